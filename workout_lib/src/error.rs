use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("invalid coordinates ({lat}, {lng})")]
    InvalidCoordinates { lat: f64, lng: f64 },
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StorageError {
    #[error("storage is unavailable: {0}")]
    Unavailable(String),
    #[error("storage rejected the write: {0}")]
    WriteRejected(String),
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to encode workouts: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode workouts: {0}")]
    Decode(#[source] serde_json::Error),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// No map click is pending, so there is nowhere to place the workout.
    #[error("no location selected on the map")]
    NoPendingLocation,
    #[error("inputs have to be positive numbers")]
    InvalidInput,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LocationError {
    #[error("permission to read the location was denied")]
    Denied,
    #[error("location is unavailable")]
    Unavailable,
    #[error("geolocation is not supported")]
    Unsupported,
}
