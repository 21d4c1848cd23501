pub mod config;
pub mod controller;
pub mod error;
pub mod map;
pub mod persistence;
pub mod storage;
pub mod store;
pub mod validation;
pub mod workout;

pub use controller::{AppController, FormState, Phase};
pub use workout::{Coordinates, Workout, WorkoutId, WorkoutKind};
