use std::{
    collections::HashSet,
    fmt::{self, Display},
};

use chrono::{DateTime, TimeZone, Utc};
use geo_types::Point;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// A latitude/longitude pair. Stored as a `geo_types::Point` (x = lng, y = lat)
/// but always serialized as `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "(f64, f64)", try_from = "(f64, f64)")]
pub struct Coordinates(Point<f64>);

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Result<Self, ModelError> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);

        if !valid {
            return Err(ModelError::InvalidCoordinates { lat, lng });
        }

        Ok(Self(Point::new(lng, lat)))
    }

    /// Like [`new`](Self::new) but first folds the longitude into
    /// [-180, 180], as map clicks on a wrapped world copy report e.g. 200.
    pub fn wrapped(lat: f64, lng: f64) -> Result<Self, ModelError> {
        let lng = if (-180.0..=180.0).contains(&lng) { lng } else { (lng + 180.0).rem_euclid(360.0) - 180.0 };
        Self::new(lat, lng)
    }

    pub fn lat(&self) -> f64 {
        self.0.y()
    }

    pub fn lng(&self) -> f64 {
        self.0.x()
    }
}

impl From<Coordinates> for (f64, f64) {
    fn from(value: Coordinates) -> Self {
        (value.lat(), value.lng())
    }
}

impl TryFrom<(f64, f64)> for Coordinates {
    type Error = ModelError;

    fn try_from((lat, lng): (f64, f64)) -> Result<Self, Self::Error> {
        Coordinates::new(lat, lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutKind {
    Running,
    Cycling,
}

impl WorkoutKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutKind::Running => "running",
            WorkoutKind::Cycling => "cycling",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WorkoutKind::Running => "Running",
            WorkoutKind::Cycling => "Cycling",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            WorkoutKind::Running => "🏃‍♂️",
            WorkoutKind::Cycling => "🚴‍♀️",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "running" => Some(WorkoutKind::Running),
            "cycling" => Some(WorkoutKind::Cycling),
            _ => None,
        }
    }
}

impl Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque workout identifier, also used as the list item correlation key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(String);

impl WorkoutId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WorkoutId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for WorkoutId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hands out ids derived from the last ten digits of the millisecond clock.
/// Ids increase with every call, so two workouts never share one even when
/// they are created within the same millisecond. Past the ten digit window
/// the counter wraps to zero and skips every id already taken.
#[derive(Debug, Default, Clone)]
pub struct IdGenerator {
    last: u64,
    taken: HashSet<WorkoutId>,
}

impl IdGenerator {
    const MODULUS: u64 = 10_000_000_000;

    pub fn next(&mut self, now: DateTime<Utc>) -> WorkoutId {
        let candidate = now.timestamp_millis().max(0) as u64 % Self::MODULUS;
        let mut value = if candidate > self.last { candidate } else { (self.last + 1) % Self::MODULUS };

        // `last` stays below MODULUS, so neither step can overflow.
        let mut id = WorkoutId(format!("{value:010}"));
        while self.taken.contains(&id) {
            value = (value + 1) % Self::MODULUS;
            id = WorkoutId(format!("{value:010}"));
        }

        self.last = value;
        self.taken.insert(id.clone());
        id
    }

    /// Registers an id issued elsewhere (e.g. loaded from storage). Ids that
    /// are not ten digit numbers are only remembered as taken.
    pub fn observe(&mut self, id: &WorkoutId) {
        if let Ok(value) = id.0.parse::<u64>() {
            if value < Self::MODULUS {
                self.last = self.last.max(value);
            }
        }
        self.taken.insert(id.clone());
    }
}

/// Fields shared by every workout kind.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutMeta {
    pub(crate) id: WorkoutId,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) coordinates: Coordinates,
    pub(crate) distance_km: f64,
    pub(crate) duration_min: f64,
    pub(crate) description: String,
    pub(crate) click_count: u32,
}

impl WorkoutMeta {
    fn new<Tz: TimeZone>(
        kind: WorkoutKind,
        id: WorkoutId,
        created_at: DateTime<Tz>,
        coordinates: Coordinates,
        distance_km: f64,
        duration_min: f64,
    ) -> Result<Self, ModelError>
    where
        Tz::Offset: Display,
    {
        positive("distanceKm", distance_km)?;
        positive("durationMin", duration_min)?;

        // Month and day come from the caller's time zone, not UTC.
        let description = format!("{} on {}", kind.title(), created_at.format("%B %-d"));

        Ok(Self {
            id,
            created_at: created_at.with_timezone(&Utc),
            coordinates,
            distance_km,
            duration_min,
            description,
            click_count: 0,
        })
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ModelError> {
    if !value.is_finite() {
        return Err(ModelError::NotFinite { field, value });
    }
    if value <= 0.0 {
        return Err(ModelError::NotPositive { field, value });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub(crate) meta: WorkoutMeta,
    pub(crate) cadence_spm: f64,
    pub(crate) pace_min_per_km: f64,
}

impl Run {
    pub fn new<Tz: TimeZone>(
        id: WorkoutId,
        created_at: DateTime<Tz>,
        coordinates: Coordinates,
        distance_km: f64,
        duration_min: f64,
        cadence_spm: f64,
    ) -> Result<Self, ModelError>
    where
        Tz::Offset: Display,
    {
        let meta = WorkoutMeta::new(WorkoutKind::Running, id, created_at, coordinates, distance_km, duration_min)?;
        positive("cadenceSpm", cadence_spm)?;

        Ok(Self {
            pace_min_per_km: meta.duration_min / meta.distance_km,
            meta,
            cadence_spm,
        })
    }

    pub fn cadence_spm(&self) -> f64 {
        self.cadence_spm
    }

    pub fn pace_min_per_km(&self) -> f64 {
        self.pace_min_per_km
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ride {
    pub(crate) meta: WorkoutMeta,
    pub(crate) elevation_gain_m: f64,
    pub(crate) speed_km_per_h: f64,
}

impl Ride {
    pub fn new<Tz: TimeZone>(
        id: WorkoutId,
        created_at: DateTime<Tz>,
        coordinates: Coordinates,
        distance_km: f64,
        duration_min: f64,
        elevation_gain_m: f64,
    ) -> Result<Self, ModelError>
    where
        Tz::Offset: Display,
    {
        let meta = WorkoutMeta::new(WorkoutKind::Cycling, id, created_at, coordinates, distance_km, duration_min)?;
        if !elevation_gain_m.is_finite() {
            return Err(ModelError::NotFinite { field: "elevationGainM", value: elevation_gain_m });
        }

        Ok(Self {
            speed_km_per_h: meta.distance_km / (meta.duration_min / 60.0),
            meta,
            elevation_gain_m,
        })
    }

    pub fn elevation_gain_m(&self) -> f64 {
        self.elevation_gain_m
    }

    pub fn speed_km_per_h(&self) -> f64 {
        self.speed_km_per_h
    }
}

/// One recorded exercise session. Immutable after construction apart from
/// the click counter.
#[derive(Debug, Clone, PartialEq)]
pub enum Workout {
    Running(Run),
    Cycling(Ride),
}

/// A single line of the list view, e.g. `⏱ 30 min`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatRow {
    pub icon: &'static str,
    pub value: String,
    pub unit: &'static str,
}

impl StatRow {
    fn new(icon: &'static str, value: String, unit: &'static str) -> Self {
        Self { icon, value, unit }
    }
}

impl Workout {
    fn meta(&self) -> &WorkoutMeta {
        match self {
            Workout::Running(run) => &run.meta,
            Workout::Cycling(ride) => &ride.meta,
        }
    }

    fn meta_mut(&mut self) -> &mut WorkoutMeta {
        match self {
            Workout::Running(run) => &mut run.meta,
            Workout::Cycling(ride) => &mut ride.meta,
        }
    }

    pub fn kind(&self) -> WorkoutKind {
        match self {
            Workout::Running(_) => WorkoutKind::Running,
            Workout::Cycling(_) => WorkoutKind::Cycling,
        }
    }

    pub fn id(&self) -> &WorkoutId {
        &self.meta().id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.meta().created_at
    }

    pub fn coordinates(&self) -> Coordinates {
        self.meta().coordinates
    }

    pub fn distance_km(&self) -> f64 {
        self.meta().distance_km
    }

    pub fn duration_min(&self) -> f64 {
        self.meta().duration_min
    }

    pub fn description(&self) -> &str {
        &self.meta().description
    }

    pub fn click_count(&self) -> u32 {
        self.meta().click_count
    }

    pub fn click(&mut self) {
        let meta = self.meta_mut();
        meta.click_count = meta.click_count.saturating_add(1);
    }

    /// Text shown in the map marker popup.
    pub fn marker_label(&self) -> String {
        format!("{} {}", self.kind().icon(), self.description())
    }

    pub fn popup_class(&self) -> String {
        format!("{}-popup", self.kind())
    }

    pub fn list_stats(&self) -> Vec<StatRow> {
        let mut rows = vec![
            StatRow::new(self.kind().icon(), self.distance_km().to_string(), "km"),
            StatRow::new("⏱", self.duration_min().to_string(), "min"),
        ];

        match self {
            Workout::Running(run) => {
                rows.push(StatRow::new("⚡️", format!("{:.1}", run.pace_min_per_km), "min/km"));
                rows.push(StatRow::new("🦶🏼", run.cadence_spm.to_string(), "spm"));
            }
            Workout::Cycling(ride) => {
                rows.push(StatRow::new("⚡️", format!("{:.1}", ride.speed_km_per_h), "km/h"));
                rows.push(StatRow::new("⛰", ride.elevation_gain_m.to_string(), "m"));
            }
        }

        rows
    }
}

impl From<Run> for Workout {
    fn from(value: Run) -> Self {
        Workout::Running(value)
    }
}

impl From<Ride> for Workout {
    fn from(value: Ride) -> Self {
        Workout::Cycling(value)
    }
}
