use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::PersistError,
    storage::KeyValueStore,
    workout::{Coordinates, Ride, Run, Workout, WorkoutId, WorkoutMeta},
};

/// Persisted shape of a workout. The `kind` tag is written explicitly so the
/// loader knows which variant to rebuild.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum StoredWorkout {
    Running(StoredRun),
    Cycling(StoredRide),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCommon {
    id: WorkoutId,
    #[serde(rename = "createdAtISO")]
    created_at: DateTime<Utc>,
    coordinates: Coordinates,
    distance_km: f64,
    duration_min: f64,
    description: String,
    click_count: u32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRun {
    #[serde(flatten)]
    common: StoredCommon,
    cadence_spm: f64,
    pace_min_per_km: f64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRide {
    #[serde(flatten)]
    common: StoredCommon,
    elevation_gain_m: f64,
    speed_km_per_h: f64,
}

impl From<&WorkoutMeta> for StoredCommon {
    fn from(meta: &WorkoutMeta) -> Self {
        Self {
            id: meta.id.clone(),
            created_at: meta.created_at,
            coordinates: meta.coordinates,
            distance_km: meta.distance_km,
            duration_min: meta.duration_min,
            description: meta.description.clone(),
            click_count: meta.click_count,
        }
    }
}

impl From<StoredCommon> for WorkoutMeta {
    fn from(stored: StoredCommon) -> Self {
        Self {
            id: stored.id,
            created_at: stored.created_at,
            coordinates: stored.coordinates,
            distance_km: stored.distance_km,
            duration_min: stored.duration_min,
            description: stored.description,
            click_count: stored.click_count,
        }
    }
}

impl From<&Workout> for StoredWorkout {
    fn from(workout: &Workout) -> Self {
        match workout {
            Workout::Running(run) => StoredWorkout::Running(StoredRun {
                common: (&run.meta).into(),
                cadence_spm: run.cadence_spm,
                pace_min_per_km: run.pace_min_per_km,
            }),
            Workout::Cycling(ride) => StoredWorkout::Cycling(StoredRide {
                common: (&ride.meta).into(),
                elevation_gain_m: ride.elevation_gain_m,
                speed_km_per_h: ride.speed_km_per_h,
            }),
        }
    }
}

/// Rebuilds the in-memory variant from its tag. Derived metrics are taken
/// from the record as written, never recomputed.
impl From<StoredWorkout> for Workout {
    fn from(stored: StoredWorkout) -> Self {
        match stored {
            StoredWorkout::Running(run) => Workout::Running(Run {
                meta: run.common.into(),
                cadence_spm: run.cadence_spm,
                pace_min_per_km: run.pace_min_per_km,
            }),
            StoredWorkout::Cycling(ride) => Workout::Cycling(Ride {
                meta: ride.common.into(),
                elevation_gain_m: ride.elevation_gain_m,
                speed_km_per_h: ride.speed_km_per_h,
            }),
        }
    }
}

/// Reads and writes the workout history under a single storage key.
pub struct PersistenceAdapter<S: KeyValueStore> {
    storage: S,
    key: String,
}

impl<S: KeyValueStore> PersistenceAdapter<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self { storage, key: key.into() }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn save(&mut self, workouts: &[Workout]) -> Result<(), PersistError> {
        let records: Vec<StoredWorkout> = workouts.iter().map(StoredWorkout::from).collect();
        let encoded = serde_json::to_string(&records).map_err(PersistError::Encode)?;
        self.storage.set(&self.key, &encoded)?;

        tracing::debug!(count = workouts.len(), key = %self.key, "Saved workouts");
        Ok(())
    }

    /// Loads the saved history. Missing or corrupt state yields an empty list.
    pub fn load(&self) -> Vec<Workout> {
        match self.try_load() {
            Ok(workouts) => workouts,
            Err(err) => {
                tracing::warn!(key = %self.key, "Discarding persisted workouts: {err}");
                Vec::new()
            }
        }
    }

    /// Like [`load`](Self::load) but reports why nothing could be read.
    /// Individual records that fail to decode, or repeat an earlier id, are
    /// skipped.
    pub fn try_load(&self) -> Result<Vec<Workout>, PersistError> {
        let Some(raw) = self.storage.get(&self.key)? else {
            return Ok(Vec::new());
        };

        let records: Vec<serde_json::Value> = serde_json::from_str(&raw).map_err(PersistError::Decode)?;

        let mut seen = HashSet::new();
        let mut workouts = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let stored = match serde_json::from_value::<StoredWorkout>(record) {
                Ok(stored) => stored,
                Err(err) => {
                    tracing::warn!(index, "Skipping unreadable workout record: {err}");
                    continue;
                }
            };

            let workout = Workout::from(stored);
            if !seen.insert(workout.id().clone()) {
                tracing::warn!(id = %workout.id(), "Skipping duplicate workout id");
                continue;
            }
            workouts.push(workout);
        }

        Ok(workouts)
    }

    pub fn clear(&mut self) -> Result<(), PersistError> {
        self.storage.remove(&self.key)?;
        Ok(())
    }
}
