use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};

use crate::{
    config::AppConfig,
    error::{LocationError, SubmitError},
    map::{MapView, MarkerPopup},
    persistence::PersistenceAdapter,
    storage::KeyValueStore,
    store::WorkoutStore,
    validation::FormInput,
    workout::{Coordinates, IdGenerator, Ride, Run, Workout, WorkoutId, WorkoutKind},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormState {
    Hidden,
    /// The form is open for a workout at `pending`, the last clicked location.
    Visible { pending: Coordinates },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    AwaitingLocation,
    /// Location was refused or failed. The map never appears; the list still works.
    LocationUnavailable,
    MapReady(FormState),
}

/// Owns the app state and keeps the store, the persisted copy, the map
/// markers and the list in step with each other.
pub struct AppController<M: MapView, S: KeyValueStore> {
    config: AppConfig,
    phase: Phase,
    store: WorkoutStore,
    persistence: PersistenceAdapter<S>,
    map: M,
    ids: IdGenerator,
}

impl<M: MapView, S: KeyValueStore> AppController<M, S> {
    /// Starts in `AwaitingLocation` with whatever history `storage` holds.
    pub fn new(config: AppConfig, map: M, storage: S) -> Self {
        let persistence = PersistenceAdapter::new(storage, config.storage_key.clone());
        let store = WorkoutStore::from(persistence.load());

        let mut ids = IdGenerator::default();
        for workout in store.all() {
            ids.observe(workout.id());
        }

        tracing::info!(count = store.len(), "Loaded workouts");

        Self {
            config,
            phase: Phase::AwaitingLocation,
            store,
            persistence,
            map,
            ids,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn workouts(&self) -> &[Workout] {
        self.store.all()
    }

    pub fn store(&self) -> &WorkoutStore {
        &self.store
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    pub fn storage(&self) -> &S {
        self.persistence.storage()
    }

    pub fn form_visible(&self) -> bool {
        matches!(self.phase, Phase::MapReady(FormState::Visible { .. }))
    }

    pub fn pending_location(&self) -> Option<Coordinates> {
        match self.phase {
            Phase::MapReady(FormState::Visible { pending }) => Some(pending),
            _ => None,
        }
    }

    /// Handles the one-shot geolocation result. Later results are ignored.
    /// Markers for already loaded workouts are placed once the map exists.
    pub fn location_resolved(&mut self, result: Result<Coordinates, LocationError>) -> Result<(), LocationError> {
        if self.phase != Phase::AwaitingLocation {
            tracing::debug!(phase = ?self.phase, "Ignoring late location result");
            return Ok(());
        }

        match result {
            Ok(center) => {
                self.map.show(center, self.config.map_zoom);
                for workout in self.store.all() {
                    self.map.add_marker(workout.coordinates(), &MarkerPopup::from(workout));
                }
                self.phase = Phase::MapReady(FormState::Hidden);
                tracing::info!(lat = center.lat(), lng = center.lng(), "Map ready");
                Ok(())
            }
            Err(err) => {
                self.phase = Phase::LocationUnavailable;
                tracing::warn!("Running without a map: {err}");
                Err(err)
            }
        }
    }

    /// Opens the form for `at`. A click while the form is open replaces the
    /// pending location. Returns `false` when there is no map to click on.
    pub fn map_clicked(&mut self, at: Coordinates) -> bool {
        match self.phase {
            Phase::MapReady(_) => {
                self.phase = Phase::MapReady(FormState::Visible { pending: at });
                true
            }
            _ => false,
        }
    }

    pub fn cancel_form(&mut self) {
        if let Phase::MapReady(FormState::Visible { .. }) = self.phase {
            self.phase = Phase::MapReady(FormState::Hidden);
        }
    }

    pub fn submit(&mut self, input: &FormInput) -> Result<&Workout, SubmitError> {
        self.submit_at(input, Local::now())
    }

    /// Validates `input` and records a workout created at `now`. On error
    /// nothing changes: the form stays open, the store and storage are
    /// untouched and no marker is placed.
    pub fn submit_at<Tz: TimeZone>(&mut self, input: &FormInput, now: DateTime<Tz>) -> Result<&Workout, SubmitError>
    where
        Tz::Offset: Display,
    {
        let pending = self.pending_location().ok_or(SubmitError::NoPendingLocation)?;

        if !input.is_valid() {
            tracing::debug!(kind = %input.kind, "Rejected workout input");
            return Err(SubmitError::InvalidInput);
        }

        let (distance, duration, specific) = input.numbers();
        let id = self.ids.next(now.with_timezone(&Utc));
        let workout: Workout = match input.kind {
            WorkoutKind::Running => Run::new(id, now, pending, distance, duration, specific).map(Workout::from),
            WorkoutKind::Cycling => Ride::new(id, now, pending, distance, duration, specific).map(Workout::from),
        }
        .map_err(|err| {
            tracing::warn!("Validated input failed to build a workout: {err}");
            SubmitError::InvalidInput
        })?;

        self.map.add_marker(pending, &MarkerPopup::from(&workout));
        tracing::info!(id = %workout.id(), kind = %workout.kind(), "Added workout");

        self.store.add(workout);
        self.persist();
        self.phase = Phase::MapReady(FormState::Hidden);

        self.store.all().last().ok_or(SubmitError::InvalidInput)
    }

    /// Focuses a workout picked from the list. Unknown ids and selections made
    /// before the map exists are ignored.
    pub fn select_workout(&mut self, id: &WorkoutId) -> Option<&Workout> {
        if !matches!(self.phase, Phase::MapReady(_)) {
            return None;
        }

        let Some(workout) = self.store.find_by_id_mut(id) else {
            tracing::debug!(%id, "Selected workout no longer exists");
            return None;
        };

        workout.click();
        let at = workout.coordinates();
        self.map.recenter(at, self.config.map_zoom);
        self.persist();

        self.store.find_by_id(id)
    }

    /// Deletes the history, in memory and in storage, and returns to the
    /// initial state. The caller is expected to reload the page afterwards.
    pub fn reset(&mut self) {
        if let Err(err) = self.persistence.clear() {
            tracing::warn!("Failed to clear persisted workouts: {err}");
        }
        self.store.clear();
        self.phase = Phase::AwaitingLocation;
        tracing::info!("Workouts reset");
    }

    fn persist(&mut self) {
        if let Err(err) = self.persistence.save(self.store.all()) {
            tracing::warn!("Failed to persist workouts: {err}");
        }
    }
}
