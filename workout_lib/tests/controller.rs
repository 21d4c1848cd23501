use std::{cell::RefCell, rc::Rc};

use chrono::{Local, TimeZone, Utc};
use workout_lib::{
    config::AppConfig,
    error::{LocationError, SubmitError},
    map::{MapView, MarkerPopup},
    storage::{KeyValueStore, MemoryStorage},
    validation::FormInput,
    AppController, Coordinates, FormState, Phase, Workout, WorkoutKind,
};

#[derive(Default)]
struct RecordingMap {
    shown: Option<(Coordinates, f64)>,
    markers: Vec<(Coordinates, MarkerPopup)>,
    recentered: Vec<Coordinates>,
    click_handler: Option<Box<dyn Fn(Coordinates)>>,
}

impl MapView for RecordingMap {
    fn show(&mut self, center: Coordinates, zoom: f64) {
        self.shown = Some((center, zoom));
    }

    fn on_click(&mut self, handler: Box<dyn Fn(Coordinates)>) {
        self.click_handler = Some(handler);
    }

    fn add_marker(&mut self, at: Coordinates, popup: &MarkerPopup) {
        self.markers.push((at, popup.clone()));
    }

    fn recenter(&mut self, center: Coordinates, _zoom: f64) {
        self.recentered.push(center);
    }
}

fn coords(lat: f64, lng: f64) -> Coordinates {
    Coordinates::new(lat, lng).unwrap()
}

fn form(kind: WorkoutKind, distance: &str, duration: &str, specific: &str) -> FormInput {
    let mut input = FormInput::new(kind);
    input.distance = distance.into();
    input.duration = duration.into();
    match kind {
        WorkoutKind::Running => input.cadence = specific.into(),
        WorkoutKind::Cycling => input.elevation = specific.into(),
    }
    input
}

fn ready_controller(storage: MemoryStorage) -> AppController<RecordingMap, MemoryStorage> {
    let mut app = AppController::new(AppConfig::default(), RecordingMap::default(), storage);
    app.location_resolved(Ok(coords(51.5, -0.12))).unwrap();
    app
}

#[test]
fn starts_waiting_for_location() {
    let app = AppController::new(AppConfig::default(), RecordingMap::default(), MemoryStorage::new());

    assert_eq!(app.phase(), Phase::AwaitingLocation);
    assert!(app.workouts().is_empty());
    assert!(app.map().shown.is_none());
}

#[test]
fn running_submission_records_a_run() {
    let mut app = ready_controller(MemoryStorage::new());
    assert!(app.map_clicked(coords(51.5, -0.1)));
    assert!(app.form_visible());

    let now = Local::now();
    let workout = app.submit_at(&form(WorkoutKind::Running, "5", "30", "180"), now).unwrap().clone();

    match &workout {
        Workout::Running(run) => assert_eq!(run.pace_min_per_km(), 6.0),
        Workout::Cycling(_) => panic!("expected a run"),
    }
    assert_eq!(workout.description(), format!("Running on {}", now.format("%B %-d")));
    assert_eq!(workout.coordinates(), coords(51.5, -0.1));

    assert_eq!(app.workouts().len(), 1);
    assert_eq!(app.phase(), Phase::MapReady(FormState::Hidden));
    assert_eq!(app.map().markers.len(), 1);
    assert_eq!(app.map().markers[0].1.class_name, "running-popup");
    assert!(app.storage().get("workouts").unwrap().is_some());
}

#[test]
fn cycling_submission_computes_speed() {
    let mut app = ready_controller(MemoryStorage::new());
    app.map_clicked(coords(40.0, 8.0));

    let workout = app.submit(&form(WorkoutKind::Cycling, "20", "60", "0")).unwrap();

    match workout {
        Workout::Cycling(ride) => assert_eq!(ride.speed_km_per_h(), 20.0),
        Workout::Running(_) => panic!("expected a ride"),
    }
}

#[test]
fn invalid_submission_changes_nothing() {
    let mut app = ready_controller(MemoryStorage::new());
    app.map_clicked(coords(40.0, 8.0));

    let result = app.submit(&form(WorkoutKind::Running, "0", "30", "180"));

    assert_eq!(result.err(), Some(SubmitError::InvalidInput));
    assert!(app.form_visible());
    assert!(app.workouts().is_empty());
    assert!(app.map().markers.is_empty());
    assert_eq!(app.storage().get("workouts").unwrap(), None);
}

#[test]
fn submission_without_a_click_is_refused() {
    let mut app = ready_controller(MemoryStorage::new());

    let result = app.submit(&form(WorkoutKind::Running, "5", "30", "180"));

    assert_eq!(result.err(), Some(SubmitError::NoPendingLocation));
    assert!(app.workouts().is_empty());
}

#[test]
fn later_click_replaces_pending_location() {
    let mut app = ready_controller(MemoryStorage::new());
    app.map_clicked(coords(1.0, 1.0));
    app.map_clicked(coords(2.0, 2.0));

    assert_eq!(app.pending_location(), Some(coords(2.0, 2.0)));

    app.cancel_form();
    assert_eq!(app.phase(), Phase::MapReady(FormState::Hidden));
}

#[test]
fn denied_location_degrades_to_list_only() {
    let storage = MemoryStorage::new();
    let mut app = AppController::new(AppConfig::default(), RecordingMap::default(), storage);

    let result = app.location_resolved(Err(LocationError::Denied));

    assert_eq!(result, Err(LocationError::Denied));
    assert_eq!(app.phase(), Phase::LocationUnavailable);
    assert!(!app.map_clicked(coords(1.0, 1.0)));
    assert!(app.map().shown.is_none());

    // A late success does not revive the map.
    app.location_resolved(Ok(coords(1.0, 1.0))).unwrap();
    assert_eq!(app.phase(), Phase::LocationUnavailable);
}

#[test]
fn history_survives_a_reload_and_markers_wait_for_the_map() {
    let mut first = ready_controller(MemoryStorage::new());
    first.map_clicked(coords(51.5, -0.1));
    first.submit(&form(WorkoutKind::Running, "5.2", "24", "178")).unwrap();
    first.map_clicked(coords(39.0, -12.0));
    first.submit(&form(WorkoutKind::Cycling, "27", "95", "523")).unwrap();

    let saved = first.storage().clone();
    let mut second = AppController::new(AppConfig::default(), RecordingMap::default(), saved);

    assert_eq!(second.workouts(), first.workouts());
    assert!(second.map().markers.is_empty());

    second.location_resolved(Ok(coords(51.5, -0.12))).unwrap();
    assert_eq!(second.map().markers.len(), 2);
    assert_eq!(second.map().markers[1].0, coords(39.0, -12.0));
}

#[test]
fn new_ids_do_not_collide_with_loaded_ones() {
    let mut first = ready_controller(MemoryStorage::new());
    let now = Utc.timestamp_millis_opt(1_713_087_000_000).unwrap();
    first.map_clicked(coords(1.0, 1.0));
    first.submit_at(&form(WorkoutKind::Running, "5", "30", "180"), now).unwrap();

    let mut second = ready_controller(first.storage().clone());
    second.map_clicked(coords(1.0, 1.0));
    second.submit_at(&form(WorkoutKind::Running, "5", "30", "180"), now).unwrap();

    let ids: Vec<&str> = second.workouts().iter().map(|w| w.id().as_str()).collect();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
}

#[test]
fn oversized_stored_id_does_not_break_submission() {
    let stored = r#"[{"kind":"cycling","id":"18446744073709551615","createdAtISO":"2023-05-06T10:00:00Z",
        "coordinates":[1.0,2.0],"distanceKm":20,"durationMin":60,"description":"Cycling on May 6",
        "clickCount":0,"elevationGainM":0,"speedKmPerH":20}]"#;
    let mut app = ready_controller(MemoryStorage::with_entry("workouts", stored));
    assert_eq!(app.workouts().len(), 1);

    app.map_clicked(coords(1.0, 1.0));
    let id = app.submit(&form(WorkoutKind::Running, "5", "30", "180")).unwrap().id().clone();

    assert_eq!(id.as_str().len(), 10);
    assert_eq!(app.workouts().len(), 2);
}

#[test]
fn wrapped_click_longitude_still_opens_the_form() {
    let mut app = ready_controller(MemoryStorage::new());

    assert!(app.map_clicked(Coordinates::wrapped(51.5, 200.0).unwrap()));
    assert_eq!(app.pending_location(), Some(coords(51.5, -160.0)));
}

#[test]
fn selecting_counts_clicks_and_recenters() {
    let mut app = ready_controller(MemoryStorage::new());
    app.map_clicked(coords(10.0, 20.0));
    let id = app.submit(&form(WorkoutKind::Cycling, "20", "60", "100")).unwrap().id().clone();

    let selected = app.select_workout(&id).unwrap();
    assert_eq!(selected.click_count(), 1);
    assert_eq!(app.map().recentered, vec![coords(10.0, 20.0)]);

    let reloaded = AppController::new(AppConfig::default(), RecordingMap::default(), app.storage().clone());
    assert_eq!(reloaded.workouts()[0].click_count(), 1);
}

#[test]
fn stale_or_early_selection_is_a_no_op() {
    let mut app = ready_controller(MemoryStorage::new());
    app.map_clicked(coords(10.0, 20.0));
    let id = app.submit(&form(WorkoutKind::Running, "5", "30", "180")).unwrap().id().clone();

    assert!(app.select_workout(&"0000000000".into()).is_none());

    let mut waiting = AppController::new(AppConfig::default(), RecordingMap::default(), app.storage().clone());
    assert!(waiting.select_workout(&id).is_none());
    assert_eq!(waiting.workouts()[0].click_count(), 0);
    assert!(waiting.map().recentered.is_empty());
}

#[test]
fn reset_clears_everything() {
    let mut app = ready_controller(MemoryStorage::new());
    app.map_clicked(coords(10.0, 20.0));
    let id = app.submit(&form(WorkoutKind::Running, "5", "30", "180")).unwrap().id().clone();

    app.reset();

    assert_eq!(app.phase(), Phase::AwaitingLocation);
    assert!(app.workouts().is_empty());
    assert_eq!(app.storage().get("workouts").unwrap(), None);
    assert!(app.select_workout(&id).is_none());
}

#[test]
fn corrupt_storage_starts_empty() {
    let storage = MemoryStorage::with_entry("workouts", "]]]");
    let app = AppController::new(AppConfig::default(), RecordingMap::default(), storage);

    assert!(app.workouts().is_empty());
}

#[test]
fn map_clicks_flow_through_the_registered_handler() {
    let clicks = Rc::new(RefCell::new(Vec::new()));
    let mut map = RecordingMap::default();
    let sink = clicks.clone();
    map.on_click(Box::new(move |at| sink.borrow_mut().push(at)));

    let mut app = AppController::new(AppConfig::default(), map, MemoryStorage::new());
    app.location_resolved(Ok(coords(0.0, 0.0))).unwrap();

    if let Some(handler) = &app.map().click_handler {
        handler(coords(3.0, 4.0));
    }
    for at in clicks.borrow().iter() {
        app.map_clicked(*at);
    }

    assert_eq!(app.pending_location(), Some(coords(3.0, 4.0)));
}
