use crate::workout::{Coordinates, Workout};

/// Content of the popup bound to a workout marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPopup {
    pub text: String,
    pub class_name: String,
}

impl From<&Workout> for MarkerPopup {
    fn from(workout: &Workout) -> Self {
        Self {
            text: workout.marker_label(),
            class_name: workout.popup_class(),
        }
    }
}

/// The interactive map widget as seen by the controller.
pub trait MapView {
    /// Renders the map centered on `center`.
    fn show(&mut self, center: Coordinates, zoom: f64);

    /// Registers a handler for map clicks. It may fire any number of times.
    fn on_click(&mut self, handler: Box<dyn Fn(Coordinates)>);

    /// Places a marker. Markers are never deduplicated.
    fn add_marker(&mut self, at: Coordinates, popup: &MarkerPopup);

    /// Moves the view to `center`. Fire and forget.
    fn recenter(&mut self, center: Coordinates, zoom: f64);
}
