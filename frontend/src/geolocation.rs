use gloo_utils::window;
use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use web_sys::js_sys::{Function, Reflect};
use workout_lib::{Coordinates, error::LocationError};
use yew::Callback;

// GeolocationPositionError.PERMISSION_DENIED
const PERMISSION_DENIED: f64 = 1.0;

/// Asks the browser for the current position once. `on_result` fires at most
/// once, with either the position or the reason it is unavailable.
pub fn request_location(on_result: Callback<Result<Coordinates, LocationError>>) {
    let Ok(geolocation) = window().navigator().geolocation() else {
        on_result.emit(Err(LocationError::Unsupported));
        return;
    };

    let on_success = on_result.clone();
    let success = Closure::once_into_js(move |position: JsValue| {
        on_success.emit(read_position(&position));
    });

    let on_failure = on_result.clone();
    let failure = Closure::once_into_js(move |error: JsValue| {
        on_failure.emit(Err(read_error(&error)));
    });

    if geolocation
        .get_current_position_with_error_callback(success.unchecked_ref::<Function>(), Some(failure.unchecked_ref::<Function>()))
        .is_err()
    {
        on_result.emit(Err(LocationError::Unavailable));
    }
}

fn number(target: &JsValue, field: &str) -> Option<f64> {
    Reflect::get(target, &JsValue::from_str(field)).ok()?.as_f64()
}

fn read_position(position: &JsValue) -> Result<Coordinates, LocationError> {
    let coords = Reflect::get(position, &JsValue::from_str("coords")).map_err(|_| LocationError::Unavailable)?;
    let lat = number(&coords, "latitude").ok_or(LocationError::Unavailable)?;
    let lng = number(&coords, "longitude").ok_or(LocationError::Unavailable)?;

    Coordinates::new(lat, lng).map_err(|_| LocationError::Unavailable)
}

fn read_error(error: &JsValue) -> LocationError {
    match number(error, "code") {
        Some(code) if code == PERMISSION_DENIED => LocationError::Denied,
        _ => LocationError::Unavailable,
    }
}
