use crate::workout::WorkoutKind;

/// Coerces a raw form field to a number the way a numeric unary plus does:
/// blank input becomes `0`, `0x`/`0o`/`0b` literals are read in their radix
/// and anything unparsable becomes NaN.
pub fn coerce_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let radix = match trimmed.get(..2) {
        Some("0x" | "0X") => 16,
        Some("0o" | "0O") => 8,
        Some("0b" | "0B") => 2,
        _ => return trimmed.parse::<f64>().unwrap_or(f64::NAN),
    };

    let digits = &trimmed[2..];
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0, |acc: f64, c| c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d)))
        .unwrap_or(f64::NAN)
}

/// Decides whether raw form input may become a workout.
///
/// All three numbers must be finite. Distance and duration must be positive
/// for both kinds, cadence must be positive for runs, while elevation gain
/// only has to be finite (a flat ride has zero gain).
pub fn is_valid_workout_input(kind: WorkoutKind, distance_km: f64, duration_min: f64, type_specific: f64) -> bool {
    let all_finite = [distance_km, duration_min, type_specific].iter().all(|v| v.is_finite());
    if !all_finite {
        return false;
    }

    match kind {
        WorkoutKind::Running => [distance_km, duration_min, type_specific].iter().all(|v| *v > 0.0),
        WorkoutKind::Cycling => distance_km > 0.0 && duration_min > 0.0,
    }
}

/// Raw values read from the workout form, before coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct FormInput {
    pub kind: WorkoutKind,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation: String,
}

impl FormInput {
    pub fn new(kind: WorkoutKind) -> Self {
        Self {
            kind,
            distance: String::new(),
            duration: String::new(),
            cadence: String::new(),
            elevation: String::new(),
        }
    }

    /// Coerced (distance, duration, kind specific value). Only the field
    /// belonging to the selected kind is read.
    pub fn numbers(&self) -> (f64, f64, f64) {
        let specific = match self.kind {
            WorkoutKind::Running => &self.cadence,
            WorkoutKind::Cycling => &self.elevation,
        };
        (coerce_number(&self.distance), coerce_number(&self.duration), coerce_number(specific))
    }

    pub fn is_valid(&self) -> bool {
        let (distance, duration, specific) = self.numbers();
        is_valid_workout_input(self.kind, distance, duration, specific)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coercion_matches_unary_plus() {
        assert_eq!(coerce_number(" 5.5 "), 5.5);
        assert_eq!(coerce_number(""), 0.0);
        assert!(coerce_number("five").is_nan());
        assert!(!coerce_number("inf").is_finite());
    }

    #[test]
    fn coercion_reads_radix_prefixes() {
        assert_eq!(coerce_number("0x10"), 16.0);
        assert_eq!(coerce_number("0B101"), 5.0);
        assert_eq!(coerce_number("0o17"), 15.0);
        assert!(coerce_number("0x").is_nan());
        assert!(coerce_number("0x+1").is_nan());
        assert!(coerce_number("-0x10").is_nan());
    }

    #[test]
    fn rejects_zero_negative_and_nan() {
        assert!(!is_valid_workout_input(WorkoutKind::Running, 0.0, 30.0, 180.0));
        assert!(!is_valid_workout_input(WorkoutKind::Running, 5.0, -1.0, 180.0));
        assert!(!is_valid_workout_input(WorkoutKind::Running, 5.0, 30.0, f64::NAN));
        assert!(!is_valid_workout_input(WorkoutKind::Cycling, 5.0, 30.0, f64::INFINITY));
    }

    #[test]
    fn elevation_may_be_zero_or_negative() {
        assert!(is_valid_workout_input(WorkoutKind::Cycling, 20.0, 60.0, 0.0));
        assert!(is_valid_workout_input(WorkoutKind::Cycling, 20.0, 60.0, -15.0));
        assert!(!is_valid_workout_input(WorkoutKind::Running, 5.0, 30.0, 0.0));
    }

    #[test]
    fn form_reads_only_the_visible_field() {
        let mut input = FormInput::new(WorkoutKind::Cycling);
        input.distance = "20".into();
        input.duration = "60".into();
        input.cadence = "not a number".into();

        // Blank elevation coerces to 0, which is accepted.
        assert!(input.is_valid());

        input.kind = WorkoutKind::Running;
        assert!(!input.is_valid());
    }
}
