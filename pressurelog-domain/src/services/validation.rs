//! Physiological bounds validation for blood pressure readings.
//!
//! This is the single validation path for every construction and update of a
//! reading; no entry point re-derives these checks.

/// Accepted systolic range in mmHg
pub const SYSTOLIC_RANGE: (f64, f64) = (60.0, 300.0);

/// Accepted diastolic range in mmHg
pub const DIASTOLIC_RANGE: (f64, f64) = (30.0, 200.0);

/// Accepted pulse range in BPM
pub const PULSE_RANGE: (f64, f64) = (30.0, 220.0);

/// Validate blood pressure reading values.
///
/// Accumulates every violated constraint instead of failing fast, in fixed
/// order: systolic range, diastolic range, pulse range, systolic > diastolic.
/// Non-finite inputs (NaN, infinities) report the corresponding range
/// violation. Returns the ordered list of messages; an empty list means the
/// values are valid.
pub fn validate_reading_values(systolic: f64, diastolic: f64, pulse: f64) -> Vec<String> {
    let mut errors = Vec::new();

    if !within(systolic, SYSTOLIC_RANGE) {
        errors.push("Systolic pressure must be between 60 and 300 mmHg".to_string());
    }

    if !within(diastolic, DIASTOLIC_RANGE) {
        errors.push("Diastolic pressure must be between 30 and 200 mmHg".to_string());
    }

    if !within(pulse, PULSE_RANGE) {
        errors.push("Pulse rate must be between 30 and 220 BPM".to_string());
    }

    // The ordering constraint is only meaningful when both pressures are numeric
    if systolic.is_finite() && diastolic.is_finite() && systolic <= diastolic {
        errors.push("Systolic pressure must be higher than diastolic pressure".to_string());
    }

    errors
}

fn within(value: f64, (min, max): (f64, f64)) -> bool {
    value.is_finite() && value >= min && value <= max
}
