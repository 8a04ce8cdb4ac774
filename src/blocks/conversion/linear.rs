use crate::types::DecodedValue;

/// Apply `offset + factor * x`.
///
/// Non-numeric values pass through unchanged.
pub fn apply_linear(offset: f64, factor: f64, value: &DecodedValue) -> DecodedValue {
    match value.as_f64() {
        Some(raw) => DecodedValue::Float64(offset + factor * raw),
        None => value.clone(),
    }
}

/// Apply `(p1·x² + p2·x + p3) / (p4·x² + p5·x + p6)`.
///
/// A zero denominator yields the raw value as a float.
pub fn apply_rational(p: &[f64; 6], value: &DecodedValue) -> DecodedValue {
    let Some(raw) = value.as_f64() else {
        return value.clone();
    };
    let num = p[0] * raw * raw + p[1] * raw + p[2];
    let den = p[3] * raw * raw + p[4] * raw + p[5];
    if den.abs() > f64::EPSILON {
        DecodedValue::Float64(num / den)
    } else {
        DecodedValue::Float64(raw)
    }
}
