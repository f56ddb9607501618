//! Float rendering shared by the plain and CSV outputs.
//!
//! Scores are printed with the shortest digits that round-trip. Values
//! below `1e-4` or from `1e16` up use exponent notation with an explicit
//! sign and at least two exponent digits (`1e-05`, `1e+17`). Whole numbers
//! keep a trailing `.0`, and non-finite values print as `nan`, `inf` and
//! `-inf`.

use serde::Serializer;

pub fn format_score(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    // Debug switches to exponent notation at the same magnitudes.
    let shortest = format!("{value:?}");
    match shortest.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => shortest,
    }
}

/// `serialize_with` hook writing a float through [`format_score`].
pub fn serialize_score<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_score(*value))
}
