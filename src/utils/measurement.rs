use crate::utils::constants::UNIT_SUFFIXES;

/// Coerce a stored measurement such as `"27.0 µg/m³"` or `"25.5 °C"` to a number.
///
/// Returns `None` (a parse skip) when the text is empty, carries something
/// other than a known unit, or is not a finite number. A skipped value is left
/// out of the average for its own quantity only.
pub fn parse_measurement(raw: &str) -> Option<f64> {
    let mut value = raw.trim();

    for suffix in UNIT_SUFFIXES {
        if let Some(stripped) = value.strip_suffix(suffix) {
            value = stripped.trim_end();
            break;
        }
    }

    if value.is_empty() {
        return None;
    }

    value.parse::<f64>().ok().filter(|v| v.is_finite())
}
