/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Maps each value onto one of `levels` steps across `[0, ceiling]`.
///
/// Values outside the range are clamped. Returns an empty Vec for empty input.
pub fn quantize(values: &[f64], ceiling: f64, levels: u8) -> Vec<u8> {
    if levels == 0 || ceiling <= 0.0 {
        return Vec::new();
    }
    let top = (levels - 1) as f64;

    values
        .iter()
        .map(|v| ((v / ceiling).clamp(0.0, 1.0) * top).round() as u8)
        .collect()
}
