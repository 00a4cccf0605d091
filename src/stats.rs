//! Small cross-sectional statistics shared by the blending, scoring and
//! simulation stages. All spreads are population standard deviations.

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn population_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    Some(var.sqrt())
}

/// Median of the available values; even counts average the middle pair.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// Cross-sectional z-scores over an optional column. Missing entries stay
/// missing; when the spread is zero or undefined every present entry maps
/// to 0.0.
pub fn zscores(column: &[Option<f64>]) -> Vec<Option<f64>> {
    let present: Vec<f64> = column.iter().filter_map(|v| *v).collect();
    let m = mean(&present);
    let sd = population_std(&present);
    column
        .iter()
        .map(|v| {
            let v = (*v)?;
            match (m, sd) {
                (Some(m), Some(sd)) if sd > 0.0 => Some((v - m) / sd),
                _ => Some(0.0),
            }
        })
        .collect()
}
