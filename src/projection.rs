//! Composite predictive score: signed, weight-renormalized sum of
//! cross-sectional z-scores over the configured feature set.

use std::collections::BTreeMap;

use crate::features::{Direction, Feature, FieldTable};
use crate::stats::zscores;

/// One z-scored composite value per row, in row order.
///
/// A feature contributes only when its configured weight is positive and
/// at least one row carries a value. A row missing a contributing
/// feature picks up that feature's field mean (z = 0) rather than
/// poisoning its composite. When no feature is usable the composite is
/// exactly zero for every player — a neutral fallback, not an error.
pub fn compute_composite(table: &FieldTable, weights: &BTreeMap<Feature, f64>) -> Vec<f64> {
    let n = table.len();
    let mut total = vec![0.0; n];
    let mut weight_sum = 0.0;

    for feature in Feature::ALL {
        let w = weights.get(&feature).copied().unwrap_or(0.0);
        if w <= 0.0 {
            continue;
        }
        let column: Vec<Option<f64>> = table.rows.iter().map(|row| feature.value(row)).collect();
        if column.iter().all(Option::is_none) {
            continue;
        }
        let signed = match feature.direction() {
            Direction::HigherBetter => w,
            Direction::LowerBetter => -w,
        };
        for (acc, z) in total.iter_mut().zip(zscores(&column)) {
            if let Some(z) = z {
                *acc += signed * z;
            }
        }
        weight_sum += w;
    }

    if weight_sum <= 0.0 {
        return vec![0.0; n];
    }
    total.iter().map(|t| t / weight_sum).collect()
}
