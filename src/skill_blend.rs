//! Blends per-player strokes-gained vectors from two recency windows
//! into one vector per metric.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::config::BlendWeights;
use crate::payload::{first_f64, player_records, record_key};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SgMetric {
    OffTee,
    Approach,
    AroundGreen,
    Putting,
    Total,
}

impl SgMetric {
    pub const ALL: [SgMetric; 5] = [
        SgMetric::OffTee,
        SgMetric::Approach,
        SgMetric::AroundGreen,
        SgMetric::Putting,
        SgMetric::Total,
    ];

    /// Accepted field spellings, in priority order.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            SgMetric::OffTee => &["sg_ott", "sg_off_tee"],
            SgMetric::Approach => &["sg_app", "sg_approach"],
            SgMetric::AroundGreen => &["sg_arg", "sg_around_green"],
            SgMetric::Putting => &["sg_putt", "sg_putting"],
            SgMetric::Total => &["sg_total", "sg_t", "sg_overall"],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SgMetric::OffTee => "SG_OTT",
            SgMetric::Approach => "SG_APP",
            SgMetric::AroundGreen => "SG_ARG",
            SgMetric::Putting => "SG_PUTT",
            SgMetric::Total => "SG_TOTAL",
        }
    }

    fn index(self) -> usize {
        match self {
            SgMetric::OffTee => 0,
            SgMetric::Approach => 1,
            SgMetric::AroundGreen => 2,
            SgMetric::Putting => 3,
            SgMetric::Total => 4,
        }
    }
}

/// One player's strokes-gained vector; missing metrics stay missing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SgVector {
    values: [Option<f64>; 5],
}

impl SgVector {
    pub fn get(&self, metric: SgMetric) -> Option<f64> {
        self.values[metric.index()]
    }

    pub fn set(&mut self, metric: SgMetric, value: Option<f64>) {
        self.values[metric.index()] = value;
    }

    pub fn is_all_missing(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }
}

pub type SkillMap = BTreeMap<String, SgVector>;

fn extract(payload: &Value) -> SkillMap {
    let mut out = SkillMap::new();
    for record in player_records(payload) {
        let Some(key) = record_key(record) else {
            continue;
        };
        let entry = out.entry(key).or_default();
        for metric in SgMetric::ALL {
            if entry.get(metric).is_none() {
                entry.set(metric, first_f64(record, metric.aliases()));
            }
        }
    }
    out
}

/// Weighted average over the windows that actually carry a value, with
/// the weights re-normalized by their sum. A value present in only one
/// window passes through unmodified — no shrinkage toward the other
/// window.
pub(crate) fn blend_pair(long: Option<f64>, short: Option<f64>, w: BlendWeights) -> Option<f64> {
    match (long, short) {
        (Some(a), Some(b)) => {
            let den = w.long + w.short;
            if den > 0.0 {
                Some((w.long * a + w.short * b) / den)
            } else {
                None
            }
        }
        (Some(a), None) if w.long > 0.0 => Some(a),
        (None, Some(b)) if w.short > 0.0 => Some(b),
        _ => None,
    }
}

/// Blend the long and short window payloads into one skill vector per
/// player. Output covers the union of players seen in either window.
pub fn blend_skill(
    long_window: Option<&Value>,
    short_window: Option<&Value>,
    weights: BlendWeights,
) -> SkillMap {
    let long_map = long_window.map(extract).unwrap_or_default();
    let short_map = short_window.map(extract).unwrap_or_default();

    let keys: BTreeSet<&String> = long_map.keys().chain(short_map.keys()).collect();
    let mut out = SkillMap::new();
    for key in keys {
        let long_vec = long_map.get(key).copied().unwrap_or_default();
        let short_vec = short_map.get(key).copied().unwrap_or_default();
        let mut blended = SgVector::default();
        for metric in SgMetric::ALL {
            blended.set(
                metric,
                blend_pair(long_vec.get(metric), short_vec.get(metric), weights),
            );
        }
        out.insert(key.clone(), blended);
    }
    out
}
