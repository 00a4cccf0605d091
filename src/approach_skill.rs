//! Distance-bucket approach-skill aggregation.
//!
//! Approach payloads arrive in two shapes: nested bucket lists with yard
//! ranges, or flat keys whose spellings vary by feed vintage. Each
//! payload is normalized into one canonical record per player before any
//! blending, so the rest of the pipeline never sees the raw shapes.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::config::{BlendWeights, DistanceWeights};
use crate::payload::{first_f64, player_records, record_key, value_as_f64};
use crate::skill_blend::blend_pair;
use crate::stats::{mean, zscores};

const BUCKET_LIST_KEYS: &[&str] = &["distance_buckets", "buckets"];
const BUCKET_SG_KEYS: &[&str] = &["sg_per_shot", "sg", "sg_app"];
const POOR_AVOID_KEYS: &[&str] = &["poor_shot_avoid_pct", "poor_shot_avoidance", "poor_shot_avoid"];

const MID_RANGE_KEYS: &[&str] = &["sg_150_200"];
const LONG_RANGE_KEYS: &[&str] = &["sg_200_999", "sg_200_plus", "sg_200_300", "sg_200_275"];
const LONG_RANGE_MARKERS: &[&str] = &["999", "plus", "300", "275"];

/// Canonical per-player record for one recency window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ApproachRecord {
    /// Strokes gained per shot from 150-200 yards.
    pub mid_range: Option<f64>,
    /// Strokes gained per shot from 200-plus yards.
    pub long_range: Option<f64>,
    /// Overall poor-shot-avoidance rate; falls back to the mean of any
    /// per-band rates when the direct field is absent.
    pub poor_avoid: Option<f64>,
}

/// Blended approach features carried into the feature table.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproachFeatures {
    pub approach_weighted: Option<f64>,
    pub poor_shot_avoid: Option<f64>,
}

/// Normalize one window payload into canonical records keyed by player.
pub fn extract_window(payload: &Value) -> BTreeMap<String, ApproachRecord> {
    let mut out = BTreeMap::new();
    for record in player_records(payload) {
        let Some(key) = record_key(record) else {
            continue;
        };
        out.entry(key).or_insert_with(|| canonical_record(record));
    }
    out
}

fn canonical_record(record: &Value) -> ApproachRecord {
    let mut mid_range = None;
    let mut long_range = None;
    let mut band_poor_rates = Vec::new();

    for list_key in BUCKET_LIST_KEYS {
        let Some(Value::Array(buckets)) = record.get(*list_key) else {
            continue;
        };
        for bucket in buckets {
            let (Some(lo), Some(hi)) = (
                bucket.get("min_yards").and_then(value_as_f64),
                bucket.get("max_yards").and_then(value_as_f64),
            ) else {
                continue;
            };
            let sg = first_f64(bucket, BUCKET_SG_KEYS);
            if let Some(poor) = first_f64(bucket, POOR_AVOID_KEYS) {
                band_poor_rates.push(poor);
            }
            if lo == 150.0 && hi == 200.0 {
                mid_range = mid_range.or(sg);
            } else if lo == 200.0 && hi > 200.0 {
                long_range = long_range.or(sg);
            }
        }
        break;
    }

    if mid_range.is_none() {
        mid_range = flat_band(record, MID_RANGE_KEYS, |key| {
            key.contains("150") && key.contains("200")
        });
    }
    if long_range.is_none() {
        long_range = flat_band(record, LONG_RANGE_KEYS, |key| {
            key.contains("200") && LONG_RANGE_MARKERS.iter().any(|m| key.contains(m))
        });
    }

    if let Some(map) = record.as_object() {
        for (key, value) in map {
            if key.contains("poor") && key.contains("avoid") && !POOR_AVOID_KEYS.contains(&key.as_str()) {
                if let Some(v) = value_as_f64(value) {
                    band_poor_rates.push(v);
                }
            }
        }
    }

    let poor_avoid = first_f64(record, POOR_AVOID_KEYS).or_else(|| mean(&band_poor_rates));

    ApproachRecord {
        mid_range,
        long_range,
        poor_avoid,
    }
}

/// Explicit candidates first, then a scan over the record's `sg_*` keys
/// for approximate spellings. Keys are visited in sorted order, so the
/// fallback is deterministic.
fn flat_band(record: &Value, candidates: &[&str], matches: impl Fn(&str) -> bool) -> Option<f64> {
    if let Some(v) = first_f64(record, candidates) {
        return Some(v);
    }
    let map = record.as_object()?;
    for (key, value) in map {
        if key.starts_with("sg_") && matches(key) {
            if let Some(v) = value_as_f64(value) {
                return Some(v);
            }
        }
    }
    None
}

/// Blend both windows, z-score each distance band across the field, and
/// combine the bands with the configured distance weights re-normalized
/// over the bands present per player.
pub fn aggregate_approach(
    long_window: Option<&Value>,
    short_window: Option<&Value>,
    period: BlendWeights,
    distance: DistanceWeights,
) -> BTreeMap<String, ApproachFeatures> {
    let long_map = long_window.map(extract_window).unwrap_or_default();
    let short_map = short_window.map(extract_window).unwrap_or_default();

    let keys: Vec<String> = long_map
        .keys()
        .chain(short_map.keys())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .cloned()
        .collect();

    let blended: Vec<ApproachRecord> = keys
        .iter()
        .map(|key| {
            let l = long_map.get(key).copied().unwrap_or_default();
            let s = short_map.get(key).copied().unwrap_or_default();
            ApproachRecord {
                mid_range: blend_pair(l.mid_range, s.mid_range, period),
                long_range: blend_pair(l.long_range, s.long_range, period),
                poor_avoid: blend_pair(l.poor_avoid, s.poor_avoid, period),
            }
        })
        .collect();

    let z_mid = zscores(&blended.iter().map(|r| r.mid_range).collect::<Vec<_>>());
    let z_long = zscores(&blended.iter().map(|r| r.long_range).collect::<Vec<_>>());

    keys.into_iter()
        .enumerate()
        .map(|(i, key)| {
            let features = ApproachFeatures {
                approach_weighted: combine_bands(z_mid[i], z_long[i], distance),
                poor_shot_avoid: blended[i].poor_avoid,
            };
            (key, features)
        })
        .collect()
}

fn combine_bands(mid: Option<f64>, long: Option<f64>, w: DistanceWeights) -> Option<f64> {
    let mut total = 0.0;
    let mut weight_sum = 0.0;
    if let Some(v) = mid {
        total += w.mid_range * v;
        weight_sum += w.mid_range;
    }
    if let Some(v) = long {
        total += w.long_range * v;
        weight_sum += w.long_range;
    }
    if weight_sum > 0.0 {
        Some(total / weight_sum)
    } else {
        None
    }
}
