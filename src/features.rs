//! Builds the per-entrant feature table all later stages consume.
//!
//! The entrant list defines the row set; every other source is merged in
//! with left-preserving semantics on the normalized name key. Missing
//! sources degrade to missing columns, never an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::approach_skill::{ApproachFeatures, aggregate_approach};
use crate::config::ModelConfig;
use crate::names::normalize_name;
use crate::payload::{first_f64, player_records, record_key};
use crate::skill_blend::{SgVector, blend_skill};

pub const STD_DEV_KEYS: &[&str] = &["std_dev", "std_deviation", "round_std_dev"];
pub const BIG_NUM_KEYS: &[&str] = &["big_num", "big_numbers", "big_num_rate", "dbl_bogey_rate"];
pub const COURSE_HISTORY_KEYS: &[&str] =
    &["course_history_adj", "course_history", "course_hist", "ch_adj"];

/// Closed set of composite-scorer features. Configuration references
/// these by label, so a typo fails at parse time instead of silently
/// reading as missing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Feature {
    SgTotal,
    ApproachWeighted,
    CourseHistory,
    CourseFit,
    PenaltyAvoid,
    BigNum,
    Stability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    HigherBetter,
    LowerBetter,
}

impl Feature {
    pub const ALL: [Feature; 7] = [
        Feature::SgTotal,
        Feature::ApproachWeighted,
        Feature::CourseHistory,
        Feature::CourseFit,
        Feature::PenaltyAvoid,
        Feature::BigNum,
        Feature::Stability,
    ];

    pub fn direction(self) -> Direction {
        match self {
            Feature::BigNum | Feature::Stability => Direction::LowerBetter,
            _ => Direction::HigherBetter,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Feature::SgTotal => "SG_TOTAL",
            Feature::ApproachWeighted => "APPROACH_WEIGHTED",
            Feature::CourseHistory => "COURSE_HISTORY",
            Feature::CourseFit => "COURSE_FIT",
            Feature::PenaltyAvoid => "PENALTY_AVOID",
            Feature::BigNum => "BIG_NUM",
            Feature::Stability => "STD_DEV",
        }
    }

    pub fn value(self, row: &PlayerRow) -> Option<f64> {
        match self {
            Feature::SgTotal => row.sg.get(crate::skill_blend::SgMetric::Total),
            Feature::ApproachWeighted => row.approach_weighted,
            Feature::CourseHistory => row.course_history,
            Feature::CourseFit => row.course_fit,
            Feature::PenaltyAvoid => row.penalty_avoid,
            Feature::BigNum => row.big_num,
            Feature::Stability => row.std_dev,
        }
    }
}

/// One tournament entrant with every numeric feature column. `None` is
/// explicitly missing and distinct from zero throughout.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRow {
    pub name: String,
    pub key: String,
    pub sg: SgVector,
    pub std_dev: Option<f64>,
    pub big_num: Option<f64>,
    pub course_history: Option<f64>,
    pub course_fit: Option<f64>,
    pub approach_weighted: Option<f64>,
    pub poor_shot_avoid: Option<f64>,
    pub penalty_avoid: Option<f64>,
    /// True when every strokes-gained column plus both decomposition
    /// columns are missing; such rows belong to an external fallback
    /// path, not the model.
    pub fill_player: bool,
}

/// Ordered feature table; row order is entrant order and never changes
/// after construction.
#[derive(Debug, Clone, Default)]
pub struct FieldTable {
    pub rows: Vec<PlayerRow>,
}

impl FieldTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn fill_player_count(&self) -> usize {
        self.rows.iter().filter(|r| r.fill_player).count()
    }
}

/// Course-fit signal source. The default is a neutral constant so the
/// pipeline stays stable until a real similarity model is plugged in.
pub trait CourseFitModel {
    fn course_fit(&self, row: &PlayerRow) -> f64;
}

pub struct NeutralCourseFit;

impl CourseFitModel for NeutralCourseFit {
    fn course_fit(&self, _row: &PlayerRow) -> f64 {
        0.0
    }
}

/// Raw upstream payloads for one run; every source is optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourcePayloads<'a> {
    pub skill_long: Option<&'a Value>,
    pub skill_short: Option<&'a Value>,
    pub decomp: Option<&'a Value>,
    pub approach_long: Option<&'a Value>,
    pub approach_short: Option<&'a Value>,
}

#[derive(Debug, Clone, Copy, Default)]
struct DecompRecord {
    std_dev: Option<f64>,
    big_num: Option<f64>,
    course_history: Option<f64>,
}

fn extract_decomp(payload: &Value) -> BTreeMap<String, DecompRecord> {
    let mut out = BTreeMap::new();
    for record in player_records(payload) {
        let Some(key) = record_key(record) else {
            continue;
        };
        out.entry(key).or_insert_with(|| DecompRecord {
            std_dev: first_f64(record, STD_DEV_KEYS),
            big_num: first_f64(record, BIG_NUM_KEYS),
            course_history: first_f64(record, COURSE_HISTORY_KEYS),
        });
    }
    out
}

/// Merge the entrant list with all blended sources. Entrants whose name
/// normalizes to an empty key are discarded.
pub fn build_features(
    entrants: &[String],
    sources: &SourcePayloads,
    cfg: &ModelConfig,
    course_fit: &dyn CourseFitModel,
) -> FieldTable {
    let skill = blend_skill(sources.skill_long, sources.skill_short, cfg.sg_blend);
    let decomp = sources.decomp.map(extract_decomp).unwrap_or_default();
    let approach = aggregate_approach(
        sources.approach_long,
        sources.approach_short,
        cfg.approach.period_blend,
        cfg.approach.distance_weights,
    );

    let mut rows = Vec::with_capacity(entrants.len());
    for name in entrants {
        let key = normalize_name(name);
        if key.is_empty() {
            log::warn!("discarding entrant with unusable name: {name:?}");
            continue;
        }

        let sg = skill.get(&key).copied().unwrap_or_default();
        let d = decomp.get(&key).copied().unwrap_or_default();
        let a = approach.get(&key).copied().unwrap_or_default();

        let mut row = PlayerRow {
            name: name.clone(),
            key,
            sg,
            std_dev: d.std_dev,
            big_num: d.big_num,
            course_history: d.course_history,
            course_fit: None,
            approach_weighted: a.approach_weighted,
            poor_shot_avoid: a.poor_shot_avoid,
            penalty_avoid: derive_penalty_avoid(&a, d.big_num),
            fill_player: sg.is_all_missing() && d.std_dev.is_none() && d.big_num.is_none(),
        };
        row.course_fit = Some(course_fit.course_fit(&row));
        rows.push(row);
    }

    FieldTable { rows }
}

/// Poor-shot avoidance when present, else the negated big-number rate.
/// The fallback mixes a rate with a negated incidence measure; the unit
/// mismatch is a known property of the upstream sources, kept until they
/// reconcile.
fn derive_penalty_avoid(approach: &ApproachFeatures, big_num: Option<f64>) -> Option<f64> {
    approach.poor_shot_avoid.or_else(|| big_num.map(|b| -b))
}

#[cfg(test)]
pub(crate) fn tests_config() -> ModelConfig {
    serde_json::from_value(serde_json::json!({
        "sg_blend": {"long": 0.6, "short": 0.4},
        "approach": {
            "period_blend": {"long": 0.6, "short": 0.4},
            "distance_weights": {"150_200": 0.6, "200_plus": 0.4}
        },
        "weights": {"SG_TOTAL": 1.0},
        "sim": {"seed": 7, "n_sims": 100},
        "datagolf": {
            "base_url": "https://feeds.example.com",
            "endpoints": {"schedule": "/get-schedule"}
        }
    }))
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skill_blend::SgMetric;
    use serde_json::json;

    fn test_config() -> ModelConfig {
        tests_config()
    }

    #[test]
    fn entrant_list_defines_row_set_and_order() {
        let skill = json!({"players": [
            {"player_name": "B Player", "sg_total": 1.0},
            {"player_name": "Z Unentered", "sg_total": 9.9}
        ]});
        let entrants = vec!["A Player".to_string(), "B Player".to_string()];
        let table = build_features(
            &entrants,
            &SourcePayloads {
                skill_long: Some(&skill),
                ..Default::default()
            },
            &test_config(),
            &NeutralCourseFit,
        );

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].name, "A Player");
        assert_eq!(table.rows[1].name, "B Player");
        assert_eq!(table.rows[0].sg.get(SgMetric::Total), None);
        assert_eq!(table.rows[1].sg.get(SgMetric::Total), Some(1.0));
    }

    #[test]
    fn absent_sources_degrade_to_missing_and_flag_fill_players() {
        let entrants = vec!["A Player".to_string()];
        let table = build_features(
            &entrants,
            &SourcePayloads::default(),
            &test_config(),
            &NeutralCourseFit,
        );
        let row = &table.rows[0];
        assert!(row.fill_player);
        assert_eq!(row.std_dev, None);
        assert_eq!(row.approach_weighted, None);
        assert_eq!(row.penalty_avoid, None);
        // Neutral course fit is still present.
        assert_eq!(row.course_fit, Some(0.0));
    }

    #[test]
    fn penalty_avoid_falls_back_to_negated_big_number_rate() {
        let decomp = json!({"players": [{"player_name": "A Player", "big_num_rate": 0.12}]});
        let entrants = vec!["A Player".to_string()];
        let table = build_features(
            &entrants,
            &SourcePayloads {
                decomp: Some(&decomp),
                ..Default::default()
            },
            &test_config(),
            &NeutralCourseFit,
        );
        let row = &table.rows[0];
        assert_eq!(row.penalty_avoid, Some(-0.12));
        assert!(!row.fill_player);
    }

    #[test]
    fn decomp_alias_spellings_resolve() {
        let decomp = json!({"data": [{
            "name": "A Player",
            "round_std_dev": 2.7,
            "dbl_bogey_rate": 0.08,
            "ch_adj": 0.3
        }]});
        let entrants = vec!["A Player".to_string()];
        let table = build_features(
            &entrants,
            &SourcePayloads {
                decomp: Some(&decomp),
                ..Default::default()
            },
            &test_config(),
            &NeutralCourseFit,
        );
        let row = &table.rows[0];
        assert_eq!(row.std_dev, Some(2.7));
        assert_eq!(row.big_num, Some(0.08));
        assert_eq!(row.course_history, Some(0.3));
    }

    #[test]
    fn unusable_entrant_names_are_discarded() {
        let entrants = vec!["123".to_string(), "A Player".to_string()];
        let table = build_features(
            &entrants,
            &SourcePayloads::default(),
            &test_config(),
            &NeutralCourseFit,
        );
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].name, "A Player");
    }
}
