use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::features::Feature;

/// Weight pair for a long/short recency-window blend. Only the windows
/// actually carrying a value participate, re-normalized by their sum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BlendWeights {
    pub long: f64,
    pub short: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DistanceWeights {
    #[serde(rename = "150_200")]
    pub mid_range: f64,
    #[serde(rename = "200_plus")]
    pub long_range: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproachConfig {
    pub period_blend: BlendWeights,
    pub distance_weights: DistanceWeights,
    #[serde(default = "default_weather_cap")]
    pub weather_cap_abs: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimConfig {
    pub seed: u64,
    pub n_sims: u64,
    #[serde(default = "default_variance_multiplier")]
    pub variance_multiplier: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GuardrailConfig {
    #[serde(default = "default_max_fill")]
    pub max_fill_player_pct_fail: f64,
    #[serde(default = "default_max_p_t10")]
    pub max_p_t10: f64,
    #[serde(default = "default_max_p_t40")]
    pub max_p_t40: f64,
    #[serde(default = "default_max_p_mc")]
    pub max_p_mc: f64,
}

impl Default for GuardrailConfig {
    fn default() -> Self {
        Self {
            max_fill_player_pct_fail: default_max_fill(),
            max_p_t10: default_max_p_t10(),
            max_p_t40: default_max_p_t40(),
            max_p_mc: default_max_p_mc(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataGolfConfig {
    pub base_url: String,
    pub endpoints: BTreeMap<String, String>,
    #[serde(default)]
    pub defaults: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub sg_blend: BlendWeights,
    pub approach: ApproachConfig,
    /// Composite weights keyed by the closed feature set; an unknown key
    /// fails deserialization instead of becoming silent missing data.
    pub weights: BTreeMap<Feature, f64>,
    pub sim: SimConfig,
    #[serde(default)]
    pub guardrails: GuardrailConfig,
    pub datagolf: DataGolfConfig,
}

impl ModelConfig {
    pub fn load(path: &Path) -> ModelResult<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| ModelError::Config(format!("cannot read {}: {e}", path.display())))?;
        let cfg: Self = serde_json::from_str(&raw)
            .map_err(|e| ModelError::Config(format!("cannot parse {}: {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject broken configuration before any payload is touched.
    pub fn validate(&self) -> ModelResult<()> {
        check_blend("sg_blend", self.sg_blend)?;
        check_blend("approach.period_blend", self.approach.period_blend)?;

        let dw = self.approach.distance_weights;
        check_weight("distance_weights.150_200", dw.mid_range)?;
        check_weight("distance_weights.200_plus", dw.long_range)?;
        if dw.mid_range + dw.long_range <= 0.0 {
            return Err(ModelError::Config(
                "distance_weights must have a positive sum".into(),
            ));
        }

        if !self.approach.weather_cap_abs.is_finite() {
            return Err(ModelError::Config("weather_cap_abs must be finite".into()));
        }

        for (feature, w) in &self.weights {
            check_weight(feature.label(), *w)?;
        }

        if self.sim.n_sims == 0 {
            return Err(ModelError::Config("sim.n_sims must be positive".into()));
        }
        if !self.sim.variance_multiplier.is_finite() || self.sim.variance_multiplier <= 0.0 {
            return Err(ModelError::Config(
                "sim.variance_multiplier must be a positive number".into(),
            ));
        }

        let g = &self.guardrails;
        for (label, v) in [
            ("max_fill_player_pct_fail", g.max_fill_player_pct_fail),
            ("max_p_t10", g.max_p_t10),
            ("max_p_t40", g.max_p_t40),
            ("max_p_mc", g.max_p_mc),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(ModelError::Config(format!(
                    "guardrails.{label} must be a non-negative number"
                )));
            }
        }

        if self.datagolf.base_url.trim().is_empty() {
            return Err(ModelError::Config("datagolf.base_url is required".into()));
        }
        if self.datagolf.endpoints.is_empty() {
            return Err(ModelError::Config("datagolf.endpoints is required".into()));
        }

        Ok(())
    }
}

fn check_blend(label: &str, w: BlendWeights) -> ModelResult<()> {
    check_weight(label, w.long)?;
    check_weight(label, w.short)?;
    if w.long + w.short <= 0.0 {
        return Err(ModelError::Config(format!(
            "{label} must have a positive sum"
        )));
    }
    Ok(())
}

fn check_weight(label: &str, w: f64) -> ModelResult<()> {
    if !w.is_finite() || w < 0.0 {
        return Err(ModelError::Config(format!(
            "weight {label} must be a non-negative number"
        )));
    }
    Ok(())
}

fn default_weather_cap() -> f64 {
    0.12
}

fn default_variance_multiplier() -> f64 {
    1.0
}

fn default_max_fill() -> f64 {
    0.5
}

fn default_max_p_t10() -> f64 {
    0.55
}

fn default_max_p_t40() -> f64 {
    0.85
}

fn default_max_p_mc() -> f64 {
    0.95
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> serde_json::Value {
        serde_json::json!({
            "sg_blend": {"long": 0.6, "short": 0.4},
            "approach": {
                "period_blend": {"long": 0.6, "short": 0.4},
                "distance_weights": {"150_200": 0.6, "200_plus": 0.4}
            },
            "weights": {"SG_TOTAL": 0.5, "BIG_NUM": 0.1},
            "sim": {"seed": 7, "n_sims": 100},
            "datagolf": {
                "base_url": "https://feeds.example.com",
                "endpoints": {"schedule": "/get-schedule"}
            }
        })
    }

    #[test]
    fn parses_with_defaults_and_validates() {
        let cfg: ModelConfig = serde_json::from_value(sample_json()).unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.sim.variance_multiplier, 1.0);
        assert_eq!(cfg.guardrails.max_p_mc, 0.95);
        assert_eq!(cfg.approach.weather_cap_abs, 0.12);
        assert_eq!(cfg.weights.get(&Feature::SgTotal), Some(&0.5));
    }

    #[test]
    fn unknown_weight_key_fails_at_parse_time() {
        let mut raw = sample_json();
        raw["weights"]["SG_TOTLA"] = serde_json::json!(0.5);
        assert!(serde_json::from_value::<ModelConfig>(raw).is_err());
    }

    #[test]
    fn zero_sims_is_a_config_error() {
        let mut raw = sample_json();
        raw["sim"]["n_sims"] = serde_json::json!(0);
        let cfg: ModelConfig = serde_json::from_value(raw).unwrap();
        assert!(matches!(cfg.validate(), Err(ModelError::Config(_))));
    }

    #[test]
    fn negative_weight_is_rejected() {
        let mut raw = sample_json();
        raw["weights"]["SG_TOTAL"] = serde_json::json!(-0.2);
        let cfg: ModelConfig = serde_json::from_value(raw).unwrap();
        assert!(cfg.validate().is_err());
    }
}
