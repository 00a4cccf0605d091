//! Sanity guardrails over the simulation output.
//!
//! The report is a status value, not an exception: callers must check
//! it, and a FAIL still comes with the fully populated simulation
//! result for diagnosis. Every violated rule is collected; nothing
//! short-circuits.

use serde::Serialize;

use crate::config::GuardrailConfig;
use crate::simulate::{SimRow, SimulationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CalibrationStatus {
    Pass,
    Fail,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProbSanity {
    pub max_p_t10: Option<f64>,
    pub max_p_t40: Option<f64>,
    pub max_p_mc: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalibrationReport {
    pub status: CalibrationStatus,
    pub n_players: usize,
    pub fill_player_pct: f64,
    pub prob_sanity: ProbSanity,
    pub reasons: Vec<String>,
}

pub fn calibration_report(result: &SimulationResult, g: &GuardrailConfig) -> CalibrationReport {
    let n = result.rows.len();
    let fill_player_pct = if n == 0 {
        0.0
    } else {
        result.rows.iter().filter(|r| r.player.fill_player).count() as f64 / n as f64
    };

    let prob_sanity = ProbSanity {
        max_p_t10: column_max(result, |r| r.p_t10),
        max_p_t40: column_max(result, |r| r.p_t40),
        max_p_mc: column_max(result, |r| r.p_mc),
    };

    let mut reasons = Vec::new();
    if fill_player_pct > g.max_fill_player_pct_fail {
        reasons.push(format!("Fill player pct too high: {fill_player_pct:.3}"));
    }
    if prob_sanity.max_p_t10.is_some_and(|p| p > g.max_p_t10) {
        reasons.push("max P(T10) too high".to_string());
    }
    if prob_sanity.max_p_t40.is_some_and(|p| p > g.max_p_t40) {
        reasons.push("max P(T40) too high".to_string());
    }
    if prob_sanity.max_p_mc.is_some_and(|p| p > g.max_p_mc) {
        reasons.push("max P(MC) too high".to_string());
    }

    CalibrationReport {
        status: if reasons.is_empty() {
            CalibrationStatus::Pass
        } else {
            CalibrationStatus::Fail
        },
        n_players: n,
        fill_player_pct,
        prob_sanity,
        reasons,
    }
}

fn column_max(result: &SimulationResult, pick: impl Fn(&SimRow) -> f64) -> Option<f64> {
    result.rows.iter().map(pick).reduce(f64::max)
}
