//! Monte Carlo tournament simulation.
//!
//! A stateless function of the feature table, the composite score, the
//! simulation parameters and an optional pre-bounded weather overlay.
//! All randomness flows from the single configured seed; the same seed
//! with the same inputs reproduces bit-identical output.

use std::cmp::Ordering;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::config::SimConfig;
use crate::error::{ModelError, ModelResult};
use crate::features::{FieldTable, PlayerRow};
use crate::stats::{median, population_std};

/// Clamp bounds for the per-player round spread, in strokes.
pub const SIGMA_FLOOR: f64 = 1.5;
pub const SIGMA_CEIL: f64 = 6.0;
/// Spread used when no round-stability data exists field-wide.
pub const DEFAULT_SIGMA: f64 = 3.0;
/// Target cross-sectional spread of the rescaled composite, in strokes
/// per round.
pub const TARGET_MU_SD: f64 = 1.2;
/// Highest rank (0-based) that still makes the cut on a full-size field.
pub const CUT_RANK: usize = 70;

/// One entrant row extended with the simulation outputs.
#[derive(Debug, Clone)]
pub struct SimRow {
    pub player: PlayerRow,
    /// Rescaled mean performance, weather included.
    pub model_score: f64,
    pub p_t10: f64,
    pub p_t20: f64,
    pub p_t30: f64,
    pub p_t40: f64,
    pub p_mc: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SimulationResult {
    pub rows: Vec<SimRow>,
}

/// Run the full simulation. Fails fast on a non-positive simulation
/// count or mismatched input lengths, before any sampling.
pub fn simulate(
    table: &FieldTable,
    composite: &[f64],
    cfg: SimConfig,
    weather: Option<&[f64]>,
) -> ModelResult<SimulationResult> {
    let n = table.len();
    if cfg.n_sims == 0 {
        return Err(ModelError::Simulation("n_sims must be positive".into()));
    }
    if composite.len() != n {
        return Err(ModelError::Simulation(format!(
            "composite has {} values for {} players",
            composite.len(),
            n
        )));
    }
    if let Some(w) = weather {
        if w.len() != n {
            return Err(ModelError::Simulation(format!(
                "weather adjustment has {} values for {} players",
                w.len(),
                n
            )));
        }
    }
    if n == 0 {
        return Ok(SimulationResult::default());
    }

    let sigma = player_sigmas(&table.rows, cfg.variance_multiplier);
    let mu = player_mus(composite, weather);

    let cutline = CUT_RANK.min(n - 1);
    let mut t10 = vec![0u64; n];
    let mut t20 = vec![0u64; n];
    let mut t30 = vec![0u64; n];
    let mut t40 = vec![0u64; n];
    let mut made_cut = vec![0u64; n];

    let mut rng = ChaCha8Rng::seed_from_u64(cfg.seed);
    let mut draws = vec![0.0f64; n];
    let mut order: Vec<usize> = (0..n).collect();

    for _ in 0..cfg.n_sims {
        for (i, draw) in draws.iter_mut().enumerate() {
            let z: f64 = StandardNormal.sample(&mut rng);
            *draw = mu[i] + sigma[i] * z;
        }

        // Higher draw = better finish. Exact-float ties fall back to
        // field order, which keeps the sort a deterministic total order.
        for (slot, i) in order.iter_mut().zip(0..n) {
            *slot = i;
        }
        order.sort_unstable_by(|&a, &b| {
            draws[b]
                .partial_cmp(&draws[a])
                .unwrap_or(Ordering::Equal)
                .then(a.cmp(&b))
        });

        for (rank, &i) in order.iter().enumerate() {
            if rank < 10 {
                t10[i] += 1;
            }
            if rank < 20 {
                t20[i] += 1;
            }
            if rank < 30 {
                t30[i] += 1;
            }
            if rank < 40 {
                t40[i] += 1;
            }
            if rank <= cutline {
                made_cut[i] += 1;
            } else if rank >= 40 {
                break;
            }
        }
    }

    let inv = 1.0 / cfg.n_sims as f64;
    let rows = table
        .rows
        .iter()
        .enumerate()
        .map(|(i, player)| {
            let mut p_t10 = t10[i] as f64 * inv;
            let mut p_t20 = t20[i] as f64 * inv;
            let mut p_t30 = t30[i] as f64 * inv;
            let p_t40 = t40[i] as f64 * inv;
            let p_mc = made_cut[i] as f64 * inv;

            // Successive pairwise minimum, narrow bucket first.
            p_t10 = p_t10.min(p_t20);
            p_t20 = p_t20.min(p_t30);
            p_t30 = p_t30.min(p_t40);

            SimRow {
                player: player.clone(),
                model_score: mu[i],
                p_t10,
                p_t20,
                p_t30,
                p_t40,
                p_mc,
            }
        })
        .collect();

    Ok(SimulationResult { rows })
}

/// Round spread per player: round-stability when the column has any
/// data (missing rows imputed with the field median), clamped to
/// [1.5, 6.0]; a constant 3.0 otherwise. Scaled by the configured
/// variance multiplier.
fn player_sigmas(rows: &[PlayerRow], variance_multiplier: f64) -> Vec<f64> {
    let present: Vec<f64> = rows.iter().filter_map(|r| r.std_dev).collect();
    match median(&present) {
        Some(field_median) => rows
            .iter()
            .map(|r| {
                r.std_dev
                    .unwrap_or(field_median)
                    .clamp(SIGMA_FLOOR, SIGMA_CEIL)
                    * variance_multiplier
            })
            .collect(),
        None => vec![DEFAULT_SIGMA * variance_multiplier; rows.len()],
    }
}

/// Mean performance per player: the composite rescaled linearly (no
/// intercept shift) to the target cross-sectional spread, plus the
/// weather overlay. A degenerate all-equal composite skips the rescale.
fn player_mus(composite: &[f64], weather: Option<&[f64]>) -> Vec<f64> {
    let mut mu = composite.to_vec();
    if let Some(sd) = population_std(&mu) {
        if sd > 0.0 {
            let scale = TARGET_MU_SD / sd;
            for v in &mut mu {
                *v *= scale;
            }
        }
    }
    if let Some(w) = weather {
        for (v, adj) in mu.iter_mut().zip(w) {
            *v += adj;
        }
    }
    mu
}
