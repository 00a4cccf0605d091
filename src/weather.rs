//! Pre-tournament weather overlay.
//!
//! Deterministic and bounded. A real weather client would convert
//! per-player exposure into strokes before the clamp; until one is
//! wired in, the overlay is neutral.

pub fn weather_adjustment(n_players: usize, cap_abs: f64) -> Vec<f64> {
    let cap = cap_abs.abs();
    vec![0.0; n_players]
        .into_iter()
        .map(|adj: f64| adj.clamp(-cap, cap))
        .collect()
}
