use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use serde_json::{Value, json};

use tourcast::config::ModelConfig;
use tourcast::features::{FieldTable, NeutralCourseFit, SourcePayloads, build_features};
use tourcast::projection::compute_composite;
use tourcast::simulate::simulate;

const FIELD_SIZE: usize = 156;

fn bench_config() -> ModelConfig {
    serde_json::from_value(json!({
        "sg_blend": {"long": 0.6, "short": 0.4},
        "approach": {
            "period_blend": {"long": 0.6, "short": 0.4},
            "distance_weights": {"150_200": 0.6, "200_plus": 0.4}
        },
        "weights": {
            "SG_TOTAL": 0.4,
            "APPROACH_WEIGHTED": 0.2,
            "PENALTY_AVOID": 0.1,
            "BIG_NUM": 0.075,
            "STABILITY": 0.075
        },
        "sim": {"seed": 1337, "n_sims": 2000, "variance_multiplier": 1.0},
        "datagolf": {
            "base_url": "https://feeds.example.com",
            "endpoints": {"schedule": "/get-schedule"}
        }
    }))
    .expect("bench config should parse")
}

fn synthetic_name(idx: usize) -> String {
    format!("Player {idx:03}, Test")
}

fn synthetic_payloads() -> (Vec<String>, Value, Value, Value) {
    let entrants: Vec<String> = (0..FIELD_SIZE).map(synthetic_name).collect();

    let skill: Vec<Value> = (0..FIELD_SIZE)
        .map(|i| {
            let spread = (i as f64 - FIELD_SIZE as f64 / 2.0) / 40.0;
            json!({
                "player_name": synthetic_name(i),
                "sg_ott": spread * 0.3,
                "sg_app": spread * 0.5,
                "sg_arg": spread * 0.1,
                "sg_putt": spread * 0.1,
                "sg_total": spread
            })
        })
        .collect();

    let decomp: Vec<Value> = (0..FIELD_SIZE)
        .map(|i| {
            json!({
                "player_name": synthetic_name(i),
                "std_dev": 2.0 + (i % 5) as f64 * 0.5,
                "big_num": 0.04 + (i % 7) as f64 * 0.01
            })
        })
        .collect();

    let approach: Vec<Value> = (0..FIELD_SIZE)
        .map(|i| {
            let spread = (i as f64 - FIELD_SIZE as f64 / 2.0) / 500.0;
            json!({
                "player_name": synthetic_name(i),
                "sg_150_200": spread,
                "sg_200_999": spread * 0.8,
                "poor_shot_avoid_pct": 0.75 + (i % 10) as f64 * 0.01
            })
        })
        .collect();

    (
        entrants,
        json!({"players": skill}),
        json!({"players": decomp}),
        json!({"players": approach}),
    )
}

fn synthetic_table(cfg: &ModelConfig) -> FieldTable {
    let (entrants, skill, decomp, approach) = synthetic_payloads();
    build_features(
        &entrants,
        &SourcePayloads {
            skill_long: Some(&skill),
            decomp: Some(&decomp),
            approach_long: Some(&approach),
            ..Default::default()
        },
        cfg,
        &NeutralCourseFit,
    )
}

fn bench_feature_build(c: &mut Criterion) {
    let cfg = bench_config();
    let (entrants, skill, decomp, approach) = synthetic_payloads();
    c.bench_function("feature_build", |b| {
        b.iter(|| {
            let table = build_features(
                black_box(&entrants),
                &SourcePayloads {
                    skill_long: Some(black_box(&skill)),
                    decomp: Some(black_box(&decomp)),
                    approach_long: Some(black_box(&approach)),
                    ..Default::default()
                },
                &cfg,
                &NeutralCourseFit,
            );
            black_box(table.len());
        })
    });
}

fn bench_composite(c: &mut Criterion) {
    let cfg = bench_config();
    let table = synthetic_table(&cfg);
    c.bench_function("composite_score", |b| {
        b.iter(|| {
            let composite = compute_composite(black_box(&table), &cfg.weights);
            black_box(composite.len());
        })
    });
}

fn bench_simulate(c: &mut Criterion) {
    let cfg = bench_config();
    let table = synthetic_table(&cfg);
    let composite = compute_composite(&table, &cfg.weights);
    c.bench_function("simulate_2000", |b| {
        b.iter(|| {
            let result = simulate(
                black_box(&table),
                black_box(&composite),
                cfg.sim,
                None,
            )
            .expect("bench preconditions hold");
            black_box(result.rows.len());
        })
    });
}

criterion_group!(perf, bench_feature_build, bench_composite, bench_simulate);
criterion_main!(perf);
