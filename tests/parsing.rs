use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use tourcast::approach_skill::extract_window;
use tourcast::config::BlendWeights;
use tourcast::field::extract_entrants;
use tourcast::skill_blend::{SgMetric, blend_skill};

fn read_fixture(name: &str) -> Value {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    let raw = fs::read_to_string(path).expect("fixture file should be readable");
    serde_json::from_str(&raw).expect("fixture should be valid json")
}

const BLEND: BlendWeights = BlendWeights {
    long: 0.6,
    short: 0.4,
};

#[test]
fn skill_payload_resolves_alias_spellings() {
    let long = read_fixture("skill_long.json");
    let skill = blend_skill(Some(&long), None, BLEND);

    // "sg_off_tee"/"sg_approach" spellings land in the same columns as
    // "sg_ott"/"sg_app".
    let teddy = &skill["okafor teddy"];
    assert_eq!(teddy.get(SgMetric::OffTee), Some(0.52));
    assert_eq!(teddy.get(SgMetric::Approach), Some(0.64));
    assert_eq!(teddy.get(SgMetric::Total), Some(1.39));

    // Absent metric stays missing, never zero.
    let rory = &skill["quinn rory"];
    assert_eq!(rory.get(SgMetric::AroundGreen), None);
}

#[test]
fn skill_windows_blend_and_pass_single_sources_through() {
    let long = read_fixture("skill_long.json");
    let short = read_fixture("skill_short.json");
    let skill = blend_skill(Some(&long), Some(&short), BLEND);

    let marcus = skill["vale marcus"].get(SgMetric::Total).unwrap();
    assert!((marcus - (0.6 * 2.41 + 0.4 * 2.01)).abs() < 1e-12);

    // Only the long window carries Teddy, so his values are raw.
    assert_eq!(skill["okafor teddy"].get(SgMetric::Total), Some(1.39));

    // Rory's putting exists in both windows.
    let rory_putt = skill["quinn rory"].get(SgMetric::Putting).unwrap();
    assert!((rory_putt - (0.6 * 0.1 + 0.4 * 0.4)).abs() < 1e-12);
}

#[test]
fn nested_bucket_payload_normalizes_to_canonical_records() {
    let long = read_fixture("approach_long.json");
    let records = extract_window(&long);

    let marcus = &records["vale marcus"];
    assert_eq!(marcus.mid_range, Some(0.05));
    assert_eq!(marcus.long_range, Some(0.03));
    // No direct overall rate: mean of the three per-bucket rates.
    let expected = (0.88 + 0.84 + 0.79) / 3.0;
    assert!((marcus.poor_avoid.unwrap() - expected).abs() < 1e-12);

    // Direct overall rate wins over the per-bucket fallback.
    assert_eq!(records["quinn rory"].poor_avoid, Some(0.81));
}

#[test]
fn flat_key_payload_normalizes_to_canonical_records() {
    let short = read_fixture("approach_short.json");
    let records = extract_window(&short);

    let marcus = &records["vale marcus"];
    assert_eq!(marcus.mid_range, Some(0.06));
    assert_eq!(marcus.long_range, Some(0.02));
    assert_eq!(marcus.poor_avoid, Some(0.86));

    // "sg_200_999" spelling for the 200-plus band.
    assert_eq!(records["whitfield dan"].long_range, Some(-0.02));

    // Per-band poor rates average when the overall field is absent.
    let rory = &records["quinn rory"];
    assert!((rory.poor_avoid.unwrap() - 0.76).abs() < 1e-12);
    assert_eq!(rory.long_range, None);
}

#[test]
fn entrant_extraction_skips_records_without_usable_names() {
    let pret = read_fixture("pre_tournament.json");
    let entrants = extract_entrants(&pret);
    assert_eq!(entrants.len(), 8);
    assert_eq!(entrants[0], "Vale, Marcus");
    assert_eq!(entrants[7], "Holloway, Gus");
}
