//! Pre-tournament finish-probability model for golf fields.
//!
//! The core pipeline is a chain of pure transforms: normalize entrant
//! names, blend skill sources across recency windows, build the feature
//! table, score a composite, simulate tournament outcomes, and check
//! the output against calibration guardrails. Fetching, caching and
//! output writing are collaborator modules around that core.

pub mod approach_skill;
pub mod calibration;
pub mod config;
pub mod datagolf_fetch;
pub mod error;
pub mod export;
pub mod features;
pub mod field;
pub mod http_cache;
pub mod names;
pub mod payload;
pub mod projection;
pub mod simulate;
pub mod skill_blend;
pub mod stats;
pub mod weather;
