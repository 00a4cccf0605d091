//! On-disk cache for upstream JSON responses.
//!
//! Entries live under `data/raw/` and are keyed by a SHA-256 digest of
//! the source, endpoint and sorted request parameters, so the same
//! request always maps to the same file. Freshness is the file's mtime
//! against the caller's TTL.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

const RAW_DIR: &str = "data/raw";

fn cache_key(source: &str, endpoint: &str, params: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort();
    let items = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    let digest = Sha256::digest(format!("{source}|{endpoint}|{items}").as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn cache_path(source: &str, endpoint: &str, params: &[(String, String)]) -> PathBuf {
    PathBuf::from(RAW_DIR).join(format!("{source}_{}.json", cache_key(source, endpoint, params)))
}

/// Cached body when a fresh entry exists; `None` on miss, expiry or
/// forced refresh.
pub fn cache_read(
    source: &str,
    endpoint: &str,
    params: &[(String, String)],
    ttl: Duration,
    refresh: bool,
) -> Option<String> {
    if refresh {
        return None;
    }
    let path = cache_path(source, endpoint, params);
    let meta = fs::metadata(&path).ok()?;
    let age = SystemTime::now()
        .duration_since(meta.modified().ok()?)
        .ok()?;
    if age > ttl {
        return None;
    }
    fs::read_to_string(&path).ok()
}

pub fn cache_write(
    source: &str,
    endpoint: &str,
    params: &[(String, String)],
    body: &str,
) -> Result<()> {
    fs::create_dir_all(RAW_DIR).context("creating raw cache dir")?;
    let path = cache_path(source, endpoint, params);
    fs::write(&path, body).with_context(|| format!("writing cache file {}", path.display()))
}
