//! Event and entrant-list resolution.
//!
//! Picks the next upcoming event from the schedule payload, then pulls
//! the entrant list out of the pre-tournament payload. Both payloads
//! are schema-tolerant; an empty cached field forces one refresh before
//! giving up.

use anyhow::{Result, anyhow};
use serde_json::Value;

use crate::datagolf_fetch::DataGolfClient;
use crate::names::normalize_name;
use crate::payload::{NAME_KEYS, first_str, player_records, value_as_f64};

const EVENT_LIST_KEYS: &[&str] = &["schedule", "events", "tournaments"];
const EVENT_ID_KEYS: &[&str] = &["event_id", "dg_event_id", "id"];

#[derive(Debug, Clone)]
pub struct EventField {
    pub event_id: i64,
    pub event_name: String,
    pub course: String,
    pub date: String,
    /// Raw entrant names, in field order.
    pub players: Vec<String>,
}

impl EventField {
    pub fn field_count(&self) -> usize {
        self.players.len()
    }
}

/// Entrant names from a pre-tournament payload. Records without a
/// usable name are skipped.
pub fn extract_entrants(pre_tournament: &Value) -> Vec<String> {
    player_records(pre_tournament)
        .iter()
        .filter_map(|record| first_str(record, NAME_KEYS))
        .filter(|name| !normalize_name(name).is_empty())
        .map(str::to_string)
        .collect()
}

pub fn resolve_event(client: &DataGolfClient, tour: &str) -> Result<EventField> {
    resolve_inner(client, tour, false)
}

fn resolve_inner(client: &DataGolfClient, tour: &str, refresh: bool) -> Result<EventField> {
    let schedule = client.fetch_schedule(tour, true, refresh)?;
    let events = event_list(&schedule)
        .ok_or_else(|| anyhow!("no upcoming events returned by the schedule endpoint"))?;
    let event = events
        .first()
        .ok_or_else(|| anyhow!("no upcoming events returned by the schedule endpoint"))?;

    let event_id = event_id(event).ok_or_else(|| anyhow!("could not determine event_id"))?;
    let event_name = first_str(event, &["event_name", "name"])
        .unwrap_or("Unknown Event")
        .to_string();
    let course = first_str(event, &["course", "venue"]).unwrap_or("").to_string();
    let date = first_str(event, &["start_date", "date"]).unwrap_or("").to_string();

    log::info!("resolved event_id={event_id} ({event_name})");

    let pre_tournament = client.fetch_pre_tournament(event_id, tour, refresh)?;
    let players = extract_entrants(&pre_tournament);

    if players.is_empty() && !refresh {
        log::warn!("field empty from cache, forcing refresh once");
        return resolve_inner(client, tour, true);
    }
    if players.is_empty() {
        let top_keys: Vec<&String> = pre_tournament
            .as_object()
            .map(|m| m.keys().collect())
            .unwrap_or_default();
        return Err(anyhow!(
            "pre-tournament endpoint returned 0 players for event_id={event_id} ({event_name}) \
             even after forced refresh; top-level keys: {top_keys:?}"
        ));
    }

    Ok(EventField {
        event_id,
        event_name,
        course,
        date,
        players,
    })
}

fn event_list(schedule: &Value) -> Option<&Vec<Value>> {
    let map = schedule.as_object()?;
    EVENT_LIST_KEYS.iter().find_map(|key| match map.get(*key) {
        Some(Value::Array(items)) if !items.is_empty() => Some(items),
        _ => None,
    })
}

fn event_id(event: &Value) -> Option<i64> {
    for key in EVENT_ID_KEYS {
        match event.get(*key) {
            Some(Value::Number(n)) => {
                if let Some(id) = n.as_i64() {
                    return Some(id);
                }
            }
            Some(v) => {
                if let Some(id) = value_as_f64(v) {
                    return Some(id as i64);
                }
            }
            None => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entrants_come_from_any_recognized_list_key() {
        let payload = json!({"baseline": [
            {"player_name": "A Player", "win": 0.02},
            {"player_name": "B Player"},
            {"player_name": "#@!"},
            {"rank": 3}
        ]});
        let entrants = extract_entrants(&payload);
        assert_eq!(entrants, vec!["A Player", "B Player"]);
    }

    #[test]
    fn event_id_accepts_numbers_and_numeric_strings() {
        assert_eq!(event_id(&json!({"event_id": 551})), Some(551));
        assert_eq!(event_id(&json!({"dg_event_id": "551"})), Some(551));
        assert_eq!(event_id(&json!({"name": "x"})), None);
    }
}
