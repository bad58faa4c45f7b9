//! One-time upgrade of legacy save documents.
//!
//! Version 1 saves stored locations as percentage pairs (`x_pct`/`y_pct`), sometimes
//! with absolute pixel coordinates alongside, and usually without ids or pin types.
//! Their habits had no ids either. Loading such a document backfills everything here;
//! the next save writes the canonical version 2 shape and nothing is migrated again.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use uuid::Uuid;

use crate::game::types::{Location, MapExtent, MapPoint, PinType, Player, LEGACY_PLAYER_SCHEMA_VERSION, PLAYER_SCHEMA_VERSION};
use crate::logutil::escape_log;

/// Location as it may appear in any save version. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LocationRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub notes: Option<String>,
    pub position: Option<MapPoint>,
    pub x_pct: Option<f64>,
    pub y_pct: Option<f64>,
    pub absolute_x: Option<f64>,
    pub absolute_y: Option<f64>,
    pub pin_type: Option<String>,
    pub visited: Option<bool>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// What a load had to repair. Logged once per load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub from_version: u8,
    pub habits_renumbered: usize,
    pub locations_backfilled: usize,
    pub locations_dropped: usize,
    pub location_ids_regenerated: usize,
    /// Top-level fields that were missing or undecodable and fell back to defaults.
    pub defaulted_fields: Vec<&'static str>,
}

impl MigrationReport {
    pub fn new(from_version: u8) -> Self {
        Self {
            from_version,
            ..Self::default()
        }
    }

    /// True when the stored document differs from what a save would now write.
    pub fn changed(&self) -> bool {
        self.from_version < PLAYER_SCHEMA_VERSION
            || self.habits_renumbered > 0
            || self.locations_backfilled > 0
            || self.locations_dropped > 0
            || self.location_ids_regenerated > 0
    }

    pub fn is_legacy(&self) -> bool {
        self.from_version <= LEGACY_PLAYER_SCHEMA_VERSION
    }

    pub fn log(&self) {
        if !self.changed() {
            return;
        }
        info!(
            "save migrated from v{} to v{}: {} habit ids assigned, {} locations backfilled, {} dropped, {} duplicate ids replaced",
            self.from_version,
            PLAYER_SCHEMA_VERSION,
            self.habits_renumbered,
            self.locations_backfilled,
            self.locations_dropped,
            self.location_ids_regenerated
        );
    }
}

/// Parse an RFC 3339 timestamp, or a bare ISO timestamp without offset interpreted in
/// local time.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    parse_local_timestamp(raw).map(|t| t.with_timezone(&Utc))
}

pub fn parse_local_timestamp(raw: &str) -> Option<DateTime<Local>> {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Local));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()?;
    Local.from_local_datetime(&naive).earliest()
}

/// Turn one stored record into a canonical [`Location`].
///
/// Position precedence: a canonical `position`, then the percentage pair, then the
/// absolute pair divided by `extent`. Records with no usable position or no name are
/// dropped (`None`). The flag is true when anything had to be filled in.
pub fn migrate_location(record: LocationRecord, extent: MapExtent, now: DateTime<Utc>) -> Option<(Location, bool)> {
    let name = record.name.as_deref().map(str::trim).filter(|n| !n.is_empty())?.to_string();
    let mut backfilled = false;

    let position = match (record.position, record.x_pct, record.y_pct, record.absolute_x, record.absolute_y) {
        (Some(p), ..) => MapPoint::new(p.x, p.y),
        (None, Some(x), Some(y), ..) => {
            backfilled = true;
            MapPoint::from_percent(x, y)
        }
        (None, _, _, Some(x), Some(y)) if extent.width > 0.0 && extent.height > 0.0 => {
            backfilled = true;
            MapPoint::new(x / extent.width, y / extent.height)
        }
        _ => {
            warn!("dropping location '{}' with no usable position", escape_log(&name));
            return None;
        }
    };

    let id = match record.id.as_deref().and_then(|raw| Uuid::parse_str(raw.trim()).ok()) {
        Some(id) => id,
        None => {
            backfilled = true;
            Uuid::new_v4()
        }
    };

    let pin = match record.pin_type.as_deref().map(str::parse::<PinType>) {
        Some(Ok(pin)) => pin,
        Some(Err(_)) | None => {
            backfilled = true;
            PinType::default()
        }
    };

    let created_at = record.created_at.as_deref().and_then(parse_timestamp).unwrap_or(now);
    let updated_at = record.updated_at.as_deref().and_then(parse_timestamp).unwrap_or(created_at);

    let location = Location {
        id,
        name,
        notes: record.notes.unwrap_or_default(),
        position,
        pin,
        visited: record.visited.unwrap_or(true),
        created_at,
        updated_at,
    };
    Some((location, backfilled))
}

/// Decode the stored location array, repairing or dropping each entry independently,
/// and make ids unique.
pub fn migrate_locations(values: Vec<Value>, extent: MapExtent, now: DateTime<Utc>, report: &mut MigrationReport) -> Vec<Location> {
    let mut seen = HashSet::new();
    let mut locations = Vec::with_capacity(values.len());
    for value in values {
        let record = match LocationRecord::deserialize(value) {
            Ok(record) => record,
            Err(e) => {
                warn!("dropping undecodable location record: {}", e);
                report.locations_dropped += 1;
                continue;
            }
        };
        let Some((mut location, backfilled)) = migrate_location(record, extent, now) else {
            report.locations_dropped += 1;
            continue;
        };
        if backfilled {
            report.locations_backfilled += 1;
        }
        while !seen.insert(location.id) {
            location.id = Uuid::new_v4();
            report.location_ids_regenerated += 1;
        }
        locations.push(location);
    }
    locations
}

/// Give every habit a unique non-zero id and move `habit_seq` past the largest one.
/// Returns how many habits were renumbered.
pub fn backfill_habit_ids(player: &mut Player) -> usize {
    let max_id = player.habits.iter().map(|h| h.id).max().unwrap_or(0);
    player.habit_seq = player.habit_seq.max(max_id);

    let mut seen = HashSet::new();
    let mut renumbered = 0;
    for habit in &mut player.habits {
        if habit.id == 0 || !seen.insert(habit.id) {
            player.habit_seq = player.habit_seq.saturating_add(1);
            habit.id = player.habit_seq;
            seen.insert(habit.id);
            renumbered += 1;
        }
    }
    renumbered
}
