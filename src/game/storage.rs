//! JSON save file for the player aggregate.
//!
//! Saving writes pretty JSON to a temp file next to the destination and renames it into
//! place while holding an exclusive `fs2` lock on the destination. Loading never fails:
//! a missing, oversized or malformed file yields a fresh player, and each top-level
//! field is decoded on its own so one bad field only costs that field.

use chrono::{DateTime, Local, Utc};
use fs2::FileExt;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::game::errors::GameError;
use crate::game::migration::{backfill_habit_ids, migrate_locations, parse_local_timestamp, MigrationReport};
use crate::game::types::{
    Attribute, Attributes, MapExtent, Player, LEGACY_PLAYER_SCHEMA_VERSION, PLAYER_SCHEMA_VERSION,
};

/// Save files larger than this are treated as corrupt.
pub const MAX_SAVE_BYTES: u64 = 5 * 1024 * 1024;

pub const DEFAULT_SAVE_FILE: &str = "player.json";

#[derive(Debug, Clone)]
pub struct PlayerStore {
    path: PathBuf,
    extent: MapExtent,
}

impl PlayerStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            extent: MapExtent::default(),
        }
    }

    pub fn in_dir(data_dir: impl AsRef<Path>, file_name: &str) -> Self {
        Self::open(data_dir.as_ref().join(file_name))
    }

    /// Map extent used to convert legacy absolute coordinates while loading.
    pub fn with_extent(mut self, extent: MapExtent) -> Self {
        self.extent = extent;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn extent(&self) -> MapExtent {
        self.extent
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn save(&self, player: &Player) -> Result<(), GameError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(player)?;
        write_file_locked(&self.path, &content)?;
        debug!("saved player to {}", self.path.display());
        Ok(())
    }

    pub fn load(&self) -> Player {
        self.load_with_report().0
    }

    pub fn load_with_report(&self) -> (Player, MigrationReport) {
        self.load_at(Local::now())
    }

    /// Load, using `now` for any timestamps that have to be defaulted.
    pub fn load_at(&self, now: DateTime<Local>) -> (Player, MigrationReport) {
        let fresh = || (Player::new_at(now), MigrationReport::new(PLAYER_SCHEMA_VERSION));
        match fs::metadata(&self.path) {
            Ok(meta) if meta.len() > MAX_SAVE_BYTES => {
                warn!(
                    "save file {} is {} bytes (limit {}); starting fresh",
                    self.path.display(),
                    meta.len(),
                    MAX_SAVE_BYTES
                );
                return fresh();
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("no save at {}; starting a new character", self.path.display());
                return fresh();
            }
            Err(e) => {
                warn!("cannot stat save file {}: {}", self.path.display(), e);
                return fresh();
            }
        }
        match fs::read_to_string(&self.path) {
            Ok(content) => decode_player(&content, self.extent, now),
            Err(e) => {
                warn!("failed to read save file {}: {}", self.path.display(), e);
                fresh()
            }
        }
    }

    /// Remove the save file. Returns `false` if there was nothing to remove.
    pub fn delete(&self) -> Result<bool, GameError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("deleted save file {}", self.path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Write `content` to `path` atomically under an exclusive lock on the destination.
fn write_file_locked(path: &Path, content: &str) -> Result<(), GameError> {
    let lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(path)?;
    lock_file.lock_exclusive()?;

    let dir = path.parent().filter(|d| !d.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    let base = path.file_name().and_then(|s| s.to_str()).unwrap_or(DEFAULT_SAVE_FILE);
    let mut counter = 0u32;
    let tmp_path = loop {
        let candidate = dir.join(format!(".{}.tmp-{}-{}", base, std::process::id(), counter));
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(mut tmp) => {
                tmp.write_all(content.as_bytes())?;
                tmp.flush()?;
                let _ = tmp.sync_all();
                break candidate;
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                counter = counter.saturating_add(1);
            }
            Err(e) => return Err(e.into()),
        }
    };

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    if let Ok(dir_file) = File::open(dir) {
        let _ = dir_file.sync_all();
    }
    drop(lock_file);
    Ok(())
}

/// Decode a save document field by field.
pub fn decode_player(content: &str, extent: MapExtent, now: DateTime<Local>) -> (Player, MigrationReport) {
    let mut map = match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            warn!("save document is not a JSON object; starting fresh");
            return (Player::new_at(now), MigrationReport::new(PLAYER_SCHEMA_VERSION));
        }
        Err(e) => {
            warn!("save document is malformed ({}); starting fresh", e);
            return (Player::new_at(now), MigrationReport::new(PLAYER_SCHEMA_VERSION));
        }
    };

    let version = map
        .get("schema_version")
        .and_then(Value::as_u64)
        .and_then(|v| u8::try_from(v).ok())
        .unwrap_or(LEGACY_PLAYER_SCHEMA_VERSION);
    let mut report = MigrationReport::new(version);
    let mut player = Player::new_at(now);

    if let Some(name) = field::<String>(&mut map, "name", &mut report) {
        if name.trim().is_empty() {
            warn!("stored name is blank; keeping default");
        } else {
            player.name = name;
        }
    }
    if let Some(level) = field::<u32>(&mut map, "level", &mut report) {
        player.level = level.max(1);
    }
    if let Some(xp) = field::<u64>(&mut map, "xp", &mut report) {
        player.xp = xp;
    }
    if let Some(gold) = field::<u64>(&mut map, "gold", &mut report) {
        player.gold = gold;
    }
    match map.remove("attributes") {
        Some(Value::Object(attrs)) => player.attributes = decode_attributes(&attrs),
        Some(_) => {
            warn!("field 'attributes' is not an object; using baseline");
            report.defaulted_fields.push("attributes");
        }
        None => report.defaulted_fields.push("attributes"),
    }
    player.active_quests = list(&mut map, "active_quests", &mut report);
    player.completed_quests = list(&mut map, "completed_quests", &mut report);
    player.habits = list(&mut map, "habits", &mut report);
    if let Some(seq) = field::<u64>(&mut map, "habit_seq", &mut report) {
        player.habit_seq = seq;
    }
    match map.remove("last_login") {
        Some(Value::String(raw)) => match parse_local_timestamp(&raw) {
            Some(t) => player.last_login = t,
            None => {
                warn!("unparsable last_login {:?}; using now", raw);
                report.defaulted_fields.push("last_login");
            }
        },
        Some(_) | None => report.defaulted_fields.push("last_login"),
    }
    if let Some(streak) = field::<u32>(&mut map, "daily_streak", &mut report) {
        player.daily_streak = streak;
    }
    match map.remove("visited_locations") {
        Some(Value::Array(values)) => {
            player.visited_locations = migrate_locations(values, extent, now.with_timezone(&Utc), &mut report);
        }
        Some(_) => {
            warn!("field 'visited_locations' is not a list; using starter map");
            report.defaulted_fields.push("visited_locations");
        }
        None => report.defaulted_fields.push("visited_locations"),
    }
    player.achievements = list(&mut map, "achievements", &mut report);
    player.inventory = list(&mut map, "inventory", &mut report);

    normalize_xp(&mut player);
    report.habits_renumbered = backfill_habit_ids(&mut player);
    player.schema_version = PLAYER_SCHEMA_VERSION;

    if !report.defaulted_fields.is_empty() {
        debug!("defaulted fields: {}", report.defaulted_fields.join(", "));
    }
    report.log();
    (player, report)
}

/// Take one field out of the document. `None` when missing or undecodable.
fn field<T: DeserializeOwned>(map: &mut Map<String, Value>, key: &'static str, report: &mut MigrationReport) -> Option<T> {
    let Some(value) = map.remove(key) else {
        report.defaulted_fields.push(key);
        return None;
    };
    match serde_json::from_value(value) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("field '{}' could not be decoded ({}); using default", key, e);
            report.defaulted_fields.push(key);
            None
        }
    }
}

/// Decode a list element by element, dropping entries that do not decode.
fn list<T: DeserializeOwned>(map: &mut Map<String, Value>, key: &'static str, report: &mut MigrationReport) -> Vec<T> {
    let values = match map.remove(key) {
        Some(Value::Array(values)) => values,
        Some(_) => {
            warn!("field '{}' is not a list; using empty list", key);
            report.defaulted_fields.push(key);
            return Vec::new();
        }
        None => {
            report.defaulted_fields.push(key);
            return Vec::new();
        }
    };
    values
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("dropping entry {} of '{}': {}", i, key, e);
                None
            }
        })
        .collect()
}

fn decode_attributes(raw: &Map<String, Value>) -> Attributes {
    let mut attrs = Attributes::default();
    for attribute in Attribute::ALL {
        match raw.get(attribute.key()).map(|v| v.as_u64().and_then(|n| u32::try_from(n).ok())) {
            Some(Some(value)) => attrs.set(attribute, value),
            Some(None) => warn!("attribute '{}' is not a valid number; using baseline", attribute),
            None => {}
        }
    }
    attrs
}

/// Stored experience at or past the threshold is capped just below it. No level-up is
/// applied while loading.
fn normalize_xp(player: &mut Player) {
    let threshold = player.xp_to_next_level();
    if player.xp >= threshold {
        warn!("stored xp {} exceeds threshold {}; capping", player.xp, threshold);
        player.xp = threshold.saturating_sub(1);
    }
}
