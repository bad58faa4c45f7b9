//! Test utilities & fixtures.
//! Static fixtures live under `tests/test-data-int`; tests that write use a temp dir.
#![allow(dead_code)] // each test binary uses a different subset

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use liferpg::game::{Clock, GameSession, PlayerStore};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Return the path to the static integration test fixture directory.
pub fn fixture_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("test-data-int")
}

/// A save document in the first release's format.
pub fn legacy_save() -> String {
    std::fs::read_to_string(fixture_root().join("legacy_player.json")).expect("legacy fixture")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Local time at `hour`:00 on the given day.
pub fn local(y: i32, m: u32, d: u32, hour: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(y, m, d, hour, 0, 0).single().expect("unambiguous local time")
}

pub fn fixed_clock(now: DateTime<Local>) -> Clock {
    Box::new(move || now)
}

/// A clock the test can move forward while a session holds it.
pub fn shared_clock(start: DateTime<Local>) -> (Arc<Mutex<DateTime<Local>>>, Clock) {
    let handle = Arc::new(Mutex::new(start));
    let reader = handle.clone();
    (handle, Box::new(move || *reader.lock().unwrap()))
}

pub fn store_in(dir: &Path) -> PlayerStore {
    PlayerStore::in_dir(dir, "player.json")
}

pub fn open_session(dir: &Path, clock: Clock) -> GameSession {
    GameSession::open_with_clock(store_in(dir), clock)
}
