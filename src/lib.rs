//! # liferpg - a role-playing layer over everyday life
//!
//! liferpg turns habits, daily quests and places visited into experience, gold and
//! levels for a single local character, saved as one JSON file.
//!
//! ## Features
//!
//! - **Progression**: experience thresholds of `level × 100`, level-up gold bonuses and
//!   rarity-scaled quest rewards.
//! - **Streaks**: an explicitly claimed daily login streak plus per-habit streaks on
//!   local calendar days, with a once-per-day XP guard.
//! - **Locations**: map pins stored as fractions of the map, converted to pixels only at
//!   the edges.
//! - **Persistence**: atomic, locked saves and forgiving loads that default field by
//!   field and upgrade legacy documents.
//! - **Extras**: achievements, a rewards shop and a "life in weeks" calendar.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use liferpg::game::{GameSession, PlayerStore, HabitType, Frequency};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut session = GameSession::open(PlayerStore::in_dir("./data", "player.json"));
//!     let id = session.add_habit("Read 20 pages", HabitType::Learning, Frequency::Daily)?;
//!     for event in session.toggle_habit(id)? {
//!         println!("{:?}", event);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`game`] - the player aggregate, its rules, and the save file
//! - [`console`] - command parser, text rendering and notifications for the binary
//! - [`config`] - TOML configuration
//! - [`validation`] - inline validation of user input
//! - [`logutil`] - helpers for logging untrusted text

pub mod config;
pub mod console;
pub mod game;
pub mod logutil;
pub mod validation;
