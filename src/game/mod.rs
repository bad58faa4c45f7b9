//! Player progression model and its JSON persistence.
//!
//! The [`Player`] aggregate owns everything; the submodules add behavior to it
//! (`progression`, `streak`, `ledger`, `location`, `shop`) or move it on and off disk
//! (`storage`, `migration`). [`GameSession`] ties the two together for front ends.

pub mod achievement;
pub mod calendar;
pub mod errors;
pub mod ledger;
pub mod location;
pub mod migration;
pub mod progression;
pub mod session;
pub mod shop;
pub mod storage;
pub mod streak;
pub mod types;

pub use achievement::{check_achievements, APPRENTICE_LEVEL, CONSISTENT_STREAK, NOVICE_LEVEL};
pub use calendar::{LifeCalendar, WeekState, DEFAULT_LIFE_EXPECTANCY, LIFE_EXPECTANCY_RANGE, WEEKS_PER_YEAR};
pub use errors::GameError;
pub use ledger::{
    basic_daily_quests, daily_quest_pool, generate_daily_quests, QuestTemplate, BASIC_DAILY_QUESTS,
    DAILY_QUEST_POOL,
};
pub use location::LocationUpdate;
pub use migration::{backfill_habit_ids, migrate_location, LocationRecord, MigrationReport};
pub use progression::{LevelUp, QuestOutcome, GOLD_PER_LEVEL, XP_PER_LEVEL};
pub use session::{Clock, GameSession, SessionEvent};
pub use shop::{find_reward, reward_catalog, RewardItem};
pub use storage::{decode_player, PlayerStore, DEFAULT_SAVE_FILE, MAX_SAVE_BYTES};
pub use streak::{HabitToggle, StreakChange};
pub use types::*;
