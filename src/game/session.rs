//! The single owner of the live player.
//!
//! Front ends call one method per user action. Each method validates its input, mutates
//! the player, checks achievements and saves before returning the events to show.
//! Validation failures return before anything is changed or written.

use chrono::{DateTime, Local, NaiveDate, Utc};
use log::{debug, info, warn};
use uuid::Uuid;

use crate::game::achievement::check_achievements;
use crate::game::errors::GameError;
use crate::game::location::LocationUpdate;
use crate::game::migration::MigrationReport;
use crate::game::progression::{LevelUp, QuestOutcome};
use crate::game::shop::RewardItem;
use crate::game::storage::PlayerStore;
use crate::game::streak::{HabitToggle, StreakChange};
use crate::game::types::{Achievement, Frequency, HabitType, PinType, PixelPoint, Player, Quest};
use crate::logutil::escape_log;
use crate::validation::validate_name;

/// Something the front end should tell the user about.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    LevelUp(LevelUp),
    AchievementEarned(Achievement),
    Streak(StreakChange),
    QuestCompleted(QuestOutcome),
    HabitToggled(HabitToggle),
    Purchased { name: &'static str, price: u64 },
    ProgressReset,
}

pub type Clock = Box<dyn Fn() -> DateTime<Local> + Send>;

pub struct GameSession {
    store: PlayerStore,
    player: Player,
    report: MigrationReport,
    clock: Clock,
}

impl GameSession {
    /// Load the player, clear stale habit flags and write back anything migration had
    /// to repair. A failed write-back is logged; the next mutating operation saves again.
    pub fn open(store: PlayerStore) -> Self {
        Self::open_with_clock(store, Box::new(Local::now))
    }

    pub fn open_with_clock(store: PlayerStore, clock: Clock) -> Self {
        let (mut player, report) = store.load_at(clock());
        let cleared = player.refresh_habits(clock().date_naive());
        if cleared > 0 {
            debug!("cleared {} stale habit flags", cleared);
        }
        if report.changed() || cleared > 0 {
            if let Err(e) = store.save(&player) {
                warn!(
                    "could not write repaired save back to {}: {}; continuing with the loaded player",
                    store.path().display(),
                    e
                );
            }
        }
        info!(
            "session opened for '{}' (level {}) from {}",
            escape_log(&player.name),
            player.level,
            store.path().display()
        );
        Self {
            store,
            player,
            report,
            clock,
        }
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn store(&self) -> &PlayerStore {
        &self.store
    }

    pub fn migration_report(&self) -> &MigrationReport {
        &self.report
    }

    fn now(&self) -> DateTime<Local> {
        (self.clock)()
    }

    /// Today's date on the session clock.
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    fn commit(&mut self, mut events: Vec<SessionEvent>) -> Result<Vec<SessionEvent>, GameError> {
        let now = self.now().with_timezone(&Utc);
        events.extend(
            check_achievements(&mut self.player, now)
                .into_iter()
                .map(SessionEvent::AchievementEarned),
        );
        self.store.save(&self.player)?;
        Ok(events)
    }

    pub fn claim_daily_login(&mut self) -> Result<Vec<SessionEvent>, GameError> {
        let change = self.player.claim_daily_login(self.now());
        if change == StreakChange::AlreadyClaimed {
            return Ok(vec![SessionEvent::Streak(change)]);
        }
        self.commit(vec![SessionEvent::Streak(change)])
    }

    pub fn add_xp(&mut self, amount: u64) -> Result<Vec<SessionEvent>, GameError> {
        let events = self.player.add_xp(amount).map(SessionEvent::LevelUp).into_iter().collect();
        self.commit(events)
    }

    pub fn level_up(&mut self) -> Result<Vec<SessionEvent>, GameError> {
        let level_up = self.player.level_up();
        self.commit(vec![SessionEvent::LevelUp(level_up)])
    }

    pub fn begin_quest(&mut self, quest: Quest) -> Result<Vec<SessionEvent>, GameError> {
        self.player.begin_quest(quest);
        self.commit(Vec::new())
    }

    /// Complete a quest instance. Completing the same instance twice yields no events
    /// and no save.
    pub fn complete_quest(&mut self, quest: Quest) -> Result<Vec<SessionEvent>, GameError> {
        let Some(outcome) = self.player.complete_quest(quest) else {
            return Ok(Vec::new());
        };
        let mut events = Vec::new();
        if let Some(level_up) = outcome.level_up {
            events.push(SessionEvent::LevelUp(level_up));
        }
        events.insert(0, SessionEvent::QuestCompleted(outcome));
        self.commit(events)
    }

    /// Complete the active quest at `index` (0-based, display order).
    pub fn complete_active_quest(&mut self, index: usize) -> Result<Vec<SessionEvent>, GameError> {
        let quest = self
            .player
            .active_quests
            .get(index)
            .cloned()
            .ok_or(GameError::QuestIndexOutOfRange(index))?;
        self.complete_quest(quest)
    }

    /// Returns the new habit's id.
    pub fn add_habit(&mut self, name: &str, kind: HabitType, frequency: Frequency) -> Result<u64, GameError> {
        let name = validate_name("habit name", name)?;
        let today = self.today();
        let id = self.player.add_habit(&name, kind, frequency, today).id;
        self.commit(Vec::new())?;
        Ok(id)
    }

    pub fn remove_habit(&mut self, habit_id: u64) -> Result<bool, GameError> {
        if !self.player.remove_habit(habit_id) {
            return Ok(false);
        }
        self.commit(Vec::new())?;
        Ok(true)
    }

    pub fn toggle_habit(&mut self, habit_id: u64) -> Result<Vec<SessionEvent>, GameError> {
        let today = self.today();
        let toggle = self
            .player
            .toggle_habit_completion(habit_id, today)
            .ok_or(GameError::HabitNotFound(habit_id))?;
        let mut events = vec![SessionEvent::HabitToggled(toggle)];
        if let Some(level_up) = toggle.level_up {
            events.push(SessionEvent::LevelUp(level_up));
        }
        self.commit(events)
    }

    /// Pin a location from a click on the store's map extent. Returns its id.
    pub fn add_location(&mut self, name: &str, pixel: PixelPoint, pin: PinType, notes: &str) -> Result<Uuid, GameError> {
        let now = self.now().with_timezone(&Utc);
        let extent = self.store.extent();
        let id = self.player.add_location(name, pixel, extent, pin, notes, now)?.id;
        self.commit(Vec::new())?;
        Ok(id)
    }

    pub fn remove_location(&mut self, id: Uuid) -> Result<bool, GameError> {
        if !self.player.remove_location(id) {
            return Ok(false);
        }
        self.commit(Vec::new())?;
        Ok(true)
    }

    pub fn update_location(&mut self, id: Uuid, update: LocationUpdate) -> Result<bool, GameError> {
        let now = self.now().with_timezone(&Utc);
        if !self.player.update_location(id, update, now)? {
            return Ok(false);
        }
        self.commit(Vec::new())?;
        Ok(true)
    }

    pub fn clear_locations(&mut self) -> Result<usize, GameError> {
        let count = self.player.clear_locations();
        if count > 0 {
            self.commit(Vec::new())?;
        }
        Ok(count)
    }

    pub fn purchase(&mut self, query: &str) -> Result<Vec<SessionEvent>, GameError> {
        let item: &'static RewardItem = self.player.purchase(query)?;
        self.commit(vec![SessionEvent::Purchased {
            name: item.name,
            price: item.price,
        }])
    }

    pub fn rename(&mut self, name: &str) -> Result<(), GameError> {
        let name = validate_name("player name", name)?;
        info!("player renamed '{}' -> '{}'", escape_log(&self.player.name), escape_log(&name));
        self.player.name = name;
        self.commit(Vec::new())?;
        Ok(())
    }

    /// Start over: delete the old save and write a brand-new character in its place.
    pub fn reset_progress(&mut self) -> Result<Vec<SessionEvent>, GameError> {
        info!("resetting progress for '{}'", escape_log(&self.player.name));
        self.store.delete()?;
        self.player = Player::new_at(self.now());
        self.store.save(&self.player)?;
        Ok(vec![SessionEvent::ProgressReset])
    }
}
