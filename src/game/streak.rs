//! Daily-login and per-habit streak tracking.
//!
//! Both streaks work on calendar-day deltas in the player's local time zone. The daily
//! login streak only moves when the player explicitly claims it.

use chrono::{DateTime, Local, NaiveDate};
use log::{debug, info};

use crate::game::progression::LevelUp;
use crate::game::types::Player;
use crate::logutil::escape_log;

/// What a daily-login claim did to the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakChange {
    /// Already claimed today (or the clock moved backwards); nothing changed.
    AlreadyClaimed,
    /// Claimed the day after the previous claim.
    Extended { streak: u32 },
    /// At least one day was skipped; the streak restarted at 1.
    Reset { previous: u32 },
}

/// Result of toggling a habit's completion for today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HabitToggle {
    pub habit_id: u64,
    pub completed: bool,
    pub streak: u32,
    pub xp_awarded: u64,
    pub level_up: Option<LevelUp>,
}

impl Player {
    /// Claim today's login bonus.
    pub fn claim_daily_login(&mut self, now: DateTime<Local>) -> StreakChange {
        let gap = (now.date_naive() - self.last_login.date_naive()).num_days();
        let change = match gap {
            g if g <= 0 => return StreakChange::AlreadyClaimed,
            1 => {
                self.daily_streak = self.daily_streak.saturating_add(1);
                StreakChange::Extended {
                    streak: self.daily_streak,
                }
            }
            _ => {
                let previous = self.daily_streak;
                self.daily_streak = 1;
                StreakChange::Reset { previous }
            }
        };
        self.last_login = now;
        info!("daily login claimed: {:?}", change);
        change
    }

    /// Flip a habit's completed-today flag.
    ///
    /// Completing bumps the streak (restarting at 1 after a skipped day) and pays the
    /// habit's XP at most once per day. Un-completing drops the streak by one, never
    /// below zero, and leaves `last_completed` untouched. Returns `None` for an
    /// unknown habit id.
    pub fn toggle_habit_completion(&mut self, habit_id: u64, today: NaiveDate) -> Option<HabitToggle> {
        let habit = self.habits.iter_mut().find(|h| h.id == habit_id)?;

        // A flag left over from an earlier day does not count as done today.
        if habit.last_completed != Some(today) {
            habit.completed_today = false;
        }
        habit.completed_today = !habit.completed_today;

        let mut xp_awarded = 0;
        if habit.completed_today {
            habit.streak = match habit.last_completed {
                Some(last) if (today - last).num_days() > 1 => 1,
                _ => habit.streak.saturating_add(1),
            };
            habit.last_completed = Some(today);
            if habit.rewarded_on != Some(today) {
                habit.rewarded_on = Some(today);
                xp_awarded = habit.xp_reward;
            }
        } else {
            habit.streak = habit.streak.saturating_sub(1);
        }

        debug!(
            "habit '{}' toggled: completed={} streak={}",
            escape_log(&habit.name),
            habit.completed_today,
            habit.streak
        );
        let (completed, streak) = (habit.completed_today, habit.streak);
        let level_up = self.add_xp(xp_awarded);
        Some(HabitToggle {
            habit_id,
            completed,
            streak,
            xp_awarded,
            level_up,
        })
    }

    /// Clear completed-today flags that belong to an earlier day. Returns how many
    /// habits were reset.
    pub fn refresh_habits(&mut self, today: NaiveDate) -> usize {
        let mut cleared = 0;
        for habit in self
            .habits
            .iter_mut()
            .filter(|h| h.completed_today && h.last_completed != Some(today))
        {
            habit.completed_today = false;
            cleared += 1;
        }
        cleared
    }

    /// Longest streak currently held, across the login streak and every habit.
    pub fn best_streak(&self) -> u32 {
        self.habits
            .iter()
            .map(|h| h.streak)
            .chain(std::iter::once(self.daily_streak))
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::{Frequency, HabitType};
    use chrono::{Duration, TimeZone};

    fn noon(y: i32, m: u32, d: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn same_day_claim_changes_nothing() {
        let mut player = Player::new_at(noon(2024, 3, 10));
        player.daily_streak = 4;
        let later = noon(2024, 3, 10) + Duration::hours(6);
        assert_eq!(player.claim_daily_login(later), StreakChange::AlreadyClaimed);
        assert_eq!(player.daily_streak, 4);
        assert_eq!(player.last_login, noon(2024, 3, 10));
    }

    #[test]
    fn backwards_clock_is_ignored() {
        let mut player = Player::new_at(noon(2024, 3, 10));
        assert_eq!(player.claim_daily_login(noon(2024, 3, 8)), StreakChange::AlreadyClaimed);
    }

    #[test]
    fn refresh_clears_stale_flags_only() {
        let mut player = Player::new();
        player.add_habit("Read", HabitType::Learning, Frequency::Daily, date(2024, 3, 1));
        player.add_habit("Walk", HabitType::Fitness, Frequency::Daily, date(2024, 3, 1));
        player.toggle_habit_completion(1, date(2024, 3, 9));
        player.toggle_habit_completion(2, date(2024, 3, 10));
        assert_eq!(player.refresh_habits(date(2024, 3, 10)), 1);
        assert!(!player.habits[0].completed_today);
        assert!(player.habits[1].completed_today);
    }

    #[test]
    fn best_streak_considers_habits_and_login() {
        let mut player = Player::new();
        player.daily_streak = 3;
        player.add_habit("Read", HabitType::Learning, Frequency::Daily, date(2024, 3, 1));
        player.habits[0].streak = 9;
        assert_eq!(player.best_streak(), 9);
    }
}
