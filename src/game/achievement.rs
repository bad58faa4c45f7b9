//! Achievement definitions and the award check run after every mutating operation.
//!
//! Achievements are one-shot: once recorded on the player they are never awarded
//! again, even if the condition later stops holding.

use chrono::{DateTime, Utc};
use log::info;

use crate::game::types::{Achievement, EarnedAchievement, Player};
use crate::logutil::escape_log;

pub const NOVICE_LEVEL: u32 = 5;
pub const APPRENTICE_LEVEL: u32 = 10;
pub const CONSISTENT_STREAK: u32 = 7;

impl Achievement {
    pub const ALL: [Achievement; 3] = [Achievement::Novice, Achievement::Apprentice, Achievement::Consistent];

    pub fn title(self) -> &'static str {
        match self {
            Achievement::Novice => "Novice Adventurer",
            Achievement::Apprentice => "Apprentice Adventurer",
            Achievement::Consistent => "Consistent Performer",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Achievement::Novice => "Reach level 5",
            Achievement::Apprentice => "Reach level 10",
            Achievement::Consistent => "Maintain a 7-day streak",
        }
    }

    /// Whether the player currently satisfies the condition. The streak counts either
    /// the daily login streak or any single habit's streak.
    pub fn is_met(self, player: &Player) -> bool {
        match self {
            Achievement::Novice => player.level >= NOVICE_LEVEL,
            Achievement::Apprentice => player.level >= APPRENTICE_LEVEL,
            Achievement::Consistent => player.best_streak() >= CONSISTENT_STREAK,
        }
    }
}

impl Player {
    pub fn has_achievement(&self, achievement: Achievement) -> bool {
        self.achievements.iter().any(|e| e.achievement == achievement)
    }
}

/// Record every achievement the player now qualifies for but has not earned yet.
/// Returns the newly earned ones in definition order.
pub fn check_achievements(player: &mut Player, now: DateTime<Utc>) -> Vec<Achievement> {
    let current: &Player = player;
    let newly: Vec<Achievement> = Achievement::ALL
        .into_iter()
        .filter(|a| !current.has_achievement(*a) && a.is_met(current))
        .collect();
    for achievement in &newly {
        info!(
            "{} earned achievement '{}'",
            escape_log(&player.name),
            achievement.title()
        );
        player.achievements.push(EarnedAchievement {
            achievement: *achievement,
            earned_at: now,
        });
    }
    newly
}
