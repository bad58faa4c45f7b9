//! Experience, leveling and gold arithmetic for the player aggregate.
//!
//! A level is worth `level × 100` experience. Crossing the threshold triggers exactly
//! one level-up: the level increases by one, experience resets to zero and the player
//! is paid `new_level × 50` gold. A single very large grant therefore advances only one
//! level; the surplus is discarded.

use log::{debug, info};

use crate::game::types::{Player, Quest};
use crate::logutil::escape_log;

pub const XP_PER_LEVEL: u64 = 100;
pub const GOLD_PER_LEVEL: u64 = 50;

/// Result of one level-up transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUp {
    pub new_level: u32,
    pub gold_awarded: u64,
}

/// Rewards applied by [`Player::complete_quest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestOutcome {
    pub name: String,
    pub xp: u64,
    pub gold: u64,
    pub level_up: Option<LevelUp>,
}

impl Player {
    /// Experience needed to leave the current level.
    pub fn xp_to_next_level(&self) -> u64 {
        u64::from(self.level).saturating_mul(XP_PER_LEVEL)
    }

    /// Fraction of the current level already earned, for progress bars.
    pub fn xp_progress(&self) -> f64 {
        let needed = self.xp_to_next_level();
        if needed == 0 {
            return 0.0;
        }
        (self.xp as f64 / needed as f64).min(1.0)
    }

    /// Add experience, levelling up once if the threshold is reached.
    pub fn add_xp(&mut self, amount: u64) -> Option<LevelUp> {
        if amount == 0 {
            return None;
        }
        self.xp = self.xp.saturating_add(amount);
        debug!("xp +{} -> {}/{}", amount, self.xp, self.xp_to_next_level());
        if self.xp >= self.xp_to_next_level() {
            Some(self.level_up())
        } else {
            None
        }
    }

    pub fn level_up(&mut self) -> LevelUp {
        self.level = self.level.saturating_add(1);
        self.xp = 0;
        let gold_awarded = u64::from(self.level).saturating_mul(GOLD_PER_LEVEL);
        self.gold = self.gold.saturating_add(gold_awarded);
        info!(
            "{} reached level {} (+{} gold)",
            escape_log(&self.name),
            self.level,
            gold_awarded
        );
        LevelUp {
            new_level: self.level,
            gold_awarded,
        }
    }

    /// Apply a quest's rewards and file it under completed quests.
    ///
    /// The quest is taken out of `active_quests` when it was started there. A quest
    /// whose id is already in `completed_quests` is ignored and `None` is returned.
    pub fn complete_quest(&mut self, mut quest: Quest) -> Option<QuestOutcome> {
        if self.completed_quests.iter().any(|q| q.id == quest.id) {
            debug!("quest {} already completed; ignoring", quest.id);
            return None;
        }
        self.active_quests.retain(|q| q.id != quest.id);

        let level_up = self.add_xp(quest.xp_reward);
        self.gold = self.gold.saturating_add(quest.gold_reward);
        quest.completed = true;
        let outcome = QuestOutcome {
            name: quest.name.clone(),
            xp: quest.xp_reward,
            gold: quest.gold_reward,
            level_up,
        };
        info!(
            "quest '{}' completed (+{} xp, +{} gold)",
            escape_log(&quest.name),
            outcome.xp,
            outcome.gold
        );
        self.completed_quests.push(quest);
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::{QuestRarity, QuestType};

    #[test]
    fn threshold_grows_with_level() {
        let mut player = Player::new();
        assert_eq!(player.xp_to_next_level(), 100);
        player.level = 7;
        assert_eq!(player.xp_to_next_level(), 700);
    }

    #[test]
    fn zero_xp_is_a_no_op() {
        let mut player = Player::new();
        let before = player.clone();
        assert_eq!(player.add_xp(0), None);
        assert_eq!(player, before);
    }

    #[test]
    fn exact_threshold_levels_up() {
        let mut player = Player::new();
        let gold = player.gold;
        let level_up = player.add_xp(100).unwrap();
        assert_eq!(level_up, LevelUp { new_level: 2, gold_awarded: 100 });
        assert_eq!(player.level, 2);
        assert_eq!(player.xp, 0);
        assert_eq!(player.gold, gold + 100);
    }

    #[test]
    fn large_grant_advances_a_single_level() {
        let mut player = Player::new();
        player.add_xp(1_000);
        assert_eq!(player.level, 2);
        assert_eq!(player.xp, 0);
    }

    #[test]
    fn quest_without_rewards_still_completes() {
        let mut player = Player::new();
        let quest = Quest::new("Stretch", "Five minutes", QuestType::Daily);
        let outcome = player.complete_quest(quest).unwrap();
        assert_eq!(outcome.xp, 0);
        assert_eq!(outcome.gold, 0);
        assert_eq!(player.completed_quests.len(), 1);
        assert!(player.completed_quests[0].completed);
    }

    #[test]
    fn quest_is_never_completed_twice() {
        let mut player = Player::new();
        let quest = Quest::new("Code Training", "One hour", QuestType::Daily)
            .with_rewards(QuestRarity::Common, 50, 25);
        player.begin_quest(quest.clone());
        assert!(player.complete_quest(quest.clone()).is_some());
        assert!(player.complete_quest(quest).is_none());
        assert!(player.active_quests.is_empty());
        assert_eq!(player.completed_quests.len(), 1);
        assert_eq!(player.xp, 50);
        assert_eq!(player.gold, 125);
    }
}
