//! Quest and habit bookkeeping: the habit list, active quests, and the daily quest
//! generator.

use chrono::NaiveDate;
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::game::types::{Frequency, Habit, HabitType, Player, Quest, QuestRarity, QuestType};
use crate::logutil::escape_log;

/// Base definition a quest instance is rolled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: QuestType,
    pub base_xp: u64,
    pub base_gold: u64,
}

impl QuestTemplate {
    /// Build a quest at the given rarity. Anything above common gets a flavor
    /// adjective in front of its name.
    pub fn instantiate<R: Rng + ?Sized>(&self, rarity: QuestRarity, rng: &mut R) -> Quest {
        let name = if rarity == QuestRarity::Common {
            self.name.to_string()
        } else {
            format!("{} {}", flavor_adjective(rng), self.name)
        };
        Quest::new(&name, self.description, self.kind).with_rewards(rarity, self.base_xp, self.base_gold)
    }
}

/// Templates offered on the quest board without rarity rolls.
pub const BASIC_DAILY_QUESTS: [QuestTemplate; 3] = [
    QuestTemplate {
        name: "Morning Ritual",
        description: "Complete your morning routine",
        kind: QuestType::Daily,
        base_xp: 25,
        base_gold: 10,
    },
    QuestTemplate {
        name: "Code Training",
        description: "Practice coding for 1 hour",
        kind: QuestType::Daily,
        base_xp: 50,
        base_gold: 25,
    },
    QuestTemplate {
        name: "Dragon Exercise",
        description: "30 minutes of physical activity",
        kind: QuestType::Daily,
        base_xp: 30,
        base_gold: 15,
    },
];

/// Pool the daily generator samples from.
pub const DAILY_QUEST_POOL: [QuestTemplate; 3] = [
    QuestTemplate {
        name: "Morning Ritual",
        description: "Complete your sacred morning rites",
        kind: QuestType::Daily,
        base_xp: 25,
        base_gold: 10,
    },
    QuestTemplate {
        name: "Code Training",
        description: "Study the arcane coding tomes",
        kind: QuestType::Daily,
        base_xp: 50,
        base_gold: 25,
    },
    QuestTemplate {
        name: "Dragon Exercise",
        description: "Train like the ancient dragon warriors",
        kind: QuestType::Daily,
        base_xp: 30,
        base_gold: 15,
    },
];

/// Lead descriptor of the strength, intelligence and charisma word lists.
const FLAVOR_ADJECTIVES: [&str; 3] = ["Brawny", "Wise", "Charming"];

fn flavor_adjective<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    FLAVOR_ADJECTIVES.choose(rng).copied().unwrap_or(FLAVOR_ADJECTIVES[0])
}

pub fn daily_quest_pool() -> &'static [QuestTemplate] {
    &DAILY_QUEST_POOL
}

/// The basic board: every template at common rarity.
pub fn basic_daily_quests() -> Vec<Quest> {
    BASIC_DAILY_QUESTS
        .iter()
        .map(|t| Quest::new(t.name, t.description, t.kind).with_rewards(QuestRarity::Common, t.base_xp, t.base_gold))
        .collect()
}

/// Sample up to `count` distinct templates from `pool`, rolling an independent,
/// uniformly random rarity for each.
pub fn generate_daily_quests<R: Rng + ?Sized>(count: usize, pool: &[QuestTemplate], rng: &mut R) -> Vec<Quest> {
    let picked: Vec<&QuestTemplate> = pool.choose_multiple(rng, count).collect();
    let quests: Vec<Quest> = picked
        .into_iter()
        .map(|template| {
            let rarity = QuestRarity::ALL[rng.gen_range(0..QuestRarity::ALL.len())];
            template.instantiate(rarity, rng)
        })
        .collect();
    debug!("generated {} daily quests from a pool of {}", quests.len(), pool.len());
    quests
}

impl Player {
    /// Register a new habit with the next id in sequence.
    pub fn add_habit(&mut self, name: &str, kind: HabitType, frequency: Frequency, today: NaiveDate) -> &Habit {
        self.habit_seq = self.habit_seq.saturating_add(1);
        let habit = Habit::new(self.habit_seq, name, kind, frequency, today);
        info!("habit #{} '{}' added", habit.id, escape_log(&habit.name));
        let index = self.habits.len();
        self.habits.push(habit);
        &self.habits[index]
    }

    /// Remove a habit by id. Unknown ids are ignored.
    pub fn remove_habit(&mut self, habit_id: u64) -> bool {
        let before = self.habits.len();
        self.habits.retain(|h| h.id != habit_id);
        let removed = self.habits.len() != before;
        if removed {
            info!("habit #{} removed", habit_id);
        }
        removed
    }

    pub fn habit(&self, habit_id: u64) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == habit_id)
    }

    /// Start a quest. Identical quests may be active side by side.
    pub fn begin_quest(&mut self, quest: Quest) {
        info!("quest '{}' started", escape_log(&quest.name));
        self.active_quests.push(quest);
    }
}
