//! Rewards shop: a fixed catalog bought with gold.

use log::info;

use crate::game::errors::GameError;
use crate::game::types::Player;

/// An item for sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardItem {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub price: u64,
}

const CATALOG: [RewardItem; 3] = [
    RewardItem {
        id: "health_potion",
        name: "Health Potion",
        description: "Restores 10 HP",
        price: 50,
    },
    RewardItem {
        id: "mana_elixir",
        name: "Mana Elixir",
        description: "Restores 15 MP",
        price: 75,
    },
    RewardItem {
        id: "golden_key",
        name: "Golden Key",
        description: "Unlocks special quests",
        price: 200,
    },
];

pub fn reward_catalog() -> &'static [RewardItem] {
    &CATALOG
}

/// Look an item up by id or by display name, ignoring case.
pub fn find_reward(query: &str) -> Option<&'static RewardItem> {
    let query = query.trim();
    CATALOG
        .iter()
        .find(|item| item.id.eq_ignore_ascii_case(query) || item.name.eq_ignore_ascii_case(query))
}

impl Player {
    pub fn can_afford(&self, item: &RewardItem) -> bool {
        self.gold >= item.price
    }

    /// Buy one item. On error nothing changes.
    pub fn purchase(&mut self, query: &str) -> Result<&'static RewardItem, GameError> {
        let item = find_reward(query).ok_or_else(|| GameError::UnknownItem(query.trim().to_string()))?;
        if !self.can_afford(item) {
            return Err(GameError::InsufficientGold {
                needed: item.price,
                available: self.gold,
            });
        }
        self.gold -= item.price;
        self.inventory.push(item.id.to_string());
        info!("bought {} for {} gold ({} left)", item.name, item.price, self.gold);
        Ok(item)
    }

    /// How many of an item the player owns.
    pub fn owned(&self, item_id: &str) -> usize {
        self.inventory.iter().filter(|id| id.as_str() == item_id).count()
    }
}
