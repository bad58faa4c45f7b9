//! Experience, level-up and quest reward behavior.

mod common;

use liferpg::game::{LevelUp, Player, Quest, QuestRarity, QuestType, GOLD_PER_LEVEL};

#[test]
fn first_level_up_scenario() {
    let mut player = Player::new();
    assert_eq!((player.level, player.xp), (1, 0));
    let gold = player.gold;

    let level_up = player.add_xp(100);

    assert_eq!(level_up, Some(LevelUp { new_level: 2, gold_awarded: 100 }));
    assert_eq!(player.level, 2);
    assert_eq!(player.xp, 0);
    assert_eq!(player.gold, gold + 2 * GOLD_PER_LEVEL);
}

#[test]
fn xp_stays_below_threshold_for_any_grant() {
    for amount in (0..=1_000u64).step_by(7) {
        let mut player = Player::new();
        player.level = 3;
        player.xp = 250;
        let (level, gold) = (player.level, player.gold);

        player.add_xp(amount);

        assert!(player.xp < player.xp_to_next_level(), "amount {}", amount);
        if player.level > level {
            assert_eq!(player.level, level + 1, "single step only");
            assert!(player.gold > gold);
        } else {
            assert_eq!(player.gold, gold);
        }
    }
}

#[test]
fn threshold_is_strictly_increasing() {
    let mut player = Player::new();
    let mut previous = 0;
    for level in 1..=50 {
        player.level = level;
        let threshold = player.xp_to_next_level();
        assert!(threshold > previous);
        assert_eq!(threshold, u64::from(level) * 100);
        previous = threshold;
    }
}

#[test]
fn quest_rewards_apply_once_and_move_to_completed() {
    let mut player = Player::new();
    let quest = Quest::new("Dragon Exercise", "Train", QuestType::Daily).with_rewards(QuestRarity::Legendary, 30, 15);
    assert_eq!((quest.xp_reward, quest.gold_reward), (75, 37));
    player.begin_quest(quest.clone());
    player.begin_quest(Quest::new("Other", "", QuestType::Story));

    let outcome = player.complete_quest(quest.clone()).unwrap();

    assert_eq!(outcome.xp, 75);
    assert_eq!(player.xp, 75);
    assert_eq!(player.gold, 137);
    assert_eq!(player.active_quests.len(), 1);
    assert_eq!(player.active_quests[0].name, "Other");
    assert!(player.complete_quest(quest).is_none());
    assert_eq!(player.completed_quests.len(), 1);
}

#[test]
fn quest_completion_can_level_up() {
    let mut player = Player::new();
    player.xp = 90;
    let quest = Quest::new("Code Training", "", QuestType::Daily).with_rewards(QuestRarity::Common, 50, 25);

    let outcome = player.complete_quest(quest).unwrap();

    assert_eq!(outcome.level_up.map(|l| l.new_level), Some(2));
    assert_eq!(player.xp, 0);
    assert_eq!(player.gold, 100 + 100 + 25);
}
