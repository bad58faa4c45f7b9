//! Game session: every operation saves, validation failures never do.

mod common;

use chrono::Duration;
use common::{fixed_clock, legacy_save, local, open_session, shared_clock, store_in};
use liferpg::game::{
    basic_daily_quests, Achievement, Frequency, GameError, GameSession, HabitType, LevelUp, LocationUpdate, PinType,
    PixelPoint, PlayerStore, SessionEvent, StreakChange,
};
use tempfile::tempdir;

#[test]
fn open_without_save_starts_fresh() {
    let dir = tempdir().unwrap();
    let session = open_session(dir.path(), fixed_clock(local(2024, 6, 1, 9)));
    assert_eq!(session.player().level, 1);
    assert!(!store_in(dir.path()).exists(), "nothing to write until something changes");
}

#[test]
fn each_mutation_is_saved() {
    let dir = tempdir().unwrap();
    let mut session = open_session(dir.path(), fixed_clock(local(2024, 6, 1, 9)));

    let habit = session.add_habit("Stretch", HabitType::Fitness, Frequency::Daily).unwrap();
    session.toggle_habit(habit).unwrap();
    session.begin_quest(basic_daily_quests().remove(1)).unwrap();
    let location = session
        .add_location("Gym", PixelPoint::new(400.0, 250.0), PinType::Work, "leg day")
        .unwrap();
    session.rename("Tester").unwrap();

    let on_disk = store_in(dir.path()).load();
    assert_eq!(&on_disk, session.player());
    assert_eq!(on_disk.name, "Tester");
    assert_eq!(on_disk.xp, 10);
    assert_eq!(on_disk.active_quests.len(), 1);
    assert!(on_disk.visited_locations.iter().any(|l| l.id == location));
}

#[test]
fn validation_failure_changes_nothing_on_disk() {
    let dir = tempdir().unwrap();
    let mut session = open_session(dir.path(), fixed_clock(local(2024, 6, 1, 9)));
    session.rename("Before").unwrap();
    let saved = std::fs::read_to_string(store_in(dir.path()).path()).unwrap();

    assert!(matches!(session.rename("   "), Err(GameError::Validation(_))));
    assert!(session.add_habit("", HabitType::Other, Frequency::Daily).is_err());
    assert!(session
        .add_location("Nowhere", PixelPoint::new(-5.0, 0.0), PinType::City, "")
        .is_err());

    assert_eq!(session.player().name, "Before");
    assert_eq!(std::fs::read_to_string(store_in(dir.path()).path()).unwrap(), saved);
}

#[test]
fn claim_follows_calendar_days() {
    let dir = tempdir().unwrap();
    let (clock, handle) = shared_clock(local(2024, 6, 1, 9));
    let mut session = open_session(dir.path(), handle);

    assert_eq!(
        session.claim_daily_login().unwrap(),
        vec![SessionEvent::Streak(StreakChange::AlreadyClaimed)]
    );

    *clock.lock().unwrap() = local(2024, 6, 2, 9);
    assert_eq!(
        session.claim_daily_login().unwrap(),
        vec![SessionEvent::Streak(StreakChange::Extended { streak: 1 })]
    );
    assert_eq!(store_in(dir.path()).load().daily_streak, 1);

    *clock.lock().unwrap() = local(2024, 6, 5, 9);
    assert_eq!(
        session.claim_daily_login().unwrap(),
        vec![SessionEvent::Streak(StreakChange::Reset { previous: 1 })]
    );
}

#[test]
fn seven_day_streak_earns_achievement_once() {
    let dir = tempdir().unwrap();
    let start = local(2024, 6, 1, 9);
    let (clock, handle) = shared_clock(start);
    let mut session = open_session(dir.path(), handle);

    let mut earned = Vec::new();
    for day in 1..=8 {
        *clock.lock().unwrap() = start + Duration::days(day);
        earned.extend(
            session
                .claim_daily_login()
                .unwrap()
                .into_iter()
                .filter(|e| matches!(e, SessionEvent::AchievementEarned(_))),
        );
    }

    assert_eq!(earned, vec![SessionEvent::AchievementEarned(Achievement::Consistent)]);
    assert_eq!(session.player().daily_streak, 8);
}

#[test]
fn level_five_reports_level_up_and_achievement() {
    let dir = tempdir().unwrap();
    let mut session = open_session(dir.path(), fixed_clock(local(2024, 6, 1, 9)));
    for _ in 0..3 {
        session.level_up().unwrap();
    }

    let events = session.add_xp(400).unwrap();

    assert_eq!(
        events,
        vec![
            SessionEvent::LevelUp(LevelUp { new_level: 5, gold_awarded: 250 }),
            SessionEvent::AchievementEarned(Achievement::Novice),
        ]
    );
    assert!(store_in(dir.path()).load().has_achievement(Achievement::Novice));
}

#[test]
fn complete_active_quest_by_position() {
    let dir = tempdir().unwrap();
    let mut session = open_session(dir.path(), fixed_clock(local(2024, 6, 1, 9)));
    for quest in basic_daily_quests() {
        session.begin_quest(quest).unwrap();
    }

    let events = session.complete_active_quest(1).unwrap();

    assert!(matches!(&events[0], SessionEvent::QuestCompleted(o) if o.name == "Code Training"));
    assert_eq!(session.player().active_quests.len(), 2);
    assert_eq!(session.player().completed_quests.len(), 1);
    assert!(matches!(
        session.complete_active_quest(5),
        Err(GameError::QuestIndexOutOfRange(5))
    ));
}

#[test]
fn completing_same_quest_twice_is_silent() {
    let dir = tempdir().unwrap();
    let mut session = open_session(dir.path(), fixed_clock(local(2024, 6, 1, 9)));
    let quest = basic_daily_quests().remove(0);
    session.begin_quest(quest.clone()).unwrap();

    assert!(!session.complete_quest(quest.clone()).unwrap().is_empty());
    assert!(session.complete_quest(quest).unwrap().is_empty());
    assert_eq!(session.player().xp, 25);
}

#[test]
fn missing_lookups_are_no_ops() {
    let dir = tempdir().unwrap();
    let mut session = open_session(dir.path(), fixed_clock(local(2024, 6, 1, 9)));

    assert!(!session.remove_habit(42).unwrap());
    assert!(!session.remove_location(uuid::Uuid::new_v4()).unwrap());
    assert!(!session
        .update_location(uuid::Uuid::new_v4(), LocationUpdate::default())
        .unwrap());
    assert!(matches!(session.toggle_habit(42), Err(GameError::HabitNotFound(42))));
    assert!(!store_in(dir.path()).exists());
}

#[test]
fn reset_replaces_player_and_saves() {
    let dir = tempdir().unwrap();
    let mut session = open_session(dir.path(), fixed_clock(local(2024, 6, 1, 9)));
    session.rename("Veteran").unwrap();
    session.add_xp(50).unwrap();

    assert_eq!(session.reset_progress().unwrap(), vec![SessionEvent::ProgressReset]);

    let on_disk = store_in(dir.path()).load();
    assert_eq!(on_disk.name, "Adventurer");
    assert_eq!(on_disk.xp, 0);
    assert_eq!(session.player().name, "Adventurer");
}

#[test]
fn opening_legacy_save_writes_upgrade_back() {
    let dir = tempdir().unwrap();
    let store = store_in(dir.path());
    std::fs::write(store.path(), legacy_save()).unwrap();

    let session = open_session(dir.path(), fixed_clock(local(2024, 5, 3, 9)));

    assert!(session.migration_report().is_legacy());
    // the stale "completed" flag from May 1st is cleared on open
    assert!(!session.player().habits[0].completed_today);
    let text = std::fs::read_to_string(store.path()).unwrap();
    assert!(text.contains("\"schema_version\": 2"));
    assert!(!text.contains("x_pct"));
}

#[test]
fn purchases_are_saved() {
    let dir = tempdir().unwrap();
    let mut session = open_session(dir.path(), fixed_clock(local(2024, 6, 1, 9)));

    let events = session.purchase("Health Potion").unwrap();
    assert_eq!(events, vec![SessionEvent::Purchased { name: "Health Potion", price: 50 }]);
    assert!(matches!(
        session.purchase("golden_key"),
        Err(GameError::InsufficientGold { needed: 200, available: 50 })
    ));

    let on_disk = store_in(dir.path()).load();
    assert_eq!(on_disk.gold, 50);
    assert_eq!(on_disk.inventory, ["health_potion"]);
}

#[test]
fn failed_write_back_still_opens_upgraded_player() {
    let dir = tempdir().unwrap();
    // leaves no room in the file name for the temp-file suffix, so saving fails
    let name = format!("{}.json", "p".repeat(245));
    let store = PlayerStore::in_dir(dir.path(), &name);
    std::fs::write(store.path(), legacy_save()).unwrap();

    let mut session = GameSession::open_with_clock(store.clone(), fixed_clock(local(2024, 5, 3, 9)));

    assert!(session.migration_report().is_legacy());
    assert_eq!(session.player().name, "Hero");
    assert_eq!(session.player().level, 3);
    assert_eq!(session.player().visited_locations.len(), 3);
    assert!(std::fs::read_to_string(store.path()).unwrap().contains("x_pct"));
    assert!(matches!(session.rename("Still Hero"), Err(GameError::Io(_))));
}

#[test]
fn reset_without_existing_save_writes_one() {
    let dir = tempdir().unwrap();
    let mut session = open_session(dir.path(), fixed_clock(local(2024, 6, 1, 9)));
    assert!(!store_in(dir.path()).exists());

    session.reset_progress().unwrap();

    assert!(store_in(dir.path()).exists());
    assert_eq!(store_in(dir.path()).load().level, 1);
}
