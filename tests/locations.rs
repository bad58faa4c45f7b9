//! Location store: pixel conversion, identity and partial updates.

mod common;

use chrono::Utc;
use liferpg::game::{GameError, LocationUpdate, MapExtent, PinType, PixelPoint, Player};
use liferpg::validation::ValidationError;
use std::collections::HashSet;
use uuid::Uuid;

fn ids(player: &Player) -> HashSet<Uuid> {
    player.visited_locations.iter().map(|l| l.id).collect()
}

#[test]
fn add_then_remove_restores_identifier_set() {
    let mut player = Player::new();
    let before = ids(&player);

    let id = player
        .add_location("Lighthouse", PixelPoint::new(600.0, 90.0), MapExtent::default(), PinType::Landmark, "", Utc::now())
        .unwrap()
        .id;
    assert_eq!(ids(&player).len(), before.len() + 1);

    assert!(player.remove_location(id));
    assert_eq!(ids(&player), before);
    assert!(!player.remove_location(id));
}

#[test]
fn ids_stay_unique() {
    let mut player = Player::new();
    for i in 0..50 {
        player
            .add_location(&format!("Spot {}", i), PixelPoint::new(10.0, 10.0), MapExtent::default(), PinType::City, "", Utc::now())
            .unwrap();
    }
    assert_eq!(ids(&player).len(), player.visited_locations.len());
}

#[test]
fn position_is_independent_of_later_extent() {
    let mut player = Player::new();
    let id = player
        .add_location("Bridge", PixelPoint::new(200.0, 100.0), MapExtent::new(400.0, 400.0), PinType::Landmark, "", Utc::now())
        .unwrap()
        .id;
    let location = player.location(id).unwrap();
    assert_eq!(location.percent(), (50.0, 25.0));
    let on_big_map = location.pixel_position(MapExtent::new(1600.0, 1000.0));
    assert_eq!(on_big_map, PixelPoint::new(800.0, 250.0));
}

#[test]
fn edge_clicks_are_accepted_and_outside_rejected() {
    let mut player = Player::new();
    let extent = MapExtent::default();
    assert!(player
        .add_location("Corner", PixelPoint::new(800.0, 500.0), extent, PinType::Mystery, "", Utc::now())
        .is_ok());
    let err = player
        .add_location("Beyond", PixelPoint::new(800.5, 10.0), extent, PinType::Mystery, "", Utc::now())
        .unwrap_err();
    assert!(matches!(err, GameError::Validation(ValidationError::OutsideMap { .. })));
}

#[test]
fn update_is_partial_and_stamps_time() {
    let mut player = Player::new();
    let id = player.visited_locations[0].id;
    let created = player.visited_locations[0].created_at;
    let later = created + chrono::Duration::minutes(5);

    let changed = player
        .update_location(
            id,
            LocationUpdate {
                notes: None,
                pin: Some(PinType::Home),
            },
            later,
        )
        .unwrap();

    assert!(changed);
    let location = player.location(id).unwrap();
    assert_eq!(location.pin, PinType::Home);
    assert_eq!(location.notes, "");
    assert_eq!(location.name, "Tokyo");
    assert_eq!(location.created_at, created);
    assert_eq!(location.updated_at, later);
}

#[test]
fn overlong_notes_are_rejected_without_change() {
    let mut player = Player::new();
    let id = player.visited_locations[0].id;
    let before = player.clone();
    let update = LocationUpdate {
        notes: Some("x".repeat(10_000)),
        pin: Some(PinType::Danger),
    };
    assert!(player.update_location(id, update, Utc::now()).is_err());
    assert_eq!(player, before);
}

#[test]
fn fresh_player_has_starter_cities() {
    let player = Player::new();
    let names: Vec<&str> = player.visited_locations.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, ["Tokyo", "Paris"]);
    assert!(player.visited_locations.iter().all(|l| l.pin == PinType::City && l.visited));
}
