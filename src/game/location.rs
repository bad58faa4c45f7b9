//! Visited-location bookkeeping.
//!
//! Positions are stored as fractions of the map. Pixel coordinates only exist at the
//! edges: a click is converted with the caller's [`MapExtent`] on the way in, and
//! [`Location::pixel_position`] converts back for drawing.

use chrono::{DateTime, Utc};
use log::{debug, info};
use uuid::Uuid;

use crate::game::errors::GameError;
use crate::game::types::{Location, MapExtent, MapPoint, PinType, PixelPoint, Player};
use crate::logutil::escape_log;
use crate::validation::{validate_name, validate_notes, ValidationError};

/// Partial update; `None` leaves the field alone. Coordinates cannot be changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationUpdate {
    pub notes: Option<String>,
    pub pin: Option<PinType>,
}

impl Location {
    pub fn new(name: &str, position: MapPoint, pin: PinType, notes: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            notes: notes.to_string(),
            position,
            pin,
            visited: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn pixel_position(&self, extent: MapExtent) -> PixelPoint {
        extent.to_pixels(self.position)
    }

    /// Position as percentages of the map, `(x, y)`.
    pub fn percent(&self) -> (f64, f64) {
        (self.position.x * 100.0, self.position.y * 100.0)
    }

    pub fn has_notes(&self) -> bool {
        !self.notes.trim().is_empty()
    }
}

impl Player {
    /// Pin a new location where the player clicked.
    ///
    /// Name and notes are validated and the click must land inside `extent`; on any
    /// error the player is left untouched.
    pub fn add_location(
        &mut self,
        name: &str,
        pixel: PixelPoint,
        extent: MapExtent,
        pin: PinType,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Result<&Location, GameError> {
        let name = validate_name("location name", name)?;
        let notes = validate_notes(notes)?;
        let position = extent
            .to_fraction(pixel)
            .ok_or(ValidationError::OutsideMap { x: pixel.x, y: pixel.y })?;

        let mut location = Location::new(&name, position, pin, &notes, now);
        while self.location(location.id).is_some() {
            location.id = Uuid::new_v4();
        }
        info!(
            "location '{}' pinned at ({:.3}, {:.3}) as {}",
            escape_log(&location.name),
            position.x,
            position.y,
            pin.key()
        );
        let index = self.visited_locations.len();
        self.visited_locations.push(location);
        Ok(&self.visited_locations[index])
    }

    pub fn location(&self, id: Uuid) -> Option<&Location> {
        self.visited_locations.iter().find(|l| l.id == id)
    }

    /// Remove a location by id; unknown ids are ignored.
    pub fn remove_location(&mut self, id: Uuid) -> bool {
        let before = self.visited_locations.len();
        self.visited_locations.retain(|l| l.id != id);
        let removed = self.visited_locations.len() != before;
        if removed {
            info!("location {} removed", id);
        }
        removed
    }

    /// Apply a partial update to notes and/or pin type. Returns `false` for an unknown
    /// id or an empty update.
    pub fn update_location(&mut self, id: Uuid, update: LocationUpdate, now: DateTime<Utc>) -> Result<bool, GameError> {
        let notes = update.notes.as_deref().map(validate_notes).transpose()?;
        let Some(location) = self.visited_locations.iter_mut().find(|l| l.id == id) else {
            return Ok(false);
        };
        if notes.is_none() && update.pin.is_none() {
            return Ok(false);
        }
        if let Some(notes) = notes {
            location.notes = notes;
        }
        if let Some(pin) = update.pin {
            location.pin = pin;
        }
        location.updated_at = now;
        debug!("location '{}' updated", escape_log(&location.name));
        Ok(true)
    }

    /// Forget every visited location. Returns how many were removed.
    pub fn clear_locations(&mut self) -> usize {
        let count = self.visited_locations.len();
        self.visited_locations.clear();
        info!("cleared {} locations", count);
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_player() -> Player {
        let mut player = Player::new();
        player.visited_locations.clear();
        player
    }

    #[test]
    fn click_is_stored_as_fraction() {
        let mut player = bare_player();
        let extent = MapExtent::new(1000.0, 400.0);
        let location = player
            .add_location("Home", PixelPoint::new(250.0, 100.0), extent, PinType::Home, "", Utc::now())
            .unwrap();
        assert_eq!(location.position, MapPoint { x: 0.25, y: 0.25 });
        assert_eq!(location.percent(), (25.0, 25.0));
        assert_eq!(location.pixel_position(MapExtent::new(800.0, 500.0)), PixelPoint::new(200.0, 125.0));
    }

    #[test]
    fn click_outside_map_is_rejected() {
        let mut player = bare_player();
        let err = player
            .add_location("Void", PixelPoint::new(-1.0, 10.0), MapExtent::default(), PinType::Mystery, "", Utc::now())
            .unwrap_err();
        assert!(matches!(err, GameError::Validation(ValidationError::OutsideMap { .. })));
        assert!(player.visited_locations.is_empty());
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut player = bare_player();
        let result = player.add_location("   ", PixelPoint::new(1.0, 1.0), MapExtent::default(), PinType::City, "", Utc::now());
        assert!(result.is_err());
        assert!(player.visited_locations.is_empty());
    }

    #[test]
    fn update_changes_notes_and_pin_only() {
        let mut player = bare_player();
        let id = player
            .add_location("Cafe", PixelPoint::new(80.0, 50.0), MapExtent::default(), PinType::City, "", Utc::now())
            .unwrap()
            .id;
        let position = player.location(id).unwrap().position;
        let update = LocationUpdate {
            notes: Some("Great espresso".into()),
            pin: Some(PinType::Landmark),
        };
        assert!(player.update_location(id, update, Utc::now()).unwrap());
        let location = player.location(id).unwrap();
        assert_eq!(location.notes, "Great espresso");
        assert_eq!(location.pin, PinType::Landmark);
        assert_eq!(location.position, position);
    }

    #[test]
    fn update_of_unknown_location_is_a_no_op() {
        let mut player = bare_player();
        let update = LocationUpdate {
            notes: Some("x".into()),
            pin: None,
        };
        assert!(!player.update_location(Uuid::new_v4(), update, Utc::now()).unwrap());
    }

    #[test]
    fn clear_reports_count() {
        let mut player = Player::new();
        assert_eq!(player.clear_locations(), 2);
        assert_eq!(player.clear_locations(), 0);
    }
}
