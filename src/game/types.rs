use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::validation::ValidationError;

/// Version 1 is the untyped document written by the first desktop release
/// (percent coordinates, habits without ids, no quest lists).
pub const LEGACY_PLAYER_SCHEMA_VERSION: u8 = 1;
pub const PLAYER_SCHEMA_VERSION: u8 = 2;

pub const DEFAULT_PLAYER_NAME: &str = "Adventurer";
pub const STARTING_GOLD: u64 = 100;
pub const DEFAULT_HABIT_XP: u64 = 10;

// ============================================================================
// Attributes
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Strength,
    Intelligence,
    Charisma,
    Endurance,
    Creativity,
}

impl Attribute {
    pub const ALL: [Attribute; 5] = [
        Attribute::Strength,
        Attribute::Intelligence,
        Attribute::Charisma,
        Attribute::Endurance,
        Attribute::Creativity,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Attribute::Strength => "strength",
            Attribute::Intelligence => "intelligence",
            Attribute::Charisma => "charisma",
            Attribute::Endurance => "endurance",
            Attribute::Creativity => "creativity",
        }
    }

    /// Starting value for a fresh character.
    pub fn baseline(self) -> u32 {
        match self {
            Attribute::Intelligence => 8,
            Attribute::Charisma => 6,
            Attribute::Strength | Attribute::Endurance | Attribute::Creativity => 5,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Fixed attribute sheet. Keys missing from a save fall back to their baseline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Attributes {
    pub strength: u32,
    pub intelligence: u32,
    pub charisma: u32,
    pub endurance: u32,
    pub creativity: u32,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            strength: Attribute::Strength.baseline(),
            intelligence: Attribute::Intelligence.baseline(),
            charisma: Attribute::Charisma.baseline(),
            endurance: Attribute::Endurance.baseline(),
            creativity: Attribute::Creativity.baseline(),
        }
    }
}

impl Attributes {
    pub fn get(&self, attribute: Attribute) -> u32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Intelligence => self.intelligence,
            Attribute::Charisma => self.charisma,
            Attribute::Endurance => self.endurance,
            Attribute::Creativity => self.creativity,
        }
    }

    pub fn set(&mut self, attribute: Attribute, value: u32) {
        let slot = match attribute {
            Attribute::Strength => &mut self.strength,
            Attribute::Intelligence => &mut self.intelligence,
            Attribute::Charisma => &mut self.charisma,
            Attribute::Endurance => &mut self.endurance,
            Attribute::Creativity => &mut self.creativity,
        };
        *slot = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, u32)> + '_ {
        Attribute::ALL.into_iter().map(move |a| (a, self.get(a)))
    }
}

// ============================================================================
// Quests
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuestType {
    #[default]
    Daily,
    Weekly,
    Story,
    Habit,
}

impl QuestType {
    pub fn label(self) -> &'static str {
        match self {
            QuestType::Daily => "Daily",
            QuestType::Weekly => "Weekly",
            QuestType::Story => "Story",
            QuestType::Habit => "Habit",
        }
    }
}

/// Quality tier that scales quest rewards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuestRarity {
    #[default]
    Common,
    Rare,
    Epic,
    Legendary,
}

impl QuestRarity {
    pub const ALL: [QuestRarity; 4] = [
        QuestRarity::Common,
        QuestRarity::Rare,
        QuestRarity::Epic,
        QuestRarity::Legendary,
    ];

    pub fn index(self) -> u64 {
        match self {
            QuestRarity::Common => 0,
            QuestRarity::Rare => 1,
            QuestRarity::Epic => 2,
            QuestRarity::Legendary => 3,
        }
    }

    /// `base × (1 + 0.5 × index)`, truncated.
    pub fn scale(self, base: u64) -> u64 {
        base.saturating_mul(2 + self.index()) / 2
    }

    pub fn label(self) -> &'static str {
        match self {
            QuestRarity::Common => "Common",
            QuestRarity::Rare => "Rare",
            QuestRarity::Epic => "Epic",
            QuestRarity::Legendary => "Legendary",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quest {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "quest_type")]
    pub kind: QuestType,
    #[serde(default)]
    pub rarity: QuestRarity,
    #[serde(default)]
    pub xp_reward: u64,
    #[serde(default)]
    pub gold_reward: u64,
    #[serde(default)]
    pub completed: bool,
}

impl Quest {
    pub fn new(name: &str, description: &str, kind: QuestType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
            kind,
            rarity: QuestRarity::Common,
            xp_reward: 0,
            gold_reward: 0,
            completed: false,
        }
    }

    /// Set the rarity and derive both rewards from their base values.
    pub fn with_rewards(mut self, rarity: QuestRarity, base_xp: u64, base_gold: u64) -> Self {
        self.rarity = rarity;
        self.xp_reward = rarity.scale(base_xp);
        self.gold_reward = rarity.scale(base_gold);
        self
    }
}

// ============================================================================
// Habits
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum HabitType {
    Health,
    Fitness,
    Learning,
    Mindfulness,
    Productivity,
    Social,
    Creativity,
    #[default]
    Other,
}

impl HabitType {
    pub const ALL: [HabitType; 8] = [
        HabitType::Health,
        HabitType::Fitness,
        HabitType::Learning,
        HabitType::Mindfulness,
        HabitType::Productivity,
        HabitType::Social,
        HabitType::Creativity,
        HabitType::Other,
    ];

    pub fn key(self) -> &'static str {
        match self {
            HabitType::Health => "health",
            HabitType::Fitness => "fitness",
            HabitType::Learning => "learning",
            HabitType::Mindfulness => "mindfulness",
            HabitType::Productivity => "productivity",
            HabitType::Social => "social",
            HabitType::Creativity => "creativity",
            HabitType::Other => "other",
        }
    }
}

impl FromStr for HabitType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        HabitType::ALL
            .into_iter()
            .find(|kind| kind.key() == wanted)
            .ok_or_else(|| ValidationError::UnknownVariant {
                field: "habit type",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn key(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

impl FromStr for Frequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            _ => Err(ValidationError::UnknownVariant {
                field: "frequency",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Habit {
    /// Zero only on records from legacy saves; migration renumbers those.
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default, alias = "type")]
    pub kind: HabitType,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub streak: u32,
    #[serde(default = "default_habit_xp")]
    pub xp_reward: u64,
    #[serde(default, alias = "completed")]
    pub completed_today: bool,
    #[serde(default, deserialize_with = "lenient_date")]
    pub last_completed: Option<NaiveDate>,
    /// Day the completion XP was last granted; blocks a second grant on the same day.
    #[serde(default, deserialize_with = "lenient_date")]
    pub rewarded_on: Option<NaiveDate>,
    #[serde(default = "today_local", deserialize_with = "lenient_created_at")]
    pub created_at: NaiveDate,
}

impl Habit {
    pub fn new(id: u64, name: &str, kind: HabitType, frequency: Frequency, today: NaiveDate) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind,
            frequency,
            streak: 0,
            xp_reward: DEFAULT_HABIT_XP,
            completed_today: false,
            last_completed: None,
            rewarded_on: None,
            created_at: today,
        }
    }
}

fn default_habit_xp() -> u64 {
    DEFAULT_HABIT_XP
}

fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// Accept `YYYY-MM-DD` as well as full ISO timestamps (legacy saves stored
/// `datetime.isoformat()`); anything unparsable becomes `None`.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_date_prefix))
}

fn lenient_created_at<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_date(deserializer)?.unwrap_or_else(today_local))
}

pub(crate) fn parse_date_prefix(raw: &str) -> Option<NaiveDate> {
    let head = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

// ============================================================================
// Map locations
// ============================================================================

/// Pixel dimensions of the map the caller is displaying.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MapExtent {
    pub width: f64,
    pub height: f64,
}

impl Default for MapExtent {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 500.0,
        }
    }
}

impl MapExtent {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Convert a pixel position to a fraction of this extent. `None` when the
    /// point falls outside the map or the extent is degenerate.
    pub fn to_fraction(&self, pixel: PixelPoint) -> Option<MapPoint> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        let inside = (0.0..=self.width).contains(&pixel.x) && (0.0..=self.height).contains(&pixel.y);
        inside.then(|| MapPoint::new(pixel.x / self.width, pixel.y / self.height))
    }

    pub fn to_pixels(&self, point: MapPoint) -> PixelPoint {
        PixelPoint {
            x: point.x * self.width,
            y: point.y * self.height,
        }
    }
}

/// Canonical location position: fractions (0..=1) of the map width and height.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
}

impl MapPoint {
    /// Build a point, clamping both axes into `0..=1`.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: clamp_unit(x),
            y: clamp_unit(y),
        }
    }

    pub fn from_percent(x_pct: f64, y_pct: f64) -> Self {
        Self::new(x_pct / 100.0, y_pct / 100.0)
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PinType {
    #[default]
    City,
    Landmark,
    Danger,
    Mystery,
    Treasure,
    Home,
    Work,
}

impl PinType {
    pub const ALL: [PinType; 7] = [
        PinType::City,
        PinType::Landmark,
        PinType::Danger,
        PinType::Mystery,
        PinType::Treasure,
        PinType::Home,
        PinType::Work,
    ];

    pub fn key(self) -> &'static str {
        match self {
            PinType::City => "city",
            PinType::Landmark => "landmark",
            PinType::Danger => "danger",
            PinType::Mystery => "mystery",
            PinType::Treasure => "treasure",
            PinType::Home => "home",
            PinType::Work => "work",
        }
    }
}

impl FromStr for PinType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        PinType::ALL
            .into_iter()
            .find(|pin| pin.key() == wanted)
            .ok_or_else(|| ValidationError::UnknownVariant {
                field: "pin type",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub notes: String,
    pub position: MapPoint,
    #[serde(default, rename = "pin_type")]
    pub pin: PinType,
    #[serde(default = "visited_default")]
    pub visited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn visited_default() -> bool {
    true
}

// ============================================================================
// Achievements
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    /// Reach level 5
    Novice,
    /// Reach level 10
    Apprentice,
    /// Maintain a 7-day streak
    Consistent,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EarnedAchievement {
    pub achievement: Achievement,
    pub earned_at: DateTime<Utc>,
}

// ============================================================================
// Player aggregate
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub name: String,
    pub level: u32,
    pub xp: u64,
    pub gold: u64,
    pub attributes: Attributes,
    pub active_quests: Vec<Quest>,
    pub completed_quests: Vec<Quest>,
    pub habits: Vec<Habit>,
    /// Last habit id handed out; ids are never reused.
    pub habit_seq: u64,
    pub last_login: DateTime<Local>,
    pub daily_streak: u32,
    pub visited_locations: Vec<Location>,
    pub achievements: Vec<EarnedAchievement>,
    /// Item ids bought in the rewards shop, in purchase order.
    pub inventory: Vec<String>,
    pub schema_version: u8,
}

impl Player {
    pub fn new() -> Self {
        Self::new_at(Local::now())
    }

    /// Fresh character whose login clock starts at `now`.
    pub fn new_at(now: DateTime<Local>) -> Self {
        let created = now.with_timezone(&Utc);
        Self {
            name: DEFAULT_PLAYER_NAME.to_string(),
            level: 1,
            xp: 0,
            gold: STARTING_GOLD,
            attributes: Attributes::default(),
            active_quests: Vec::new(),
            completed_quests: Vec::new(),
            habits: Vec::new(),
            habit_seq: 0,
            last_login: now,
            daily_streak: 0,
            visited_locations: starter_locations(created),
            achievements: Vec::new(),
            inventory: Vec::new(),
            schema_version: PLAYER_SCHEMA_VERSION,
        }
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

fn starter_locations(now: DateTime<Utc>) -> Vec<Location> {
    [("Tokyo", 88.0, 50.0), ("Paris", 46.0, 40.0)]
        .into_iter()
        .map(|(name, x_pct, y_pct)| Location {
            id: Uuid::new_v4(),
            name: name.to_string(),
            notes: String::new(),
            position: MapPoint::from_percent(x_pct, y_pct),
            pin: PinType::City,
            visited: true,
            created_at: now,
            updated_at: now,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rarity_scaling_truncates() {
        assert_eq!(QuestRarity::Common.scale(25), 25);
        assert_eq!(QuestRarity::Rare.scale(25), 37);
        assert_eq!(QuestRarity::Epic.scale(25), 50);
        assert_eq!(QuestRarity::Legendary.scale(25), 62);
    }

    #[test]
    fn attributes_fill_missing_keys_with_baseline() {
        let attrs: Attributes = serde_json::from_str(r#"{"strength": 12}"#).unwrap();
        assert_eq!(attrs.strength, 12);
        assert_eq!(attrs.intelligence, 8);
        assert_eq!(attrs.charisma, 6);
    }

    #[test]
    fn extent_rejects_points_outside_the_map() {
        let extent = MapExtent::default();
        assert!(extent.to_fraction(PixelPoint::new(801.0, 10.0)).is_none());
        let point = extent.to_fraction(PixelPoint::new(400.0, 125.0)).unwrap();
        assert_eq!(point, MapPoint { x: 0.5, y: 0.25 });
    }

    #[test]
    fn legacy_habit_dates_parse() {
        let habit: Habit = serde_json::from_str(
            r#"{"name": "Read", "streak": 3, "completed": true,
                "last_completed": "2024-05-01T21:14:09.123456"}"#,
        )
        .unwrap();
        assert_eq!(habit.id, 0);
        assert!(habit.completed_today);
        assert_eq!(habit.last_completed, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(habit.xp_reward, DEFAULT_HABIT_XP);
    }

    #[test]
    fn parse_pin_and_habit_kinds() {
        assert_eq!("Treasure".parse::<PinType>().unwrap(), PinType::Treasure);
        assert!("volcano".parse::<PinType>().is_err());
        assert_eq!("fitness".parse::<HabitType>().unwrap(), HabitType::Fitness);
        assert_eq!("WEEKLY".parse::<Frequency>().unwrap(), Frequency::Weekly);
    }
}
