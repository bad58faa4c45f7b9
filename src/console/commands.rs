//! Line commands for the interactive `play` loop and their execution against a
//! [`GameSession`].

use log::debug;
use rand::thread_rng;

use crate::console::notifications::{NotificationCenter, NotificationKind};
use crate::game::{
    basic_daily_quests, daily_quest_pool, generate_daily_quests, reward_catalog, Frequency, GameError, GameSession,
    HabitType, LifeCalendar, LocationUpdate, PinType, PixelPoint, Quest, SessionEvent, StreakChange,
    DEFAULT_LIFE_EXPECTANCY,
};
use crate::logutil::escape_log;

pub const HELP_TEXT: &str = "\
Commands:
  status | s                         character sheet
  claim                              claim today's login bonus
  quests | q                         quest board and active quests
  generate [n]                       roll a new quest board
  begin <n> / complete <n>           start a board quest / finish an active one
  habits | h                         list habits
  habit add <type> <freq> <name>     types: health fitness learning mindfulness
                                     productivity social creativity other
  toggle <id> / habit remove <id>    mark done for today / delete
  locations | l                      list pinned locations
  pin <x> <y> <type> <name>          pin a location at map pixel x,y
  note <n> <text> / repin <n> <type> edit a location
  unpin <n> / clear-locations        remove one / all locations
  shop / buy <item>                  rewards shop
  calendar <dd> <mm> <yyyy> [years]  life in weeks
  rename <name>
  help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum GameCommand {
    Status,
    Claim,
    Quests,
    Generate(usize),
    Begin(usize),    // 1-based index on the quest board
    Complete(usize), // 1-based index into active quests
    Habits,
    AddHabit { kind: HabitType, frequency: Frequency, name: String },
    ToggleHabit(u64),
    RemoveHabit(u64),
    Locations,
    Pin { x: f64, y: f64, pin: PinType, name: String },
    Note { index: usize, text: String },
    Repin { index: usize, pin: PinType },
    Unpin(usize),
    ClearLocations,
    Shop,
    Buy(String),
    Calendar { day: String, month: String, year: String, expectancy: String },
    Rename(String),
    Help,
    Quit,
    /// Unrecognized input or a usage message.
    Unknown(String),
}

fn usage(text: &str) -> GameCommand {
    GameCommand::Unknown(format!("Usage: {}", text))
}

fn index_arg(raw: Option<&&str>, usage_text: &str) -> Result<usize, GameCommand> {
    raw.and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .ok_or_else(|| usage(usage_text))
}

/// Parse one input line. Keywords are case-insensitive; names keep their case.
pub fn parse_command(input: &str) -> GameCommand {
    let parts: Vec<&str> = input.split_whitespace().collect();
    let Some(first) = parts.first() else {
        return GameCommand::Unknown(String::new());
    };
    let rest = |from: usize| parts.get(from..).map(|p| p.join(" ")).unwrap_or_default();

    let result: Result<GameCommand, GameCommand> = match first.to_ascii_lowercase().as_str() {
        "s" | "status" => Ok(GameCommand::Status),
        "claim" | "login" => Ok(GameCommand::Claim),
        "q" | "quests" => Ok(GameCommand::Quests),
        "generate" | "gen" => match parts.get(1) {
            None => Ok(GameCommand::Generate(3)),
            Some(n) => n.parse().map(GameCommand::Generate).map_err(|_| usage("generate [count]")),
        },
        "begin" => index_arg(parts.get(1), "begin <board number>").map(GameCommand::Begin),
        "complete" | "done" => index_arg(parts.get(1), "complete <quest number>").map(GameCommand::Complete),
        "h" | "habits" => Ok(GameCommand::Habits),
        "habit" => match parts.get(1).map(|s| s.to_ascii_lowercase()).as_deref() {
            Some("add") => parse_add_habit(&parts, rest(4)),
            Some("toggle") => parse_habit_id(parts.get(2), "habit toggle <id>").map(GameCommand::ToggleHabit),
            Some("remove") | Some("rm") => parse_habit_id(parts.get(2), "habit remove <id>").map(GameCommand::RemoveHabit),
            Some("list") | None => Ok(GameCommand::Habits),
            Some(_) => Err(usage("habit add|toggle|remove|list")),
        },
        "t" | "toggle" => parse_habit_id(parts.get(1), "toggle <habit id>").map(GameCommand::ToggleHabit),
        "l" | "locations" => Ok(GameCommand::Locations),
        "pin" => parse_pin(&parts, rest(4)),
        "note" => index_arg(parts.get(1), "note <location number> <text>").map(|index| GameCommand::Note { index, text: rest(2) }),
        "repin" => {
            let index = index_arg(parts.get(1), "repin <location number> <type>");
            let pin = parts.get(2).and_then(|p| p.parse::<PinType>().ok());
            match (index, pin) {
                (Ok(index), Some(pin)) => Ok(GameCommand::Repin { index, pin }),
                _ => Err(usage("repin <location number> <type>")),
            }
        }
        "unpin" => index_arg(parts.get(1), "unpin <location number>").map(GameCommand::Unpin),
        "clear-locations" => Ok(GameCommand::ClearLocations),
        "shop" => Ok(GameCommand::Shop),
        "buy" => {
            let item = rest(1);
            if item.is_empty() {
                Err(usage("buy <item>"))
            } else {
                Ok(GameCommand::Buy(item))
            }
        }
        "calendar" => match parts.len() {
            4 | 5 => Ok(GameCommand::Calendar {
                day: parts[1].to_string(),
                month: parts[2].to_string(),
                year: parts[3].to_string(),
                expectancy: parts
                    .get(4)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| DEFAULT_LIFE_EXPECTANCY.to_string()),
            }),
            _ => Err(usage("calendar <dd> <mm> <yyyy> [years]")),
        },
        "rename" => {
            let name = rest(1);
            if name.is_empty() {
                Err(usage("rename <name>"))
            } else {
                Ok(GameCommand::Rename(name))
            }
        }
        "help" | "?" => Ok(GameCommand::Help),
        "quit" | "exit" => Ok(GameCommand::Quit),
        other => Err(GameCommand::Unknown(format!("Unknown command '{}'. Type 'help'.", other))),
    };
    result.unwrap_or_else(|e| e)
}

fn parse_habit_id(raw: Option<&&str>, usage_text: &str) -> Result<u64, GameCommand> {
    raw.and_then(|s| s.parse::<u64>().ok()).ok_or_else(|| usage(usage_text))
}

fn parse_add_habit(parts: &[&str], name: String) -> Result<GameCommand, GameCommand> {
    const USAGE: &str = "habit add <type> <daily|weekly|monthly> <name>";
    let kind = parts.get(2).and_then(|s| s.parse::<HabitType>().ok());
    let frequency = parts.get(3).and_then(|s| s.parse::<Frequency>().ok());
    match (kind, frequency) {
        (Some(kind), Some(frequency)) if !name.is_empty() => Ok(GameCommand::AddHabit { kind, frequency, name }),
        _ => Err(usage(USAGE)),
    }
}

fn parse_pin(parts: &[&str], name: String) -> Result<GameCommand, GameCommand> {
    const USAGE: &str = "pin <x> <y> <city|landmark|danger|mystery|treasure|home|work> <name>";
    let x = parts.get(1).and_then(|s| s.parse::<f64>().ok());
    let y = parts.get(2).and_then(|s| s.parse::<f64>().ok());
    let pin = parts.get(3).and_then(|s| s.parse::<PinType>().ok());
    match (x, y, pin) {
        (Some(x), Some(y), Some(pin)) if !name.is_empty() => Ok(GameCommand::Pin { x, y, pin, name }),
        _ => Err(usage(USAGE)),
    }
}

/// What the caller should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Interactive front end: owns the session, the quest board and the notification
/// center, and renders every result as plain text lines.
pub struct Console {
    session: GameSession,
    board: Vec<Quest>,
    notifications: NotificationCenter,
}

impl Console {
    pub fn new(session: GameSession, notifications: NotificationCenter) -> Self {
        Self {
            session,
            board: basic_daily_quests(),
            notifications,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }

    pub fn board(&self) -> &[Quest] {
        &self.board
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    /// Parse and run one line. Errors are rendered into the output rather than
    /// returned, so a bad command never ends the loop.
    pub fn handle_line(&mut self, line: &str) -> (Flow, Vec<String>) {
        let command = parse_command(line);
        debug!("console command: {}", escape_log(line));
        if command == GameCommand::Quit {
            return (Flow::Quit, vec!["Farewell, adventurer.".to_string()]);
        }
        match self.execute(command) {
            Ok(lines) => (Flow::Continue, lines),
            Err(e) => {
                let message = e.to_string();
                self.notifications.show(message.clone(), NotificationKind::Error);
                (Flow::Continue, vec![format!("Error: {}", message)])
            }
        }
    }

    pub fn execute(&mut self, command: GameCommand) -> Result<Vec<String>, GameError> {
        let lines = match command {
            GameCommand::Status => self.render_status(),
            GameCommand::Claim => {
                let events = self.session.claim_daily_login()?;
                self.render_events(&events)
            }
            GameCommand::Quests => self.render_quests(),
            GameCommand::Generate(count) => {
                self.board = generate_daily_quests(count, daily_quest_pool(), &mut thread_rng());
                self.render_quests()
            }
            GameCommand::Begin(n) => {
                let index = n
                    .checked_sub(1)
                    .filter(|i| *i < self.board.len())
                    .ok_or(GameError::QuestIndexOutOfRange(n))?;
                let quest = self.board.remove(index);
                let name = quest.name.clone();
                self.session.begin_quest(quest)?;
                vec![format!("Quest started: {}", name)]
            }
            GameCommand::Complete(n) => {
                let index = n.checked_sub(1).ok_or(GameError::QuestIndexOutOfRange(n))?;
                let events = self.session.complete_active_quest(index).map_err(|e| match e {
                    GameError::QuestIndexOutOfRange(_) => GameError::QuestIndexOutOfRange(n),
                    other => other,
                })?;
                self.render_events(&events)
            }
            GameCommand::Habits => self.render_habits(),
            GameCommand::AddHabit { kind, frequency, name } => {
                let id = self.session.add_habit(&name, kind, frequency)?;
                vec![format!("Habit #{} added.", id)]
            }
            GameCommand::ToggleHabit(id) => {
                let events = self.session.toggle_habit(id)?;
                self.render_events(&events)
            }
            GameCommand::RemoveHabit(id) => {
                if self.session.remove_habit(id)? {
                    vec![format!("Habit #{} removed.", id)]
                } else {
                    vec![format!("No habit #{}.", id)]
                }
            }
            GameCommand::Locations => self.render_locations(),
            GameCommand::Pin { x, y, pin, name } => {
                self.session.add_location(&name, PixelPoint::new(x, y), pin, "")?;
                vec![format!("Pinned {} ({}).", name, pin.key())]
            }
            GameCommand::Note { index, text } => {
                let id = self.location_id(index)?;
                let update = LocationUpdate {
                    notes: Some(text),
                    pin: None,
                };
                self.session.update_location(id, update)?;
                vec!["Notes saved.".to_string()]
            }
            GameCommand::Repin { index, pin } => {
                let id = self.location_id(index)?;
                let update = LocationUpdate {
                    notes: None,
                    pin: Some(pin),
                };
                self.session.update_location(id, update)?;
                vec![format!("Location is now a {} pin.", pin.key())]
            }
            GameCommand::Unpin(index) => {
                let id = self.location_id(index)?;
                self.session.remove_location(id)?;
                vec!["Location removed.".to_string()]
            }
            GameCommand::ClearLocations => {
                let count = self.session.clear_locations()?;
                vec![format!("Removed {} locations.", count)]
            }
            GameCommand::Shop => self.render_shop(),
            GameCommand::Buy(item) => {
                let events = self.session.purchase(&item)?;
                self.render_events(&events)
            }
            GameCommand::Calendar {
                day,
                month,
                year,
                expectancy,
            } => {
                let today = self.session.today();
                let calendar = LifeCalendar::from_inputs(&day, &month, &year, &expectancy, today)?;
                render_calendar(&calendar)
            }
            GameCommand::Rename(name) => {
                self.session.rename(&name)?;
                vec![format!("You are now known as {}.", self.session.player().name)]
            }
            GameCommand::Help => HELP_TEXT.lines().map(str::to_string).collect(),
            GameCommand::Quit => Vec::new(),
            GameCommand::Unknown(message) => {
                if message.is_empty() {
                    Vec::new()
                } else {
                    vec![message]
                }
            }
        };
        Ok(lines)
    }

    fn location_id(&self, index: usize) -> Result<uuid::Uuid, GameError> {
        index
            .checked_sub(1)
            .and_then(|i| self.session.player().visited_locations.get(i))
            .map(|l| l.id)
            .ok_or(GameError::LocationIndexOutOfRange(index))
    }

    fn render_events(&self, events: &[SessionEvent]) -> Vec<String> {
        let mut lines = Vec::with_capacity(events.len());
        for event in events {
            let (line, kind) = describe_event(event);
            if kind != NotificationKind::Info {
                self.notifications.show(line.clone(), kind);
            }
            lines.push(line);
        }
        lines
    }

    fn render_status(&self) -> Vec<String> {
        let p = self.session.player();
        let filled = (p.xp_progress() * 20.0).round() as usize;
        let mut lines = vec![
            format!("{} - Level {}", p.name, p.level),
            format!(
                "XP  [{}{}] {}/{}",
                "#".repeat(filled),
                "-".repeat(20 - filled.min(20)),
                p.xp,
                p.xp_to_next_level()
            ),
            format!("Gold {}   Daily streak {}", p.gold, p.daily_streak),
        ];
        lines.extend(p.attributes.iter().map(|(a, v)| format!("  {:<13}{}", a.key(), v)));
        if !p.achievements.is_empty() {
            let titles: Vec<&str> = p.achievements.iter().map(|e| e.achievement.title()).collect();
            lines.push(format!("Achievements: {}", titles.join(", ")));
        }
        if !p.inventory.is_empty() {
            lines.push(format!("Inventory: {}", p.inventory.join(", ")));
        }
        lines
    }

    fn render_quests(&self) -> Vec<String> {
        let mut lines = vec!["Quest board:".to_string()];
        lines.extend(self.board.iter().enumerate().map(|(i, q)| {
            format!(
                "  {}. [{}] {} - {} (+{} xp, +{} gold)",
                i + 1,
                q.rarity.label(),
                q.name,
                q.description,
                q.xp_reward,
                q.gold_reward
            )
        }));
        let active = &self.session.player().active_quests;
        lines.push(format!("Active quests ({}):", active.len()));
        lines.extend(
            active
                .iter()
                .enumerate()
                .map(|(i, q)| format!("  {}. {} (+{} xp, +{} gold)", i + 1, q.name, q.xp_reward, q.gold_reward)),
        );
        lines.push(format!("Completed: {}", self.session.player().completed_quests.len()));
        lines
    }

    fn render_habits(&self) -> Vec<String> {
        let habits = &self.session.player().habits;
        if habits.is_empty() {
            return vec!["No habits yet. Try: habit add fitness daily Morning run".to_string()];
        }
        habits
            .iter()
            .map(|h| {
                format!(
                    "  #{} [{}] {} ({}, {}) streak {}",
                    h.id,
                    if h.completed_today { "x" } else { " " },
                    h.name,
                    h.kind.key(),
                    h.frequency.key(),
                    h.streak
                )
            })
            .collect()
    }

    fn render_locations(&self) -> Vec<String> {
        let extent = self.session.store().extent();
        let locations = &self.session.player().visited_locations;
        if locations.is_empty() {
            return vec!["No locations pinned.".to_string()];
        }
        locations
            .iter()
            .enumerate()
            .map(|(i, l)| {
                let px = l.pixel_position(extent);
                let mut line = format!("  {}. {} [{}] at ({:.0}, {:.0})", i + 1, l.name, l.pin.key(), px.x, px.y);
                if l.has_notes() {
                    line.push_str(&format!(" - {}", l.notes));
                }
                line
            })
            .collect()
    }

    fn render_shop(&self) -> Vec<String> {
        let player = self.session.player();
        let mut lines = vec![format!("Rewards shop (you have {} gold):", player.gold)];
        lines.extend(reward_catalog().iter().map(|item| {
            format!(
                "  {:<14}{:>4}g  {}{}",
                item.name,
                item.price,
                item.description,
                if player.can_afford(item) { "" } else { " (can't afford)" }
            )
        }));
        lines
    }
}

/// Text for one session event, and how loudly to announce it.
pub fn describe_event(event: &SessionEvent) -> (String, NotificationKind) {
    match event {
        SessionEvent::LevelUp(l) => (
            format!("Level up! You reached level {} (+{} gold).", l.new_level, l.gold_awarded),
            NotificationKind::Success,
        ),
        SessionEvent::AchievementEarned(a) => (
            format!("Achievement unlocked: {} - {}", a.title(), a.description()),
            NotificationKind::Success,
        ),
        SessionEvent::Streak(StreakChange::AlreadyClaimed) => (
            "Daily bonus already claimed today.".to_string(),
            NotificationKind::Warning,
        ),
        SessionEvent::Streak(StreakChange::Extended { streak }) => (
            format!("Daily streak extended to {} days.", streak),
            NotificationKind::Success,
        ),
        SessionEvent::Streak(StreakChange::Reset { previous }) => (
            format!("Streak restarted at 1 (was {}).", previous),
            NotificationKind::Info,
        ),
        SessionEvent::QuestCompleted(o) => (
            format!("Quest complete: {} (+{} xp, +{} gold)", o.name, o.xp, o.gold),
            NotificationKind::Success,
        ),
        SessionEvent::HabitToggled(t) if t.completed => (
            format!("Habit #{} done (streak {}, +{} xp).", t.habit_id, t.streak, t.xp_awarded),
            NotificationKind::Info,
        ),
        SessionEvent::HabitToggled(t) => (
            format!("Habit #{} unmarked (streak {}).", t.habit_id, t.streak),
            NotificationKind::Info,
        ),
        SessionEvent::Purchased { name, price } => (
            format!("Bought {} for {} gold.", name, price),
            NotificationKind::Success,
        ),
        SessionEvent::ProgressReset => ("Progress reset. A new adventure begins.".to_string(), NotificationKind::Warning),
    }
}

pub fn render_calendar(calendar: &LifeCalendar) -> Vec<String> {
    let mut lines = vec![format!(
        "Weeks lived {} / {} ({:.1}%), remaining {}",
        calendar.lived_weeks,
        calendar.total_weeks(),
        calendar.percent_lived(),
        calendar.remaining_weeks()
    )];
    lines.extend(calendar.render_rows());
    lines
}
