//! Text front end: command parsing, rendering and timed notifications.

pub mod commands;
pub mod notifications;

pub use commands::{describe_event, parse_command, render_calendar, Console, Flow, GameCommand, HELP_TEXT};
pub use notifications::{Notification, NotificationCenter, NotificationKind, DEFAULT_NOTIFICATION_DURATION};
