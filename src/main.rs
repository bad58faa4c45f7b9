//! Binary entrypoint for the liferpg CLI.
//!
//! Commands:
//! - `init [--name <name>] [--force]` - write a starter `config.toml` and create the character
//! - `status` - print the character sheet
//! - `claim` - claim today's login bonus
//! - `play` - interactive session
//! - `quest`, `habit`, `location`, `shop` - one-shot versions of the `play` commands
//! - `calendar` - life in weeks
//! - `rename <name>`, `reset --yes`
//!
//! See the library crate docs for module-level details: `liferpg::`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{error, info, warn};
use std::io::Write as _;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

use liferpg::config::Config;
use liferpg::console::{Console, Flow, GameCommand, NotificationCenter};
use liferpg::game::{Frequency, GameSession, HabitType, PinType, DEFAULT_LIFE_EXPECTANCY};
use liferpg::validation::validate_name;

#[derive(Parser)]
#[command(name = "liferpg")]
#[command(about = "Turn habits, quests and places into experience and levels")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration and create a new character
    Init {
        /// Character name (defaults to [player] default_name)
        #[arg(short, long)]
        name: Option<String>,
        /// Replace an existing save
        #[arg(long)]
        force: bool,
    },
    /// Show the character sheet
    Status,
    /// Claim today's login bonus
    Claim,
    /// Interactive session
    Play,
    /// Quest board and active quests
    #[command(subcommand)]
    Quest(QuestCommand),
    /// Habit tracking
    #[command(subcommand)]
    Habit(HabitCommand),
    /// Map locations
    #[command(subcommand)]
    Location(LocationCommand),
    /// Rewards shop
    #[command(subcommand)]
    Shop(ShopCommand),
    /// Life in weeks, from a birth date
    Calendar {
        #[arg(long)]
        day: String,
        #[arg(long)]
        month: String,
        #[arg(long)]
        year: String,
        /// Life expectancy in years (50-120)
        #[arg(long, default_value_t = DEFAULT_LIFE_EXPECTANCY.to_string())]
        expectancy: String,
    },
    /// Change the character's name
    Rename { name: String },
    /// Start over with a new character
    Reset {
        /// Confirm that all progress should be discarded
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum QuestCommand {
    /// Show the basic board and active quests
    List,
    /// Roll random daily quests and start all of them
    Generate {
        #[arg(short = 'n', long, default_value_t = 3)]
        count: usize,
    },
    /// Start a quest from the basic board (1-based)
    Begin { number: usize },
    /// Complete an active quest (1-based)
    Complete { number: usize },
}

#[derive(Subcommand)]
enum HabitCommand {
    Add {
        name: String,
        #[arg(short = 't', long = "type", default_value = "other")]
        kind: HabitType,
        #[arg(short, long, default_value = "daily")]
        frequency: Frequency,
    },
    /// Mark a habit done (or undone) for today
    Toggle { id: u64 },
    Remove { id: u64 },
    List,
}

#[derive(Subcommand)]
enum LocationCommand {
    /// Pin a location at map pixel coordinates
    Add {
        name: String,
        #[arg(long)]
        x: f64,
        #[arg(long)]
        y: f64,
        #[arg(short, long, default_value = "city")]
        pin: PinType,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Remove a location (1-based, as listed)
    Remove { number: usize },
    /// Replace a location's notes
    Note { number: usize, text: String },
    List,
    /// Remove every location
    Clear,
}

#[derive(Subcommand)]
enum ShopCommand {
    List,
    Buy { item: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = match &cli.command {
        Commands::Init { .. } => None,
        _ => Config::load(&cli.config).await.ok(),
    };
    init_logging(&config, cli.verbose);

    if let Err(e) = run(cli, config).await {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, pre_config: Option<Config>) -> Result<()> {
    if let Commands::Init { name, force } = &cli.command {
        return init(&cli.config, name.as_deref(), *force).await;
    }
    let config = match pre_config {
        Some(config) => config,
        None => {
            if !Path::new(&cli.config).exists() {
                warn!("config file {} not found; using defaults", cli.config);
            }
            load_or_default(&cli.config).await?
        }
    };

    let session = GameSession::open(config.player_store());
    let one_shot = !matches!(cli.command, Commands::Play);
    let notifications = if config.notifications.enabled && !one_shot {
        NotificationCenter::new(config.notifications.duration())
    } else {
        NotificationCenter::disabled()
    };
    let mut console = Console::new(session, notifications);

    let command = match cli.command {
        Commands::Init { .. } => return Ok(()),
        Commands::Play => return play(&mut console).await,
        Commands::Reset { yes } => {
            if !yes {
                return Err(anyhow!("refusing to reset without --yes"));
            }
            console.session_mut().reset_progress()?;
            println!("Progress reset. A new adventure begins.");
            return Ok(());
        }
        Commands::Quest(QuestCommand::Generate { count }) => {
            print_lines(&console.execute(GameCommand::Generate(count))?);
            for _ in 0..console.board().len() {
                print_lines(&console.execute(GameCommand::Begin(1))?);
            }
            return Ok(());
        }
        Commands::Status => GameCommand::Status,
        Commands::Claim => GameCommand::Claim,
        Commands::Quest(QuestCommand::List) => GameCommand::Quests,
        Commands::Quest(QuestCommand::Begin { number }) => GameCommand::Begin(number),
        Commands::Quest(QuestCommand::Complete { number }) => GameCommand::Complete(number),
        Commands::Habit(HabitCommand::Add { name, kind, frequency }) => GameCommand::AddHabit { kind, frequency, name },
        Commands::Habit(HabitCommand::Toggle { id }) => GameCommand::ToggleHabit(id),
        Commands::Habit(HabitCommand::Remove { id }) => GameCommand::RemoveHabit(id),
        Commands::Habit(HabitCommand::List) => GameCommand::Habits,
        Commands::Location(LocationCommand::Add { name, x, y, pin, notes }) => {
            let extent = console.session().store().extent();
            let id = console
                .session_mut()
                .add_location(&name, liferpg::game::PixelPoint::new(x, y), pin, &notes)?;
            info!("location {} added on a {}x{} map", id, extent.width, extent.height);
            println!("Pinned {} ({}).", name, pin.key());
            return Ok(());
        }
        Commands::Location(LocationCommand::Remove { number }) => GameCommand::Unpin(number),
        Commands::Location(LocationCommand::Note { number, text }) => GameCommand::Note { index: number, text },
        Commands::Location(LocationCommand::List) => GameCommand::Locations,
        Commands::Location(LocationCommand::Clear) => GameCommand::ClearLocations,
        Commands::Shop(ShopCommand::List) => GameCommand::Shop,
        Commands::Shop(ShopCommand::Buy { item }) => GameCommand::Buy(item),
        Commands::Calendar {
            day,
            month,
            year,
            expectancy,
        } => GameCommand::Calendar {
            day,
            month,
            year,
            expectancy,
        },
        Commands::Rename { name } => GameCommand::Rename(name),
    };
    print_lines(&console.execute(command)?);
    Ok(())
}

async fn load_or_default(path: &str) -> Result<Config> {
    if Path::new(path).exists() {
        Config::load(path).await
    } else {
        Ok(Config::default())
    }
}

async fn init(config_path: &str, name: Option<&str>, force: bool) -> Result<()> {
    if Path::new(config_path).exists() {
        info!("keeping existing configuration at {}", config_path);
    } else {
        Config::create_default(config_path).await?;
        info!("configuration file created at {}", config_path);
    }
    let config = Config::load(config_path).await?;
    let store = config.player_store();
    if store.exists() && !force {
        return Err(anyhow!(
            "a character already exists at {} (use --force to replace it)",
            store.path().display()
        ));
    }

    let mut player = liferpg::game::Player::new();
    player.name = validate_name("player name", name.unwrap_or(&config.player.default_name))?;
    store.save(&player)?;
    println!("Created {} at {}", player.name, store.path().display());
    Ok(())
}

async fn play(console: &mut Console) -> Result<()> {
    print_lines(&console.execute(GameCommand::Status)?);
    println!("Type 'help' for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        for toast in console.notifications().active() {
            println!("  {}", toast);
        }
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let (flow, output) = console.handle_line(&line);
        print_lines(&output);
        if flow == Flow::Quit {
            break;
        }
    }
    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|c| c.logging.level.parse::<log::LevelFilter>().ok())
            .unwrap_or(log::LevelFilter::Warn),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|file| std::fs::OpenOptions::new().create(true).append(true).open(file).ok());
    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Only echo to the console when stderr is a terminal
        let is_tty = atty::is(atty::Stream::Stderr);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}
