//! Binary entrypoint for the xiuxian CLI.
//!
//! Every player command takes `--user <id> --name <username>` and prints its
//! result as JSON on stdout. Logs go to stderr and, when configured, a file.
//!
//! Commands:
//! - `init` - write a starter `config.toml` and create the database
//! - `catalog [--output <file>]` - dump the active catalog as JSON
//! - `status`, `inventory`, `stages`, `weapons [name]` - read-only reports
//! - `meditate`, `gather`, `mine`, `challenge <stage>` - cooldown-gated actions
//! - `shop`, `realm-weapons <realm>`, `buy`, `equip`, `unequip`, `enhance` - weapons
//! - `sell <material> [amount]`, `sell-all` - the material market
//! - `leaderboard [--limit n]` - top cultivators by experience
//! - `snapshot create|list|verify|restore|prune` - database snapshots
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use serde::Serialize;

use xiuxian::config::{log_level_filter, Config};
use xiuxian::game::{GameError, GameService, PlayerIdentity, PlayerStore, Realm};
use xiuxian::storage::SnapshotManager;

#[derive(Parser)]
#[command(name = "xiuxian")]
#[command(about = "A cultivation progression and economy engine")]
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

#[derive(Args, Clone)]
struct PlayerArgs {
    /// Platform user id
    #[arg(short, long)]
    user: u64,
    /// Platform username
    #[arg(short, long)]
    name: String,
    /// Display name; defaults to the username
    #[arg(long)]
    display_name: Option<String>,
}

impl PlayerArgs {
    fn identity(&self) -> PlayerIdentity {
        let display = self.display_name.clone().unwrap_or_else(|| self.name.clone());
        PlayerIdentity::new(self.user, self.name.clone(), display)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file and create the database
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
    /// Print the active catalog as JSON
    Catalog {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Realm, experience, spiritual power and cooldowns
    Status(PlayerArgs),
    /// Spirit stones, materials with their value, and weapons
    Inventory(PlayerArgs),
    Meditate(PlayerArgs),
    /// Gather herbs at a random location open to your realm
    Gather(PlayerArgs),
    /// Mine at a random mine open to your realm
    Mine(PlayerArgs),
    /// List dungeon stages
    Stages(PlayerArgs),
    /// Challenge a dungeon stage
    Challenge {
        #[command(flatten)]
        player: PlayerArgs,
        stage: String,
    },
    /// Weapons your realm allows
    Shop {
        #[command(flatten)]
        player: PlayerArgs,
        /// Only weapons you can afford right now
        #[arg(long)]
        affordable: bool,
    },
    /// Weapons that require exactly this realm
    RealmWeapons { realm: Realm },
    Buy {
        #[command(flatten)]
        player: PlayerArgs,
        weapon: String,
    },
    Equip {
        #[command(flatten)]
        player: PlayerArgs,
        weapon: String,
    },
    Unequip(PlayerArgs),
    /// Attempt to raise a weapon's enhancement level by one
    Enhance {
        #[command(flatten)]
        player: PlayerArgs,
        weapon: String,
    },
    /// Details of one owned weapon, or all of them
    Weapons {
        #[command(flatten)]
        player: PlayerArgs,
        weapon: Option<String>,
    },
    Sell {
        #[command(flatten)]
        player: PlayerArgs,
        material: String,
        #[arg(default_value_t = 1)]
        amount: u64,
    },
    /// Sell every material the market buys
    SellAll(PlayerArgs),
    Leaderboard {
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Database snapshots
    Snapshot {
        #[command(subcommand)]
        action: SnapshotCommand,
    },
}

#[derive(Subcommand)]
enum SnapshotCommand {
    Create {
        #[arg(short, long)]
        label: Option<String>,
    },
    List,
    Verify { id: String },
    /// Replace the database with a snapshot; the current one is kept aside
    Restore { id: String },
    /// Keep only the newest snapshots
    Prune {
        #[arg(short, long)]
        keep: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.command {
        Commands::Init { .. } => Config::default(),
        _ => Config::load_or_default(&cli.config).await?,
    };
    init_logging(&config, cli.verbose);

    match run(cli, config).await {
        Ok(()) => Ok(()),
        Err(e) => match e.downcast_ref::<GameError>().and_then(GameError::as_action) {
            // A refused action is an answer, not a crash.
            Some(refusal) => {
                print_json(&serde_json::json!({ "error": refusal.to_string() }))?;
                std::process::exit(2);
            }
            None => Err(e),
        },
    }
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Init { force } => {
            if tokio::fs::try_exists(&cli.config).await.unwrap_or(false) && !force {
                warn!("{} already exists; use --force to overwrite", cli.config);
            } else {
                Config::create_default(&cli.config).await?;
                info!("Configuration file created at {}", cli.config);
            }
            let db_path = config.storage.db_path();
            PlayerStore::open(&db_path)?;
            info!("Player database ready at {}", db_path.display());
        }
        Commands::Catalog { output } => {
            let json = config.catalog()?.to_json_pretty()?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, json).await?;
                    info!("Catalog written to {}", path);
                }
                None => println!("{}", json),
            }
        }
        Commands::Snapshot { action } => run_snapshot(action, &config)?,
        Commands::RealmWeapons { realm } => {
            let service = open_service(&config)?;
            print_json(&service.weapons_for_realm(realm))?;
        }
        Commands::Leaderboard { limit } => {
            let service = open_service(&config)?;
            print_json(&serde_json::json!({
                "players": service.player_count()?,
                "top": service.leaderboard(limit)?,
            }))?;
        }
        player_command => {
            let service = open_service(&config)?;
            run_player_command(&service, player_command).await?;
        }
    }
    Ok(())
}

async fn run_player_command(service: &GameService, command: Commands) -> Result<()> {
    match command {
        Commands::Status(p) => print_json(&service.status(&p.identity()).await?),
        Commands::Inventory(p) => print_json(&service.inventory(&p.identity()).await?),
        Commands::Meditate(p) => print_json(&service.meditate(&p.identity()).await?),
        Commands::Gather(p) => print_json(&service.gather_herbs(&p.identity()).await?),
        Commands::Mine(p) => print_json(&service.mine(&p.identity()).await?),
        Commands::Stages(p) => print_json(&service.list_stages(&p.identity()).await?),
        Commands::Challenge { player, stage } => {
            let outcome = service.challenge_dungeon(&player.identity(), &stage).await?;
            for line in outcome.battle.log() {
                info!("{}", line);
            }
            print_json(&outcome)
        }
        Commands::Shop { player, affordable } => {
            print_json(&service.list_weapons(&player.identity(), affordable).await?)
        }
        Commands::Buy { player, weapon } => {
            print_json(&service.buy_weapon(&player.identity(), &weapon).await?)
        }
        Commands::Equip { player, weapon } => {
            print_json(&service.equip_weapon(&player.identity(), &weapon).await?)
        }
        Commands::Unequip(p) => print_json(&serde_json::json!({
            "unequipped": service.unequip_weapon(&p.identity()).await?,
        })),
        Commands::Enhance { player, weapon } => {
            print_json(&service.enhance_weapon(&player.identity(), &weapon).await?)
        }
        Commands::Weapons { player, weapon } => print_json(
            &service
                .weapon_details(&player.identity(), weapon.as_deref())
                .await?,
        ),
        Commands::Sell {
            player,
            material,
            amount,
        } => print_json(
            &service
                .sell_material(&player.identity(), &material, amount)
                .await?,
        ),
        Commands::SellAll(p) => print_json(&service.sell_all_materials(&p.identity()).await?),
        _ => Err(anyhow!("not a player command")),
    }
}

fn run_snapshot(action: SnapshotCommand, config: &Config) -> Result<()> {
    let mut manager =
        SnapshotManager::new(config.storage.db_path(), config.storage.snapshot_dir())?;
    match action {
        SnapshotCommand::Create { label } => print_json(&manager.create(label)?),
        SnapshotCommand::List => print_json(&manager.list()),
        SnapshotCommand::Verify { id } => {
            let valid = manager.verify(&id)?;
            print_json(&serde_json::json!({ "id": id, "valid": valid }))
        }
        SnapshotCommand::Restore { id } => {
            let previous = manager.restore(&id)?;
            print_json(&serde_json::json!({ "restored": id, "previous_database": previous }))
        }
        SnapshotCommand::Prune { keep } => {
            let deleted = manager.prune(keep.unwrap_or(config.storage.snapshot_keep))?;
            print_json(&serde_json::json!({ "deleted": deleted }))
        }
    }
}

fn open_service(config: &Config) -> Result<GameService> {
    let catalog = Arc::new(config.catalog()?);
    let store = PlayerStore::open(config.storage.db_path())?;
    Ok(GameService::new(store, catalog, config.game.rules.clone()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_logging(config: &Config, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let level = match verbosity {
        0 => log_level_filter(&config.logging.level).unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(level);

    let file = config.logging.file.as_ref().and_then(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });
    match file {
        Some(f) => {
            let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
            // Mirror to the console only when someone is watching it
            let is_tty = atty::is(atty::Stream::Stdout);
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
        }
        None => {
            builder.format(|fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
            });
        }
    }
    let _ = builder.try_init();
}
