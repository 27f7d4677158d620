//! Creature battle server and offline simulator.
//!
//!   creature-battle serve [--config game.ron] [--listen 127.0.0.1:7878]
//!   creature-battle simulate --team cindrake,gustling --foe shellpup --level 20 --seed 7

use clap::{Parser, Subcommand};
use creature_battle::battle::ai::{Behavior, ScoringAI};
use creature_battle::battle::engine::{apply_replacement, pending_replacements, resolve_round, RoundOutcome};
use creature_battle::battle::rng::SeededRng;
use creature_battle::battle::state::{Arena, BattleSide, Side};
use creature_battle::catalog::Catalog;
use creature_battle::config::GameConfig;
use creature_battle::creature::Creature;
use creature_battle::persistence::{MemoryProfileStore, ProfileStore};
use creature_battle::player::PlayerProfile;
use creature_battle::presence::HeartbeatTracker;
use creature_battle::pvp::{PvpCoordinator, SystemClock};
use creature_battle::roster::Roster;
use creature_battle::service::BattleService;
use schema::SpeciesId;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

type AppResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Hard stop for simulations where neither side can finish the other.
const SIMULATION_ROUND_LIMIT: u32 = 500;

#[derive(Parser)]
#[command(name = "creature-battle", version, about = "Creature battle engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the PvP request surface as line-delimited JSON
    Serve {
        /// RON file with coordinator windows and battle rules
        #[arg(long)]
        config: Option<PathBuf>,
        /// Listen on a TCP address instead of stdio
        #[arg(long)]
        listen: Option<String>,
    },
    /// Run an AI-versus-AI battle and print the narration
    Simulate {
        /// Comma separated species for the first side
        #[arg(long, value_delimiter = ',', default_value = "Cindrake")]
        team: Vec<String>,
        /// Comma separated species for the second side
        #[arg(long, value_delimiter = ',', default_value = "Shellpup")]
        foe: Vec<String>,
        #[arg(long, default_value_t = 20)]
        level: u8,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&PathBuf>) -> AppResult<GameConfig> {
    Ok(match path {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    })
}

fn parse_species(name: &str) -> AppResult<SpeciesId> {
    let trimmed = name.trim();
    let mut normalized = trimmed.to_ascii_lowercase();
    if let Some(first) = normalized.get_mut(..1) {
        first.make_ascii_uppercase();
    }
    SpeciesId::from_str(trimmed)
        .or_else(|_| SpeciesId::from_str(&normalized))
        .map_err(|_| format!("unknown species: {name}").into())
}

fn build_team(catalog: &Catalog, names: &[String], level: u8) -> AppResult<Vec<Creature>> {
    names
        .iter()
        .map(|name| Ok(Creature::from_catalog(catalog, parse_species(name)?, level)?))
        .collect()
}

/// A few ready-made players so a fresh server has someone to challenge.
fn seed_profiles(store: &dyn ProfileStore, catalog: &Catalog) -> AppResult<()> {
    let demo = [
        ("red", "Red", [SpeciesId::Cindrake, SpeciesId::Gustling]),
        ("blue", "Blue", [SpeciesId::Shellpup, SpeciesId::Pebblit]),
        ("green", "Green", [SpeciesId::Sproutling, SpeciesId::Toxitoad]),
    ];
    for (id, username, species) in demo {
        let team = species
            .into_iter()
            .map(|species| Creature::from_catalog(catalog, species, 25))
            .collect::<Result<Vec<_>, _>>()?;
        store.save(&PlayerProfile::new(id, username, Roster::new(team)?))?;
    }
    Ok(())
}

async fn serve_lines<R, W>(service: Arc<BattleService>, reader: R, mut writer: W) -> AppResult<()>
where
    R: tokio::io::AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = service.handle_line(&line);
        writer.write_all(format!("{response}\n").as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}

async fn serve(config: GameConfig, listen: Option<String>) -> AppResult<()> {
    let catalog = Catalog::builtin()?;
    let store = Arc::new(MemoryProfileStore::new());
    seed_profiles(store.as_ref(), &catalog)?;

    let coordinator = PvpCoordinator::new(
        store,
        Arc::new(HeartbeatTracker::new()),
        Arc::new(SystemClock),
        catalog,
        config,
    );
    let service = Arc::new(BattleService::new(Arc::new(coordinator)));

    match listen {
        Some(address) => {
            let listener = TcpListener::bind(&address).await?;
            info!(%address, "listening");
            loop {
                let (socket, peer) = listener.accept().await?;
                let service = service.clone();
                tokio::spawn(async move {
                    let (reader, writer) = socket.into_split();
                    if let Err(err) = serve_lines(service, reader, writer).await {
                        error!(%peer, error = %err, "connection closed with error");
                    }
                });
            }
        }
        None => {
            info!("serving on stdio");
            serve_lines(service, tokio::io::stdin(), tokio::io::stdout()).await
        }
    }
}

fn simulate(config: GameConfig, team: &[String], foe: &[String], level: u8, seed: Option<u64>) -> AppResult<()> {
    let catalog = Catalog::builtin()?;
    let mut arena = Arena::new(
        BattleSide::new("Blue", build_team(&catalog, team, level)?),
        BattleSide::new("Red", build_team(&catalog, foe, level)?),
    );
    let mut rng = match seed {
        Some(seed) => SeededRng::from_seed(seed),
        None => SeededRng::from_entropy(),
    };
    let ai = ScoringAI::new();

    for round in 1..=SIMULATION_ROUND_LIMIT {
        let actions = Side::BOTH.map(|side| ai.decide_action(side, &arena, &catalog));
        let resolution = resolve_round(&arena, actions, round, &catalog, &config.rules, &mut rng)?;
        for line in resolution.events.narrate(&resolution.arena) {
            println!("{line}");
        }
        arena = resolution.arena;

        match resolution.outcome {
            RoundOutcome::Ongoing => {}
            RoundOutcome::NeedsReplacement(_) => {
                for side in pending_replacements(&arena) {
                    let Some(index) = arena.side(side).first_available() else { continue };
                    let (next, events) = apply_replacement(&arena, side, index)?;
                    for line in events.narrate(&next) {
                        println!("{line}");
                    }
                    arena = next;
                }
            }
            RoundOutcome::Finished { winner, .. } => {
                let name = winner.map_or("Nobody", |side| arena.side(side).name.as_str());
                println!("{name} wins after {round} rounds.");
                return Ok(());
            }
        }
    }
    println!("No winner after {SIMULATION_ROUND_LIMIT} rounds.");
    Ok(())
}

#[tokio::main]
async fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve { config, listen } => serve(load_config(config.as_ref())?, listen).await,
        Commands::Simulate { team, foe, level, seed, config } => {
            simulate(load_config(config.as_ref())?, &team, &foe, level, seed)
        }
    }
}
