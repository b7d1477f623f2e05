// Diagnostic CLI for the room backend
//
// Usage:
//   room-scribe engines
//   room-scribe rooms
//   room-scribe token --engine <id> [--operation real_time_transcription] [--room standup]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use room_scribe::session::resolve_room_name;
use room_scribe::{BackendClient, Config, EngineCatalog, OperationMode, RoomDirectory, TokenIssuer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "room-scribe")]
#[command(about = "Inspect rooms, audio models and tokens on the room backend")]
struct Args {
    /// Configuration file (extension optional)
    #[arg(short, long, default_value = "config/room-scribe")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List audio-capable engines
    Engines,

    /// List active rooms
    Rooms,

    /// Request an access token for a room
    Token {
        /// Engine id
        #[arg(short, long)]
        engine: String,

        /// Operation mode
        #[arg(short, long, default_value = "turn_based_transcription")]
        operation: OperationMode,

        /// Room name; generated when omitted
        #[arg(short, long)]
        room: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let cfg = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Backend: {}", cfg.backend.base_url);

    let backend = BackendClient::new(&cfg.backend).context("Failed to create backend client")?;

    match args.command {
        Command::Engines => {
            let engines = backend.list_engines().await?;
            if engines.is_empty() {
                println!("No audio models found");
            }
            for engine in engines {
                println!("{}\t{}", engine.id, engine.name);
            }
        }
        Command::Rooms => {
            let rooms = backend.list_rooms().await?;
            println!("{} room{}", rooms.len(), if rooms.len() == 1 { "" } else { "s" });
            for room in rooms {
                println!(
                    "{}\t{}/{}\t{}{}",
                    room.name,
                    room.num_participants,
                    room.max_participants,
                    room.creation_time.format("%H:%M:%S"),
                    if room.active_recording { "\tREC" } else { "" }
                );
            }
        }
        Command::Token {
            engine,
            operation,
            room,
        } => {
            let room_name = resolve_room_name(room.as_deref(), "room");
            let grant = backend.request_token(&engine, operation, &room_name).await?;
            println!("room: {}", room_name);
            if let Some(room_id) = grant.room_id {
                println!("room id: {}", room_id);
            }
            println!("token: {}", grant.credential);
        }
    }

    Ok(())
}
