mod config;
mod event;
mod persistence;

use std::path::Path;

use config::ServerConfig;
use event::{EventHandler, Reply};
use ms_inventory::{InventoryManager, RecipeBook};
use persistence::FileStorage;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt};
use tracing::{info, warn};

async fn write_replies(stdout: &mut tokio::io::Stdout, replies: &[Reply]) -> std::io::Result<()> {
    let mut buf = Vec::new();
    for reply in replies {
        match serde_json::to_vec(reply) {
            Ok(line) => {
                buf.extend_from_slice(&line);
                buf.push(b'\n');
            }
            Err(e) => warn!("Failed to encode reply {reply:?}: {e}"),
        }
    }
    stdout.write_all(&buf).await?;
    stdout.flush().await
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = match ServerConfig::load("server.toml") {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load server.toml: {e}");
            std::process::exit(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    // stdout carries the reply stream, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("Inventory server v{} starting", env!("CARGO_PKG_VERSION"));

    let mut recipes = RecipeBook::new();
    recipes.load_recipes(
        Path::new(&config.recipes.path),
        &config.recipes.suffix,
        &config.recipes.enabled,
    );
    info!("Recipe book holds {} pattern(s)", recipes.len());

    let storage = FileStorage::new(&config.storage.directory);
    info!("Container storage: {}", storage.dir().display());
    let mut handler = EventHandler::new(InventoryManager::new(recipes), storage);

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);

    // Handle Ctrl+C
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    // Events arrive one JSON object per line
    let (line_tx, mut line_rx) = tokio::sync::mpsc::channel::<String>(32);
    tokio::spawn(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim().to_string();
            if !line.is_empty() && line_tx.send(line).await.is_err() {
                break;
            }
        }
    });

    let mut stdout = tokio::io::stdout();
    loop {
        tokio::select! {
            line = line_rx.recv() => {
                match line {
                    Some(line) => {
                        let replies = handler.handle_line(&line);
                        if let Err(e) = write_replies(&mut stdout, &replies).await {
                            warn!("Reply stream closed: {e}");
                            break;
                        }
                    }
                    None => {
                        info!("Input closed");
                        break;
                    }
                }
            }
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }

    info!("Saving open containers before shutdown...");
    let (saved, replies) = handler.shutdown();
    if let Err(e) = write_replies(&mut stdout, &replies).await {
        warn!("Reply stream closed: {e}");
    }
    info!("Saved {saved} container(s). Server shut down.");
}
