//! # LinkPost: scheduled LinkedIn posts with AI-generated content
//!
//! Usage:
//!   linkpost serve                      # HTTP API + in-process scheduler
//!   linkpost serve --port 8080          # Custom port
//!   linkpost cycle                      # Run one generate/publish cycle and exit
//!   linkpost post -t Rust -m chart.png  # Generate and publish with images
//!   linkpost config                     # Show effective configuration
//!   linkpost auth-url --scopes a,b      # Print a LinkedIn authorization URL

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use linkpost_core::config::AppConfig;
use linkpost_core::traits::{ConfigStore, Publisher};
use linkpost_core::types::MediaAsset;
use linkpost_gateway::AppState;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "linkpost",
    version,
    about = "📣 LinkPost — AI-written LinkedIn posts on a schedule"
)]
struct Cli {
    /// Config file (default: ~/.linkpost/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP gateway (and the scheduler in standalone mode)
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
        #[arg(long)]
        host: Option<String>,
    },
    /// Run one scheduled-post cycle now
    Cycle,
    /// Generate a post on a topic and publish it, optionally with images
    Post {
        #[arg(short, long)]
        topic: String,
        /// Extra context for the generator
        #[arg(long)]
        context: Option<String>,
        /// Image file to attach (repeatable)
        #[arg(short, long)]
        media: Vec<PathBuf>,
        /// LinkedIn access token (defaults to the configured one)
        #[arg(long)]
        token: Option<String>,
        /// Print the draft without publishing
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the effective configuration with secrets masked
    Config,
    /// Print a LinkedIn authorization URL and its CSRF state
    AuthUrl {
        /// Comma-separated scopes
        #[arg(long)]
        scopes: Option<String>,
    },
}

/// Mask a secret string for display: show first 4 chars + •••
fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    if s.len() <= 4 {
        return "••••".to_string();
    }
    let prefix: String = s.chars().take(4).collect();
    format!("{prefix}••••")
}

fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

async fn load_media(paths: &[PathBuf]) -> Result<Vec<MediaAsset>> {
    let mut assets = Vec::with_capacity(paths.len());
    for path in paths {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read media file {}", path.display()))?;
        assets.push(MediaAsset {
            data,
            content_type: content_type_for(path).map(String::from),
        });
    }
    Ok(assets)
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = if cli.verbose {
        "linkpost=debug,linkpost_core=debug,linkpost_providers=debug,linkpost_linkedin=debug,\
         linkpost_scheduler=debug,linkpost_gateway=debug,tower_http=debug"
    } else {
        "linkpost=info,linkpost_core=info,linkpost_providers=info,linkpost_linkedin=info,\
         linkpost_scheduler=info,linkpost_gateway=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_path);
    let mut config = AppConfig::load(&config_path)?;
    tracing::debug!("Loaded config from {}", config_path.display());

    match cli.command.unwrap_or(Command::Serve { port: None, host: None }) {
        Command::Serve { port, host } => {
            if let Some(port) = port {
                config.gateway.port = port;
            }
            if let Some(host) = host {
                config.gateway.host = host;
            }

            println!("📣 LinkPost v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "   Mode: {:?} | Auto-publish: {} | Storage: {}",
                config.scheduler.mode,
                config.scheduler.auto_publish,
                if config.storage.persistent { "file" } else { "memory" }
            );

            let state = AppState::from_config(&config)?;
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("❌ Failed to listen for ctrl-c: {e}");
                    std::future::pending::<()>().await;
                }
                tracing::info!("🛑 Shutdown requested");
            };
            linkpost_gateway::start(&config.gateway, state, shutdown).await?;
        }
        Command::Cycle => {
            let state = AppState::from_config(&config)?;
            let outcome = state.trigger.run_cycle().await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Post {
            topic,
            context,
            media,
            token,
            dry_run,
        } => {
            let assets = load_media(&media).await?;
            let state = AppState::from_config(&config)?;
            let style = state.store.get().await?;
            let draft = state
                .composer
                .compose(&topic, &style, context.as_deref().unwrap_or(""))
                .await?;

            if dry_run {
                println!("{}", serde_json::to_string_pretty(&draft)?);
            } else {
                tracing::info!("📤 Publishing '{}' with {} media file(s)", draft.topic, assets.len());
                let result = state
                    .publisher
                    .publish(&draft, &assets, token.as_deref())
                    .await?;
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
        }
        Command::Config => {
            let mut shown = config.clone();
            shown.openrouter.api_key = mask_secret(&shown.openrouter.api_key);
            shown.linkedin.client_secret = mask_secret(&shown.linkedin.client_secret);
            shown.linkedin.access_token = mask_secret(&shown.linkedin.access_token);
            println!("# {}", config_path.display());
            println!("{}", serde_json::to_string_pretty(&shown)?);
        }
        Command::AuthUrl { scopes } => {
            let oauth = linkpost_linkedin::LinkedInOAuth::new(&config.linkedin)?;
            let scopes: Vec<String> = match scopes {
                Some(list) => list.split(',').map(|s| s.trim().to_string()).collect(),
                None => linkpost_linkedin::POSTING_SCOPES.iter().map(|s| s.to_string()).collect(),
            };
            let state = linkpost_linkedin::generate_state();
            println!("{}", oauth.authorization_url(&scopes, &state)?);
            println!("state: {state}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(""), "");
        assert_eq!(mask_secret("abc"), "••••");
        assert_eq!(mask_secret("sk-or-12345"), "sk-o••••");
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["linkpost", "serve", "--port", "8080"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Serve { port: Some(8080), .. })));

        let cli = Cli::try_parse_from(["linkpost", "-v", "cycle"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Command::Cycle)));

        let cli = Cli::try_parse_from([
            "linkpost", "post", "--topic", "Rust", "-m", "a.png", "--media", "b.jpg",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Post { topic, media, dry_run, .. }) => {
                assert_eq!(topic, "Rust");
                assert_eq!(media, vec![PathBuf::from("a.png"), PathBuf::from("b.jpg")]);
                assert!(!dry_run);
            }
            _ => panic!("expected post subcommand"),
        }
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for(Path::new("chart.PNG")), Some("image/png"));
        assert_eq!(content_type_for(Path::new("photo.jpeg")), Some("image/jpeg"));
        assert_eq!(content_type_for(Path::new("notes.txt")), None);
        assert_eq!(content_type_for(Path::new("no_extension")), None);
    }

    #[tokio::test]
    async fn test_load_media() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("chart.png");
        std::fs::write(&image, [0x89, b'P', b'N', b'G']).unwrap();

        let assets = load_media(&[image]).await.unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].data, vec![0x89, b'P', b'N', b'G']);
        assert_eq!(assets[0].content_type.as_deref(), Some("image/png"));

        let err = load_media(&[dir.path().join("missing.png")]).await.unwrap_err();
        assert!(err.to_string().contains("missing.png"));
    }
}
