use clap::{Parser, Subcommand};
use colored::*;
use popart::client::{Notifier, Orchestrator, SubmitError, EXAMPLE_PROMPTS};
use popart::{Config, FileStorage, HttpProxyClient, LocalHistoryStore};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "popart", version, about = "Pop-art image generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the generate/upload proxy server
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Generate an image, upload it, and record it in history
    Generate {
        #[arg(required = true)]
        prompt: Vec<String>,
    },
    /// List saved generations, newest first
    History,
    /// Forget every saved generation
    Clear,
    /// Save a generation's image to disk
    Download {
        id: String,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Print prompt ideas
    Examples,
}

struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn alert(&self, message: &str) {
        eprintln!("{}", message.red().bold());
    }
}

fn orchestrator(config: &Config) -> Orchestrator {
    let storage = Arc::new(FileStorage::new(config.client.data_dir.clone()));
    let history = LocalHistoryStore::open(storage);
    let api = HttpProxyClient::new(config.client.proxy_base_url.clone());
    Orchestrator::new(Arc::new(api), Box::new(history)).with_notifier(Arc::new(ConsoleNotifier))
}

#[cfg(feature = "server")]
async fn serve(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    popart::server::run(config).await?;
    Ok(())
}

#[cfg(not(feature = "server"))]
async fn serve(_config: Config) -> Result<(), Box<dyn std::error::Error>> {
    Err("popart was built without the `server` feature".into())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    popart::logger::init_with_config(popart::logger::LoggerConfig::from_env())?;
    if !dotenv_loaded {
        log::debug!("No .env file found, using process environment");
    }

    let cli = Cli::parse();
    let mut config = Config::from_env();

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config = config.with_host(host);
            }
            if let Some(port) = port {
                config = config.with_port(port);
            }
            serve(config).await?;
        }
        Command::Generate { prompt } => {
            let app = orchestrator(&config);
            app.set_prompt(prompt.join(" "));
            match app.submit().await {
                Ok(image) => {
                    println!("{}", image.image_url.bright_cyan());
                    println!("{} {}", "id:".bright_black(), image.id);
                }
                Err(SubmitError::EmptyPrompt) => {
                    eprintln!("{}", "Type a prompt first.".yellow());
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::History => {
            let app = orchestrator(&config);
            let entries = app.history();
            if entries.is_empty() {
                println!("{}", "No generations yet.".bright_black());
            }
            for image in entries {
                let when = chrono::DateTime::<chrono::Utc>::from_timestamp_millis(image.timestamp)
                    .map(|t| t.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                println!(
                    "{}  {}  \"{}\"\n    {}",
                    image.id.bright_black(),
                    when,
                    image.prompt.yellow(),
                    image.image_url
                );
            }
        }
        Command::Clear => {
            orchestrator(&config).clear_history()?;
            println!("History cleared.");
        }
        Command::Download { id, out } => {
            let app = orchestrator(&config);
            let image = app
                .find(&id)
                .ok_or_else(|| format!("No generation with id {}", id))?;
            let path = popart::client::download_image(&reqwest::Client::new(), &image, &out).await?;
            println!("{}", path.display());
        }
        Command::Examples => {
            for example in EXAMPLE_PROMPTS {
                println!("\"{}\"", example.bright_magenta());
            }
        }
    }

    Ok(())
}
