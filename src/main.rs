//! LifeLens 命令行入口
//!
//! 初始化日志、加载配置，按子命令调用门面。

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use lifelens::config::{load_config, AppConfig};
use lifelens::{LifeLens, LlmResult};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "lifelens", about = "Turn free-form text into a biography and timeline")]
struct Cli {
    /// 额外的 TOML 配置文件
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a biography from text, a file, or a website
    Generate {
        #[arg(long, conflicts_with_all = ["file", "url"])]
        text: Option<String>,
        #[arg(long, conflicts_with = "url")]
        file: Option<PathBuf>,
        #[arg(long)]
        url: Option<String>,
        /// Add to the accumulated life story instead of replacing the current biography
        #[arg(long, conflicts_with = "url")]
        append: bool,
    },
    /// Show the current biography
    Show {
        /// Show the accumulated life story instead
        #[arg(long)]
        life_story: bool,
    },
    /// List saved biographies
    List,
    /// Save the current biography under a name
    Save { name: String },
    /// Load a saved biography by id
    Load { id: String },
    /// Delete a saved biography by id
    Delete {
        id: String,
        #[arg(long)]
        yes: bool,
    },
    /// Clear the current biography
    Clear {
        #[arg(long)]
        yes: bool,
    },
    /// Check whether the crawler backend is available
    Health,
}

fn print_story(story: &LlmResult) {
    println!("{}", story.bio);
    if !story.timeline.is_empty() {
        println!();
        for event in &story.timeline {
            println!("{:>10}  {}", event.date, event.title);
            if !event.description.is_empty() {
                println!("{:>10}  {}", "", event.description);
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 日志：默认 info，可通过 RUST_LOG 覆盖
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let cfg = load_config(cli.config.clone()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default().apply_env_fallbacks()
    });
    let mut app = LifeLens::from_config(&cfg).context("Failed to open storage")?;

    match cli.command {
        Commands::Generate {
            text,
            file,
            url,
            append,
        } => {
            if let Some(url) = url {
                print_story(app.submit_url(&url).await?);
                return Ok(());
            }
            let input = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => anyhow::bail!("one of --text, --file or --url is required"),
            };
            if append {
                print_story(&app.add_to_life_story(&input).await?);
            } else {
                print_story(app.submit_text(&input).await?);
            }
        }
        Commands::Show { life_story } => {
            if life_story {
                print_story(&app.store().life_story()?);
            } else {
                match app.store().current() {
                    Some(current) => print_story(current),
                    None => println!("No biography yet. Generate one first!"),
                }
            }
        }
        Commands::List => {
            let saved = app.store().summaries()?;
            if saved.is_empty() {
                println!("No saved biographies yet");
            }
            for s in saved {
                println!("{}  {}  {}", s.id, s.last_updated.format("%Y-%m-%d"), s.name);
            }
        }
        Commands::Save { name } => match app.store().save_current(&name)? {
            Some(saved) => println!("Saved {} ({})", saved.name, saved.id),
            None => println!("Nothing saved: a name and a current biography are required"),
        },
        Commands::Load { id } => match app.store_mut().load(&id)? {
            Some(current) => print_story(current),
            None => println!("No saved biography with id {}", id),
        },
        Commands::Delete { id, yes } => {
            if !yes {
                anyhow::bail!("refusing to delete without --yes");
            }
            if !app.store().delete(&id)? {
                println!("No saved biography with id {}", id);
            }
        }
        Commands::Clear { yes } => {
            if !yes {
                anyhow::bail!("refusing to clear without --yes");
            }
            app.store_mut().clear_current()?;
        }
        Commands::Health => {
            let available = app.crawler().is_available().await;
            println!(
                "crawler at {}: {}",
                app.crawler().base_url(),
                if available { "available" } else { "unavailable" }
            );
        }
    }

    Ok(())
}
