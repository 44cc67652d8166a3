use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use matchday_bot::{
    AllowAll, AllowList, BotConfig, CareerService, ConsoleSink, Incoming, MemoryPlayerStore,
    ServiceSettings, SubscriptionOracle,
};
use matchday_game::{CareerEngine, ClubDirectory};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Parser)]
#[command(name = "matchday-bot", version)]
#[command(about = "Play a Matchday football career from the terminal")]
struct Args {
    /// JSON config file (locale, pauses, admins, league and match tuning)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Message language (en, ru)
    #[arg(long)]
    locale: Option<String>,

    /// Seed for match randomness
    #[arg(long)]
    seed: Option<u64>,

    /// User id the console speaks as
    #[arg(long, default_value_t = 1)]
    user: u64,

    /// Pause between match messages in milliseconds
    #[arg(long)]
    pause_ms: Option<u64>,

    /// Directory with match illustrations
    #[arg(long)]
    images: Option<PathBuf>,

    /// JSON file to keep players in between runs
    #[arg(long)]
    data: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<BotConfig> {
    let mut config = match &args.config {
        Some(path) => BotConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => BotConfig::default(),
    };
    if let Some(locale) = &args.locale {
        config.locale.clone_from(locale);
    }
    if let Some(pause_ms) = args.pause_ms {
        config.pause_ms = pause_ms;
    }
    if args.images.is_some() {
        config.image_root.clone_from(&args.images);
    }
    if args.data.is_some() {
        config.data_file.clone_from(&args.data);
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn announce_banner(user: u64) {
    println!("{}", "⚽ Matchday".bright_green().bold());
    println!("{}", "==========".green());
    println!(
        "{}",
        format!(
            "Speaking as user {user}. /start to begin, !<data> presses a button, /user <id> switches user, /quit exits."
        )
        .dimmed()
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    let engine = CareerEngine::new(config.career.clone(), ClubDirectory::default())
        .context("building the career engine")?;
    let store = match &config.data_file {
        Some(path) => MemoryPlayerStore::open(path)
            .await
            .with_context(|| format!("opening player file {}", path.display()))?,
        None => MemoryPlayerStore::new(),
    };
    let oracle: Arc<dyn SubscriptionOracle> = match &config.subscribers {
        Some(subscribers) => Arc::new(AllowList::new(subscribers.iter().copied())),
        None => Arc::new(AllowAll),
    };
    let seed = config.seed.unwrap_or_else(rand::random::<u64>);
    log::info!("match randomness seeded with {seed}");
    let service = CareerService::new(
        engine,
        store,
        ConsoleSink::new(config.image_root.clone()),
        oracle,
        ServiceSettings::from_config(&config, seed),
    );

    let mut user = args.user;
    announce_banner(user);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let trimmed = line.trim();
        if trimmed == "/quit" {
            break;
        }
        if let Some(id) = trimmed.strip_prefix("/user ") {
            match id.trim().parse() {
                Ok(id) => {
                    user = id;
                    println!("{}", format!("Now speaking as user {user}").dimmed());
                }
                Err(_) => println!("{}", "Usage: /user <id>".red()),
            }
            continue;
        }
        let Some(incoming) = Incoming::parse(trimmed, service.sink().last_keyboard_message())
        else {
            continue;
        };
        if let Err(err) = service.handle(user, incoming).await {
            log::debug!("request failed: {err}");
        }
    }
    Ok(())
}
