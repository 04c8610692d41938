use clap::{Parser, Subcommand};
use lib::chat::ChatSession;
use lib::client::RelayClient;

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "Parley CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config file. Fill in
    /// upstream.agentId and upstream.credential (or PARLEY_AGENT_KEY) before
    /// running the relay.
    Init {
        /// Config file path (default: PARLEY_CONFIG_PATH or ~/.parley/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Run the relay (HTTP front door for the hosted agent API).
    Relay {
        /// Config file path (default: PARLEY_CONFIG_PATH or ~/.parley/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from config or 7878)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Chat with the agent through the relay (interactive).
    Chat {
        /// Config file path (default: PARLEY_CONFIG_PATH or ~/.parley/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// Relay base URL (default from config, e.g. http://127.0.0.1:7878)
        #[arg(long, value_name = "URL")]
        relay: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("parley {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Relay { config, port }) => {
            if let Err(e) = run_relay(config, port).await {
                log::error!("relay failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Chat { config, relay }) => {
            if let Err(e) = run_chat(config, relay).await {
                log::error!("chat failed: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(lib::config::default_config_path);
    let dir = lib::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_relay(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let (mut config, _path) = lib::config::load_config(config_path)?;
    if let Some(p) = port {
        config.relay.port = p;
    }
    log::info!("starting relay on {}:{}", config.relay.bind, config.relay.port);
    lib::relay::run_relay(config).await
}

async fn run_chat(
    config_path: Option<std::path::PathBuf>,
    relay: Option<String>,
) -> anyhow::Result<()> {
    use std::io::{self, Write};

    let (config, _) = lib::config::load_config(config_path)?;
    let relay_url = relay.unwrap_or_else(|| lib::config::resolve_relay_url(&config));
    let client = RelayClient::new(&relay_url, config.upstream.timeout_secs);
    let mut session = ChatSession::new(config.chat.suggestions.clone());

    println!("{}", config.chat.welcome);
    print_suggestions(&session);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("/exit") || input.eq_ignore_ascii_case("/quit") {
            break;
        }

        // A bare number picks the matching suggestion while they are offered.
        let turn = match input.parse::<usize>() {
            Ok(n) if n >= 1 => session
                .submit_suggestion(n - 1)
                .or_else(|| session.submit(input)),
            _ => session.submit(input),
        };
        let Some(turn) = turn else {
            continue;
        };
        println!("…");

        match client.send(&turn.message).await {
            Ok(envelope) => {
                if let Some(msg) = session.reply_received(&turn, &envelope) {
                    println!("< {}", msg.content.trim());
                }
            }
            Err(e) => {
                log::debug!("chat turn failed: {}", e);
                if let Some(msg) = session.reply_failed(&turn) {
                    println!("< {}", msg.content);
                }
            }
        }
    }

    session.cancel_pending();
    Ok(())
}

fn print_suggestions(session: &ChatSession) {
    let suggestions = session.suggestions();
    if suggestions.is_empty() {
        return;
    }
    println!("Try asking (enter a number, or type your own question):");
    for (i, q) in suggestions.iter().enumerate() {
        println!("  {}. {}", i + 1, q);
    }
}
