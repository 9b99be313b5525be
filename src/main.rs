use std::sync::Arc;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tokio::sync::Mutex;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use seedlist::{
    api::DEFAULT_LIMIT,
    cli::{self, RecommendOptions},
    config, error,
    types::PkceToken,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Collect and store a listening profile
    Collect(UserOption),

    /// Show a stored listening profile
    Profile(UserOption),

    /// Recommend tracks from seed tracks or a stored profile
    Recommend(RecommendArgs),

    /// Serve the recommendation HTTP API
    Serve,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct UserOption {
    /// Spotify user id; defaults to the authorized account
    #[clap(long)]
    user: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct RecommendArgs {
    /// Input track (id, spotify:track: uri or link); can be repeated
    #[clap(long = "track", num_args = 1)]
    tracks: Vec<String>,

    /// Use the stored profile of this user (`me` for the authorized account)
    #[clap(long)]
    user: Option<String>,

    /// Number of recommendations
    #[clap(long, default_value_t = DEFAULT_LIMIT)]
    limit: usize,

    /// Save the result as a private playlist with this name
    #[clap(long)]
    playlist: Option<String>,

    /// Print the full result as JSON
    #[clap(long)]
    json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("seedlist=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth => {
            let oauth_result: Arc<Mutex<Option<PkceToken>>> = Arc::new(Mutex::new(None));
            cli::auth(Arc::clone(&oauth_result)).await;
        }
        Command::Collect(opt) => cli::collect(opt.user).await,
        Command::Profile(opt) => cli::show_profile(opt.user).await,
        Command::Recommend(opt) => {
            cli::recommend(RecommendOptions {
                tracks: opt.tracks,
                user: opt.user,
                limit: opt.limit,
                playlist: opt.playlist,
                json: opt.json,
            })
            .await
        }
        Command::Serve => cli::serve().await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
