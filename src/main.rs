use std::path::PathBuf;

use clap::{
    CommandFactory, Parser,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use txttoytmusic::{
    cli::{self, DEFAULT_AUTH_FILE, DEFAULT_INPUT_FILE, Overrides},
    config::{self, Settings},
    error, info,
    prompt::Console,
    success,
    types::Privacy,
    warning,
    ytmusic::YtMusicConnector,
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
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Path to the input file containing song queries
    #[clap(short, long, default_value = DEFAULT_INPUT_FILE)]
    file: PathBuf,

    /// Playlist title (default: auto-generated with timestamp)
    #[clap(short, long)]
    title: Option<String>,

    /// Playlist description (default: same as title)
    #[clap(short, long)]
    description: Option<String>,

    /// Playlist privacy setting (default: will prompt)
    #[clap(short, long, value_enum)]
    privacy: Option<Privacy>,

    /// Allow duplicate songs in the playlist
    #[clap(long)]
    duplicates: bool,

    /// Path to the authentication headers file
    #[clap(long, default_value = DEFAULT_AUTH_FILE)]
    auth: PathBuf,

    /// Never prompt; use provided arguments or defaults
    #[clap(long)]
    non_interactive: bool,

    /// Print shell completions and exit
    #[clap(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            file: self.file.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            privacy: self.privacy,
            duplicates: self.duplicates,
            auth: self.auth.clone(),
            non_interactive: self.non_interactive,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = config::load_env() {
        warning!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => error!("{}", e),
    };

    info!("Starting TxtToYoutubeMusic");
    let connector = YtMusicConnector::from_env();
    let mut console = Console::stdio();

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    match cli::run_until(&cli.overrides(), &connector, &mut console, &settings, shutdown).await {
        Ok(report) => success!(
            "TxtToYoutubeMusic execution completed successfully. Playlist ID: {}",
            report.playlist_id.as_deref().unwrap_or("-")
        ),
        Err(e) => error!("{}", e),
    }
}
