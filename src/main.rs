use clap::{Args, Parser, Subcommand};
use errwatch::config::{resolve_config_path, Overrides};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "errwatch")]
#[command(about = "Forwards new error logs from Elasticsearch to Slack", long_about = None)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Required settings that may be given instead of (or on top of) the config file.
#[derive(Args)]
struct Settings {
    /// Base address of the search backend
    #[arg(long, global = true)]
    elastic_search_domain: Option<String>,

    /// Slack channel that receives log uploads
    #[arg(long, global = true)]
    slack_channel: Option<String>,

    /// Slack incoming webhook path
    #[arg(long, global = true)]
    slack_channel_web_hook_url: Option<String>,

    /// Slack bot token used for uploads
    #[arg(long, global = true)]
    slack_bot_token: Option<String>,
}

impl From<Settings> for Overrides {
    fn from(settings: Settings) -> Self {
        Overrides {
            search_url: settings.elastic_search_domain,
            slack_channel: settings.slack_channel,
            slack_webhook: settings.slack_channel_web_hook_url,
            slack_bot_token: settings.slack_bot_token,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    Run,
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Init {
        #[arg(long)]
        stdout: bool,
    },
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "errwatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config.as_deref());
    let overrides = Overrides::from(cli.settings);

    match cli.command {
        Some(Commands::Run) | None => {
            errwatch::cli::run::run(config_path, overrides).await?;
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { stdout } => {
                errwatch::cli::config::init(stdout)?;
            }
            ConfigAction::Validate => {
                errwatch::cli::config::validate(config_path, &overrides)?;
            }
        },
    }

    Ok(())
}
