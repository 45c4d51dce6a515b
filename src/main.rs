use bucket_thumbnails::config::{self, PipelineConfig};
use bucket_thumbnails::lambda;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bucket-thumbnails")]
#[command(about = "Event-driven thumbnail pipeline")]
#[command(long_about = "\
Event-driven thumbnail pipeline

Two functions share one binary:

  notifier     storage \"object created\" event → {\"Bucket\",\"Key\"} on the topic
  thumbnailer  topic message → PNG thumbnail at <prefix>/<name>.png

Settings come from environment variables (SNS_TOPIC_ARN, THUMBNAIL_BUCKET,
THUMBNAIL_PREFIX, ...), then the optional --config file, then defaults.

Run 'bucket-thumbnails gen-config' to print a documented config file.")]
#[command(version)]
struct Cli {
    /// TOML config file (environment variables take precedence)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Relay storage events to the topic
    Notifier,
    /// Turn topic messages into stored thumbnails
    Thumbnailer,
    /// Print a stock config file with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    let cli = Cli::parse();

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            Ok(())
        }
        Command::Notifier => {
            let config = PipelineConfig::load(cli.config.as_deref())?;
            lambda::init_tracing(&config.logging.level);
            lambda::run_notifier(&config).await
        }
        Command::Thumbnailer => {
            let config = PipelineConfig::load(cli.config.as_deref())?;
            lambda::init_tracing(&config.logging.level);
            lambda::run_thumbnailer(&config).await
        }
    }
}
