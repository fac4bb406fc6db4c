use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use notion2webflow::config;
use notion2webflow::notion::NotionClient;
use notion2webflow::openai::{DescriptionGenerator, OpenAiClient};
use notion2webflow::pipeline::{self, Services};
use notion2webflow::webflow::{Publisher, WebflowClient};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Publish Notion pages marked ready as draft Webflow collection items"
)]
struct Args {
    /// Path to YAML config file (defaults to ./config.yaml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Do not generate meta descriptions, regardless of config
    #[arg(long)]
    skip_descriptions: bool,

    /// Fetch and render records without publishing them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(args.config.as_deref())?;

    let notion = NotionClient::from_config(&cfg.notion)?;
    let openai = OpenAiClient::from_config(&cfg.openai)?;
    let webflow = WebflowClient::from_config(&cfg.webflow)?;

    let describe = cfg.pipeline.generate_meta_description && !args.skip_descriptions;
    let services = Services {
        notion: &notion,
        describer: describe.then_some(&openai as &dyn DescriptionGenerator),
        publisher: (!args.dry_run).then_some(&webflow as &dyn Publisher),
    };

    info!(describe, dry_run = args.dry_run, "starting automation run");
    if let Err(err) = pipeline::run(&cfg, services).await {
        error!(?err, "error running the automation");
        std::process::exit(1);
    }
    Ok(())
}
