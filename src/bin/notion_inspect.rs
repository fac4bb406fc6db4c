use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use notion2webflow::config;
use notion2webflow::notion::{self, NotionClient};
use notion2webflow::webflow::markdown_to_html;

/// Print the Markdown one Notion page renders to.
#[derive(Parser, Debug)]
struct Args {
    /// Path to YAML config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Page (or block) ID to render
    #[arg(long)]
    page_id: String,

    /// Also print the HTML that would be published
    #[arg(long)]
    html: bool,
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
    let client = NotionClient::from_config(&cfg.notion)?;

    let body = notion::fetch_page_body(&client, &args.page_id).await?;
    println!("{}", body);
    if args.html {
        println!("\n--- HTML ---\n{}", markdown_to_html(&body));
    }
    Ok(())
}
