//! Orchestrator: one sequential, fail-fast pass from the source database to
//! the destination collection.
use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::model::PageRecord;
use crate::notion::{self, NotionService};
use crate::openai::DescriptionGenerator;
use crate::webflow::Publisher;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub fetched: usize,
    pub published: usize,
    /// Ids assigned by the destination, in processing order.
    pub item_ids: Vec<String>,
}

/// Collaborators for one run. `describer` is `None` when descriptions are off
/// and is ignored unless a meta description field slug is configured;
/// `publisher` is `None` for a dry run.
pub struct Services<'a> {
    pub notion: &'a dyn NotionService,
    pub describer: Option<&'a dyn DescriptionGenerator>,
    pub publisher: Option<&'a dyn Publisher>,
}

/// Fetch every ready record, then enrich and publish each in list order.
///
/// The first error from any step ends the run; records after it are not
/// attempted.
// TODO: decide whether one record's failure should stop the batch or be
// isolated and reported per record.
#[instrument(skip_all)]
pub async fn run(cfg: &Config, services: Services<'_>) -> Result<RunReport> {
    let records = notion::fetch_records(services.notion, &cfg.notion).await?;
    info!(count = records.len(), "fetched records from Notion");

    let mut report = RunReport {
        fetched: records.len(),
        ..Default::default()
    };

    // Descriptions are only generated when there is a field to send them to.
    let describer = match (services.describer, cfg.webflow.fields.meta_description.as_deref()) {
        (Some(describer), Some(_)) => Some(describer),
        (Some(_), None) => {
            info!("webflow.fields.meta_description not set; skipping description generation");
            None
        }
        (None, _) => None,
    };

    for mut record in records {
        info!(title = %record.title, "processing record");

        if let Some(describer) = describer {
            let description = describer
                .generate(&record.title, &record.body)
                .await
                .with_context(|| format!("failed to generate description for '{}'", record.title))?;
            info!(title = %record.title, %description, "generated meta description");
            record.meta_description = Some(description);
        }

        match services.publisher {
            Some(publisher) => publish_one(publisher, &record, &mut report).await?,
            None => info!(
                title = %record.title,
                body = %record.body,
                meta_description = ?record.meta_description,
                "dry run; not publishing"
            ),
        }
    }

    info!(
        fetched = report.fetched,
        published = report.published,
        "automation run complete"
    );
    Ok(report)
}

async fn publish_one(publisher: &dyn Publisher, record: &PageRecord, report: &mut RunReport) -> Result<()> {
    let item = publisher
        .publish(record)
        .await
        .with_context(|| format!("failed to publish '{}'", record.title))?;
    match item.item_id() {
        Some(id) => {
            info!(title = %record.title, item_id = %id, "created collection item");
            report.published += 1;
            report.item_ids.push(id.to_string());
        }
        None => warn!(title = %record.title, response = ?item.extra, "failed to create collection item"),
    }
    Ok(())
}
