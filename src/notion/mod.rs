//! Source reader: queries the Notion database for rows ready to publish and
//! flattens each row's block tree into a Markdown [`PageRecord`].
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Request, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::fmt;
use tracing::{debug, info, warn};

use crate::config;
use crate::http;
use crate::model::PageRecord;
use crate::notion::model::{Block, BlockChildren, BlockKind, PageObject, QueryResponse};
use crate::render;

pub mod model;

#[derive(Clone)]
pub struct NotionClient {
    http: Client,
    base_url: Url,
    token: String,
    version: String,
}

impl fmt::Debug for NotionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotionClient")
            .field("base_url", &self.base_url)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

/// The two source API calls the reader depends on.
#[async_trait]
pub trait NotionService: Send + Sync {
    /// Rows of `database_id` selected by the `query` body. Single request.
    async fn query_database(&self, database_id: &str, query: &Value) -> Result<Vec<PageObject>>;

    /// One page of `block_id`'s direct children, starting at `start_cursor`.
    async fn block_children(&self, block_id: &str, start_cursor: Option<&str>) -> Result<BlockChildren>;
}

impl NotionClient {
    pub fn new(base_url: &str, token: String, version: String) -> Result<Self> {
        Ok(Self {
            http: http::build_client()?,
            base_url: http::parse_base_url(base_url)?,
            token,
            version,
        })
    }

    pub fn from_config(cfg: &config::Notion) -> Result<Self> {
        Self::new(&cfg.base_url, cfg.token.clone(), cfg.version.clone())
    }

    pub fn build_query_request(&self, database_id: &str, body: &Value) -> Result<Request> {
        let endpoint = self
            .base_url
            .join(&format!("v1/databases/{}/query", database_id))
            .context("invalid Notion base URL")?;
        self.http
            .post(endpoint)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Notion-Version", &self.version)
            .header("Content-Type", "application/json")
            .json(body)
            .build()
            .context("failed to build Notion query request")
    }

    pub fn build_children_request(&self, block_id: &str, start_cursor: Option<&str>) -> Result<Request> {
        let endpoint = self
            .base_url
            .join(&format!("v1/blocks/{}/children", block_id))
            .context("invalid Notion base URL")?;
        let mut builder = self
            .http
            .get(endpoint)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Notion-Version", &self.version);
        if let Some(cursor) = start_cursor {
            builder = builder.query(&[("start_cursor", cursor)]);
        }
        builder.build().context("failed to build Notion children request")
    }

    async fn execute<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        http::log_request("notion", &request);
        let res = self
            .http
            .execute(request)
            .await
            .context("failed to reach Notion")?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            warn!("Notion API error - Status: {}, Body: {}", status, body);
            return Err(anyhow!("notion error {}: {}", status, body));
        }

        res.json::<T>().await.context("invalid Notion response")
    }
}

#[async_trait]
impl NotionService for NotionClient {
    async fn query_database(&self, database_id: &str, query: &Value) -> Result<Vec<PageObject>> {
        let request = self.build_query_request(database_id, query)?;
        let payload: QueryResponse = self.execute(request).await?;
        if payload.has_more {
            debug!(database_id, "query reported more rows; only the first page is processed");
        }
        Ok(payload.results)
    }

    async fn block_children(&self, block_id: &str, start_cursor: Option<&str>) -> Result<BlockChildren> {
        let request = self.build_children_request(block_id, start_cursor)?;
        self.execute(request).await
    }
}

/// Query body selecting rows whose status property equals `value`.
pub fn status_filter(property: &str, value: &str) -> Value {
    json!({
        "filter": {
            "property": property,
            "status": { "equals": value }
        }
    })
}

/// Collect every direct child of `block_id`, following cursors until the
/// source reports no further pages.
pub async fn fetch_block_list(notion: &dyn NotionService, block_id: &str) -> Result<Vec<Block>> {
    let mut blocks = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = notion
            .block_children(block_id, cursor.as_deref())
            .await
            .with_context(|| format!("failed to fetch children of block {}", block_id))?;
        blocks.extend(page.results);
        if !page.has_more {
            break;
        }
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => bail!("block {} reported more children without a cursor", block_id),
        }
    }

    Ok(blocks)
}

/// Fetch a page's blocks and attach rows to any table blocks, which the
/// children endpoint does not inline.
pub async fn fetch_all_blocks(notion: &dyn NotionService, block_id: &str) -> Result<Vec<Block>> {
    let mut blocks = fetch_block_list(notion, block_id).await?;
    for block in blocks.iter_mut() {
        if let BlockKind::Table(table) = &mut block.kind {
            if block.has_children && table.children.is_empty() {
                table.children = fetch_block_list(notion, &block.id).await?;
            }
        }
    }
    Ok(blocks)
}

/// Rendered Markdown body of one page.
pub async fn fetch_page_body(notion: &dyn NotionService, page_id: &str) -> Result<String> {
    let blocks = fetch_all_blocks(notion, page_id).await?;
    Ok(render::render_blocks(&blocks))
}

/// Query rows in the publish-ready state and build one record per row, in
/// the order the source returned them.
pub async fn fetch_records(notion: &dyn NotionService, cfg: &config::Notion) -> Result<Vec<PageRecord>> {
    let query = status_filter(&cfg.properties.status, &cfg.status_value);
    let pages = notion
        .query_database(&cfg.database_id, &query)
        .await
        .context("failed to query Notion database")?;
    info!(count = pages.len(), status = %cfg.status_value, "queried Notion database");

    let mut records = Vec::with_capacity(pages.len());
    for page in pages {
        let body = fetch_page_body(notion, &page.id).await?;
        let title = page.title(&cfg.properties.title);

        let short_description = cfg
            .properties
            .short_description
            .as_deref()
            .and_then(|p| page.rich_text_property(p));
        let featured_sentence = cfg
            .properties
            .featured_sentence
            .as_deref()
            .and_then(|p| page.rich_text_property(p));

        info!(page_id = %page.id, %title, body = %preview(&body, 100), "fetched page");
        records.push(PageRecord {
            title,
            body,
            meta_description: None,
            short_description,
            featured_sentence,
        });
    }

    Ok(records)
}

fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
