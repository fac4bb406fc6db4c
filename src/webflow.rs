//! Publisher: turns a [`PageRecord`] into a draft item of a Webflow collection.
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};
use reqwest::{Client, Request, Url};
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

use crate::config;
use crate::http;
use crate::model::{CollectionItem, CollectionItemRequest, PageRecord};

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, record: &PageRecord) -> Result<CollectionItem>;
}

#[derive(Clone)]
pub struct WebflowClient {
    http: Client,
    base_url: Url,
    token: String,
    collection_id: String,
    fields: config::WebflowFields,
}

impl fmt::Debug for WebflowClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebflowClient")
            .field("base_url", &self.base_url)
            .field("collection_id", &self.collection_id)
            .finish_non_exhaustive()
    }
}

/// Markdown → HTML. Every source block is rendered on its own line, so a
/// single line break starts a new block: inside a paragraph it starts a new
/// paragraph, and after a quote or list item it closes that container.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let markdown = separate_containers(markdown);
    let mut in_paragraph = false;
    let mut events = Vec::new();
    for event in Parser::new_ext(&markdown, options) {
        match event {
            Event::Start(Tag::Paragraph) => {
                in_paragraph = true;
                events.push(event);
            }
            Event::End(TagEnd::Paragraph) => {
                in_paragraph = false;
                events.push(event);
            }
            Event::SoftBreak if in_paragraph => {
                events.push(Event::End(TagEnd::Paragraph));
                events.push(Event::Start(Tag::Paragraph));
            }
            other => events.push(other),
        }
    }

    let mut out = String::new();
    html::push_html(&mut out, events.into_iter());
    out.trim_end().to_string()
}

/// Put a blank line between a quote or list line and a following line that
/// opens neither, so the latter is not read as a lazy continuation.
fn separate_containers(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    let mut in_fence = false;
    let mut prev_container = false;

    for (i, line) in markdown.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if line.starts_with("```") {
            in_fence = !in_fence;
            prev_container = false;
        } else if !in_fence {
            let container = opens_container(line);
            if prev_container && !container && !line.trim().is_empty() {
                out.push('\n');
            }
            prev_container = container;
        }
        out.push_str(line);
    }
    out
}

fn opens_container(line: &str) -> bool {
    line == ">" || line.starts_with("> ") || line.starts_with("- ") || line.starts_with("1. ")
}

/// Draft, unarchived item carrying the title, HTML body and any optional
/// fields that have both a configured slug and a value.
pub fn build_item_request(record: &PageRecord, fields: &config::WebflowFields) -> CollectionItemRequest {
    let mut field_data = Map::new();
    field_data.insert("name".into(), Value::String(record.title.clone()));
    field_data.insert(fields.body.clone(), Value::String(markdown_to_html(&record.body)));

    let optional = [
        (&fields.meta_description, &record.meta_description),
        (&fields.short_description, &record.short_description),
        (&fields.featured_sentence, &record.featured_sentence),
    ];
    for (slug, value) in optional {
        if let (Some(slug), Some(value)) = (slug, value) {
            field_data.insert(slug.clone(), Value::String(value.clone()));
        }
    }

    CollectionItemRequest {
        is_archived: false,
        is_draft: true,
        field_data,
    }
}

/// Message the destination reported in an error envelope.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("msg")
                .or_else(|| v.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| "Unknown error".to_string())
}

impl WebflowClient {
    pub fn from_config(cfg: &config::Webflow) -> Result<Self> {
        Ok(Self {
            http: http::build_client()?,
            base_url: http::parse_base_url(&cfg.base_url)?,
            token: cfg.token.clone(),
            collection_id: cfg.collection_id.clone(),
            fields: cfg.fields.clone(),
        })
    }

    pub fn build_request(&self, item: &CollectionItemRequest) -> Result<Request> {
        let endpoint = self
            .base_url
            .join(&format!("v2/collections/{}/items", self.collection_id))
            .context("invalid Webflow base URL")?;
        self.http
            .post(endpoint)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.token))
            .json(item)
            .build()
            .context("failed to build Webflow request")
    }
}

#[async_trait]
impl Publisher for WebflowClient {
    async fn publish(&self, record: &PageRecord) -> Result<CollectionItem> {
        let item = build_item_request(record, &self.fields);
        let request = self.build_request(&item)?;
        http::log_request("webflow", &request);

        let res = self
            .http
            .execute(request)
            .await
            .context("failed to reach Webflow")?;
        let status = res.status();
        let body = res.text().await.context("failed to read Webflow response")?;

        if !status.is_success() {
            warn!("Webflow API error - Status: {}, Body: {}", status, body);
            return Err(anyhow!(
                "error creating Webflow collection item: {}",
                error_message(&body)
            ));
        }

        serde_json::from_str(&body).context("invalid Webflow response JSON")
    }
}
