#![allow(dead_code)]

use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;

use notion2webflow::config::Config;
use notion2webflow::notion::model::{Block, BlockChildren, PageObject};
use notion2webflow::notion::NotionService;

/// Scripted stand-in for the Notion API that records every call.
#[derive(Clone, Default)]
pub struct RecordingNotion {
    pages: Arc<Mutex<Option<Result<Vec<PageObject>>>>>,
    children: Arc<Mutex<HashMap<String, VecDeque<Result<BlockChildren>>>>>,
    queries: Arc<Mutex<Vec<(String, Value)>>>,
    child_calls: Arc<Mutex<Vec<(String, Option<String>)>>>,
}

impl RecordingNotion {
    pub fn with_pages(pages: Vec<PageObject>) -> Self {
        Self {
            pages: Arc::new(Mutex::new(Some(Ok(pages)))),
            ..Default::default()
        }
    }

    pub fn failing_query(message: &str) -> Self {
        Self {
            pages: Arc::new(Mutex::new(Some(Err(anyhow!(message.to_string()))))),
            ..Default::default()
        }
    }

    /// Queue one page of children for `block_id`.
    pub async fn push_children(&self, block_id: &str, blocks: Vec<Block>, next_cursor: Option<&str>) {
        let page = BlockChildren {
            results: blocks,
            has_more: next_cursor.is_some(),
            next_cursor: next_cursor.map(str::to_string),
        };
        self.push_children_result(block_id, Ok(page)).await;
    }

    pub async fn push_children_result(&self, block_id: &str, page: Result<BlockChildren>) {
        self.children
            .lock()
            .await
            .entry(block_id.to_string())
            .or_default()
            .push_back(page);
    }

    pub async fn queries(&self) -> Vec<(String, Value)> {
        self.queries.lock().await.clone()
    }

    pub async fn child_calls(&self) -> Vec<(String, Option<String>)> {
        self.child_calls.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl NotionService for RecordingNotion {
    async fn query_database(&self, database_id: &str, query: &Value) -> Result<Vec<PageObject>> {
        self.queries
            .lock()
            .await
            .push((database_id.to_string(), query.clone()));
        match self.pages.lock().await.take() {
            Some(res) => res,
            None => Ok(Vec::new()),
        }
    }

    async fn block_children(&self, block_id: &str, start_cursor: Option<&str>) -> Result<BlockChildren> {
        self.child_calls
            .lock()
            .await
            .push((block_id.to_string(), start_cursor.map(str::to_string)));
        let mut guard = self.children.lock().await;
        guard
            .get_mut(block_id)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Ok(BlockChildren {
                    results: Vec::new(),
                    has_more: false,
                    next_cursor: None,
                })
            })
    }
}

pub fn paragraph(id: &str, text: &str) -> Block {
    serde_json::from_value(json!({
        "object": "block",
        "id": id,
        "type": "paragraph",
        "has_children": false,
        "paragraph": {
            "rich_text": [ { "type": "text", "text": { "content": text, "link": null }, "plain_text": text } ]
        }
    }))
    .unwrap()
}

pub fn page(id: &str, title: Option<&str>) -> PageObject {
    let properties = match title {
        Some(t) => json!({
            "Name": { "id": "title", "type": "title", "title": [ { "type": "text", "plain_text": t } ] },
            "Status": { "type": "status", "status": { "name": "Ready for Webflow" } }
        }),
        None => json!({ "Status": { "type": "status", "status": { "name": "Ready for Webflow" } } }),
    };
    serde_json::from_value(json!({ "object": "page", "id": id, "properties": properties })).unwrap()
}

/// Valid configuration pointing the HTTP clients at local mock servers.
pub fn test_config(openai_uri: &str, webflow_uri: &str) -> Config {
    let mut cfg = Config::default();
    cfg.notion.token = "secret_notion".into();
    cfg.notion.database_id = "db-1".into();
    cfg.openai.api_key = "sk-test".into();
    cfg.openai.base_url = openai_uri.to_string();
    cfg.webflow.token = "wf-token".into();
    cfg.webflow.collection_id = "col-1".into();
    cfg.webflow.base_url = webflow_uri.to_string();
    notion2webflow::config::validate(&cfg).unwrap();
    cfg
}
