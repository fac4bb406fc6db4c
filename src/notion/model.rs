//! Wire types for the parts of the Notion API the reader consumes.
use serde::Deserialize;
use serde_json::{Map, Value};

/// One content block. The variant payload lives under a key named after the
/// block's `type`, so decoding goes through [`RawBlock`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawBlock")]
pub struct Block {
    pub id: String,
    pub has_children: bool,
    pub kind: BlockKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    Paragraph(TextBlock),
    Heading1(TextBlock),
    Heading2(TextBlock),
    Heading3(TextBlock),
    BulletedListItem(TextBlock),
    NumberedListItem(TextBlock),
    ToDo(ToDoBlock),
    Code(CodeBlock),
    Image(FileObject),
    Quote(TextBlock),
    Callout(TextBlock),
    Divider,
    Table(TableBlock),
    TableRow(TableRow),
    Bookmark(BookmarkBlock),
    /// Any tag outside the known set; keeps the tag for display.
    Unsupported(String),
}

impl BlockKind {
    /// The wire tag of this variant.
    pub fn tag(&self) -> &str {
        match self {
            BlockKind::Paragraph(_) => "paragraph",
            BlockKind::Heading1(_) => "heading_1",
            BlockKind::Heading2(_) => "heading_2",
            BlockKind::Heading3(_) => "heading_3",
            BlockKind::BulletedListItem(_) => "bulleted_list_item",
            BlockKind::NumberedListItem(_) => "numbered_list_item",
            BlockKind::ToDo(_) => "to_do",
            BlockKind::Code(_) => "code",
            BlockKind::Image(_) => "image",
            BlockKind::Quote(_) => "quote",
            BlockKind::Callout(_) => "callout",
            BlockKind::Divider => "divider",
            BlockKind::Table(_) => "table",
            BlockKind::TableRow(_) => "table_row",
            BlockKind::Bookmark(_) => "bookmark",
            BlockKind::Unsupported(tag) => tag,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ToDoBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CodeBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub language: String,
}

/// Rows are not inlined by the children endpoint; the reader attaches them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TableBlock {
    #[serde(default)]
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TableRow {
    /// One rich-text sequence per cell.
    #[serde(default)]
    pub cells: Vec<Vec<RichText>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BookmarkBlock {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileObject {
    External { external: FileUrl },
    File { file: FileUrl },
}

impl FileObject {
    pub fn url(&self) -> &str {
        match self {
            FileObject::External { external } => &external.url,
            FileObject::File { file } => &file.url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileUrl {
    pub url: String,
}

/// One run of a rich-text sequence. Only `text` runs carry content we render.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RichText {
    Text { text: TextContent },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TextContent {
    pub content: String,
    #[serde(default)]
    pub link: Option<Link>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Link {
    pub url: String,
}

impl RichText {
    pub fn plain(content: impl Into<String>) -> Self {
        RichText::Text {
            text: TextContent {
                content: content.into(),
                link: None,
            },
        }
    }

    pub fn link(content: impl Into<String>, url: impl Into<String>) -> Self {
        RichText::Text {
            text: TextContent {
                content: content.into(),
                link: Some(Link { url: url.into() }),
            },
        }
    }
}

#[derive(Deserialize)]
struct RawBlock {
    #[serde(default)]
    id: String,
    #[serde(rename = "type")]
    typ: String,
    #[serde(default)]
    has_children: bool,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl TryFrom<RawBlock> for Block {
    type Error = serde_json::Error;

    fn try_from(mut raw: RawBlock) -> Result<Self, Self::Error> {
        let payload = raw.rest.remove(&raw.typ).unwrap_or(Value::Null);
        let kind = match raw.typ.as_str() {
            "paragraph" => BlockKind::Paragraph(serde_json::from_value(payload)?),
            "heading_1" => BlockKind::Heading1(serde_json::from_value(payload)?),
            "heading_2" => BlockKind::Heading2(serde_json::from_value(payload)?),
            "heading_3" => BlockKind::Heading3(serde_json::from_value(payload)?),
            "bulleted_list_item" => BlockKind::BulletedListItem(serde_json::from_value(payload)?),
            "numbered_list_item" => BlockKind::NumberedListItem(serde_json::from_value(payload)?),
            "to_do" => BlockKind::ToDo(serde_json::from_value(payload)?),
            "code" => BlockKind::Code(serde_json::from_value(payload)?),
            "image" => BlockKind::Image(serde_json::from_value(payload)?),
            "quote" => BlockKind::Quote(serde_json::from_value(payload)?),
            "callout" => BlockKind::Callout(serde_json::from_value(payload)?),
            "divider" => BlockKind::Divider,
            "table" => BlockKind::Table(serde_json::from_value(payload)?),
            "table_row" => BlockKind::TableRow(serde_json::from_value(payload)?),
            "bookmark" => BlockKind::Bookmark(serde_json::from_value(payload)?),
            other => BlockKind::Unsupported(other.to_string()),
        };
        Ok(Block {
            id: raw.id,
            has_children: raw.has_children,
            kind,
        })
    }
}

/// A database row. Properties stay untyped; only a few are read.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageObject {
    pub id: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl PageObject {
    /// `plain_text` of the first run of the title property, or `Untitled`.
    pub fn title(&self, property: &str) -> String {
        self.properties
            .get(property)
            .and_then(|p| p.get("title"))
            .and_then(|runs| runs.get(0))
            .and_then(|run| run.get("plain_text"))
            .and_then(Value::as_str)
            .unwrap_or("Untitled")
            .to_string()
    }

    /// Concatenated `plain_text` of a rich-text property; `None` when the
    /// property is missing or renders empty.
    pub fn rich_text_property(&self, property: &str) -> Option<String> {
        let runs = self
            .properties
            .get(property)
            .and_then(|p| p.get("rich_text"))
            .and_then(Value::as_array)?;
        let text: String = runs
            .iter()
            .filter_map(|run| run.get("plain_text").and_then(Value::as_str))
            .collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueryResponse {
    pub results: Vec<PageObject>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// One page of a block's direct children.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlockChildren {
    pub results: Vec<Block>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_paragraph_with_mixed_runs() {
        let block: Block = serde_json::from_value(json!({
            "object": "block",
            "id": "b1",
            "type": "paragraph",
            "has_children": false,
            "paragraph": {
                "rich_text": [
                    { "type": "text", "text": { "content": "a", "link": null }, "plain_text": "a" },
                    { "type": "text", "text": { "content": "b", "link": { "url": "http://x" } } },
                    { "type": "mention", "mention": { "type": "user" }, "plain_text": "@bob" }
                ],
                "color": "default"
            }
        }))
        .unwrap();

        assert_eq!(block.id, "b1");
        assert_eq!(
            block.kind,
            BlockKind::Paragraph(TextBlock {
                rich_text: vec![RichText::plain("a"), RichText::link("b", "http://x"), RichText::Other],
            })
        );
    }

    #[test]
    fn unknown_tag_is_kept() {
        let block: Block = serde_json::from_value(json!({
            "id": "b2",
            "type": "synced_block",
            "synced_block": { "synced_from": null }
        }))
        .unwrap();
        assert_eq!(block.kind, BlockKind::Unsupported("synced_block".into()));
        assert_eq!(block.kind.tag(), "synced_block");
    }

    #[test]
    fn decodes_image_sources() {
        let external: FileObject = serde_json::from_value(json!({
            "type": "external", "external": { "url": "https://cdn/x.png" }
        }))
        .unwrap();
        assert_eq!(external.url(), "https://cdn/x.png");

        let hosted: FileObject = serde_json::from_value(json!({
            "type": "file", "file": { "url": "https://s3/y.png", "expiry_time": "2024-01-01T00:00:00.000Z" }
        }))
        .unwrap();
        assert_eq!(hosted.url(), "https://s3/y.png");
    }

    #[test]
    fn known_tag_with_missing_payload_fails() {
        let res: Result<Block, _> = serde_json::from_value(json!({ "id": "b3", "type": "paragraph" }));
        assert!(res.is_err());
    }

    #[test]
    fn title_falls_back_to_untitled() {
        let page: PageObject = serde_json::from_value(json!({ "id": "p1", "properties": {} })).unwrap();
        assert_eq!(page.title("Name"), "Untitled");

        let page: PageObject = serde_json::from_value(json!({
            "id": "p2",
            "properties": { "Name": { "type": "title", "title": [] } }
        }))
        .unwrap();
        assert_eq!(page.title("Name"), "Untitled");
    }

    #[test]
    fn title_uses_first_run_only() {
        let page: PageObject = serde_json::from_value(json!({
            "id": "p3",
            "properties": { "Name": { "title": [ { "plain_text": "Hello" }, { "plain_text": " world" } ] } }
        }))
        .unwrap();
        assert_eq!(page.title("Name"), "Hello");
    }

    #[test]
    fn rich_text_property_concatenates_runs() {
        let page: PageObject = serde_json::from_value(json!({
            "id": "p4",
            "properties": {
                "Short": { "rich_text": [ { "plain_text": "Fast " }, { "plain_text": "and small" } ] },
                "Blank": { "rich_text": [] }
            }
        }))
        .unwrap();
        assert_eq!(page.rich_text_property("Short").as_deref(), Some("Fast and small"));
        assert_eq!(page.rich_text_property("Blank"), None);
        assert_eq!(page.rich_text_property("Missing"), None);
    }
}
