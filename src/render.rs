//! Block → Markdown rendering.
//!
//! Every function here is pure and infallible: blocks of an unknown type
//! produce a visible placeholder instead of an error.
use crate::notion::model::{Block, BlockKind, RichText, TableBlock};

/// Render one block as a Markdown fragment (multi-line for code and tables).
pub fn render_block(block: &Block) -> String {
    match &block.kind {
        BlockKind::Paragraph(b) => render_rich_text(&b.rich_text),
        BlockKind::Heading1(b) => format!("# {}", render_rich_text(&b.rich_text)),
        BlockKind::Heading2(b) => format!("## {}", render_rich_text(&b.rich_text)),
        BlockKind::Heading3(b) => format!("### {}", render_rich_text(&b.rich_text)),
        BlockKind::BulletedListItem(b) => format!("- {}", render_rich_text(&b.rich_text)),
        // No running counter; Markdown renumbers.
        BlockKind::NumberedListItem(b) => format!("1. {}", render_rich_text(&b.rich_text)),
        BlockKind::ToDo(b) => {
            let mark = if b.checked { 'x' } else { ' ' };
            format!("- [{}] {}", mark, render_rich_text(&b.rich_text))
        }
        BlockKind::Code(b) => format!("```{}\n{}\n```", b.language, render_rich_text(&b.rich_text)),
        BlockKind::Image(file) => format!("![Image]({})", file.url()),
        BlockKind::Quote(b) | BlockKind::Callout(b) => format!("> {}", render_rich_text(&b.rich_text)),
        BlockKind::Divider => "---".to_string(),
        BlockKind::Table(table) => render_table(table),
        BlockKind::Bookmark(b) => format!("[Bookmark]({})", b.url),
        // Rows only render as part of their table.
        BlockKind::TableRow(_) | BlockKind::Unsupported(_) => unsupported(block.kind.tag()),
    }
}

/// Render blocks in order, one fragment per block, joined by newlines.
pub fn render_blocks(blocks: &[Block]) -> String {
    blocks.iter().map(render_block).collect::<Vec<_>>().join("\n")
}

/// Concatenate runs with no separator. Linked runs become `[text](url)`;
/// non-text runs contribute nothing.
pub fn render_rich_text(runs: &[RichText]) -> String {
    let mut out = String::new();
    for run in runs {
        if let RichText::Text { text } = run {
            match &text.link {
                Some(link) => {
                    out.push('[');
                    out.push_str(&text.content);
                    out.push_str("](");
                    out.push_str(&link.url);
                    out.push(')');
                }
                None => out.push_str(&text.content),
            }
        }
    }
    out
}

fn render_table(table: &TableBlock) -> String {
    table
        .children
        .iter()
        .filter_map(|child| match &child.kind {
            BlockKind::TableRow(row) => Some(
                row.cells
                    .iter()
                    .map(|cell| render_rich_text(cell))
                    .collect::<Vec<_>>()
                    .join(" | "),
            ),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn unsupported(tag: &str) -> String {
    format!("Unsupported block type: {}", tag)
}
