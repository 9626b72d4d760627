use super::inline::inline_to_markdown;
use super::model::{Block, RichDocument};

/// Rich document → markdown.
///
/// Runs of blank lines collapse to one and the result is trimmed, so the output is
/// the input of `to_rich_text` up to whitespace normalization.
pub fn to_markdown(doc: &RichDocument) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(doc.blocks.len());

    for block in &doc.blocks {
        if block.is_blank() {
            if lines.last().is_some_and(|prev| prev.trim().is_empty()) {
                continue;
            }
            lines.push(String::new());
            continue;
        }
        lines.push(block_to_line(block));
    }

    lines.join("\n").trim().to_string()
}

fn block_to_line(block: &Block) -> String {
    let mut line = String::new();
    match block {
        Block::Heading { level, content } => {
            line.push_str(&"#".repeat(usize::from(*level)));
            line.push(' ');
            inline_to_markdown(content, &mut line);
        }
        Block::ListItem { bullet, content } => {
            line.push_str(bullet.as_str());
            inline_to_markdown(content, &mut line);
        }
        Block::Rule => line.push_str("---"),
        Block::Paragraph(content) => inline_to_markdown(content, &mut line),
    }
    line
}
