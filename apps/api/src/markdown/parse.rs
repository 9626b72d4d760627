use super::inline::parse_inline;
use super::model::{Block, Bullet, Dialect, RichDocument};

/// Markdown → rich document, one block per line.
///
/// Empty input yields a single empty paragraph so the editor always has an insertion point.
pub fn to_rich_text(markdown: &str, dialect: Dialect) -> RichDocument {
    if markdown.is_empty() {
        return RichDocument::new(vec![Block::empty_paragraph()]);
    }

    let blocks = markdown
        .split('\n')
        .map(|line| parse_line(line.strip_suffix('\r').unwrap_or(line), dialect))
        .collect();

    RichDocument::new(blocks)
}

fn parse_line(line: &str, dialect: Dialect) -> Block {
    const HEADINGS: [(&str, u8); 3] = [("# ", 1), ("## ", 2), ("### ", 3)];
    const BULLETS: [(&str, Bullet); 2] = [("- ", Bullet::Dash), ("* ", Bullet::Star)];

    for (prefix, level) in HEADINGS {
        if let Some(rest) = line.strip_prefix(prefix) {
            return Block::Heading {
                level,
                content: parse_inline(rest, dialect),
            };
        }
    }

    for (prefix, bullet) in BULLETS {
        if let Some(rest) = line.strip_prefix(prefix) {
            return Block::ListItem {
                bullet,
                content: parse_inline(rest, dialect),
            };
        }
    }

    if line.starts_with("---") {
        return Block::Rule;
    }

    if line.trim().is_empty() {
        return Block::empty_paragraph();
    }

    Block::Paragraph(parse_inline(line, dialect))
}
