use serde::{Deserialize, Serialize};

/// Which markdown flavour a document uses. The profile document also accepts `_x_`
/// emphasis; CVs only use asterisks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Cv,
    Profile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmphasisDelimiter {
    Star,
    Underscore,
}

impl EmphasisDelimiter {
    pub fn as_str(self) -> &'static str {
        match self {
            EmphasisDelimiter::Star => "*",
            EmphasisDelimiter::Underscore => "_",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bullet {
    Dash,
    Star,
}

impl Bullet {
    pub fn as_str(self) -> &'static str {
        match self {
            Bullet::Dash => "- ",
            Bullet::Star => "* ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Strong(Vec<Inline>),
    Emphasis {
        delimiter: EmphasisDelimiter,
        children: Vec<Inline>,
    },
}

/// One line of the document. There is no nesting: a list is a run of `ListItem`s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Level is 1..=3.
    Heading { level: u8, content: Vec<Inline> },
    ListItem { bullet: Bullet, content: Vec<Inline> },
    Rule,
    /// Empty content is a blank line.
    Paragraph(Vec<Inline>),
}

impl Block {
    pub fn empty_paragraph() -> Self {
        Block::Paragraph(Vec::new())
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Block::Paragraph(content) if inline_is_blank(content))
    }
}

fn inline_is_blank(content: &[Inline]) -> bool {
    content.iter().all(|node| match node {
        Inline::Text(text) => text.trim().is_empty(),
        Inline::Strong(_) | Inline::Emphasis { .. } => false,
    })
}

/// The structure the rich-text editor displays and edits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichDocument {
    pub blocks: Vec<Block>,
}

impl RichDocument {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }
}
