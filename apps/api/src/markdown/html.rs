//! HTML boundary of the rich document: the tag model the embedded editor loads and saves.
//!
//! Only the constructs the markdown side can express are recognized. List wrappers are
//! transparent, an editor's `<p>` inside `<li>` is unwrapped, and any other tag is
//! dropped while its text is kept.

use super::model::{Block, Bullet, EmphasisDelimiter, Inline, RichDocument};

impl RichDocument {
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        let mut in_list = false;

        for block in &self.blocks {
            let is_item = matches!(block, Block::ListItem { .. });
            if is_item && !in_list {
                out.push_str("<ul>");
            } else if !is_item && in_list {
                out.push_str("</ul>");
            }
            in_list = is_item;

            match block {
                Block::Heading { level, content } => {
                    out.push_str(&format!("<h{level}>"));
                    inline_to_html(content, &mut out);
                    out.push_str(&format!("</h{level}>"));
                }
                Block::ListItem { content, .. } => {
                    out.push_str("<li>");
                    inline_to_html(content, &mut out);
                    out.push_str("</li>");
                }
                Block::Rule => out.push_str("<hr>"),
                Block::Paragraph(content) => {
                    out.push_str("<p>");
                    inline_to_html(content, &mut out);
                    out.push_str("</p>");
                }
            }
        }

        if in_list {
            out.push_str("</ul>");
        }
        out
    }

    pub fn from_html(html: &str) -> RichDocument {
        let mut builder = DocumentBuilder::default();
        for token in tokenize(html) {
            builder.accept(token);
        }
        builder.finish()
    }
}

fn inline_to_html(nodes: &[Inline], out: &mut String) {
    for node in nodes {
        match node {
            Inline::Text(text) => escape_into(text, out),
            Inline::Strong(children) => {
                out.push_str("<strong>");
                inline_to_html(children, out);
                out.push_str("</strong>");
            }
            Inline::Emphasis { children, .. } => {
                out.push_str("<em>");
                inline_to_html(children, out);
                out.push_str("</em>");
            }
        }
    }
}

fn escape_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tokenizer
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum Token {
    Open(String),
    Close(String),
    Text(String),
}

fn tokenize(html: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = html;

    while !rest.is_empty() {
        let Some(lt) = rest.find('<') else {
            tokens.push(Token::Text(decode_entities(rest)));
            break;
        };
        if lt > 0 {
            tokens.push(Token::Text(decode_entities(&rest[..lt])));
        }
        rest = &rest[lt..];

        if let Some(comment) = rest.strip_prefix("<!--") {
            rest = comment.find("-->").map_or("", |end| &comment[end + 3..]);
            continue;
        }

        let Some(gt) = rest.find('>') else {
            tokens.push(Token::Text(decode_entities(rest)));
            break;
        };
        let inner = &rest[1..gt];
        rest = &rest[gt + 1..];

        let (closing, body) = match inner.strip_prefix('/') {
            Some(body) => (true, body),
            None => (false, inner),
        };
        let name: String = body
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        if name.is_empty() {
            continue;
        }
        tokens.push(if closing {
            Token::Close(name)
        } else {
            Token::Open(name)
        });
    }

    tokens
}

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&rest[1..semi]).map(|ch| (ch, semi)));
        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(code)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tree builder
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Heading(u8),
    ListItem,
    Paragraph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Strong,
    Emphasis,
}

/// Open inline frames; the first frame is the block's root and has no mark.
#[derive(Debug)]
struct InlineStack {
    frames: Vec<(Option<Mark>, Vec<Inline>)>,
}

impl InlineStack {
    fn new() -> Self {
        Self {
            frames: vec![(None, Vec::new())],
        }
    }

    fn top(&mut self) -> &mut Vec<Inline> {
        let last = self.frames.len() - 1;
        &mut self.frames[last].1
    }

    fn push_text(&mut self, text: &str) {
        let nodes = self.top();
        if let Some(Inline::Text(prev)) = nodes.last_mut() {
            prev.push_str(text);
        } else {
            nodes.push(Inline::Text(text.to_string()));
        }
    }

    fn open(&mut self, mark: Mark) {
        self.frames.push((Some(mark), Vec::new()));
    }

    fn close(&mut self, mark: Mark) {
        if self.frames.len() > 1 && self.frames[self.frames.len() - 1].0 == Some(mark) {
            self.pop_frame();
        }
    }

    fn pop_frame(&mut self) {
        if let Some((Some(mark), children)) = self.frames.pop() {
            let node = match mark {
                Mark::Strong => Inline::Strong(children),
                Mark::Emphasis => Inline::Emphasis {
                    delimiter: EmphasisDelimiter::Star,
                    children,
                },
            };
            self.top().push(node);
        }
    }

    fn finish(mut self) -> Vec<Inline> {
        while self.frames.len() > 1 {
            self.pop_frame();
        }
        self.frames.pop().map(|(_, nodes)| nodes).unwrap_or_default()
    }
}

#[derive(Default)]
struct DocumentBuilder {
    blocks: Vec<Block>,
    current: Option<(Pending, InlineStack)>,
}

impl DocumentBuilder {
    fn accept(&mut self, token: Token) {
        match token {
            Token::Open(tag) => self.open(&tag),
            Token::Close(tag) => self.close(&tag),
            Token::Text(text) => self.text(&text),
        }
    }

    fn in_list_item(&self) -> bool {
        matches!(self.current, Some((Pending::ListItem, _)))
    }

    fn open(&mut self, tag: &str) {
        match tag {
            "h1" => self.start(Pending::Heading(1)),
            "h2" => self.start(Pending::Heading(2)),
            "h3" => self.start(Pending::Heading(3)),
            "h4" | "h5" | "h6" => self.start(Pending::Paragraph),
            "li" => self.start(Pending::ListItem),
            "p" if self.in_list_item() => {}
            "p" => self.start(Pending::Paragraph),
            "hr" => {
                self.flush();
                self.blocks.push(Block::Rule);
            }
            "strong" | "b" => self.inlines().open(Mark::Strong),
            "em" | "i" => self.inlines().open(Mark::Emphasis),
            _ => {}
        }
    }

    fn close(&mut self, tag: &str) {
        match tag {
            "p" if self.in_list_item() => {}
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "li" | "p" => self.flush(),
            "strong" | "b" => self.inlines().close(Mark::Strong),
            "em" | "i" => self.inlines().close(Mark::Emphasis),
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.current.is_none() && text.trim().is_empty() {
            return;
        }
        // Source newlines are layout whitespace in HTML, never line breaks in the document.
        let text = text.replace(['\r', '\n'], " ");
        self.inlines().push_text(&text);
    }

    fn start(&mut self, pending: Pending) {
        self.flush();
        self.current = Some((pending, InlineStack::new()));
    }

    fn inlines(&mut self) -> &mut InlineStack {
        &mut self
            .current
            .get_or_insert_with(|| (Pending::Paragraph, InlineStack::new()))
            .1
    }

    fn flush(&mut self) {
        let Some((pending, stack)) = self.current.take() else {
            return;
        };
        let content = stack.finish();
        self.blocks.push(match pending {
            Pending::Heading(level) => Block::Heading { level, content },
            Pending::ListItem => Block::ListItem {
                bullet: Bullet::Dash,
                content,
            },
            Pending::Paragraph => Block::Paragraph(content),
        });
    }

    fn finish(mut self) -> RichDocument {
        self.flush();
        RichDocument::new(self.blocks)
    }
}
