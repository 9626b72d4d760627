//! Inline span tokenizer: `**strong**`, `*emphasis*` and, in the profile dialect, `_emphasis_`.
//!
//! Spans are matched non-greedily and must be non-empty. Strong is tried before
//! emphasis, and span content is tokenized again so `**a *b* c**` nests. Unmatched
//! delimiters stay literal text.

use super::model::{Dialect, EmphasisDelimiter, Inline};

pub fn parse_inline(text: &str, dialect: Dialect) -> Vec<Inline> {
    let mut nodes = Vec::new();
    let mut plain = String::new();
    let mut i = 0;

    while i < text.len() {
        let rest = &text[i..];

        if let Some(inner) = rest.strip_prefix("**") {
            if let Some(end) = find_closing(inner, "**") {
                flush(&mut plain, &mut nodes);
                nodes.push(Inline::Strong(parse_inline(&inner[..end], dialect)));
                i += end + 4;
                continue;
            }
        }

        let delimiter = match rest.as_bytes()[0] {
            b'*' => Some(EmphasisDelimiter::Star),
            b'_' if dialect == Dialect::Profile => Some(EmphasisDelimiter::Underscore),
            _ => None,
        };
        if let Some(delimiter) = delimiter {
            let inner = &rest[1..];
            if let Some(end) = find_closing(inner, delimiter.as_str()) {
                flush(&mut plain, &mut nodes);
                nodes.push(Inline::Emphasis {
                    delimiter,
                    children: parse_inline(&inner[..end], dialect),
                });
                i += end + 2;
                continue;
            }
        }

        let Some(ch) = rest.chars().next() else {
            break;
        };
        plain.push(ch);
        i += ch.len_utf8();
    }

    flush(&mut plain, &mut nodes);
    nodes
}

/// Byte offset of the first `delimiter` in `s` that leaves at least one character of content.
fn find_closing(s: &str, delimiter: &str) -> Option<usize> {
    let first = s.chars().next()?.len_utf8();
    s[first..].find(delimiter).map(|pos| pos + first)
}

fn flush(plain: &mut String, nodes: &mut Vec<Inline>) {
    if !plain.is_empty() {
        nodes.push(Inline::Text(std::mem::take(plain)));
    }
}

pub fn inline_to_markdown(nodes: &[Inline], out: &mut String) {
    for node in nodes {
        match node {
            Inline::Text(text) => out.push_str(text),
            Inline::Strong(children) => {
                out.push_str("**");
                inline_to_markdown(children, out);
                out.push_str("**");
            }
            Inline::Emphasis {
                delimiter,
                children,
            } => {
                out.push_str(delimiter.as_str());
                inline_to_markdown(children, out);
                out.push_str(delimiter.as_str());
            }
        }
    }
}
