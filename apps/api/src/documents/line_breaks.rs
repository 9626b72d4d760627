//! Layout repair for CV markdown headed to the PDF pipeline.
//!
//! The CV template stacks header, skills and education lines directly under each other.
//! Markdown would join them into one paragraph, so matching lines get a trailing
//! two-space hard break. The pattern list is tied to that template.

/// Contact details in the header block.
const HEADER_MARKERS: &[&str] = &["Email:", "Phone:", "Telegram:", "LinkedIn:"];

/// Bold category labels in the skills section.
const SKILLS_PREFIXES: &[&str] = &["**Core", "**Soft", "**Tools", "**Languages"];

/// Words that mark a bold line as an education entry.
const EDUCATION_MARKERS: &[&str] = &["Degree", "Bachelor", "Master", "Certification"];

const HARD_BREAK: &str = "  ";

fn is_header_line(line: &str) -> bool {
    line.starts_with("# ")
        || line.starts_with("**")
        || HEADER_MARKERS.iter().any(|m| line.contains(m))
}

fn is_skills_line(line: &str) -> bool {
    SKILLS_PREFIXES.iter().any(|p| line.starts_with(p))
}

fn is_education_line(line: &str) -> bool {
    line.starts_with("**") && EDUCATION_MARKERS.iter().any(|m| line.contains(m))
}

fn is_layout_sensitive(line: &str) -> bool {
    is_header_line(line) || is_skills_line(line) || is_education_line(line)
}

/// A break is only needed when the next line continues the same block.
fn continues_block(next: &str) -> bool {
    !next.trim().is_empty() && !next.starts_with('#') && !next.starts_with("---")
}

pub fn repair_line_breaks(markdown: &str) -> String {
    let lines: Vec<&str> = markdown.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());

    for (i, line) in lines.iter().enumerate() {
        let next = lines.get(i + 1).copied().unwrap_or("");
        if is_layout_sensitive(line) && !line.ends_with(HARD_BREAK) && continues_block(next) {
            out.push(format!("{}{HARD_BREAK}", line.trim_end()));
        } else {
            out.push(line.to_string());
        }
    }

    out.join("\n")
}
