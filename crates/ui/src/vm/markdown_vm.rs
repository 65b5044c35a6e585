use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

/// Renders lesson Markdown as plain terminal text.
///
/// Headings are underlined, list items get bullets or numbers, code blocks are
/// indented and links keep their target in parentheses.
#[must_use]
pub fn markdown_to_text(input: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut renderer = TextRenderer::default();
    for event in Parser::new_ext(input, options) {
        renderer.event(event);
    }
    normalize_text(&renderer.out)
}

#[derive(Default)]
struct TextRenderer {
    out: String,
    heading: Option<(HeadingLevel, usize)>,
    lists: Vec<Option<u64>>,
    in_code_block: bool,
    link_target: Option<String>,
}

impl TextRenderer {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                self.out.push('`');
                self.out.push_str(&code);
                self.out.push('`');
            }
            Event::SoftBreak => self.out.push(' '),
            Event::HardBreak => self.out.push('\n'),
            Event::Rule => self.out.push_str("\n---\n\n"),
            Event::TaskListMarker(done) => self.out.push_str(if done { "[x] " } else { "[ ] " }),
            Event::Html(html) | Event::InlineHtml(html) => self.out.push_str(&html),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.block_break();
                self.heading = Some((level, self.out.len()));
            }
            Tag::Paragraph => self.block_break(),
            Tag::BlockQuote(_) => {
                self.block_break();
                self.out.push_str("> ");
            }
            Tag::CodeBlock(kind) => {
                self.block_break();
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        self.out.push_str(&format!("    [{lang}]\n"));
                    }
                }
                self.in_code_block = true;
            }
            Tag::List(first) => {
                if self.lists.is_empty() {
                    self.block_break();
                }
                self.lists.push(first);
            }
            Tag::Item => {
                if !self.out.ends_with('\n') && !self.out.is_empty() {
                    self.out.push('\n');
                }
                let depth = self.lists.len().saturating_sub(1);
                self.out.push_str(&"  ".repeat(depth));
                match self.lists.last_mut() {
                    Some(Some(number)) => {
                        self.out.push_str(&format!("{number}. "));
                        *number += 1;
                    }
                    _ => self.out.push_str("- "),
                }
            }
            Tag::Link { dest_url, .. } => self.link_target = Some(dest_url.to_string()),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                if let Some((level, start)) = self.heading.take() {
                    let width = self.out[start..].chars().count();
                    let underline = if level == HeadingLevel::H1 { '=' } else { '-' };
                    self.out.push('\n');
                    self.out.extend(std::iter::repeat_n(underline, width));
                }
                self.out.push('\n');
            }
            TagEnd::Paragraph => self.out.push('\n'),
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.out.push('\n');
            }
            TagEnd::List(_) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.out.push('\n');
                }
            }
            TagEnd::Link => {
                if let Some(target) = self.link_target.take() {
                    self.out.push_str(&format!(" ({target})"));
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_code_block {
            for line in text.lines() {
                self.out.push_str("    ");
                self.out.push_str(line);
                self.out.push('\n');
            }
        } else {
            self.out.push_str(text);
        }
    }

    fn block_break(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with("\n\n") {
            if !self.out.ends_with('\n') {
                self.out.push('\n');
            }
            self.out.push('\n');
        }
    }
}

/// Trims trailing whitespace and collapses runs of blank lines.
#[must_use]
pub fn normalize_text(input: &str) -> String {
    let normalized = input.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines = Vec::new();
    let mut blank_streak = 0usize;

    for line in normalized.split('\n') {
        let trimmed = line.trim_end_matches([' ', '\t']).to_string();
        if trimmed.is_empty() {
            blank_streak += 1;
            if blank_streak > 1 || lines.is_empty() {
                continue;
            }
        } else {
            blank_streak = 0;
        }
        lines.push(trimmed);
    }

    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    let mut output = lines.join("\n");
    if !output.is_empty() {
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::{markdown_to_text, normalize_text};

    #[test]
    fn headings_are_underlined() {
        let text = markdown_to_text("# Ownership\n\nEvery value has an owner.\n\n## Moves\n\nText");
        assert_eq!(
            text,
            "Ownership\n=========\n\nEvery value has an owner.\n\nMoves\n-----\n\nText\n"
        );
    }

    #[test]
    fn lists_keep_numbering_and_bullets() {
        let text = markdown_to_text("1. first\n2. second\n\n- a\n- b");
        assert!(text.contains("1. first\n2. second"));
        assert!(text.contains("- a\n- b"));
    }

    #[test]
    fn code_blocks_are_indented_and_links_keep_targets() {
        let text = markdown_to_text(
            "See [the book](https://doc.rust-lang.org/book/).\n\n```rust\nlet x = 5;\n```",
        );
        assert!(text.contains("the book (https://doc.rust-lang.org/book/)"));
        assert!(text.contains("    let x = 5;"));
        assert!(text.contains("[rust]"));
    }

    #[test]
    fn normalize_trims_and_collapses_blank_lines() {
        let output = normalize_text("\n\nLine one  \r\n\r\n\r\nLine two\t\r\n\r\n");
        assert_eq!(output, "Line one\n\nLine two\n");
    }
}
