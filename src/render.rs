//! Markdown rendering with word-reveal markup.
//!
//! Converts a turn's text to HTML in which every revealable word is
//! wrapped in a `<span data-word>` element, matching the token rules in
//! [`crate::reveal::count_words`]: code blocks pass through with no
//! spans (visible from the start, revealed as a unit), inline code
//! spans wrap as a single word. The playback surface toggles a
//! `visible` class on the spans as reveal events arrive, so span count
//! and reveal total must agree.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html};

/// Render a turn's text to word-span HTML.
///
/// Content that does not look like markdown is emitted as an escaped
/// plain block with the same span wrapping, so reveal progress lines up
/// either way. This is also the fallback path for structurally odd
/// backend output: there is no parse failure, only plainer output.
#[must_use]
pub fn render_turn_html(text: &str) -> String {
    if is_markdown(text) {
        render_markdown_html(text)
    } else {
        format!("<p>{}</p>", wrap_words(text))
    }
}

/// Render markdown to HTML, wrapping each revealable word in a span.
#[must_use]
pub fn render_markdown_html(content: &str) -> String {
    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;

    let mut in_code_block = false;
    let mut events = Vec::new();
    for event in Parser::new_ext(content, options) {
        match event {
            Event::Start(Tag::CodeBlock(_)) => {
                in_code_block = true;
                events.push(event);
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                events.push(event);
            }
            Event::Text(ref text) if !in_code_block => {
                events.push(Event::Html(wrap_words(text).into()));
            }
            Event::Code(code) => {
                events.push(Event::Html(
                    format!("<span data-word><code>{}</code></span>", html_escape(&code)).into(),
                ));
            }
            other => events.push(other),
        }
    }

    let mut out = String::new();
    html::push_html(&mut out, events.into_iter());
    out
}

/// Heuristic markdown detection for short backend output.
#[must_use]
pub fn is_markdown(text: &str) -> bool {
    if text.len() < 4 {
        return false;
    }
    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("# ")
            || trimmed.starts_with("## ")
            || trimmed.starts_with("### ")
            || trimmed.starts_with("- ")
            || trimmed.starts_with("* ")
            || trimmed.starts_with("> ")
            || trimmed.starts_with("```")
            || trimmed.starts_with("| ")
        {
            return true;
        }
        if let Some(rest) = trimmed.strip_prefix(|c: char| c.is_ascii_digit())
            && rest.starts_with(". ")
        {
            return true;
        }
    }
    text.contains("**") || text.contains('`') || text.contains("](")
}

/// Wrap each whitespace-delimited word in a `data-word` span.
fn wrap_words(text: &str) -> String {
    text.split_whitespace()
        .map(|word| format!("<span data-word>{}</span>", html_escape(word)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
