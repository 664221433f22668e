// src/render.rs
//! Markdown to HTML for streamed model output.
//!
//! Each increment is rendered on its own, so a fragment such as `" there"` is
//! still a complete (if tiny) document. Rendering is pure and deterministic.

use pulldown_cmark::{Event, Options, Parser, html};

fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_DEFINITION_LIST
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Render `text` as HTML. Single newlines become `<br />`.
pub fn render_markdown(text: &str) -> String {
    let events = Parser::new_ext(text, markdown_options()).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut out = String::with_capacity(text.len() + text.len() / 2);
    html::push_html(&mut out, events);

    let trimmed = out.trim_end_matches('\n').len();
    out.truncate(trimmed);
    out
}
