//! Markdown rendering for the minutes email.
//!
//! The summary comes back from the generative model as Markdown and the
//! transcript is exported as Markdown; both are composed into one body and
//! converted to HTML before sending.

use pulldown_cmark::{Options, Parser, html};

/// Converts a Markdown document to an HTML fragment.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::empty());
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Composes the Markdown body of a minutes email.
///
/// The body is the summary, the published text and video links, and the
/// full transcript, in that order.
pub fn compose_minutes(
    summary: &str,
    markdown_url: &str,
    video_url: &str,
    transcript: &str,
) -> String {
    format!(
        "\n{summary}\n\nText: [{markdown_url}]({markdown_url})\n\nVideo: [{video_url}]({video_url})\n\n{transcript}\n"
    )
}
