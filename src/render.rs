use askama::Template;

use crate::record::ReleaseRecord;

// Template structs
#[derive(Template)]
#[template(path = "release_notes.html")]
struct ReleaseNotesTemplate<'a> {
    releases: &'a [ReleaseRecord],
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate;

/// Renders the full release-notes document.
///
/// The document embeds its own style rules: light theme by default, dark
/// theme behind a `prefers-color-scheme` media query, so theme selection is
/// automatic in the embedding surface. Record content is rendered unescaped;
/// the feed origin is trusted (it ships with the application).
///
/// Zero records produce a valid document with an empty container.
pub fn render_releases(releases: &[ReleaseRecord]) -> Result<String, askama::Error> {
    ReleaseNotesTemplate { releases }.render()
}

/// Renders the static fallback document shown when the feed is unparsable.
pub fn render_error() -> Result<String, askama::Error> {
    ErrorTemplate.render()
}
