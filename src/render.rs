//! Card fragment construction.
//!
//! Builds a detached HTML fragment from sorted groups; splicing it into the
//! page is the page module's job. Every interpolated value is escaped, so
//! untrusted titles, urls, and descriptions cannot inject markup.

use std::fmt::Write;

use thiserror::Error;
use url::Url;

use crate::catalog::model::Group;

/// Shown when the dataset has no groups.
pub const EMPTY_MESSAGE: &str = "No items yet.";

/// Shown when any stage between source resolution and rendering fails.
pub const FAILURE_MESSAGE: &str = "Failed to load bookmarks.";

/// Errors that can occur while building the card fragment.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Item url could not be parsed as an absolute URL for hostname display.
    #[error("Invalid item URL '{url}': {source}")]
    InvalidItemUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Builds the card fragment for the sorted groups.
///
/// An empty sequence yields exactly one paragraph with [`EMPTY_MESSAGE`].
/// Otherwise each group becomes a heading plus a card-grid list, with one
/// card per item in sorted order.
///
/// A single invalid item url aborts the whole fragment; there is no
/// per-item isolation.
pub fn render_fragment(groups: &[Group]) -> Result<String, RenderError> {
    if groups.is_empty() {
        return Ok(format!("<p>{}</p>", EMPTY_MESSAGE));
    }

    let mut out = String::new();
    for group in groups {
        writeln!(out, "<h2>{}</h2>", escape(&group.name)).expect("write to String");
        out.push_str("<ul class=\"card-grid\">\n");
        for item in &group.items {
            let host = item_host(&item.url)?;
            writeln!(
                out,
                "<li class=\"card\"><a href=\"{href}\" target=\"_blank\" rel=\"noopener noreferrer\">\
<strong>{title}</strong><em>{host}</em><p>{description}</p></a></li>",
                href = escape(&item.url),
                title = escape(item.display_title()),
                host = escape(&host),
                description = escape(item.description_text()),
            )
            .expect("write to String");
        }
        out.push_str("</ul>\n");
    }
    Ok(out)
}

/// The failure paragraph committed when a render pass fails.
pub fn failure_fragment() -> String {
    format!("<p>{}</p>", FAILURE_MESSAGE)
}

/// Escapes text for interpolation into HTML content or attribute values.
/// Covers both contexts (quotes included) so one helper serves href and
/// element text alike.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Hostname for the card's italic line. Parsing requires an absolute URL;
/// a hostless scheme (`data:`, `mailto:`) is still valid input and shows
/// an empty hostname rather than failing the pass.
fn item_host(url: &str) -> Result<String, RenderError> {
    let parsed = Url::parse(url).map_err(|source| RenderError::InvalidItemUrl {
        url: url.to_string(),
        source,
    })?;
    Ok(parsed.host_str().unwrap_or("").to_owned())
}
