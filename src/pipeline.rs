//! One render pass: locate mount → resolve source → fetch → sort → render →
//! commit. Each invocation is stateless; nothing is cached or diffed
//! between passes.

use std::time::Duration;

use thiserror::Error;

use crate::catalog::{self, FetchError};
use crate::page::{self, PageError};
use crate::render::{self, RenderError};

/// Failure of any stage between source resolution and fragment building.
///
/// Recovered exactly once, in [`render_page`], which commits the generic
/// failure paragraph and logs the cause. The stages stay individually typed
/// so tests can target each failure mode.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Inputs for a single render pass, passed explicitly rather than read from
/// ambient page state.
pub struct RenderOptions<'a> {
    pub mount_id: &'a str,
    /// Overrides the mount's data-source attribute when set.
    pub source_override: Option<&'a str>,
    pub client: &'a reqwest::Client,
    pub timeout: Option<Duration>,
}

/// Runs one render pass over `html`.
///
/// Returns `Ok(None)` when the mount element is absent: a silent no-op, no
/// fetch issued. Otherwise returns the rewritten page. A failure in any
/// stage from source resolution through rendering commits the failure
/// paragraph instead, with the cause recorded on the diagnostic channel;
/// only a structurally broken mount (unclosed or void) is a hard error.
pub async fn render_page(
    html: &str,
    options: &RenderOptions<'_>,
) -> Result<Option<String>, PageError> {
    let Some(mount) = page::find_mount(html, options.mount_id)? else {
        tracing::debug!(id = %options.mount_id, "No mount element in page, nothing to render");
        return Ok(None);
    };

    // An absent attribute (and no override) degrades to an empty location;
    // its failure surfaces through the fetch stage, not up front.
    let source = options
        .source_override
        .or_else(|| mount.data_source())
        .unwrap_or("");

    let fragment = match build_fragment(options.client, source, options.timeout).await {
        Ok(fragment) => fragment,
        Err(e) => {
            tracing::error!(source = %source, error = %e, "Render pass failed, committing failure message");
            render::failure_fragment()
        }
    };

    Ok(Some(page::commit(html, &mount, &fragment)))
}

/// Fetch, sort, and render: the fallible middle of the pass.
pub async fn build_fragment(
    client: &reqwest::Client,
    source: &str,
    timeout: Option<Duration>,
) -> Result<String, StageError> {
    let dataset = catalog::fetch_dataset(client, source, timeout).await?;
    let groups = catalog::sorted_groups(&dataset);
    let fragment = render::render_fragment(&groups)?;
    tracing::info!(groups = groups.len(), "Rendered card fragment");
    Ok(fragment)
}
