use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};

use linkdeck::catalog;
use linkdeck::config::Config;
use linkdeck::pipeline::{render_page, RenderOptions};

/// Atomically write a file using the write-to-temp-then-rename pattern.
/// The destination is never left in a partial state.
fn atomic_write(dst: &Path, content: &[u8]) -> Result<()> {
    // Randomized temp filename so a concurrent run cannot collide with or
    // pre-create the path between the existence check and file creation.
    use std::time::{SystemTime, UNIX_EPOCH};
    let random_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = dst.with_extension(format!("tmp.{:016x}", random_suffix));

    let mut temp_file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true) // Fails atomically if the path exists
        .open(&temp_path)
        .with_context(|| {
            format!(
                "Failed to create temporary file '{}': check directory permissions or disk space",
                temp_path.display()
            )
        })?;

    temp_file.write_all(content).with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to write to temporary file '{}': disk may be full",
            temp_path.display()
        )
    })?;

    // Sync to disk to ensure data is persisted before rename
    temp_file.sync_all().with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to sync temporary file '{}' to disk",
            temp_path.display()
        )
    })?;

    drop(temp_file);

    // Atomic rename (POSIX guarantees atomicity for rename on same filesystem)
    // On Windows, rename fails if destination exists, so remove it first
    #[cfg(windows)]
    if dst.exists() {
        std::fs::remove_file(dst).with_context(|| {
            let _ = std::fs::remove_file(&temp_path);
            format!(
                "Failed to remove existing '{}' before atomic replace",
                dst.display()
            )
        })?;
    }

    std::fs::rename(&temp_path, dst).with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to rename '{}' to '{}': check permissions",
            temp_path.display(),
            dst.display()
        )
    })?;

    Ok(())
}

#[derive(Parser, Debug)]
#[command(
    name = "linkdeck",
    about = "Renders categorized bookmark JSON into a static HTML page"
)]
struct Args {
    /// HTML page containing the mount element
    page: PathBuf,

    /// Write the rendered page here instead of rewriting in place
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Override the mount element's data-source attribute
    #[arg(long, value_name = "URL")]
    source: Option<String>,

    /// Mount element id (overrides the config file)
    #[arg(long, value_name = "ID")]
    mount_id: Option<String>,

    /// Config file (default: linkdeck.toml next to the page)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(|| {
        args.page
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .join("linkdeck.toml")
    });
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let html = std::fs::read_to_string(&args.page)
        .with_context(|| format!("Failed to read page {}", args.page.display()))?;

    let client =
        catalog::build_client(&config.user_agent).context("Failed to build HTTP client")?;

    let options = RenderOptions {
        mount_id: args.mount_id.as_deref().unwrap_or(&config.mount_id),
        source_override: args.source.as_deref(),
        client: &client,
        timeout: config.timeout(),
    };

    let Some(updated) = render_page(&html, &options)
        .await
        .with_context(|| format!("Malformed mount element in {}", args.page.display()))?
    else {
        // Page does not participate; leave it untouched.
        return Ok(());
    };

    let output = args.output.as_deref().unwrap_or(&args.page);
    atomic_write(output, updated.as_bytes())
        .with_context(|| format!("Failed to write {}", output.display()))?;

    tracing::info!(page = %output.display(), "Page updated");
    Ok(())
}
