//! `digest` subcommand.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use tracing::info;

use domsift_config::Config;
use domsift_core::{
    DigestOptions, FilterConfig, FilterMode, Snapshot, ViewportInfo, summarize,
};

/// Arguments of the `digest` subcommand.
pub(crate) struct DigestArgs {
    pub snapshot: PathBuf,
    pub words: Vec<String>,
    pub write_back: Option<PathBuf>,
    pub in_place: bool,
    pub text_limit: Option<usize>,
}

/// Resolve digest options: positional words win over the config file.
pub(crate) fn resolve_options(
    config: &Config,
    words: &[String],
    text_limit: Option<usize>,
) -> anyhow::Result<DigestOptions> {
    let filter = if words.is_empty() {
        let mode: FilterMode = config.digest.mode.parse()?;
        FilterConfig::new(mode, config.digest.include_position)?
    } else {
        FilterConfig::from_args(words)?
    };

    let text_limit = text_limit.unwrap_or(config.digest.text_limit);
    if text_limit == 0 {
        bail!("text limit must be greater than 0");
    }
    Ok(DigestOptions::new(filter).with_text_limit(text_limit))
}

/// Load the snapshot, summarize it, and optionally save it back with the
/// identifiers written onto its elements. Returns the rendered digest.
pub(crate) fn run(config: &Config, args: &DigestArgs) -> anyhow::Result<String> {
    let options = resolve_options(config, &args.words, args.text_limit)?;
    let fallback = ViewportInfo {
        width: config.viewport.width,
        height: config.viewport.height,
    };

    let (mut doc, provider) = Snapshot::load(&args.snapshot, fallback)
        .with_context(|| format!("Failed to load snapshot {}", args.snapshot.display()))?;

    let digest = summarize(&mut doc, &provider, &options);
    info!(
        snapshot = %args.snapshot.display(),
        lines = digest.lines.len(),
        assigned = digest.assigned.len(),
        "snapshot summarized"
    );

    let target: Option<&Path> = if args.in_place {
        Some(args.snapshot.as_path())
    } else {
        args.write_back.as_deref()
    };
    if let Some(path) = target {
        Snapshot::save(path, &doc, &provider)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        info!(path = %path.display(), "annotated snapshot written");
    }

    Ok(digest.text)
}
