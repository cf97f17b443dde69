//! Convert argument graphs between AIF and Arguebuf
//!
//! ```text
//! argument-graph-convert <input.json> <aif|arguebuf> [output.json]
//! ```
//!
//! The input format is detected from the document. Without an output path the
//! converted document is written to stdout. An `EDITOR_CONFIG` environment variable
//! may point at a JSON editor configuration.

use anyhow::{bail, Context, Result};
use cim_domain_argument::{DocumentFormat, EditorConfig, InMemoryGraphCache, SessionController};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (input, format, output) = match args.as_slice() {
        [input, format] => (PathBuf::from(input), format, None),
        [input, format, output] => (PathBuf::from(input), format, Some(PathBuf::from(output))),
        _ => bail!("usage: argument-graph-convert <input.json> <aif|arguebuf> [output.json]"),
    };
    let Ok(format) = format.parse::<DocumentFormat>() else {
        bail!("unknown output format '{format}', expected 'aif' or 'arguebuf'");
    };

    let config = match std::env::var_os("EDITOR_CONFIG") {
        Some(path) => EditorConfig::load_or_default(Path::new(&path))?,
        None => EditorConfig::default(),
    };

    let bytes = fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
    let mut session = SessionController::new(config, Arc::new(InMemoryGraphCache::new()));
    let pending = session
        .prepare_import(&bytes)
        .with_context(|| format!("importing {}", input.display()))?;
    tracing::info!(source = ?pending.source(), "Input parsed");
    session.reset_graph(pending).await;

    let report = session.graph().validate();
    if !report.dangling_schemes.is_empty() {
        tracing::warn!(
            count = report.dangling_schemes.len(),
            "Graph contains schemes without edges"
        );
    }

    let document = session.export_json(format)?;
    match output {
        Some(path) => {
            fs::write(&path, document).with_context(|| format!("writing {}", path.display()))?;
            eprintln!(
                "Converted {} nodes and {} edges to {}",
                session.graph().node_count(),
                session.graph().edge_count(),
                path.display()
            );
        }
        None => println!("{document}"),
    }

    Ok(())
}
