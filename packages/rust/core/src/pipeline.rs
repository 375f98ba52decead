//! End-to-end `generate` pipeline: route listing → descriptors → collection → file.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, instrument, warn};

use routeman_shared::{AppConfig, Result};

use crate::builder::{self, BuildOptions};
use crate::source::{self, RouteCommand};
use crate::writer;

/// Where the route listing comes from.
#[derive(Debug, Clone)]
pub enum RouteSource {
    /// Run the introspection command.
    Command(RouteCommand),
    /// Read an exported listing from a file.
    File(PathBuf),
}

/// Where the collection goes.
#[derive(Debug, Clone)]
pub enum OutputTarget {
    File(PathBuf),
    /// Return the rendered text instead of writing it.
    Stdout,
}

/// Configuration for the `generate` pipeline.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub source: RouteSource,
    pub build: BuildOptions,
    pub output: OutputTarget,
}

impl From<&AppConfig> for GenerateConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            source: RouteSource::Command(RouteCommand::from(config)),
            build: BuildOptions::from(config),
            output: OutputTarget::File(config.output.path.clone()),
        }
    }
}

/// Result of the `generate` pipeline.
#[derive(Debug)]
pub struct GenerateResult {
    /// File written, when the target was a file.
    pub output_path: Option<PathBuf>,
    /// Rendered collection, when the target was stdout.
    pub rendered: Option<String>,
    pub route_count: usize,
    pub folder_count: usize,
    pub request_count: usize,
    /// HEAD-only routes that were dropped.
    pub skipped: usize,
    pub bytes: usize,
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, result: &GenerateResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _result: &GenerateResult) {}
}

/// Run the full `generate` pipeline.
///
/// 1. Load the route listing (command or file)
/// 2. Parse it into descriptors
/// 3. Build the collection
/// 4. Write it (or render it for stdout)
///
/// Nothing is written unless every earlier phase succeeds.
#[instrument(skip_all)]
pub fn generate(
    config: &GenerateConfig,
    progress: &dyn ProgressReporter,
) -> Result<GenerateResult> {
    let start = Instant::now();

    // --- Phase 1: Route listing ---
    let listing = match &config.source {
        RouteSource::Command(cmd) => {
            progress.phase(&format!("Running {cmd}"));
            source::run_route_command(cmd)?
        }
        RouteSource::File(path) => {
            progress.phase(&format!("Reading {}", path.display()));
            source::read_route_file(path)?
        }
    };

    // --- Phase 2: Parse ---
    progress.phase("Parsing routes");
    let routes = source::parse_routes(&listing)?;
    if routes.is_empty() {
        warn!("route listing is empty, collection will have no requests");
    }

    // --- Phase 3: Build ---
    progress.phase("Building collection");
    let built = builder::build_collection(&routes, &config.build);
    let collection = &built.collection;

    // --- Phase 4: Output ---
    let (output_path, rendered, bytes) = match &config.output {
        OutputTarget::File(path) => {
            progress.phase(&format!("Writing {}", path.display()));
            let bytes = writer::write_collection(collection, path)?;
            (Some(path.clone()), None, bytes)
        }
        OutputTarget::Stdout => {
            let text = writer::render_collection(collection)?;
            let bytes = text.len();
            (None, Some(text), bytes)
        }
    };

    let result = GenerateResult {
        output_path,
        rendered,
        route_count: routes.len(),
        folder_count: collection.folders.len(),
        request_count: collection.request_count(),
        skipped: built.skipped,
        bytes,
        elapsed: start.elapsed(),
    };

    info!(
        routes = result.route_count,
        folders = result.folder_count,
        requests = result.request_count,
        skipped = result.skipped,
        elapsed_ms = result.elapsed.as_millis() as u64,
        "generate pipeline complete"
    );

    progress.done(&result);
    Ok(result)
}
