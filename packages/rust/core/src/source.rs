//! Route listing sources.
//!
//! Routes come either from running the framework's introspection command
//! (`php artisan route:list --json` by default) or from a file holding its
//! output. Either way the text is parsed by [`parse_routes`].

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info, instrument};

use routeman_shared::{AppConfig, RawRoute, Result, RouteDescriptor, RoutemanError};

/// The external command that prints the route listing as JSON.
#[derive(Debug, Clone)]
pub struct RouteCommand {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl From<&AppConfig> for RouteCommand {
    fn from(config: &AppConfig) -> Self {
        Self {
            program: config.routes.command.clone(),
            args: config.routes.args.clone(),
            working_dir: config.routes.working_dir.clone(),
        }
    }
}

impl std::fmt::Display for RouteCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Run the route-listing command and return its stdout.
#[instrument(skip_all, fields(command = %cmd))]
pub fn run_route_command(cmd: &RouteCommand) -> Result<String> {
    info!(working_dir = ?cmd.working_dir, "running route listing command");

    let mut command = Command::new(&cmd.program);
    command
        .args(&cmd.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = &cmd.working_dir {
        command.current_dir(dir);
    }

    let output = command.output().map_err(|e| RoutemanError::UpstreamCommand {
        command: cmd.to_string(),
        status: "failed to start".into(),
        stderr: format!("{e}. Is `{}` installed?", cmd.program),
    })?;

    if !output.status.success() {
        return Err(RoutemanError::UpstreamCommand {
            command: cmd.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    debug!(bytes = output.stdout.len(), "route listing captured");

    String::from_utf8(output.stdout).map_err(|e| {
        let lossy = String::from_utf8_lossy(e.as_bytes()).into_owned();
        RoutemanError::malformed(format!("output is not UTF-8: {}", e.utf8_error()), &lossy)
    })
}

/// Read a previously exported route listing from disk.
pub fn read_route_file(path: &Path) -> Result<String> {
    info!(?path, "reading route listing file");
    std::fs::read_to_string(path).map_err(|e| RoutemanError::io(path, e))
}

/// Parse a JSON route listing into descriptors, preserving order.
#[instrument(skip_all, fields(bytes = json.len()))]
pub fn parse_routes(json: &str) -> Result<Vec<RouteDescriptor>> {
    let raw: Vec<RawRoute> = serde_json::from_str(json)
        .map_err(|e| RoutemanError::malformed(e.to_string(), json))?;

    let routes = raw
        .into_iter()
        .map(RouteDescriptor::try_from)
        .collect::<Result<Vec<_>>>()?;

    debug!(route_count = routes.len(), "route listing parsed");
    Ok(routes)
}
