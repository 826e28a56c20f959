//! Replay a message script against a model

use anyhow::{Context, Result, bail};
use clap::Args;
use plugboard_api::{Message, Model};
use plugboard_core::{HandlerFailure, HostConfig, MigrationSet, PluginRegistry};
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::host::Host;

/// Replay arguments
#[derive(Args)]
pub struct ReplayArgs {
    /// Initial model (JSON object); starts from an empty model if omitted
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Message script, one JSON message per line ("-" for stdin)
    #[arg(long)]
    pub script: PathBuf,

    /// Render this view (plugin id or tab) after the last message
    #[arg(long)]
    pub render: Option<String>,

    /// Skip model migrations
    #[arg(long)]
    pub no_migrate: bool,
}

/// Outcome of a replay
#[derive(Debug)]
pub struct ReplayReport {
    pub model: Model,
    /// Number of messages applied
    pub applied: usize,
    /// Handler failures, with the script line that caused them
    pub failures: Vec<(usize, HandlerFailure)>,
}

/// Run replay command
pub fn run(args: ReplayArgs, config: HostConfig) -> Result<()> {
    let host = Host::new(config);

    let mut model = match &args.model {
        Some(path) => read_model(path)?,
        None => Model::new(),
    };
    if !args.no_migrate {
        model = MigrationSet::reference()
            .migrate(&model)
            .context("migrating model")?;
    }

    let script = read_script(&args.script)?;
    let report = replay(&host.registry, model, &script)?;

    for (line, failure) in &report.failures {
        eprintln!(
            "line {}: {} failed on {}: {}",
            line, failure.plugin_id, failure.kind, failure.error
        );
    }

    println!("{}", serde_json::to_string_pretty(&report.model)?);

    if let Some(view) = &args.render {
        match host.registry.render(view, &report.model) {
            Some(markup) => println!("{markup}"),
            None => bail!("view '{}' not found or failed to render", view),
        }
    }

    Ok(())
}

/// Apply every message of `script` in order.
///
/// Blank lines and lines starting with `#` are skipped. A line that does not
/// decode to a message aborts the replay.
pub fn replay(registry: &PluginRegistry, model: Model, script: &str) -> Result<ReplayReport> {
    let mut current = model;
    let mut applied = 0;
    let mut failures = Vec::new();

    for (idx, line) in script.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let raw: Value = serde_json::from_str(line)
            .with_context(|| format!("line {line_no}: invalid JSON"))?;
        let message = Message::from_json(&raw).with_context(|| format!("line {line_no}"))?;

        tracing::debug!(line = line_no, kind = %message.kind, "Applying message");
        let outcome = registry.route(&message, &current);
        current = outcome.model;
        applied += 1;
        failures.extend(outcome.failures.into_iter().map(|f| (line_no, f)));
    }

    Ok(ReplayReport {
        model: current,
        applied,
        failures,
    })
}

fn read_model(path: &Path) -> Result<Model> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading model {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("parsing model {}", path.display()))?;
    Model::from_value(value).with_context(|| format!("model {} is not a JSON object", path.display()))
}

fn read_script(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut script = String::new();
        std::io::stdin().read_to_string(&mut script)?;
        return Ok(script);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading script {}", path.display()))
}
