//! Plugin listing command

use anyhow::Result;
use clap::Args;
use plugboard_core::{HostConfig, PluginInfo};

use crate::host::Host;

/// Plugin listing arguments
#[derive(Args)]
pub struct PluginsArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run plugins command
pub fn run(args: PluginsArgs, config: HostConfig) -> Result<()> {
    let host = Host::new(config);
    let plugins: Vec<PluginInfo> = host.registry.plugins().map(|p| p.info()).collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plugins)?);
        return Ok(());
    }

    for p in &plugins {
        println!("{}", format_plugin(p));
    }
    for (id, reason) in &host.skipped {
        println!("○ {}    {}", id, reason);
    }

    let tabs: Vec<&str> = host.registry.tabs().iter().map(|t| t.tab.as_str()).collect();
    if !tabs.is_empty() {
        println!();
        println!("Tabs: {}", tabs.join(", "));
    }

    Ok(())
}

fn format_plugin(p: &PluginInfo) -> String {
    let handles = if p.router {
        "all messages".to_string()
    } else if p.handlers.is_empty() {
        "no messages".to_string()
    } else {
        p.handlers.join(", ")
    };

    let mut line = format!("✓ {} v{}    {} ({})", p.id, p.version, p.name, handles);
    if !p.tabs.is_empty() {
        line.push_str(&format!("    tab: {}", p.tabs.join(", ")));
    }
    line
}
