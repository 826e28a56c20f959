//! Message table command

use anyhow::Result;
use clap::Args;
use plugboard_api::MessageTable;
use plugboard_core::HostConfig;

use crate::host::Host;

/// Message table arguments
#[derive(Args)]
pub struct MessagesArgs {
    /// Only print this namespace
    #[arg(long)]
    pub namespace: Option<String>,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run messages command
pub fn run(args: MessagesArgs, config: HostConfig) -> Result<()> {
    let host = Host::new(config);
    let table = host.registry.messages();

    if args.json {
        let value = match &args.namespace {
            Some(ns) => serde_json::to_value(table.namespace(ns))?,
            None => serde_json::to_value(table)?,
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    print!("{}", format_table(table, args.namespace.as_deref()));
    Ok(())
}

fn format_table(table: &MessageTable, only: Option<&str>) -> String {
    let mut out = String::new();

    if only.is_none() {
        out.push_str("core\n");
        for (key, kind) in plugboard_api::core_messages::ALL {
            out.push_str(&format!("  {key:<20} {kind}\n"));
        }
    }

    for ns in table.namespaces() {
        if only.is_some_and(|o| o != ns) {
            continue;
        }
        out.push_str(&format!("{ns}\n"));
        for (key, kind) in table.namespace(ns).into_iter().flatten() {
            out.push_str(&format!("  {key:<20} {kind}\n"));
        }
    }

    out
}
