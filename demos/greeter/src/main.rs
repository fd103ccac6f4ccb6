//! Greeter Demo
//!
//! Three modules discovered at link time:
//!
//! ```text
//! audience ──required──▶ greeter ◀──optional── loud
//! ```
//!
//! `greeter` reads the names from `audience` and, when `loud` is enabled,
//! shouts them.  Disabling `audience` rejects `greeter`; disabling `loud`
//! only changes the output.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package greeter -- run
//! cargo run --package greeter -- disable loud
//! cargo run --package greeter -- list
//! ```

mod audience;
mod greeter;
mod loud;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pulse::prelude::*;

#[derive(Parser)]
#[command(about = "Pulse greeter demo")]
struct Cli {
    /// Configuration file (defaults to pulse.toml in the current directory).
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Activate modules and wait for Ctrl+C.
    Run,
    /// Activate modules once, print the outcome and exit.
    Check,
    /// Show the registry.
    List,
    /// Mark a module enabled; it loads on the next run.
    Enable { name: String },
    /// Mark a module disabled; it and its dependents are left out of the next run.
    Disable { name: String },
    /// Forget a module; it is re-registered on the next run.
    Remove { name: String },
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder = PulseRuntime::builder();
    if let Some(path) = &cli.config {
        builder = builder.config_file(path);
    }
    let runtime = builder.build()?;

    match cli.command {
        Command::Run => runtime.run().await?,
        Command::Check => {
            let result = runtime.start().await?;
            if let Some(motd) = runtime.setting::<String>("motd").await? {
                println!("{motd}");
            }
            println!("order:    {}", result.order.join(" -> "));
            println!("active:   {}", result.activated.join(", "));
            for name in &result.skipped {
                println!("disabled: {name}");
            }
            for (name, rejection) in &result.rejected {
                println!("rejected: {name} ({rejection})");
            }
            if let Some(greeter) = runtime
                .namespace()
                .and_then(|ns| ns.get_as::<greeter::Greeter>("greeter"))
            {
                for line in greeter.lines() {
                    println!("{line}");
                }
            }
            runtime.stop().await?;
        }
        Command::List => {
            for (name, entry) in runtime.list_modules().await? {
                let status = if entry.enabled { "enabled" } else { "disabled" };
                println!("{name:<10} {:<8} {status}", entry.descriptor.version);
            }
        }
        Command::Enable { name } => runtime.enable_module(&name).await?,
        Command::Disable { name } => runtime.disable_module(&name).await?,
        Command::Remove { name } => {
            if !runtime.remove_module(&name).await? {
                println!("{name} was not registered");
            }
        }
    }

    Ok(())
}
