//! ruffle-patch CLI
//!
//! Sweep a site tree and add the Ruffle loader to each HTML page.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use ruffle_patch::patcher::{self, PatchOptions};

#[derive(Parser, Debug)]
#[command(name = "ruffle-patch")]
#[command(version)]
#[command(about = "Add a Ruffle loader script into HTML/HTM files")]
struct Cli {
    /// Folder with the site (where index.html/main.htm live)
    root: PathBuf,

    /// Create .bak backups before modifying
    #[arg(long)]
    backup: bool,

    /// Print one line per patched or skipped file
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let opts = PatchOptions {
        backup: cli.backup,
        verbose: cli.verbose,
        ..PatchOptions::default()
    };

    let stats = patcher::run(&cli.root, &opts)?;

    println!(
        "Done. Scanned: {}, Patched: {}, Skipped(unreadable): {}",
        stats.scanned, stats.patched, stats.skipped
    );
    println!("Next: start a local server and open http://localhost:8000/");
    println!("If you have both index.html and main.htm, try both URLs.");

    Ok(())
}
