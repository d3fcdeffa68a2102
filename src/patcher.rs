//! Directory sweep: find HTML files under a root and patch each in place.
//!
//! Every file is processed independently (read, resolve, inject, write), so
//! a failure on one file never interrupts the sweep; it is folded into the
//! run counters instead.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use walkdir::{DirEntry, WalkDir};

use crate::encoding;
use crate::inject::{self, PatchResult};

/// Directory names never descended into.
///
/// `_vti_cnf` is FrontPage server metadata and shadows every page of the
/// site it manages with a stub copy.
pub const IGNORE_DIRS: [&str; 3] = ["_vti_cnf", ".git", "node_modules"];

/// Options for a patch run over a directory tree.
#[derive(Debug, Clone)]
pub struct PatchOptions {
    /// Create a sibling `.bak` copy before the first overwrite.
    pub backup: bool,
    /// Print one line per patched or skipped file.
    pub verbose: bool,
    /// Directory names skipped entirely during traversal.
    pub ignore_dirs: Vec<String>,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            backup: false,
            verbose: false,
            ignore_dirs: IGNORE_DIRS.iter().map(|name| name.to_string()).collect(),
        }
    }
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchStats {
    /// HTML files visited.
    pub scanned: usize,
    /// Files rewritten with the loader inserted.
    pub patched: usize,
    /// Files that could not be read or written back.
    pub skipped: usize,
}

/// Per-file result of [`patch_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// Loader inserted and the file rewritten in its original encoding.
    Patched,
    /// Already referenced the loader; nothing was written.
    Unchanged,
}

/// Patch a single file in place, preserving its original encoding.
///
/// With `opts.backup` set, a `.bak` sibling holding the original bytes is
/// created before the first overwrite. An existing backup is never
/// overwritten, so re-runs keep the oldest copy.
pub fn patch_file(path: &Path, opts: &PatchOptions) -> Result<FileOutcome> {
    let raw =
        fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let (text, text_encoding) = encoding::resolve(&raw);

    let patched = match inject::inject(&text) {
        PatchResult::Unchanged => return Ok(FileOutcome::Unchanged),
        PatchResult::Patched(patched) => patched,
    };

    let bytes = text_encoding
        .encode(&patched)
        .with_context(|| format!("cannot re-encode {}", path.display()))?;

    if opts.backup {
        let backup = backup_path(path);
        if !backup.exists() {
            fs::copy(path, &backup)
                .with_context(|| format!("failed to back up {}", path.display()))?;
        }
    }

    fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(FileOutcome::Patched)
}

/// Walk `root` and patch every HTML/HTM file found.
///
/// The only propagating error is a missing root. Per-file read and write
/// failures increment [`PatchStats::skipped`] and the sweep continues.
pub fn run(root: &Path, opts: &PatchOptions) -> Result<PatchStats> {
    if !root.exists() {
        bail!("folder not found: {}", root.display());
    }

    let mut stats = PatchStats::default();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !is_ignored(entry, &opts.ignore_dirs));

    for entry in walker.filter_map(|entry| entry.ok()) {
        if !entry.file_type().is_file() || !is_html(entry.path()) {
            continue;
        }

        stats.scanned += 1;
        match patch_file(entry.path(), opts) {
            Ok(FileOutcome::Patched) => {
                stats.patched += 1;
                if opts.verbose {
                    println!("Patched: {}", entry.path().display());
                }
            }
            Ok(FileOutcome::Unchanged) => {}
            Err(err) => {
                stats.skipped += 1;
                if opts.verbose {
                    println!("Skipped: {} ({:#})", entry.path().display(), err);
                }
            }
        }
    }

    Ok(stats)
}

/// Sibling backup path: `page.html` becomes `page.html.bak`.
fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}

fn is_ignored(entry: &DirEntry, ignore_dirs: &[String]) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| ignore_dirs.iter().any(|dir| dir == name))
        .unwrap_or(false)
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
        .unwrap_or(false)
}
