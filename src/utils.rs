use std::fs;
use std::path::{Path, PathBuf};
use time::macros::format_description;
use tracing::warn;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;

use crate::args::Args;

pub fn setup_logging(verbose: bool) {
    let level = if verbose { "info" } else { "warn" };
    let installed = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_timer(LocalTime::new(format_description!(
            "[hour]:[minute]:[second].[subsecond digits:3]"
        )))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    if let Err(e) = installed {
        warn!(action = "init", component = "logging", error = %e, "Logging was already installed; keeping the existing subscriber");
    }
}

pub fn format_number(num: u64) -> String {
    let digits = num.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Resolves `path` to the file it names, following `..` and symlinks.
///
/// A file that does not exist yet resolves through its parent directory.
fn resolve_file(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    match (fs::canonicalize(parent), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

pub fn same_file(a: &Path, b: &Path) -> bool {
    resolve_file(a) == resolve_file(b)
}

/// Fails when the report or the counts database would land on the source file.
pub fn ensure_outputs_spare_source(args: &Args) -> anyhow::Result<()> {
    if same_file(&args.input, &args.output) {
        anyhow::bail!(
            "--output {:?} points at the source file {:?}",
            args.output,
            args.input
        );
    }

    if let Some(db_path) = &args.counts_db {
        if same_file(&args.input, db_path) {
            anyhow::bail!(
                "--counts-db {:?} points at the source file {:?}",
                db_path,
                args.input
            );
        }
    }

    Ok(())
}

pub fn validate_args(args: &Args) -> anyhow::Result<()> {
    if args.top == 0 {
        anyhow::bail!("--top must be greater than 0");
    }

    ensure_outputs_spare_source(args)
}
