//! Input resolution: positional arguments to buffered byte sources.
//!
//! Arguments are file paths, glob patterns, or `-` for stdin. Matches are
//! deduplicated by absolute path and sorted by display name; stdin is
//! read once no matter how often `-` appears and sorts first under its
//! `-` key while displaying as `stdin`.

use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use lawdocx_engine::InputFile;

struct Resolved {
    sort_key: String,
    display: String,
    path: Option<PathBuf>,
}

pub fn resolve_inputs(args: &[String]) -> Result<Vec<InputFile>> {
    let mut resolved: Vec<Resolved> = Vec::new();
    let mut seen_paths: HashSet<PathBuf> = HashSet::new();
    let mut stdin_requested = false;

    for arg in args {
        if arg == "-" {
            stdin_requested = true;
            continue;
        }
        let mut matched = false;
        if let Ok(paths) = glob::glob(arg) {
            for entry in paths.flatten() {
                if !entry.is_file() {
                    continue;
                }
                matched = true;
                push_path(&mut resolved, &mut seen_paths, entry)?;
            }
        }
        if !matched {
            let literal = PathBuf::from(arg);
            if !literal.is_file() {
                bail!("no such file: {arg}");
            }
            push_path(&mut resolved, &mut seen_paths, literal)?;
        }
    }

    if stdin_requested {
        resolved.push(Resolved {
            sort_key: "-".to_string(),
            display: "stdin".to_string(),
            path: None,
        });
    }
    if resolved.is_empty() {
        bail!("no input files provided");
    }
    resolved.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
    tracing::debug!(count = resolved.len(), "resolved input files");

    let mut inputs = Vec::with_capacity(resolved.len());
    for entry in resolved {
        let bytes = match &entry.path {
            Some(path) => fs::read(path)
                .with_context(|| format!("failed to read {}", path.display()))?,
            None => {
                let mut buffer = Vec::new();
                std::io::stdin()
                    .read_to_end(&mut buffer)
                    .context("failed to read stdin")?;
                buffer
            }
        };
        inputs.push(InputFile::new(entry.display, bytes));
    }
    Ok(inputs)
}

fn push_path(
    resolved: &mut Vec<Resolved>,
    seen: &mut HashSet<PathBuf>,
    path: PathBuf,
) -> Result<()> {
    let canonical = path
        .canonicalize()
        .with_context(|| format!("failed to resolve {}", path.display()))?;
    if !seen.insert(canonical) {
        return Ok(());
    }
    let display = path.to_string_lossy().into_owned();
    resolved.push(Resolved {
        sort_key: display.clone(),
        display,
        path: Some(path),
    });
    Ok(())
}
