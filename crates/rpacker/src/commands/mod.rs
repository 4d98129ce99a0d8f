use std::path::{Path, PathBuf};

use miette::{bail, Result};
use rpack::project::{self, ARCHIVE_EXTENSION};
use rpack::RepackOptions;
use tracing::{error, info};

/// Process every path, carrying on after failures so one bad archive does
/// not stop a batch. Fails overall when any path failed.
pub fn run(paths: &[PathBuf], options: RepackOptions) -> Result<()> {
    let mut failures = 0usize;

    for path in paths {
        if let Err(report) = dispatch(path, options) {
            error!("{}: {report:?}", path.display());
            failures += 1;
        }
    }

    if failures > 0 {
        bail!("{failures} of {} paths failed", paths.len());
    }
    Ok(())
}

fn dispatch(path: &Path, options: RepackOptions) -> Result<()> {
    if path.is_file() {
        let is_archive = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ARCHIVE_EXTENSION));
        if !is_archive {
            bail!("{} is not an .{ARCHIVE_EXTENSION} archive", path.display());
        }

        let out_dir = rpack::unpack_archive(path)?;
        info!("unpacked into {}", out_dir.display());
        return Ok(());
    }

    if path.is_dir() {
        let has_project = project::project_path_for_directory(path)
            .is_some_and(|project_path| project_path.is_file());

        let archive = if has_project {
            rpack::repack_directory(path, options)?
        } else {
            rpack::assemble_directory(path, options)?
        };
        info!("created {}", archive.display());
        return Ok(());
    }

    bail!("{} does not exist", path.display());
}
