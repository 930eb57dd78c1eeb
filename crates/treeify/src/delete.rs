use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::TreeifyError;

/// Walks `root` once and removes every entry not present in `keep`
/// (recursively for directories), matching §4.3 item 1: any destination
/// entry the sender did not declare is extraneous.
///
/// `keep` must contain every path the incoming file list announced,
/// including directories — a kept directory's ancestors are always kept
/// too, since the sender walks and announces every directory on the way
/// down to any file beneath it.
///
/// This stage runs to completion before anything else materializes, so it
/// can never race with — or accidentally delete — an entry the sender
/// does declare.
///
/// # Errors
///
/// Returns [`TreeifyError::Io`] if listing a directory or removing an
/// extraneous entry fails.
pub fn delete_extraneous(root: &Path, keep: &HashSet<PathBuf>) -> Result<(), TreeifyError> {
    if !root.exists() {
        return Ok(());
    }
    walk_and_prune(root, keep)
}

fn walk_and_prune(dir: &Path, keep: &HashSet<PathBuf>) -> Result<(), TreeifyError> {
    let entries = fs::read_dir(dir).map_err(|err| TreeifyError::io(dir, err))?;
    for entry in entries {
        let entry = entry.map_err(|err| TreeifyError::io(dir, err))?;
        let path = entry.path();

        if keep.contains(&path) {
            let file_type = entry.file_type().map_err(|err| TreeifyError::io(&path, err))?;
            if file_type.is_dir() {
                walk_and_prune(&path, keep)?;
            }
            continue;
        }

        let file_type = entry.file_type().map_err(|err| TreeifyError::io(&path, err))?;
        if file_type.is_dir() {
            fs::remove_dir_all(&path).map_err(|err| TreeifyError::io(&path, err))?;
        } else {
            fs::remove_file(&path).map_err(|err| TreeifyError::io(&path, err))?;
        }
    }
    Ok(())
}
