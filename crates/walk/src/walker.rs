use std::fs;
use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use crate::{EntryKind, EntryStat, WalkError};

/// Callback invoked once per tree entry: absolute path, slash-separated
/// path relative to the walk root, and the entry's stat record. The walk
/// root itself is never passed to this callback.
pub type Visit<'a> = dyn FnMut(&Path, &str, &EntryStat) -> Result<(), WalkError> + 'a;

/// A tree-enumeration strategy: given a root and a visit callback, invokes
/// the callback exactly once for every entry under `root` (skipping the
/// root itself), in whatever order the strategy considers stable.
pub type Traverser<'a> = dyn Fn(&Path, &mut Visit<'_>) -> Result<(), WalkError> + 'a;

/// This crate's own traverser: a deterministic, sorted-by-name recursive
/// directory walk. Satisfies the [`Traverser`] contract directly, so a
/// caller with no custom traversal policy can pass this function where one
/// is expected.
///
/// # Errors
///
/// See [`walk`].
pub fn default_traverser(root: &Path, visit: &mut Visit<'_>) -> Result<(), WalkError> {
    walk(root, visit)
}

/// Recursively walks `root`, visiting every directory, regular file, and
/// symlink beneath it (and anything else the platform reports, tagged
/// [`EntryKind::Other`]) in ascending byte order of each directory level's
/// entry names. The root itself is never visited. A directory entry is
/// visited before its children.
///
/// Sorting by name at every level makes two walks of an unchanged tree
/// produce an identical entry sequence, regardless of the underlying
/// filesystem's own directory-entry order.
///
/// # Errors
///
/// Returns [`WalkError::Io`] if a directory cannot be listed or an entry
/// cannot be stat'd or (for a symlink) have its target read, and
/// [`WalkError::NonUtf8Path`] if an entry's name or symlink target is not
/// valid UTF-8. Propagates any error the `visit` callback returns.
pub fn walk(root: &Path, visit: &mut Visit<'_>) -> Result<(), WalkError> {
    walk_dir(root, root, visit)
}

fn walk_dir(root: &Path, dir: &Path, visit: &mut Visit<'_>) -> Result<(), WalkError> {
    let mut entries = fs::read_dir(dir)
        .map_err(|source| io_err(dir, source))?
        .collect::<io::Result<Vec<_>>>()
        .map_err(|source| io_err(dir, source))?;
    entries.sort_by_key(fs::DirEntry::file_name);

    for entry in entries {
        let absolute = entry.path();
        let relative = relative_slash_path(root, &absolute)?;
        let metadata = entry.metadata().map_err(|source| io_err(&absolute, source))?;
        let stat = build_stat(&absolute, &metadata)?;
        let is_dir = stat.kind() == EntryKind::Directory;

        visit(&absolute, &relative, &stat)?;

        if is_dir {
            walk_dir(root, &absolute, visit)?;
        }
    }
    Ok(())
}

fn build_stat(path: &Path, metadata: &fs::Metadata) -> Result<EntryStat, WalkError> {
    let file_type = metadata.file_type();
    let (kind, len, link_target) = if file_type.is_symlink() {
        let target = fs::read_link(path).map_err(|source| io_err(path, source))?;
        let target = target
            .to_str()
            .ok_or_else(|| WalkError::NonUtf8Path { path: path.to_path_buf() })?
            .to_string();
        (EntryKind::Symlink, 0, Some(target))
    } else if file_type.is_dir() {
        (EntryKind::Directory, 0, None)
    } else if file_type.is_file() {
        (EntryKind::Regular, metadata.len(), None)
    } else {
        (EntryKind::Other, 0, None)
    };

    Ok(EntryStat::from_raw_parts(
        kind,
        len,
        metadata.mode(),
        metadata.mtime().max(0) as u64,
        metadata.mtime_nsec().max(0) as u32,
        link_target,
    ))
}

fn relative_slash_path(root: &Path, absolute: &Path) -> Result<String, WalkError> {
    let relative = absolute.strip_prefix(root).expect("walked entry is always under its root");
    let mut out = String::new();
    for (i, component) in relative.components().enumerate() {
        if i > 0 {
            out.push('/');
        }
        let part = component
            .as_os_str()
            .to_str()
            .ok_or_else(|| WalkError::NonUtf8Path { path: absolute.to_path_buf() })?;
        out.push_str(part);
    }
    Ok(out)
}

fn io_err(path: &Path, source: io::Error) -> WalkError {
    WalkError::Io { path: path.to_path_buf(), source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::symlink;

    use tempfile::TempDir;

    fn collect(root: &Path) -> Vec<(String, EntryKind)> {
        let mut seen = Vec::new();
        walk(root, &mut |_abs, rel, stat| {
            seen.push((rel.to_string(), stat.kind()));
            Ok(())
        })
        .unwrap();
        seen
    }

    #[test]
    fn empty_directory_has_no_entries() {
        let dir = TempDir::new().unwrap();
        assert!(collect(dir.path()).is_empty());
    }

    #[test]
    fn root_itself_is_never_visited() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), b"hi").unwrap();
        let seen = collect(dir.path());
        assert!(seen.iter().all(|(rel, _)| rel != "."));
    }

    #[test]
    fn entries_are_sorted_and_nested_directories_are_visited_before_children() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("z.txt"), b"z").unwrap();
        fs::create_dir(dir.path().join("mid")).unwrap();
        fs::write(dir.path().join("mid").join("inner.txt"), b"inner").unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();

        let seen = collect(dir.path());
        let names: Vec<_> = seen.iter().map(|(rel, _)| rel.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "mid", "mid/inner.txt", "z.txt"]);
    }

    #[test]
    fn regular_file_reports_size_and_kind() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("f.txt"), b"hello world").unwrap();

        let mut found = None;
        walk(dir.path(), &mut |_abs, rel, stat| {
            if rel == "f.txt" {
                found = Some(stat.clone());
            }
            Ok(())
        })
        .unwrap();

        let stat = found.unwrap();
        assert_eq!(stat.kind(), EntryKind::Regular);
        assert_eq!(stat.len(), 11);
    }

    #[test]
    fn symlink_reports_target() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("target.txt"), b"t").unwrap();
        symlink("target.txt", dir.path().join("link")).unwrap();

        let mut found = None;
        walk(dir.path(), &mut |_abs, rel, stat| {
            if rel == "link" {
                found = Some(stat.clone());
            }
            Ok(())
        })
        .unwrap();

        let stat = found.unwrap();
        assert_eq!(stat.kind(), EntryKind::Symlink);
        assert_eq!(stat.link_target(), Some("target.txt"));
    }

    #[test]
    fn visit_error_aborts_the_walk() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();
        fs::write(dir.path().join("b.txt"), b"b").unwrap();

        let mut calls = 0;
        let result = walk(dir.path(), &mut |_abs, _rel, _stat| {
            calls += 1;
            Err(WalkError::Io {
                path: dir.path().to_path_buf(),
                source: io::Error::other("boom"),
            })
        });

        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn default_traverser_matches_walk() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();

        let mut via_walk = Vec::new();
        walk(dir.path(), &mut |_abs, rel, _stat| {
            via_walk.push(rel.to_string());
            Ok(())
        })
        .unwrap();

        let mut via_default = Vec::new();
        default_traverser(dir.path(), &mut |_abs, rel, _stat| {
            via_default.push(rel.to_string());
            Ok(())
        })
        .unwrap();

        assert_eq!(via_walk, via_default);
    }
}
