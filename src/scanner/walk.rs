use glob::Pattern;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, warn};
use walkdir::{DirEntry, WalkDir};

use crate::files::has_extension;

fn compile_patterns(ignore_globs: &[String]) -> Vec<Pattern> {
    ignore_globs
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(p) => Some(p),
            Err(e) => {
                error!("Invalid glob pattern '{}': {}", glob, e);
                None
            }
        })
        .collect()
}

fn is_excluded_dir(entry: &DirEntry, skip_dir_names: &[&str], ignore: &[Pattern]) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let named_like_overflow = entry
        .file_name()
        .to_str()
        .map(|name| skip_dir_names.contains(&name))
        .unwrap_or(false);
    named_like_overflow || ignore.iter().any(|p| p.matches_path(entry.path()))
}

/// Every directory under `root_paths` that directly holds an image.
///
/// Overflow directories (`skip_dir_names`) and directories matching an
/// ignore glob are neither returned nor descended into. Directories are
/// canonicalized, so each appears once however many roots reach it, and
/// come back sorted.
pub fn find_listing_directories(
    root_paths: &[String],
    skip_dir_names: &[&str],
    ignore_globs: &[String],
    image_extensions: &[String],
) -> Vec<PathBuf> {
    let ignore = compile_patterns(ignore_globs);
    let mut found: BTreeSet<PathBuf> = BTreeSet::new();

    for root in root_paths {
        let root = Path::new(root);
        if !root.is_dir() {
            warn!("Root {} is not a directory; skipping", root.display());
            continue;
        }

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_excluded_dir(e, skip_dir_names, &ignore));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    error!("Error walking {}: {}", root.display(), err);
                    continue;
                }
            };
            if !entry.file_type().is_file() || !has_extension(entry.path(), image_extensions) {
                continue;
            }
            let Some(parent) = entry.path().parent() else {
                continue;
            };
            match fs::canonicalize(parent) {
                Ok(dir) => {
                    found.insert(dir);
                }
                Err(err) => error!("Error canonicalizing {}: {}", parent.display(), err),
            }
        }
    }

    found.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    fn images() -> Vec<String> {
        vec!["jpg".to_string(), "png".to_string()]
    }

    #[test]
    fn test_finds_directories_with_images_only() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        touch(&root.join("dog/간식/껌 100g.jpg"));
        touch(&root.join("dog/간식/껌 100g.json"));
        touch(&root.join("dog/사료/meta.txt"));
        touch(&root.join("cat/모래 5L.png"));

        let dirs = find_listing_directories(
            &[root.to_string_lossy().into_owned()],
            &["다른 무게 물건", "초과 파일"],
            &[],
            &images(),
        );

        let canonical = fs::canonicalize(root).unwrap();
        assert_eq!(
            dirs,
            vec![canonical.join("cat"), canonical.join("dog/간식")]
        );
    }

    #[test]
    fn test_overflow_and_ignored_directories_are_not_entered() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        touch(&root.join("간식/다른 무게 물건/껌 1kg.jpg"));
        touch(&root.join("간식/초과 파일/nested/껌 2kg.jpg"));
        touch(&root.join("old/껌 3kg.jpg"));

        let dirs = find_listing_directories(
            &[root.to_string_lossy().into_owned()],
            &["다른 무게 물건", "초과 파일"],
            &["*/old".to_string()],
            &images(),
        );
        assert!(dirs.is_empty());
    }

    #[test]
    fn test_overlapping_roots_yield_each_directory_once() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        touch(&root.join("a/x 1kg.jpg"));

        let dirs = find_listing_directories(
            &[
                root.to_string_lossy().into_owned(),
                root.join("a").to_string_lossy().into_owned(),
            ],
            &[],
            &[],
            &images(),
        );
        assert_eq!(dirs.len(), 1);
    }
}
