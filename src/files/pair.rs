use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// An image plus the same-stem metadata files that travel with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    pub stem: String,
    pub image: PathBuf,
    pub sidecars: Vec<PathBuf>,
}

impl FilePair {
    /// Image first, then sidecars.
    pub fn files(&self) -> impl Iterator<Item = &PathBuf> {
        std::iter::once(&self.image).chain(self.sidecars.iter())
    }
}

pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// List the file pairs directly inside `dir`, in file-name order.
///
/// Subdirectories are ignored. Sidecars without an image are not pairs.
pub fn collect_pairs(
    dir: &Path,
    image_extensions: &[String],
    sidecar_extensions: &[String],
) -> io::Result<Vec<FilePair>> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut sidecars: HashMap<String, Vec<PathBuf>> = HashMap::new();
    for path in paths.iter().filter(|p| has_extension(p, sidecar_extensions)) {
        sidecars.entry(stem_of(path)).or_default().push(path.clone());
    }

    let mut pairs: Vec<FilePair> = Vec::new();
    let mut seen: HashMap<String, PathBuf> = HashMap::new();
    for path in paths.iter().filter(|p| has_extension(p, image_extensions)) {
        let stem = stem_of(path);
        if let Some(first) = seen.get(&stem) {
            warn!(
                "Ignoring {}: shares its stem with {}",
                path.display(),
                first.display()
            );
            continue;
        }
        seen.insert(stem.clone(), path.clone());
        pairs.push(FilePair {
            sidecars: sidecars.remove(&stem).unwrap_or_default(),
            stem,
            image: path.clone(),
        });
    }

    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn exts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pairs_images_with_sidecars() {
        let dir = tempdir().unwrap();
        for name in ["b_3kg.png", "b_3kg.json", "a_1kg.JPG", "a_1kg.txt", "orphan.txt"] {
            fs::write(dir.path().join(name), name).unwrap();
        }
        fs::create_dir(dir.path().join("nested.jpg")).unwrap();

        let pairs = collect_pairs(
            dir.path(),
            &exts(&["jpg", "jpeg", "png"]),
            &exts(&["txt", "json"]),
        )
        .unwrap();

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].stem, "a_1kg");
        assert_eq!(pairs[0].sidecars, vec![dir.path().join("a_1kg.txt")]);
        assert_eq!(pairs[1].stem, "b_3kg");
        assert_eq!(pairs[1].files().count(), 2);
    }

    #[test]
    fn test_second_image_with_same_stem_is_ignored() {
        let dir = tempdir().unwrap();
        for name in ["x.jpg", "x.png", "x.txt"] {
            fs::write(dir.path().join(name), name).unwrap();
        }

        let pairs = collect_pairs(dir.path(), &exts(&["jpg", "png"]), &exts(&["txt"])).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].image, dir.path().join("x.jpg"));
        assert_eq!(pairs[0].sidecars.len(), 1);
    }
}
