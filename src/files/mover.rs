use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use super::pair::FilePair;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovedFile {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Where every existing file of `pair` would land inside `dest_dir`.
///
/// Sidecars that no longer exist are left out; the image is always included.
pub fn plan_pair(pair: &FilePair, dest_dir: &Path) -> Vec<MovedFile> {
    pair.files()
        .enumerate()
        .filter(|(i, path)| *i == 0 || path.exists())
        .filter_map(|(_, path)| {
            path.file_name().map(|name| MovedFile {
                from: path.clone(),
                to: dest_dir.join(name),
            })
        })
        .collect()
}

/// Rename, falling back to copy + remove when rename is refused
/// (e.g. across filesystems).
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            if !from.is_file() {
                return Err(rename_err);
            }
            debug!(
                "rename {} failed ({}), copying instead",
                from.display(),
                rename_err
            );
            fs::copy(from, to)?;
            if let Err(err) = fs::remove_file(from) {
                let _ = fs::remove_file(to);
                return Err(err);
            }
            Ok(())
        }
    }
}

/// Move every file of `pair` into `dest_dir`, all or nothing.
///
/// Nothing moves if any destination already exists. If a later file fails,
/// files already moved are put back before the error is returned.
pub fn move_pair(pair: &FilePair, dest_dir: &Path) -> io::Result<Vec<MovedFile>> {
    move_pair_with(pair, dest_dir, move_file)
}

fn move_pair_with<F>(
    pair: &FilePair,
    dest_dir: &Path,
    mut mover: F,
) -> io::Result<Vec<MovedFile>>
where
    F: FnMut(&Path, &Path) -> io::Result<()>,
{
    let plan = plan_pair(pair, dest_dir);

    if !pair.image.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} does not exist", pair.image.display()),
        ));
    }
    if let Some(clash) = plan.iter().find(|m| m.to.exists()) {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", clash.to.display()),
        ));
    }

    fs::create_dir_all(dest_dir)?;

    let mut done: Vec<&MovedFile> = Vec::new();
    for step in &plan {
        if let Err(err) = mover(&step.from, &step.to) {
            for undo in done.iter().rev() {
                if let Err(undo_err) = mover(&undo.to, &undo.from) {
                    error!(
                        "Could not put {} back to {}: {}",
                        undo.to.display(),
                        undo.from.display(),
                        undo_err
                    );
                }
            }
            return Err(io::Error::new(
                err.kind(),
                format!("moving {}: {}", step.from.display(), err),
            ));
        }
        done.push(step);
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn pair_in(dir: &Path, stem: &str, sidecars: &[&str]) -> FilePair {
        let image = dir.join(format!("{stem}.jpg"));
        fs::write(&image, format!("image {stem}")).unwrap();
        let sidecars = sidecars
            .iter()
            .map(|ext| {
                let path = dir.join(format!("{stem}.{ext}"));
                fs::write(&path, format!("meta {stem}")).unwrap();
                path
            })
            .collect();
        FilePair {
            stem: stem.to_string(),
            image,
            sidecars,
        }
    }

    #[test]
    fn test_move_pair_moves_image_and_sidecars() {
        let dir = tempdir().unwrap();
        let pair = pair_in(dir.path(), "간식 100g", &["txt", "json"]);
        let dest = dir.path().join("moved");

        let moved = move_pair(&pair, &dest).unwrap();
        assert_eq!(moved.len(), 3);
        assert!(!pair.image.exists());
        assert_eq!(
            fs::read_to_string(dest.join("간식 100g.jpg")).unwrap(),
            "image 간식 100g"
        );
        assert!(dest.join("간식 100g.txt").exists());
        assert!(dest.join("간식 100g.json").exists());
    }

    #[test]
    fn test_missing_sidecar_is_not_an_error() {
        let dir = tempdir().unwrap();
        let pair = pair_in(dir.path(), "p", &["txt"]);
        fs::remove_file(&pair.sidecars[0]).unwrap();

        let moved = move_pair(&pair, &dir.path().join("out")).unwrap();
        assert_eq!(moved.len(), 1);
    }

    #[test]
    fn test_destination_clash_moves_nothing() {
        let dir = tempdir().unwrap();
        let pair = pair_in(dir.path(), "p", &["txt"]);
        let dest = dir.path().join("out");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("p.txt"), "already here").unwrap();

        let err = move_pair(&pair, &dest).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert!(pair.image.exists());
        assert!(pair.sidecars[0].exists());
        assert!(!dest.join("p.jpg").exists());
    }

    #[test]
    fn test_missing_image_fails() {
        let dir = tempdir().unwrap();
        let pair = pair_in(dir.path(), "p", &[]);
        fs::remove_file(&pair.image).unwrap();
        let err = move_pair(&pair, &dir.path().join("out")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_failed_sidecar_move_puts_image_back() {
        let dir = tempdir().unwrap();
        let pair = pair_in(dir.path(), "p", &["txt", "json"]);
        let dest = dir.path().join("out");

        let mut calls = 0;
        let err = move_pair_with(&pair, &dest, |from, to| {
            calls += 1;
            if calls == 2 {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
            }
            move_file(from, to)
        })
        .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        // image out, failed sidecar, image back
        assert_eq!(calls, 3);
        assert_eq!(fs::read_to_string(&pair.image).unwrap(), "image p");
        assert!(pair.sidecars.iter().all(|s| s.exists()));
        assert_eq!(fs::read_dir(&dest).unwrap().count(), 0);
    }
}
