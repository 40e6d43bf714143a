//! Staging copy of an extension
//!
//! With a work directory configured, the run operates on a timestamped copy
//! so the source extension is never touched.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Copy `source` to `<workdir>/<extension>-<unix timestamp>` and return the copy
pub fn stage(source: &Path, workdir: &Path, extension: &str) -> io::Result<PathBuf> {
    let target = workdir.join(format!("{}-{}", extension, chrono::Utc::now().timestamp()));
    copy_tree(source, &target)?;

    tracing::debug!(
        source = %source.display(),
        target = %target.display(),
        "staged extension"
    );
    Ok(target)
}

/// Recursively copy a directory tree
fn copy_tree(source: &Path, target: &Path) -> io::Result<()> {
    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(io::Error::other)?;
        let dest = target.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)?;
        } else {
            fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_copies_tree() {
        let source = tempfile::tempdir().unwrap();
        let workdir = tempfile::tempdir().unwrap();
        fs::create_dir_all(source.path().join("k8s/nested")).unwrap();
        fs::write(source.path().join("manifest.yaml"), "name: demo\n").unwrap();
        fs::write(source.path().join("k8s/nested/cm.yaml"), "kind: ConfigMap\n").unwrap();

        let staged = stage(source.path(), workdir.path(), "demo").unwrap();

        assert!(staged.starts_with(workdir.path()));
        let dir_name = staged.file_name().unwrap().to_string_lossy().to_string();
        let (name, ts) = dir_name.rsplit_once('-').unwrap();
        assert_eq!(name, "demo");
        assert!(ts.parse::<i64>().is_ok());

        assert_eq!(
            fs::read_to_string(staged.join("k8s/nested/cm.yaml")).unwrap(),
            "kind: ConfigMap\n"
        );
        assert!(staged.join("manifest.yaml").is_file());
    }

    #[test]
    fn test_stage_missing_source() {
        let workdir = tempfile::tempdir().unwrap();
        assert!(stage(&workdir.path().join("absent"), workdir.path(), "x").is_err());
    }
}
