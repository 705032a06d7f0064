//! File system operations (read, write, rename, atomic replace).

use anyhow::{Context, Result};
use log::debug;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use super::{RealRuntime, Runtime};

impl RealRuntime {
    #[tracing::instrument(skip(self, contents))]
    pub(crate) fn write_impl(&self, path: &Path, contents: &[u8]) -> Result<()> {
        fs::write(path, contents).context("Failed to write to file")?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn read_to_string_impl(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).context("Failed to read file to string")
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn rename_impl(&self, from: &Path, to: &Path) -> Result<()> {
        fs::rename(from, to).context("Failed to rename file")?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn remove_file_impl(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).context("Failed to remove file")?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn exists_impl(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Sibling path used as the staging file for [`write_atomic`].
fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(".aurbump-tmp");
    path.with_file_name(name)
}

/// Replace `path` with `contents` without ever leaving a half-written file.
///
/// The content is written to a sibling staging file first and then renamed
/// over the target, so readers see either the old or the new file.
#[tracing::instrument(skip(runtime, contents))]
pub fn write_atomic<R: Runtime + ?Sized>(runtime: &R, path: &Path, contents: &[u8]) -> Result<()> {
    let staging = staging_path(path);
    debug!("Writing {:?} via {:?}", path, staging);

    runtime
        .write(&staging, contents)
        .with_context(|| format!("Failed to write {:?}", staging))?;

    if let Err(e) = runtime.rename(&staging, path) {
        let _ = runtime.remove_file(&staging);
        return Err(e).with_context(|| format!("Failed to replace {:?}", path));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MockRuntime, RealRuntime, Runtime};
    use mockall::predicate::eq;
    use tempfile::tempdir;

    #[test]
    fn test_real_runtime_file_ops() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.txt");

        runtime.write(&file_path, b"hello").unwrap();
        assert!(runtime.exists(&file_path));

        let content = runtime.read_to_string(&file_path).unwrap();
        assert_eq!(content, "hello");

        let new_path = dir.path().join("renamed.txt");
        runtime.rename(&file_path, &new_path).unwrap();
        assert!(!runtime.exists(&file_path));
        assert!(runtime.exists(&new_path));

        runtime.remove_file(&new_path).unwrap();
        assert!(!runtime.exists(&new_path));
    }

    #[test]
    fn test_real_runtime_errors() {
        let runtime = RealRuntime;

        let result = runtime.read_to_string(Path::new("/nonexistent/path/file.txt"));
        assert!(result.is_err());

        let result = runtime.remove_file(Path::new("/nonexistent/path/file.txt"));
        assert!(result.is_err());
    }

    #[test]
    fn test_staging_path_is_hidden_sibling() {
        assert_eq!(
            staging_path(Path::new("/pkg/PKGBUILD")),
            PathBuf::from("/pkg/.PKGBUILD.aurbump-tmp")
        );
        assert_eq!(
            staging_path(Path::new(".SRCINFO")),
            PathBuf::from("..SRCINFO.aurbump-tmp")
        );
    }

    #[test]
    fn test_write_atomic_replaces_existing_file() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let path = dir.path().join("PKGBUILD");
        std::fs::write(&path, "old").unwrap();

        write_atomic(&runtime, &path, b"new").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert!(!staging_path(&path).exists());
    }

    #[test]
    fn test_write_atomic_cleans_up_when_rename_fails() {
        let path = Path::new("/pkg/PKGBUILD");
        let staging = staging_path(path);

        let mut runtime = MockRuntime::new();
        runtime
            .expect_write()
            .with(eq(staging.clone()), eq(b"new".to_vec()))
            .returning(|_, _| Ok(()));
        runtime
            .expect_rename()
            .returning(|_, _| Err(anyhow::anyhow!("cross-device link")));
        runtime
            .expect_remove_file()
            .with(eq(staging))
            .times(1)
            .returning(|_| Ok(()));

        let result = write_atomic(&runtime, path, b"new");
        assert!(result.is_err());
    }
}
