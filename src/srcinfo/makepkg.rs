//! `.SRCINFO` produced by `makepkg --printsrcinfo`.

use anyhow::{Context, Result};
use std::path::Path;

use crate::runtime::{CommandSpec, Runtime};

/// Command that prints the `.SRCINFO` for the PKGBUILD at `pkgbuild_path`.
pub fn printsrcinfo_command(pkgbuild_path: &Path) -> CommandSpec {
    let mut command = CommandSpec::new("makepkg").arg("--printsrcinfo");

    if let Some(name) = pkgbuild_path.file_name() {
        if name != "PKGBUILD" {
            command = command.arg("-p").arg(name.to_string_lossy());
        }
    }

    match pkgbuild_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => command.current_dir(dir),
        _ => command,
    }
}

/// Run makepkg and return the printed `.SRCINFO`.
#[tracing::instrument(skip(runtime))]
pub async fn printsrcinfo<R: Runtime>(runtime: &R, pkgbuild_path: &Path) -> Result<String> {
    let command = printsrcinfo_command(pkgbuild_path);
    let output = runtime
        .run(&command)
        .await
        .context("Failed to run makepkg --printsrcinfo")?;

    if !output.success {
        anyhow::bail!(
            "makepkg --printsrcinfo exited with {:?}: {}",
            output.code,
            output.stderr.trim()
        );
    }
    if output.stdout.trim().is_empty() {
        anyhow::bail!("makepkg --printsrcinfo produced no output");
    }

    Ok(output.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{CommandOutput, MockRuntime};
    use std::path::PathBuf;

    #[test]
    fn test_command_for_default_name() {
        let command = printsrcinfo_command(Path::new("/pkg/PKGBUILD"));
        assert_eq!(command.program, "makepkg");
        assert_eq!(command.args, vec!["--printsrcinfo"]);
        assert_eq!(command.dir, Some(PathBuf::from("/pkg")));
    }

    #[test]
    fn test_command_for_custom_name_and_relative_path() {
        let command = printsrcinfo_command(Path::new("PKGBUILD.git"));
        assert_eq!(command.args, vec!["--printsrcinfo", "-p", "PKGBUILD.git"]);
        assert_eq!(command.dir, None);
    }

    #[tokio::test]
    async fn test_printsrcinfo_success() {
        let mut runtime = MockRuntime::new();
        runtime.expect_run().returning(|_| {
            Ok(CommandOutput {
                success: true,
                code: Some(0),
                stdout: "pkgbase = foo\n".to_string(),
                stderr: String::new(),
            })
        });

        let out = printsrcinfo(&runtime, Path::new("/pkg/PKGBUILD"))
            .await
            .unwrap();
        assert_eq!(out, "pkgbase = foo\n");
    }

    #[tokio::test]
    async fn test_printsrcinfo_failure() {
        let mut runtime = MockRuntime::new();
        runtime.expect_run().returning(|_| {
            Ok(CommandOutput {
                success: false,
                code: Some(1),
                stdout: String::new(),
                stderr: "==> ERROR: PKGBUILD does not exist.".to_string(),
            })
        });

        let err = printsrcinfo(&runtime, Path::new("/pkg/PKGBUILD"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("PKGBUILD does not exist"));
    }
}
