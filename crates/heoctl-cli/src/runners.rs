//! `helm` and `terraform` extensions
//!
//! These extension types are handed to the external tool; inputs become
//! `--set` or `-var` flags.

use heoctl_core::{LoadedExtension, ResolvedInputs};
use heoctl_kube::Action;
use std::path::Path;
use tokio::process::Command;

use crate::error::{CliError, Result};

/// Arguments for the helm invocation
///
/// `release` is the extension name given on the command line.
pub fn helm_args(
    extension: &LoadedExtension,
    release: &str,
    inputs: &ResolvedInputs,
    action: Action,
) -> Vec<String> {
    let name = release.to_string();

    match action {
        Action::Install => {
            let mut args = vec![
                "install".to_string(),
                name,
                extension.helm_chart_dir().display().to_string(),
            ];
            for (key, value) in inputs.to_string_pairs() {
                args.push("--set".to_string());
                args.push(format!("{}={}", key, value));
            }
            args
        }
        Action::Uninstall => vec!["uninstall".to_string(), name],
    }
}

/// Terraform invocations, in order
pub fn terraform_steps(inputs: &ResolvedInputs, action: Action) -> Vec<Vec<String>> {
    let verb = match action {
        Action::Install => "apply",
        Action::Uninstall => "destroy",
    };

    let mut run = vec![verb.to_string(), "-auto-approve".to_string()];
    for (key, value) in inputs.to_string_pairs() {
        run.push("-var".to_string());
        run.push(format!("{}={}", key, value));
    }

    vec![vec!["init".to_string()], run]
}

pub async fn helm(
    extension: &LoadedExtension,
    release: &str,
    inputs: &ResolvedInputs,
    action: Action,
) -> Result<()> {
    let args = helm_args(extension, release, inputs, action);
    run_program("helm", &args, &extension.root).await
}

pub async fn terraform(
    extension: &LoadedExtension,
    inputs: &ResolvedInputs,
    action: Action,
) -> Result<()> {
    let module = extension.terraform_module_dir();
    for args in terraform_steps(inputs, action) {
        run_program("terraform", &args, &module).await?;
    }
    Ok(())
}

async fn run_program(program: &str, args: &[String], dir: &Path) -> Result<()> {
    tracing::info!(program, ?args, dir = %dir.display(), "running");

    let status = Command::new(program)
        .args(args)
        .current_dir(dir)
        .status()
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CliError::process(program, "not found on PATH"),
            _ => CliError::process(program, e.to_string()),
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(CliError::process(program, format!("exited with {}", status)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heoctl_core::ExtensionManifest;
    use std::path::PathBuf;

    fn extension() -> LoadedExtension {
        let manifest = ExtensionManifest::from_yaml(
            "name: redis\ntype: helm\nversion: 1.0.0\ninputs:\n  - name: replicas\n    type: string\n",
        )
        .unwrap();
        LoadedExtension {
            manifest,
            root: PathBuf::from("/ext/redis"),
        }
    }

    fn inputs() -> ResolvedInputs {
        [("replicas", "2"), ("tag", "7.2")].into_iter().collect()
    }

    #[test]
    fn test_helm_install_args() {
        let args = helm_args(&extension(), "redis", &inputs(), Action::Install);
        assert_eq!(
            args,
            vec![
                "install",
                "redis",
                "/ext/redis/helm",
                "--set",
                "replicas=2",
                "--set",
                "tag=7.2"
            ]
        );
    }

    #[test]
    fn test_helm_uninstall_args() {
        let args = helm_args(&extension(), "redis", &inputs(), Action::Uninstall);
        assert_eq!(args, vec!["uninstall", "redis"]);
    }

    #[test]
    fn test_helm_release_is_the_requested_extension_name() {
        let install = helm_args(&extension(), "cache", &inputs(), Action::Install);
        assert_eq!(&install[..3], &["install", "cache", "/ext/redis/helm"]);

        let uninstall = helm_args(&extension(), "cache", &inputs(), Action::Uninstall);
        assert_eq!(uninstall, vec!["uninstall", "cache"]);
    }

    #[test]
    fn test_terraform_steps() {
        let steps = terraform_steps(&inputs(), Action::Uninstall);
        assert_eq!(steps[0], vec!["init"]);
        assert_eq!(
            steps[1],
            vec!["destroy", "-auto-approve", "-var", "replicas=2", "-var", "tag=7.2"]
        );

        assert_eq!(terraform_steps(&inputs(), Action::Install)[1][0], "apply");
    }
}
