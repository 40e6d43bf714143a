//! Shared install/uninstall flow

use console::style;
use heoctl_core::{
    CoreError, ExtensionType, LoadedExtension, ResolvedInputs, collect_user_inputs,
    inputs_from_env, parse_input_pairs,
};
use heoctl_kube::{Action, BatchOptions, BatchRunner};
use std::time::Duration;

use super::DeployArgs;
use crate::display;
use crate::error::{CliError, Result};
use crate::runners;
use crate::staging;

/// Load, resolve and run an extension
pub async fn execute(args: &DeployArgs, action: Action) -> Result<()> {
    let extension = load(args)?;
    let manifest = &extension.manifest;

    eprintln!(
        "{} {} extension {} ({}) version {}",
        style("→").blue().bold(),
        match action {
            Action::Install => "Installing",
            Action::Uninstall => "Uninstalling",
        },
        style(&manifest.name).cyan(),
        manifest.extension_type,
        style(&manifest.version).yellow()
    );

    let user = collect_user_inputs(
        parse_input_pairs(&args.input),
        inputs_from_env(std::env::vars()),
    );
    let inputs = ResolvedInputs::resolve(manifest, &user)?;
    tracing::debug!(inputs = inputs.len(), "resolved inputs");

    match manifest.extension_type {
        ExtensionType::Kubernetes => apply_resources(&extension, &inputs, action, args).await,
        ExtensionType::Helm => {
            runners::helm(&extension, &args.extension, &inputs, action).await?;
            print_done(&extension, action);
            Ok(())
        }
        ExtensionType::Terraform => {
            runners::terraform(&extension, &inputs, action).await?;
            print_done(&extension, action);
            Ok(())
        }
    }
}

/// Locate the extension, staging a copy when a work directory is set
fn load(args: &DeployArgs) -> Result<LoadedExtension> {
    let source = args.extensions_dir.join(&args.extension);
    if !source.is_dir() {
        return Err(CoreError::ExtensionNotFound {
            path: source.display().to_string(),
        }
        .into());
    }

    let root = match &args.workdir {
        Some(workdir) => staging::stage(&source, workdir, &args.extension)?,
        None => source,
    };

    Ok(LoadedExtension::load(&root, &args.manifest)?)
}

async fn apply_resources(
    extension: &LoadedExtension,
    inputs: &ResolvedInputs,
    action: Action,
    args: &DeployArgs,
) -> Result<()> {
    let client = kube::Client::try_default().await?;

    let options = BatchOptions {
        concurrency: args.concurrency.max(1),
        call_timeout: (args.timeout > 0).then(|| Duration::from_secs(args.timeout)),
    };
    let runner = BatchRunner::connect(client, options).await?;

    let cancel = runner.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling in-flight calls");
            cancel.cancel();
        }
    });

    let report = runner.run(&extension.root, inputs, action).await?;
    display::print_report(&report, args.output)?;

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::BatchFailed {
            failed: report.failed().count(),
            total: report.total(),
        })
    }
}

fn print_done(extension: &LoadedExtension, action: Action) {
    eprintln!(
        "{} {} {}",
        style("✓").green().bold(),
        style(&extension.manifest.name).cyan(),
        match action {
            Action::Install => "installed",
            Action::Uninstall => "uninstalled",
        }
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::OutputFormat;
    use crate::exit_codes;
    use std::path::Path;

    fn args(dir: &Path, extension: &str) -> DeployArgs {
        DeployArgs {
            extension: extension.to_string(),
            input: String::new(),
            manifest: "manifest.yaml".to_string(),
            extensions_dir: dir.to_path_buf(),
            workdir: None,
            concurrency: 4,
            timeout: 30,
            output: OutputFormat::Text,
        }
    }

    #[tokio::test]
    async fn test_missing_extension() {
        let dir = tempfile::tempdir().unwrap();
        let err = execute(&args(dir.path(), "absent"), Action::Install)
            .await
            .unwrap_err();

        assert_eq!(err.exit_code(), exit_codes::EXTENSION_ERROR);
    }

    #[tokio::test]
    async fn test_missing_required_input_fails_before_cluster_access() {
        let dir = tempfile::tempdir().unwrap();
        let ext = dir.path().join("demo");
        std::fs::create_dir_all(ext.join("k8s")).unwrap();
        std::fs::write(
            ext.join("manifest.yaml"),
            "name: demo\ntype: k8s\ninputs:\n  - name: heoctl_test_domain\n    type: string\n    required: true\n",
        )
        .unwrap();

        let err = execute(&args(dir.path(), "demo"), Action::Install)
            .await
            .unwrap_err();

        assert_eq!(err.exit_code(), exit_codes::INPUT_ERROR);
        assert!(err.to_string().contains("heoctl_test_domain"));
    }

    #[test]
    fn test_load_with_workdir_stages_copy() {
        let dir = tempfile::tempdir().unwrap();
        let workdir = tempfile::tempdir().unwrap();
        let ext = dir.path().join("demo");
        std::fs::create_dir_all(&ext).unwrap();
        std::fs::write(ext.join("manifest.yaml"), "name: demo\ntype: helm\n").unwrap();

        let mut args = args(dir.path(), "demo");
        args.workdir = Some(workdir.path().to_path_buf());

        let loaded = load(&args).unwrap();
        assert!(loaded.root.starts_with(workdir.path()));
        assert_eq!(loaded.manifest.extension_type, ExtensionType::Helm);
    }
}
