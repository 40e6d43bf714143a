//! Uninstall command - delete every resource of an extension
//!
//! Kubernetes resources are deleted with foreground propagation, so the
//! command returns once the API server has accepted each deletion.

use heoctl_kube::Action;

use super::{DeployArgs, deploy};
use crate::error::Result;

/// Run the uninstall command
pub async fn run(args: &DeployArgs) -> Result<()> {
    deploy::execute(args, Action::Uninstall).await
}
