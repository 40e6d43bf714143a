//! Install command - create every resource of an extension

use heoctl_kube::Action;

use super::{DeployArgs, deploy};
use crate::error::Result;

/// Run the install command
pub async fn run(args: &DeployArgs) -> Result<()> {
    deploy::execute(args, Action::Install).await
}
