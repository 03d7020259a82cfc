use crate::core::{run_checked, UNIVERSE_REPO};
use crate::domain::model::{PackageRepo, RepoList};
use crate::domain::ports::ClusterCli;
use crate::utils::error::{HarnessError, Result};
use std::sync::Arc;

/// Package repository operations. The upgrade flow reorders the Universe repo
/// to control which version an install resolves to.
pub struct RepoManager<C> {
    cli: Arc<C>,
}

impl<C: ClusterCli> RepoManager<C> {
    pub fn new(cli: Arc<C>) -> Self {
        Self { cli }
    }

    pub async fn list(&self) -> Result<Vec<PackageRepo>> {
        let output = run_checked(&*self.cli, &["package", "repo", "list", "--json"]).await?;
        let list: RepoList = serde_json::from_str(&output.stdout)?;
        Ok(list.repositories)
    }

    pub async fn universe_url(&self) -> Result<String> {
        let repos = self.list().await?;
        let repo = repos
            .into_iter()
            .find(|r| r.name == UNIVERSE_REPO)
            .ok_or_else(|| HarnessError::RepoNotFoundError {
                name: UNIVERSE_REPO.to_string(),
            })?;
        tracing::info!("Found Universe URL: {}", repo.uri);
        Ok(repo.uri)
    }

    /// Adds a repo, optionally at a fixed position in the resolution order.
    /// Index 0 makes it the preferred source.
    pub async fn add(&self, name: &str, uri: &str, index: Option<usize>) -> Result<()> {
        let index_arg;
        let mut args = vec!["package", "repo", "add"];
        if let Some(index) = index {
            index_arg = format!("--index={}", index);
            args.push(&index_arg);
        }
        args.push(name);
        args.push(uri);

        run_checked(&*self.cli, &args).await?;
        tracing::debug!("Added repo {} at index {:?}", name, index);
        Ok(())
    }

    /// Removes a repo. Returns false (without error) when the repo was not
    /// present, matching the reorder flow's tolerance for a fresh cluster.
    pub async fn remove(&self, name: &str) -> Result<bool> {
        let output = self.cli.run(&["package", "repo", "remove", name]).await?;
        if output.success() {
            Ok(true)
        } else {
            tracing::warn!(
                "Could not remove repo {} (exit {}): {}",
                name,
                output.code,
                output.stderr.trim()
            );
            Ok(false)
        }
    }
}
