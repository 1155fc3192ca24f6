use crate::branch::DATE_FORMAT;
use crate::registry::BranchPaths;
use crate::staging::StagingDir;
use crate::symstore::StoreRequest;
use crate::{BranchError, BranchRegistry, Result};
use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use symsync_symbols::{last_id_path, staging_dir, Build};
use tokio_util::sync::CancellationToken;

const COMMENT_FORMAT: &str = "%Y-%m-%d_%H:%M:%S";

/// Which success path [`BranchRegistry::add_build`] took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The local pointer already matches the build server.
    AlreadyCurrent(String),
    /// A build with this version is already in the registry.
    AlreadyPublished(Build),
    Published(Build),
}

impl SyncOutcome {
    pub fn published(&self) -> Option<&Build> {
        match self {
            Self::Published(build) => Some(build),
            _ => None,
        }
    }
}

impl BranchRegistry {
    /// Publishes the symbols of `version`, or of the build server's latest
    /// build when `version` is empty.
    ///
    /// Re-invoking is safe: a current branch or an already published version
    /// succeed without touching the store. One call per branch at a time;
    /// concurrent calls share the staging directory.
    pub async fn add_build(&self, version: &str) -> Result<SyncOutcome> {
        self.add_build_with_cancel(version, &CancellationToken::new())
            .await
    }

    pub async fn add_build_with_cancel(
        &self,
        version: &str,
        cancel: &CancellationToken,
    ) -> Result<SyncOutcome> {
        let paths = self.paths()?;
        let local = self.read_latest_build(true).await.unwrap_or_default();

        let latest = if version.trim().is_empty() {
            let pointer = paths.build.join(&self.config.latest_build_file);
            let remote = match self.read_latest_build(false).await {
                Ok(remote) if !remote.is_empty() => remote,
                Ok(_) => {
                    log::error!("Build server pointer {} is empty", pointer.display());
                    return Err(BranchError::InvalidBuildServerPath(pointer));
                }
                Err(err) => {
                    log::error!(
                        "Get build server latest build {} failed: {err}",
                        pointer.display()
                    );
                    return Err(BranchError::InvalidBuildServerPath(pointer));
                }
            };
            if remote == local {
                log::trace!("Branch {} already updated to latest {remote}", paths.name);
                return Ok(SyncOutcome::AlreadyCurrent(remote));
            }
            remote
        } else {
            version.trim().to_string()
        };

        if let Some(build) = self.get_build(&latest, "") {
            log::warn!("Symbols for build {latest} of {} already exist", paths.name);
            return Ok(SyncOutcome::AlreadyPublished(build));
        }
        log::info!(
            "Add symbols for build {latest} of {}. Local: {local}",
            paths.name
        );

        let staging = StagingDir::create(staging_dir(&paths.store))
            .await
            .map_err(|err| {
                log::error!(
                    "Create staging path {} failed: {err}",
                    staging_dir(&paths.store).display()
                );
                err
            })?;

        let archive = self
            .fetch_archive(&paths, &latest, staging.path(), cancel)
            .await?;
        self.extract_archive(archive, staging.path().to_path_buf())
            .await?;
        let build = self
            .publish(&paths, &latest, staging.path(), cancel)
            .await?;
        self.update_latest_build(&latest).await?;

        self.commit_build(build.clone());
        log::info!(
            "Published build {} ({latest}) for {}",
            build.id,
            paths.name
        );
        Ok(SyncOutcome::Published(build))
    }

    /// Copies `<build>/Build<version>/<archive>` into the staging directory.
    async fn fetch_archive(
        &self,
        paths: &BranchPaths,
        version: &str,
        staging: &Path,
        cancel: &CancellationToken,
    ) -> Result<PathBuf> {
        let source = paths
            .build
            .join(format!("Build{version}"))
            .join(&self.config.symbol_archive);
        let target = staging.join(&self.config.symbol_archive);

        log::info!("Copy {} to {}", source.display(), target.display());
        let start = Instant::now();
        let copied = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(BranchError::Cancelled),
            copied = tokio::fs::copy(&source, &target) => copied,
        };
        match copied {
            Ok(bytes) => {
                log::info!(
                    "Copy complete: size = {bytes}, time = {:?}",
                    start.elapsed()
                );
                Ok(target)
            }
            Err(err) => {
                log::error!(
                    "Copy symbol archive {} for {} failed: {err}",
                    source.display(),
                    paths.name
                );
                Err(err.into())
            }
        }
    }

    async fn extract_archive(&self, archive: PathBuf, dest: PathBuf) -> Result<()> {
        let extractor = Arc::clone(&self.extractor);
        tokio::task::spawn_blocking(move || extractor.extract(&archive, &dest))
            .await
            .map_err(|err| BranchError::Other(format!("join extract task: {err}")))?
            .map_err(|err| {
                log::error!("Extract symbols failed: {err}");
                err
            })
    }

    /// Runs the store tool and builds the record it committed.
    async fn publish(
        &self,
        paths: &BranchPaths,
        version: &str,
        symbols: &Path,
        cancel: &CancellationToken,
    ) -> Result<Build> {
        let now = Local::now();
        let request = StoreRequest {
            store_path: paths.store.clone(),
            product: paths.name.clone(),
            version: version.to_string(),
            comment: now.format(COMMENT_FORMAT).to_string(),
            symbols: symbols.to_path_buf(),
        };

        log::info!("Call symbol store tool for build {version} ...");
        let output = self.tool.add(&request, cancel).await.map_err(|err| {
            log::error!("Add build {version} to symbol store {} failed: {err}", paths.name);
            err
        })?;
        log::info!("Symbol store output: {}", output.output.trim_end());
        log::info!("Symbol store complete: {:?}", output.elapsed);

        let id = self.latest_id().await;
        if id.is_empty() {
            return Err(BranchError::MissingBuildId(last_id_path(&paths.store)));
        }
        Ok(Build {
            id,
            date: now.format(DATE_FORMAT).to_string(),
            branch: paths.name.clone(),
            version: version.to_string(),
            comment: request.comment,
        })
    }
}
