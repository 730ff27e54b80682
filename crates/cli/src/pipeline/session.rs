//! Session - a loaded configuration plus the engine built from it.

use std::path::{Path, PathBuf};

use anyhow::Context;
use contracts::{CaptureBlueprint, DataKind};
use corpus::{CorpusIndex, MetadataReader};
use sync_engine::SyncEngine;
use tracing::{info, warn};

use crate::cli::EngineArgs;
use crate::error::{CliError, Result};

/// Engine over the on-disk corpus
pub type CorpusEngine = SyncEngine<CorpusIndex, MetadataReader>;

/// A validated configuration, with CLI overrides applied
#[derive(Debug, Clone)]
pub struct Session {
    config_path: PathBuf,
    blueprint: CaptureBlueprint,
}

impl Session {
    /// Load and validate the configuration at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CliError::config_not_found(path));
        }
        let blueprint = config_loader::ConfigLoader::load_from_path(path)?;

        for warning in config_loader::warnings(&blueprint) {
            warn!(config = %path.display(), "{warning}");
        }
        info!(
            config = %path.display(),
            corpus = %blueprint.corpus.path.display(),
            sources = blueprint.sources.len(),
            "Configuration loaded"
        );

        Ok(Self {
            config_path: path.to_path_buf(),
            blueprint,
        })
    }

    /// Load the configuration named by `args` and apply its threshold overrides.
    pub fn from_engine_args(args: &EngineArgs) -> Result<Self> {
        let mut session = Self::load(&args.config)?;
        if let Some(threshold) = args.threshold {
            info!(threshold, "Overriding depth threshold from CLI");
            session.blueprint.sync.depth_threshold = threshold;
        }
        if let Some(threshold) = args.colour_threshold {
            info!(threshold, "Overriding colour threshold from CLI");
            session.blueprint.sync.colour_threshold = Some(threshold);
        }
        Ok(session)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn blueprint(&self) -> &CaptureBlueprint {
        &self.blueprint
    }

    pub fn corpus_root(&self) -> &Path {
        &self.blueprint.corpus.path
    }

    /// Fail early when the corpus directory is absent.
    pub fn ensure_corpus(&self) -> Result<()> {
        if self.corpus_root().is_dir() {
            Ok(())
        } else {
            Err(CliError::corpus_not_found(self.corpus_root()))
        }
    }

    pub fn corpus_index(&self) -> CorpusIndex {
        CorpusIndex::new(
            self.corpus_root(),
            self.blueprint.corpus.extension(DataKind::Depth),
        )
    }

    /// Engine reading frames and sidecars from the configured corpus.
    pub fn engine(&self) -> CorpusEngine {
        SyncEngine::new(
            self.blueprint.to_sync_engine_config(),
            self.corpus_index(),
            MetadataReader::new(self.corpus_root()),
        )
    }
}

/// Run `job` on a blocking worker thread.
///
/// Returns `CliError::Interrupted` when Ctrl+C or SIGTERM arrives first; the
/// worker itself is not cancelled and the process exits with it detached.
pub async fn run_blocking<T, F>(job: F) -> anyhow::Result<T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let task = tokio::task::spawn_blocking(job);

    tokio::select! {
        joined = task => joined.context("Worker thread failed")?,
        _ = shutdown_signal() => {
            warn!("Received shutdown signal, abandoning run");
            Err(CliError::Interrupted.into())
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &Path) -> PathBuf {
        let uploads = dir.join("uploads");
        fs::create_dir(&uploads).unwrap();
        let path = dir.join("capture.toml");
        fs::write(
            &path,
            format!(
                r#"
version = "V1"

[corpus]
path = "{}"

[[sources]]
id = "raspi1"
serial_number = "138322250306"

[sync]
depth_threshold = 30
"#,
                uploads.display()
            ),
        )
        .unwrap();
        path
    }

    #[test]
    fn test_missing_config() {
        let err = Session::load(Path::new("/nonexistent/capture.toml")).unwrap_err();
        assert!(matches!(err, CliError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_threshold_overrides() {
        let dir = TempDir::new().unwrap();
        let args = EngineArgs {
            config: write_config(dir.path()),
            threshold: Some(12),
            colour_threshold: None,
        };
        let session = Session::from_engine_args(&args).unwrap();
        let config = session.engine().config().clone();
        assert_eq!(config.depth_threshold, 12);
        assert_eq!(config.colour_threshold, 12);
        assert!(session.ensure_corpus().is_ok());
    }

    #[test]
    fn test_missing_corpus() {
        let dir = TempDir::new().unwrap();
        let session = Session::load(&write_config(dir.path())).unwrap();
        fs::remove_dir(session.corpus_root()).unwrap();
        assert!(matches!(
            session.ensure_corpus(),
            Err(CliError::CorpusNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_run_blocking_returns_job_result() {
        let value = run_blocking(|| Ok(7)).await.unwrap();
        assert_eq!(value, 7);
    }
}
