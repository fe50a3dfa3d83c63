use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::TelemetryError;

/// How repeated writes of one artifact kind behave across checkpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistencePolicy {
    /// One file per artifact name; every write replaces the previous content.
    Overwrite,
    /// One file per epoch; files accumulate for the lifetime of the run.
    AppendVersioned,
}

/// A file the recorder materializes inside a run directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact<'a> {
    SeriesData(&'a str),
    SeriesGraph(&'a str),
    WeightsSnapshot { epoch: u64 },
    NetworkSnapshot { epoch: u64 },
    ValueImage,
    StateValuesGraph,
    Hyperparameters,
}

impl Artifact<'_> {
    pub fn policy(&self) -> PersistencePolicy {
        match self {
            Artifact::WeightsSnapshot { .. } | Artifact::NetworkSnapshot { .. } => {
                PersistencePolicy::AppendVersioned
            }
            _ => PersistencePolicy::Overwrite,
        }
    }

    pub fn file_name(&self) -> String {
        match self {
            Artifact::SeriesData(name) => format!("{name}.json"),
            Artifact::SeriesGraph(name) => format!("{name}_graph.svg"),
            Artifact::WeightsSnapshot { epoch } => format!("weights_epoch_{epoch}.json"),
            Artifact::NetworkSnapshot { epoch } => format!("network_file_epoch_{epoch}.bin"),
            Artifact::ValueImage => "value_image.txt".to_string(),
            Artifact::StateValuesGraph => "state_values_graph.svg".to_string(),
            Artifact::Hyperparameters => "hyperparameters.txt".to_string(),
        }
    }
}

/// On-disk layout of a persisted series.
#[derive(Debug, Deserialize)]
struct SeriesDump<T> {
    values: Vec<T>,
}

#[derive(Serialize)]
struct SeriesDumpRef<'a, T> {
    values: &'a [T],
}

/// Lazily created run directory under a fixed root.
#[derive(Debug)]
pub struct RunStorage {
    root: PathBuf,
    identity: String,
    dir: Option<PathBuf>,
}

impl RunStorage {
    pub fn new(root: impl Into<PathBuf>, identity: impl Into<String>) -> Self {
        RunStorage {
            root: root.into(),
            identity: identity.into(),
            dir: None,
        }
    }

    /// Agent identity used as the run directory prefix.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// The run directory, if it has been created.
    pub fn location(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Create the run directory on first use; later calls return the same path.
    pub fn ensure_dir(&mut self) -> Result<&Path, TelemetryError> {
        let dir = match self.dir.take() {
            Some(dir) => dir,
            None => self.create_dir()?,
        };
        Ok(self.dir.insert(dir).as_path())
    }

    fn create_dir(&self) -> Result<PathBuf, TelemetryError> {
        fs::create_dir_all(&self.root).map_err(|e| TelemetryError::CreateDir {
            path: self.root.clone(),
            source: e,
        })?;
        let timestamp = chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.6f");
        let path = self.root.join(format!("{}_{}", self.identity, timestamp));
        // Non-recursive: an existing directory means a name collision.
        fs::create_dir(&path).map_err(|e| TelemetryError::CreateDir {
            path: path.clone(),
            source: e,
        })?;
        log::info!("created run directory {}", path.display());
        Ok(path)
    }

    /// Path of `artifact` inside the run directory, creating the directory
    /// if needed.
    pub fn artifact_path(&mut self, artifact: Artifact<'_>) -> Result<PathBuf, TelemetryError> {
        Ok(self.ensure_dir()?.join(artifact.file_name()))
    }

    pub fn write(
        &mut self,
        artifact: Artifact<'_>,
        contents: &[u8],
    ) -> Result<PathBuf, TelemetryError> {
        let path = self.artifact_path(artifact)?;
        fs::write(&path, contents).map_err(|e| TelemetryError::Write {
            path: path.clone(),
            source: e,
        })?;
        log::debug!("wrote {} ({:?})", path.display(), artifact.policy());
        Ok(path)
    }

    /// Dump `values` verbatim under `name`, replacing any earlier dump.
    pub fn write_series<T: Serialize>(
        &mut self,
        name: &str,
        values: &[T],
    ) -> Result<PathBuf, TelemetryError> {
        let json = serde_json::to_vec(&SeriesDumpRef { values })?;
        self.write(Artifact::SeriesData(name), &json)
    }
}

/// Load a series previously written with [`RunStorage::write_series`].
pub fn read_series<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<Vec<T>, TelemetryError> {
    let path = dir.join(Artifact::SeriesData(name).file_name());
    let bytes = fs::read(&path).map_err(|e| TelemetryError::Read { path, source: e })?;
    let dump: SeriesDump<T> = serde_json::from_slice(&bytes)?;
    Ok(dump.values)
}
