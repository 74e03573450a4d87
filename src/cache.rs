use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use anyhow::{Context, Result};

use crate::dataset::{self, Dataset};

/// Equal fingerprints mean the file is assumed untouched; contents are not hashed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFingerprint {
    modified: SystemTime,
    len: u64,
}

pub fn file_fingerprint(path: &Path) -> Result<FileFingerprint> {
    let meta =
        fs::metadata(path).with_context(|| format!("failed to stat dataset {}", path.display()))?;
    let modified = meta
        .modified()
        .with_context(|| format!("no modification time for {}", path.display()))?;
    Ok(FileFingerprint {
        modified,
        len: meta.len(),
    })
}

#[derive(Debug)]
pub enum Refresh {
    Unchanged,
    Reloaded(Arc<Dataset>),
    Failed(anyhow::Error),
}

/// A failed reload keeps the previous snapshot.
#[derive(Debug)]
pub struct DatasetCache {
    path: PathBuf,
    fingerprint: FileFingerprint,
    snapshot: Arc<Dataset>,
}

impl DatasetCache {
    pub fn load(path: &Path) -> Result<Self> {
        let fingerprint = file_fingerprint(path)?;
        let dataset = dataset::load_dataset(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            fingerprint,
            snapshot: Arc::new(dataset),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> Arc<Dataset> {
        Arc::clone(&self.snapshot)
    }

    pub fn refresh(&mut self) -> Refresh {
        match file_fingerprint(&self.path) {
            Ok(fingerprint) if fingerprint == self.fingerprint => Refresh::Unchanged,
            Ok(_) => self.force_reload(),
            Err(err) => Refresh::Failed(err),
        }
    }

    pub fn force_reload(&mut self) -> Refresh {
        let loaded = file_fingerprint(&self.path)
            .and_then(|fingerprint| Ok((fingerprint, dataset::load_dataset(&self.path)?)));
        match loaded {
            Ok((fingerprint, dataset)) => {
                self.fingerprint = fingerprint;
                self.snapshot = Arc::new(dataset);
                Refresh::Reloaded(self.snapshot())
            }
            Err(err) => Refresh::Failed(err),
        }
    }
}
