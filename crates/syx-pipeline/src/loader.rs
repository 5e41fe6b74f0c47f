//! Filesystem paper loader.
//!
//! Reads a directory of pre-extracted plain-text papers: `<stem>.txt` for
//! the publication body, optional `<stem>_SI.txt` for supporting
//! information. Upstream PDF/OCR conversion is an external concern.

use std::path::{Path, PathBuf};

use syx_core::paper::Paper;

use crate::error::PipelineError;

/// Outcome of loading one paper. A single unreadable file fails that
/// document only; the run continues.
#[derive(Debug)]
pub enum PaperLoad {
    Loaded(Paper),
    Failed {
        /// Document id (file stem).
        id: String,
        detail: String,
    },
}

impl PaperLoad {
    /// Document id regardless of outcome.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Loaded(paper) => &paper.id,
            Self::Failed { id, .. } => id,
        }
    }
}

/// Loader over a local directory of `.txt` papers.
#[derive(Debug, Clone)]
pub struct FsPaperLoader {
    data_dir: PathBuf,
    limit: Option<usize>,
}

impl FsPaperLoader {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>, limit: Option<usize>) -> Self {
        Self {
            data_dir: data_dir.into(),
            limit,
        }
    }

    /// Load all papers, sorted by id for deterministic scheduling.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::DataSource`] if the directory itself cannot
    /// be enumerated. Unreadable individual files become
    /// [`PaperLoad::Failed`] entries instead.
    pub fn load(&self) -> Result<Vec<PaperLoad>, PipelineError> {
        let entries =
            std::fs::read_dir(&self.data_dir).map_err(|source| PipelineError::DataSource {
                path: self.data_dir.display().to_string(),
                source,
            })?;

        let mut stems: Vec<(String, PathBuf)> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| PipelineError::DataSource {
                path: self.data_dir.display().to_string(),
                source,
            })?;
            let path = entry.path();
            let Some(stem) = txt_stem(&path) else {
                continue;
            };
            // SI files are picked up by their parent paper, not on their own.
            if stem.ends_with("_SI") {
                continue;
            }
            stems.push((stem, path));
        }
        stems.sort_by(|a, b| a.0.cmp(&b.0));

        if let Some(limit) = self.limit {
            stems.truncate(limit);
        }

        Ok(stems
            .into_iter()
            .map(|(stem, path)| self.load_one(stem, &path))
            .collect())
    }

    fn load_one(&self, stem: String, path: &Path) -> PaperLoad {
        let publication_text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(document = %stem, error = %err, "failed to read paper");
                return PaperLoad::Failed {
                    id: stem,
                    detail: format!("failed to read {}: {err}", path.display()),
                };
            }
        };

        let si_path = self.data_dir.join(format!("{stem}_SI.txt"));
        let si_text = if si_path.exists() {
            match std::fs::read_to_string(&si_path) {
                Ok(text) => text,
                Err(err) => {
                    tracing::warn!(document = %stem, error = %err, "failed to read SI file");
                    return PaperLoad::Failed {
                        id: stem,
                        detail: format!("failed to read {}: {err}", si_path.display()),
                    };
                }
            }
        } else {
            String::new()
        };

        PaperLoad::Loaded(Paper::new(stem, publication_text).with_si_text(si_text))
    }
}

/// File stem when the path is a `.txt` file, else `None`.
fn txt_stem(path: &Path) -> Option<String> {
    if path.extension().and_then(|e| e.to_str()) != Some("txt") {
        return None;
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(ToString::to_string)
}
