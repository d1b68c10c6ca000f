//! [`DocumentStore`]: filesystem-backed scenario and data model documents.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::schema::{DataModelDocument, Document, DocumentEnvelope, ScenarioDocument, API_VERSION};

use super::error::{LoadError, LoadResult, LoadStatus, Result};

/// Scans a directory (recursively) for `*.yml` / `*.yaml` files and keeps
/// the parsed documents keyed by `metadata.id`.
pub struct DocumentStore {
    dir: PathBuf,
    documents: HashMap<String, Document>,
}

impl DocumentStore {
    /// Create a store for `dir`, creating the directory if it does not exist.
    pub fn new(dir: PathBuf) -> Self {
        if !dir.exists() {
            if let Err(e) = fs::create_dir_all(&dir) {
                warn!(path = %dir.display(), error = %e, "failed to create documents directory");
            }
        }
        Self {
            dir,
            documents: HashMap::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load every YAML document under the directory.
    ///
    /// Dotfiles and non-YAML files are skipped; a broken file is reported
    /// in its [`LoadResult`] and does not abort the scan.
    pub fn load_all(&mut self) -> Result<Vec<LoadResult>> {
        let mut results = Vec::new();
        let dir = self.dir.clone();
        self.scan_dir_recursive(&dir, &mut results)?;
        Ok(results)
    }

    fn scan_dir_recursive(&mut self, dir: &Path, results: &mut Vec<LoadResult>) -> Result<()> {
        let entries = match fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "failed to read directory");
                return Ok(());
            }
        };

        for entry in entries {
            let path = entry?.path();

            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    if path.is_file() {
                        results.push(LoadResult {
                            path,
                            status: LoadStatus::Skipped {
                                reason: "dotfile".to_string(),
                            },
                        });
                    }
                    continue;
                }
            }

            if path.is_dir() {
                self.scan_dir_recursive(&path, results)?;
                continue;
            }

            if !is_yaml(&path) {
                results.push(LoadResult {
                    path,
                    status: LoadStatus::Skipped {
                        reason: "not a YAML file".to_string(),
                    },
                });
                continue;
            }

            match Self::load_file(&path) {
                Ok(doc) => {
                    let document_id = doc.metadata().id.clone();
                    info!(document_id = %document_id, kind = %doc.kind(), path = %path.display(), "loaded document");
                    self.documents.insert(document_id.clone(), doc);
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Loaded { document_id },
                    });
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load document");
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Failed { error: e.to_string() },
                    });
                }
            }
        }

        Ok(())
    }

    /// Parse one YAML file via two-pass deserialization.
    pub fn load_file(path: &Path) -> Result<Document> {
        let contents = fs::read_to_string(path)?;
        let envelope: DocumentEnvelope = serde_yaml::from_str(&contents)?;

        if envelope.metadata.id.is_empty() {
            return Err(LoadError::Validation("metadata.id must not be empty".to_string()));
        }
        if envelope.api_version != API_VERSION {
            return Err(LoadError::Validation(format!(
                "document '{}' has apiVersion '{}', expected '{}'",
                envelope.metadata.id, envelope.api_version, API_VERSION
            )));
        }

        envelope.parse_full().map_err(|e| {
            LoadError::Validation(format!("failed to parse document '{}': {}", envelope.metadata.id, e))
        })
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn scenario(&self, id: &str) -> Result<&ScenarioDocument> {
        self.get(id)
            .and_then(Document::as_scenario)
            .ok_or_else(|| LoadError::NotFound(id.to_string()))
    }

    /// Scenarios sorted by id.
    pub fn scenarios(&self) -> Vec<&ScenarioDocument> {
        let mut out: Vec<_> = self.documents.values().filter_map(Document::as_scenario).collect();
        out.sort_by(|a, b| a.metadata.id.cmp(&b.metadata.id));
        out
    }

    /// Data model `id`, or the only data model in the store when `id` is `None`.
    pub fn data_model(&self, id: Option<&str>) -> Result<&DataModelDocument> {
        if let Some(id) = id {
            return self
                .get(id)
                .and_then(Document::as_data_model)
                .ok_or_else(|| LoadError::NotFound(id.to_string()));
        }
        let mut models = self.documents.values().filter_map(Document::as_data_model);
        match (models.next(), models.next()) {
            (Some(dm), None) => Ok(dm),
            (None, _) => Err(LoadError::NotFound("DataModel".to_string())),
            (Some(_), Some(_)) => Err(LoadError::Validation(
                "several data models loaded; scenario must name one in spec.data_model".to_string(),
            )),
        }
    }

    /// Atomically write a document to `<dir>/<id>.yml`.
    ///
    /// Writes to a dot-prefixed `.tmp` file first, then renames it over the
    /// final path.
    pub fn write_document(&mut self, doc: &Document) -> Result<PathBuf> {
        let meta = doc.metadata();
        let final_path = self.dir.join(format!("{}.yml", meta.id));
        Self::write_file(&final_path, doc)?;
        self.documents.insert(meta.id.clone(), doc.clone());
        Ok(final_path)
    }

    /// Atomically write `doc` to `path`, whatever the file is named.
    ///
    /// The `.tmp` file sits next to `path` so the rename stays on one
    /// filesystem.
    pub fn write_file(path: &Path, doc: &Document) -> Result<()> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| LoadError::Validation(format!("not a file path: {}", path.display())))?;
        let tmp_path = path.with_file_name(format!(".{file_name}.tmp"));

        let yaml = doc.to_yaml()?;
        fs::write(&tmp_path, yaml)?;
        fs::rename(&tmp_path, path)?;

        info!(document_id = %doc.metadata().id, kind = %doc.kind(), path = %path.display(), "wrote document");
        Ok(())
    }

    pub fn save_scenario(&mut self, scenario: &ScenarioDocument) -> Result<PathBuf> {
        self.write_document(&Document::Scenario(scenario.clone()))
    }

    /// Remove the file and the in-memory entry for `id`.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let candidates = [
            self.dir.join(format!("{}.yml", id)),
            self.dir.join(format!("{}.yaml", id)),
        ];
        let Some(path) = candidates.iter().find(|p| p.exists()) else {
            return Err(LoadError::NotFound(id.to_string()));
        };
        fs::remove_file(path)?;
        self.documents.remove(id);
        info!(document_id = %id, "deleted document");
        Ok(())
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "yml" || e == "yaml")
        .unwrap_or(false)
}
