//! Reads the documents folder into memory.
//!
//! Unreadable files are collected into the report instead of aborting the
//! batch; deciding whether an empty result is acceptable is up to the caller.
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::DocsConfig;
use crate::error::DocumentReadError;
use crate::types::Document;

/// Outcome of loading a folder: the documents that could be read plus one
/// error for every file that could not.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub documents: Vec<Document>,
    pub failures: Vec<DocumentReadError>,
}

impl LoadReport {
    pub fn failure_count(&self) -> usize { self.failures.len() }
    pub fn is_empty(&self) -> bool { self.documents.is_empty() }
}

pub struct DocumentLoader {
    extensions: Vec<String>,
    recursive: bool,
}

impl Default for DocumentLoader {
    fn default() -> Self { Self::from_config(&DocsConfig::default()) }
}

impl DocumentLoader {
    pub fn new() -> Self { Self::default() }

    pub fn from_config(config: &DocsConfig) -> Self {
        let extensions = config.extensions.iter().map(|e| e.trim_start_matches('.').to_ascii_lowercase()).collect();
        Self { extensions, recursive: config.recursive }
    }

    /// Load every file with a recognized extension under `dir`, in path order.
    pub fn load_dir(&self, dir: &Path) -> LoadReport {
        let files = self.list_files(dir);
        if files.is_empty() {
            tracing::warn!(dir = %dir.display(), "no matching files found");
        }
        let mut report = LoadReport::default();
        for path in files {
            match fs::read_to_string(&path) {
                Ok(content) => {
                    let source_id = Self::source_id(&path, dir);
                    tracing::info!(source = %source_id, bytes = content.len(), "loaded document");
                    report.documents.push(Document { content, source_id });
                }
                Err(source) => {
                    let err = DocumentReadError { path, source };
                    tracing::warn!("{}", err);
                    report.failures.push(err);
                }
            }
        }
        tracing::info!(documents = report.documents.len(), failures = report.failure_count(), "document loading finished");
        report
    }

    /// Matching files under `root`, sorted. A missing directory yields none.
    pub fn list_files(&self, root: &Path) -> Vec<PathBuf> {
        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .follow_links(true)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::warn!("skipping unreadable entry: {}", err);
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .filter(|p| self.has_extension(p))
            .collect();
        files.sort();
        files
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    fn source_id(path: &Path, root: &Path) -> String {
        let relative = path.strip_prefix(root).unwrap_or(path);
        relative.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/")
    }
}
