//! Where source documents come from, and the per-variant cache in front of it.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use indexmap::IndexMap;
use log::info;

use crate::error::{RequestError, SourceError};
use crate::parse::{self, spec::OpenApiSpec};

/// Produces the parsed document for a variant name such as `v1.0` or `beta`.
pub trait DocumentSource {
    /// Variants this source can load.
    fn variants(&self) -> Vec<String>;

    fn load(&self, variant: &str) -> Result<OpenApiSpec, SourceError>;
}

/// Loads each variant from a local YAML or JSON file.
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    paths: IndexMap<String, PathBuf>,
}

impl FileSource {
    pub fn new(paths: IndexMap<String, PathBuf>) -> Self {
        Self { paths }
    }

    /// Resolve every relative path against `base`.
    pub fn relative_to(mut self, base: &Path) -> Self {
        for path in self.paths.values_mut() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }
}

impl DocumentSource for FileSource {
    fn variants(&self) -> Vec<String> {
        self.paths.keys().cloned().collect()
    }

    fn load(&self, variant: &str) -> Result<OpenApiSpec, SourceError> {
        let path = self
            .paths
            .get(variant)
            .ok_or_else(|| RequestError::UnknownDocumentVariant(variant.to_string()))?;
        let content = fs::read_to_string(path).map_err(|source| SourceError::DocumentUnavailable {
            variant: variant.to_string(),
            path: path.clone(),
            source,
        })?;

        let parsed = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => parse::from_json(&content),
            _ => parse::from_yaml(&content),
        };
        let spec = parsed.map_err(|source| SourceError::DocumentInvalid {
            variant: variant.to_string(),
            source,
        })?;
        info!(
            "loaded '{variant}' from {}: {} paths, {} operations",
            path.display(),
            spec.paths.len(),
            spec.operation_count()
        );
        Ok(spec)
    }
}

/// Parsed source documents, loaded at most once per variant and shared
/// read-only afterwards. Entries are never invalidated.
pub struct DocumentCache<S> {
    source: S,
    slots: IndexMap<String, Mutex<Option<Arc<OpenApiSpec>>>>,
}

impl<S: DocumentSource> DocumentCache<S> {
    pub fn new(source: S) -> Self {
        let slots = source
            .variants()
            .into_iter()
            .map(|variant| (variant, Mutex::new(None)))
            .collect();
        Self { source, slots }
    }

    pub fn variants(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// The document for `variant`, loading it on first use. Concurrent first
    /// callers wait on the slot, so the source is asked exactly once; a failed
    /// load leaves the slot empty for the next caller to retry.
    pub fn get(&self, variant: &str) -> Result<Arc<OpenApiSpec>, SourceError> {
        let slot = self
            .slots
            .get(variant)
            .ok_or_else(|| RequestError::UnknownDocumentVariant(variant.to_string()))?;
        let mut cached = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(ref spec) = *cached {
            return Ok(Arc::clone(spec));
        }
        let spec = Arc::new(self.source.load(variant)?);
        *cached = Some(Arc::clone(&spec));
        Ok(spec)
    }
}
