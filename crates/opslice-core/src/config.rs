use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::index::DEFAULT_HEADING;
use crate::select::Style;
use crate::write::{Dialect, Syntax};

/// Top-level project configuration loaded from `.opslice.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpsliceConfig {
    /// Variant name to source document location.
    pub variants: IndexMap<String, String>,
    pub defaults: DefaultsConfig,
    pub index: IndexConfig,
}

impl Default for OpsliceConfig {
    fn default() -> Self {
        Self {
            variants: IndexMap::from([
                ("v1.0".to_string(), "openapi/v1.0.yaml".to_string()),
                ("beta".to_string(), "openapi/beta.yaml".to_string()),
            ]),
            defaults: DefaultsConfig::default(),
            index: IndexConfig::default(),
        }
    }
}

impl OpsliceConfig {
    /// Variant locations as paths, in declaration order.
    pub fn variant_paths(&self) -> IndexMap<String, PathBuf> {
        self.variants
            .iter()
            .map(|(variant, location)| (variant.clone(), PathBuf::from(location)))
            .collect()
    }
}

/// Request values used when the caller leaves them out.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub variant: String,
    pub title: String,
    pub openapi_version: Dialect,
    pub format: Syntax,
    pub style: Style,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            variant: "v1.0".to_string(),
            title: "Partial Graph API".to_string(),
            openapi_version: Dialect::V2,
            format: Syntax::Yaml,
            style: Style::Plain,
        }
    }
}

/// Tag index rendering options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub heading: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            heading: DEFAULT_HEADING.to_string(),
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".opslice.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<OpsliceConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: OpsliceConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Content written by `opslice init`.
pub fn default_config_content() -> &'static str {
    r#"# opslice configuration
# Relative paths are resolved against the directory opslice runs in,
# which is also where this file is read from.

variants:
  v1.0: openapi/v1.0.yaml
  beta: openapi/beta.yaml

defaults:
  variant: v1.0
  title: Partial Graph API
  openapi_version: v2  # v2 | v3
  format: yaml         # yaml | json
  style: plain         # plain | powershell | power_platform

index:
  heading: OpenAPI Operations for Microsoft Graph
"#
}
