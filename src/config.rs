//! Configuration module
//!
//! All pipeline components receive an immutable [`Options`] value at
//! construction time; nothing reads ambient configuration at request time.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ImageflyError;

/// Resolved options for the transformation pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Options {
    /// Root directory for cached variants
    pub cache_dir: PathBuf,

    /// Mirror the source file's directory structure beneath the cache root
    #[serde(default)]
    pub mimic_source_dir: bool,

    /// Allow requested dimensions to exceed the source's natural dimensions
    #[serde(default)]
    pub scale_up: bool,

    /// Default encoding quality for lossy formats (1-100)
    #[serde(default = "default_quality")]
    pub quality: u8,

    /// Browser/proxy cache lifetime in seconds (Expires, Cache-Control max-age)
    #[serde(default = "default_cache_expire")]
    pub cache_expire: u64,

    /// Canvas background color for pad (no-crop) composition, hex RGB
    #[serde(default = "default_nc_color")]
    pub nc_color: String,

    /// Reject any parameter string not present in `presets`
    #[serde(default)]
    pub enforce_presets: bool,

    /// Allowed parameter strings when `enforce_presets` is set
    #[serde(default)]
    pub presets: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("cache"),
            mimic_source_dir: false,
            scale_up: false,
            quality: default_quality(),
            cache_expire: default_cache_expire(),
            nc_color: default_nc_color(),
            enforce_presets: false,
            presets: Vec::new(),
        }
    }
}

fn default_quality() -> u8 {
    80
}

/// One week
fn default_cache_expire() -> u64 {
    604_800
}

fn default_nc_color() -> String {
    "#ffffff".to_string()
}

impl Options {
    /// Load options from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self, ImageflyError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ImageflyError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_yaml::from_str(&contents).map_err(|e| {
            ImageflyError::Config(format!("cannot parse {}: {}", path.display(), e))
        })
    }
}
