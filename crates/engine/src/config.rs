//! Translator configuration via `chunkform.toml`
//!
//! A host keeps one config file next to its world data. On first use a
//! default `chunkform.toml` is written; edit it to change the chain policy
//! or the section shapes of newly created chunks.

use chunkform_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name placed next to the world data.
pub const CONFIG_FILE_NAME: &str = "chunkform.toml";

/// Section array shapes for chunks created by the translator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SectionConfig {
    /// Shape of one block section `(x, y, z)`.
    #[serde(default = "default_block_shape")]
    pub block_shape: [usize; 3],
    /// Shape of one biome section `(x, y, z)`.
    #[serde(default = "default_biome_shape")]
    pub biome_shape: [usize; 3],
}

fn default_block_shape() -> [usize; 3] {
    [16, 16, 16]
}

fn default_biome_shape() -> [usize; 3] {
    [4, 4, 4]
}

fn default_strict_layout() -> bool {
    true
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            block_shape: default_block_shape(),
            biome_shape: default_biome_shape(),
        }
    }
}

/// Translator configuration loaded from `chunkform.toml`.
///
/// # Example
///
/// ```toml
/// allow_version_gaps = false
/// strict_layout = true
///
/// [sections]
/// block_shape = [16, 16, 16]
/// biome_shape = [4, 4, 4]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranslatorConfig {
    /// Accept chains whose versions increase but skip numbers.
    #[serde(default)]
    pub allow_version_gaps: bool,
    /// Validate each version's layout on decode and encode.
    #[serde(default = "default_strict_layout")]
    pub strict_layout: bool,
    /// Section shapes.
    #[serde(default)]
    pub sections: SectionConfig,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            allow_version_gaps: false,
            strict_layout: default_strict_layout(),
            sections: SectionConfig::default(),
        }
    }
}

impl TranslatorConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# chunkform translator configuration
#
# Accept format chains whose versions skip numbers (default: false)
allow_version_gaps = false

# Validate each version's required fields on decode and encode (default: true)
strict_layout = true

# Section shapes for newly created chunks, as [x, y, z]
[sections]
block_shape = [16, 16, 16]
biome_shape = [4, 4, 4]
"#
    }

    /// Check that every section shape is non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the offending shape.
    pub fn validate(&self) -> Result<()> {
        for (name, shape) in [
            ("block_shape", self.sections.block_shape),
            ("biome_shape", self.sections.biome_shape),
        ] {
            if shape.iter().any(|&d| d == 0) {
                return Err(Error::Config(format!(
                    "sections.{} = {:?} has a zero dimension",
                    name, shape
                )));
            }
        }
        Ok(())
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: TranslatorConfig = toml::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::Config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::Config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
