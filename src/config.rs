//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `Config` con tool esterni, pipeline e opzioni di output
//! - Definisce `PipelineConfig`: flag di abilitazione e parametri per ogni step
//! - Fornisce validazione dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//!
//! ## Parametri della pipeline:
//! - `dedup`, `flatten`, `join`, `weld`, `resample`, `prune`, `sparse`: step senza parametri
//! - `instance` / `palette`: soglia `--min` (default: 5)
//! - `simplify`: `--ratio` (0.0-1.0, default: 0.75)
//! - `texture_compression`: none / basis / webp / avif / png / jpeg
//! - `texture_resize`: original / 4096 / 2048 / 1024 / 512 / 256
//! - `geometry_compression`: none / draco / meshopt
//!
//! ## Tool esterni:
//! - `gltf_transform`: nome o path del binario (default: "gltf-transform")
//! - `texture_tool`: binario usato per KTX2/Basis (default: "toktx")
//! - `search_dirs`: directory aggiunte in testa al PATH per trovare i tool
//!
//! ## Esempio:
//! ```rust
//! use gltf_optimizer::config::{Config, GeometryCodec};
//!
//! let mut config = Config::default();
//! config.pipeline.weld = true;
//! config.pipeline.geometry_compression = GeometryCodec::Draco;
//! config.validate().unwrap();
//! ```

use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::OptimizeError;

pub const DEFAULT_MIN_OCCURRENCES: u32 = 5;
pub const DEFAULT_SIMPLIFY_RATIO: f64 = 0.75;

/// Geometry codec applied as the last pipeline step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GeometryCodec {
    #[default]
    None,
    Draco,
    Meshopt,
}

/// Texture codec for the texture compression step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TextureCodec {
    #[default]
    None,
    /// KTX2 / Basis Universal
    Basis,
    Webp,
    Avif,
    Png,
    Jpeg,
}

/// Maximum texture dimension for the resize step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum TextureResize {
    #[default]
    #[serde(rename = "original")]
    #[value(name = "original")]
    Original,
    #[serde(rename = "4096")]
    #[value(name = "4096")]
    Max4096,
    #[serde(rename = "2048")]
    #[value(name = "2048")]
    Max2048,
    #[serde(rename = "1024")]
    #[value(name = "1024")]
    Max1024,
    #[serde(rename = "512")]
    #[value(name = "512")]
    Max512,
    #[serde(rename = "256")]
    #[value(name = "256")]
    Max256,
}

impl TextureResize {
    /// Target size in pixels, `None` when textures keep their size
    pub fn max_dimension(&self) -> Option<u32> {
        match self {
            Self::Original => None,
            Self::Max4096 => Some(4096),
            Self::Max2048 => Some(2048),
            Self::Max1024 => Some(1024),
            Self::Max512 => Some(512),
            Self::Max256 => Some(256),
        }
    }
}

/// Canned single-invocation profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Draco geometry compression only
    Geometry,
    /// KTX2 texture compression only
    Texture,
    /// Draco geometry and KTX2 textures
    Both,
}

/// Which optional steps are enabled and their parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub dedup: bool,
    pub instance: bool,
    /// Minimum occurrences before a mesh is instanced
    pub instance_min: u32,
    pub palette: bool,
    /// Minimum materials before a palette is created
    pub palette_min: u32,
    pub flatten: bool,
    pub join: bool,
    pub weld: bool,
    pub simplify: bool,
    /// Target vertex ratio for simplification (0.0-1.0)
    pub simplify_ratio: f64,
    pub resample: bool,
    pub prune: bool,
    pub sparse: bool,
    pub texture_compression: TextureCodec,
    pub texture_resize: TextureResize,
    pub geometry_compression: GeometryCodec,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dedup: false,
            instance: false,
            instance_min: DEFAULT_MIN_OCCURRENCES,
            palette: false,
            palette_min: DEFAULT_MIN_OCCURRENCES,
            flatten: false,
            join: false,
            weld: false,
            simplify: false,
            simplify_ratio: DEFAULT_SIMPLIFY_RATIO,
            resample: false,
            prune: false,
            sparse: false,
            texture_compression: TextureCodec::None,
            texture_resize: TextureResize::Original,
            geometry_compression: GeometryCodec::None,
        }
    }
}

impl PipelineConfig {
    /// Validate step parameters
    pub fn validate(&self) -> Result<(), OptimizeError> {
        if self.instance_min == 0 {
            return Err(OptimizeError::Validation("Instance --min must be at least 1".to_string()));
        }
        if self.palette_min == 0 {
            return Err(OptimizeError::Validation("Palette --min must be at least 1".to_string()));
        }
        if !(self.simplify_ratio > 0.0 && self.simplify_ratio <= 1.0) {
            return Err(OptimizeError::Validation(
                "Simplify ratio must be greater than 0.0 and at most 1.0".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether the KTX2/Basis texture tool is needed
    pub fn uses_basis(&self) -> bool {
        self.texture_compression == TextureCodec::Basis
    }
}

/// External tools and where to look for them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// gltf-transform binary (name resolved through PATH, or absolute path)
    pub gltf_transform: String,
    /// Texture compression binary required by KTX2/Basis steps
    pub texture_tool: String,
    /// Directories searched before the inherited PATH
    pub search_dirs: Vec<PathBuf>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            gltf_transform: "gltf-transform".to_string(),
            texture_tool: "toktx".to_string(),
            search_dirs: vec![PathBuf::from("/opt/homebrew/bin"), PathBuf::from("/usr/local/bin")],
        }
    }
}

/// Configuration for a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tools: ToolConfig,
    pub pipeline: PipelineConfig,
    /// Only files with this extension are processed (case-insensitive)
    pub extension: String,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tools: ToolConfig::default(),
            pipeline: PipelineConfig::default(),
            extension: "glb".to_string(),
            json_output: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), OptimizeError> {
        if self.tools.gltf_transform.trim().is_empty() {
            return Err(OptimizeError::Validation("gltf-transform tool name cannot be empty".to_string()));
        }
        if self.tools.texture_tool.trim().is_empty() {
            return Err(OptimizeError::Validation("Texture tool name cannot be empty".to_string()));
        }
        if self.extension.trim().is_empty() {
            return Err(OptimizeError::Validation("File extension cannot be empty".to_string()));
        }
        self.pipeline.validate()
    }

    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gltf-optimizer").join("config.json"))
    }

    /// Load configuration from file, defaults when the file does not exist
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
