//! # Pipeline Builder
//!
//! Turns a [`PipelineConfig`] into the ordered list of gltf-transform
//! invocations for one file.
//!
//! Execution order is fixed and independent of the order in which options
//! were enabled:
//!
//! | # | Step | Subcommand |
//! |---|------|------------|
//! | 1 | deduplication | `dedup` |
//! | 2 | instancing | `instance --min N` |
//! | 3 | palette textures | `palette --min N` |
//! | 4 | scene-graph flattening | `flatten` |
//! | 5 | mesh joining | `join` |
//! | 6 | vertex welding | `weld` |
//! | 7 | simplification | `simplify --ratio R` |
//! | 8 | animation resampling | `resample` |
//! | 9 | pruning | `prune` |
//! | 10 | sparse accessors | `sparse` |
//! | 11 | texture compression | `etc1s` / `webp` / `avif` / `png` / `jpeg` |
//! | 12 | texture resize | `resize --width N --height N` |
//! | 13 | geometry compression | `draco` / `meshopt` |
//!
//! Joining needs a flat hierarchy and simplification works on welded
//! topology. Geometry compression is lossy and terminal: no later step can
//! read its output, so it always runs last.
//!
//! Every stage writes its own file inside a per-file work directory and the
//! next stage reads it. The last stage's output is moved to the destination
//! by the caller. When nothing is enabled a single `copy` stage is emitted so
//! that an output file always exists.

use std::path::{Path, PathBuf};

use crate::args;
use crate::config::{GeometryCodec, PipelineConfig, Preset, TextureCodec};
use crate::utils::{quote_path, quote_program};

/// No-op subcommand used when no step is enabled
pub const COPY_SUBCOMMAND: &str = "copy";
/// Single-invocation subcommand used by presets
pub const OPTIMIZE_SUBCOMMAND: &str = "optimize";

/// A subcommand and its flags, before paths are assigned
#[derive(Debug, Clone, PartialEq)]
pub struct StepOperation {
    pub subcommand: &'static str,
    pub args: Vec<String>,
}

impl StepOperation {
    fn new(subcommand: &'static str) -> Self {
        Self { subcommand, args: Vec::new() }
    }

    fn with_args(subcommand: &'static str, args: Vec<String>) -> Self {
        Self { subcommand, args }
    }
}

/// One external tool invocation with its declared input and output
#[derive(Debug, Clone, PartialEq)]
pub struct TransformStep {
    pub subcommand: String,
    pub args: Vec<String>,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl TransformStep {
    /// `<tool> <subcommand> "<input>" "<output>" [flags]`
    pub fn command_line(&self, tool: &str) -> String {
        let mut line = format!(
            "{} {} {} {}",
            quote_program(tool),
            self.subcommand,
            quote_path(&self.input),
            quote_path(&self.output)
        );
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Ordered, chained stages for one file
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    pub steps: Vec<TransformStep>,
    /// Where the last stage's output ends up
    pub destination: PathBuf,
}

impl Pipeline {
    /// Chain operations: stage N reads stage N-1's output, every stage writes
    /// its own file inside `work_dir`
    pub fn chain(operations: Vec<StepOperation>, input: &Path, work_dir: &Path, destination: &Path) -> Self {
        let extension = input
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_else(|| "glb".to_string());

        let mut current_input = input.to_path_buf();
        let mut steps = Vec::with_capacity(operations.len());

        for (index, operation) in operations.into_iter().enumerate() {
            let output = work_dir.join(format!("{:02}-{}.{}", index + 1, operation.subcommand, extension));
            steps.push(TransformStep {
                subcommand: operation.subcommand.to_string(),
                args: operation.args,
                input: current_input,
                output: output.clone(),
            });
            current_input = output;
        }

        Self {
            steps,
            destination: destination.to_path_buf(),
        }
    }

    /// Output of the last stage
    pub fn final_output(&self) -> Option<&Path> {
        self.steps.last().map(|step| step.output.as_path())
    }

    pub fn command_lines(&self, tool: &str) -> Vec<String> {
        self.steps.iter().map(|step| step.command_line(tool)).collect()
    }

    pub fn subcommands(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.subcommand.as_str()).collect()
    }
}

/// Composes the ordered step list from the enabled options
pub struct PipelineBuilder<'a> {
    config: &'a PipelineConfig,
}

impl<'a> PipelineBuilder<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    /// Enabled operations in execution order
    pub fn operations(&self) -> Vec<StepOperation> {
        let c = self.config;
        let mut operations = Vec::new();

        if c.dedup {
            operations.push(StepOperation::new("dedup"));
        }
        if c.instance {
            operations.push(StepOperation::with_args("instance", args!["--min", c.instance_min]));
        }
        if c.palette {
            operations.push(StepOperation::with_args("palette", args!["--min", c.palette_min]));
        }
        if c.flatten {
            operations.push(StepOperation::new("flatten"));
        }
        if c.join {
            operations.push(StepOperation::new("join"));
        }
        if c.weld {
            operations.push(StepOperation::new("weld"));
        }
        if c.simplify {
            operations.push(StepOperation::with_args("simplify", args!["--ratio", c.simplify_ratio]));
        }
        if c.resample {
            operations.push(StepOperation::new("resample"));
        }
        if c.prune {
            operations.push(StepOperation::new("prune"));
        }
        if c.sparse {
            operations.push(StepOperation::new("sparse"));
        }
        if let Some(subcommand) = texture_subcommand(c.texture_compression) {
            operations.push(StepOperation::new(subcommand));
        }
        if let Some(size) = c.texture_resize.max_dimension() {
            operations.push(StepOperation::with_args("resize", args!["--width", size, "--height", size]));
        }
        if let Some(subcommand) = geometry_subcommand(c.geometry_compression) {
            operations.push(StepOperation::new(subcommand));
        }

        if operations.is_empty() {
            operations.push(StepOperation::new(COPY_SUBCOMMAND));
        }
        operations
    }

    pub fn build(&self, input: &Path, work_dir: &Path, destination: &Path) -> Pipeline {
        Pipeline::chain(self.operations(), input, work_dir, destination)
    }
}

/// External subcommand for a texture codec; Basis Universal maps to `etc1s`
pub fn texture_subcommand(codec: TextureCodec) -> Option<&'static str> {
    match codec {
        TextureCodec::None => None,
        TextureCodec::Basis => Some("etc1s"),
        TextureCodec::Webp => Some("webp"),
        TextureCodec::Avif => Some("avif"),
        TextureCodec::Png => Some("png"),
        TextureCodec::Jpeg => Some("jpeg"),
    }
}

pub fn geometry_subcommand(codec: GeometryCodec) -> Option<&'static str> {
    match codec {
        GeometryCodec::None => None,
        GeometryCodec::Draco => Some("draco"),
        GeometryCodec::Meshopt => Some("meshopt"),
    }
}

/// The single `optimize` invocation for a preset
pub fn preset_operation(preset: Preset) -> StepOperation {
    let (compress, texture_compress) = match preset {
        Preset::Geometry => ("draco", "false"),
        Preset::Texture => ("false", "ktx2"),
        Preset::Both => ("draco", "ktx2"),
    };
    StepOperation::with_args(
        OPTIMIZE_SUBCOMMAND,
        args!["--compress", compress, "--texture-compress", texture_compress],
    )
}

/// Every output name suffix a mode can produce
pub const OUTPUT_SUFFIXES: &[&str] = &["optimized", "draco", "ktx", "compressed"];

/// What a batch does to each file
#[derive(Debug, Clone, PartialEq)]
pub enum OptimizeMode {
    /// Discrete steps composed from the enabled options
    Custom(PipelineConfig),
    /// One `optimize` invocation with a canned profile
    Preset(Preset),
}

impl OptimizeMode {
    /// Output name suffix: `<stem>_<suffix>.<ext>`
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Custom(_) => "optimized",
            Self::Preset(Preset::Geometry) => "draco",
            Self::Preset(Preset::Texture) => "ktx",
            Self::Preset(Preset::Both) => "compressed",
        }
    }

    pub fn operations(&self) -> Vec<StepOperation> {
        match self {
            Self::Custom(config) => PipelineBuilder::new(config).operations(),
            Self::Preset(preset) => vec![preset_operation(*preset)],
        }
    }

    pub fn build(&self, input: &Path, work_dir: &Path, destination: &Path) -> Pipeline {
        Pipeline::chain(self.operations(), input, work_dir, destination)
    }

    /// Whether a KTX2/Basis step needs the texture tool
    pub fn needs_texture_tool(&self) -> bool {
        match self {
            Self::Custom(config) => config.uses_basis(),
            Self::Preset(preset) => *preset != Preset::Geometry,
        }
    }

    /// Short label for progress titles
    pub fn describe(&self) -> String {
        match self {
            Self::Custom(_) => self
                .operations()
                .iter()
                .map(|op| op.subcommand)
                .collect::<Vec<_>>()
                .join(" → "),
            Self::Preset(Preset::Geometry) => "Draco geometry".to_string(),
            Self::Preset(Preset::Texture) => "KTX2 textures".to_string(),
            Self::Preset(Preset::Both) => "Draco geometry + KTX2 textures".to_string(),
        }
    }
}
