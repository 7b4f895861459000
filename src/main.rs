//! # glTF Optimizer - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing` (su stderr)
//! - Caricamento della configurazione e applicazione degli override CLI
//! - Avvio del batch, dell'ispezione o del report dei tool
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (sottocomando, file, step della pipeline)
//! 2. Configura il logging (`RUST_LOG`, altrimenti INFO o DEBUG con `--verbose`)
//! 3. Carica la configurazione e applica i flag della command line
//! 4. Verifica la presenza dei tool esterni (solo warning)
//! 5. Esegue il batch e imposta l'exit code
//!
//! ## Esempio di utilizzo:
//! ```bash
//! gltf-optimizer optimize models/ --weld --simplify --simplify-ratio 0.5 --geometry-compression draco
//! gltf-optimizer preset both scene.glb
//! gltf-optimizer inspect models/ --all
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use gltf_optimizer::{
    config::{GeometryCodec, TextureCodec, TextureResize},
    file_manager::FileManager,
    optimizer::{check_dependencies, resolve_selection, TaskOptimizer},
    BatchOptimizer, BatchReport, CommandExecutor, Config, ConsoleReporter, InspectionReport, Inspector,
    JsonMessage, JsonReporter, OptimizeMode, PipelineConfig, Preset, ProgressReporter, ReportNavigator,
    ShellRunner,
};

#[derive(Parser)]
#[command(name = "gltf-optimizer")]
#[command(version, about = "Batch-optimize glTF/GLB files through gltf-transform pipelines")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (default: <config dir>/gltf-optimizer/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output progress and results as JSON lines on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory searched for external tools before PATH (repeatable)
    #[arg(long = "search-dir", value_name = "DIR", global = true)]
    search_dirs: Vec<PathBuf>,

    /// Save the effective configuration to the configuration file
    #[arg(long, global = true)]
    save_config: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run a custom pipeline of gltf-transform steps on every file
    Optimize {
        /// Files or directories (searched recursively)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        steps: StepArgs,

        /// Print the command lines without running anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Run a single `optimize` invocation with a canned profile
    Preset {
        #[arg(value_enum)]
        preset: Preset,

        /// Files or directories (searched recursively)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Show inspection reports
    Inspect {
        /// Files or directories (searched recursively)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print every report instead of navigating interactively
        #[arg(long)]
        all: bool,
    },

    /// Show where the external tools are found
    Tools,
}

/// Pipeline step switches; each one overrides the configuration file
#[derive(Args)]
struct StepArgs {
    /// Remove duplicate accessors, meshes, materials and textures
    #[arg(long)]
    dedup: bool,

    /// Create GPU instances for repeated meshes
    #[arg(long)]
    instance: bool,

    /// Minimum occurrences before a mesh is instanced
    #[arg(long, value_name = "N")]
    instance_min: Option<u32>,

    /// Merge materials into palette textures
    #[arg(long)]
    palette: bool,

    /// Minimum materials before a palette is created
    #[arg(long, value_name = "N")]
    palette_min: Option<u32>,

    /// Flatten the scene graph
    #[arg(long)]
    flatten: bool,

    /// Join compatible meshes
    #[arg(long)]
    join: bool,

    /// Merge equivalent vertices
    #[arg(long)]
    weld: bool,

    /// Reduce vertex count
    #[arg(long)]
    simplify: bool,

    /// Target vertex ratio for simplification (0.0-1.0)
    #[arg(long, value_name = "RATIO")]
    simplify_ratio: Option<f64>,

    /// Resample animation keyframes
    #[arg(long)]
    resample: bool,

    /// Remove unused nodes, textures and materials
    #[arg(long)]
    prune: bool,

    /// Use sparse accessors where possible
    #[arg(long)]
    sparse: bool,

    /// Texture codec
    #[arg(long, value_enum)]
    texture_compression: Option<TextureCodec>,

    /// Maximum texture dimension
    #[arg(long, value_enum)]
    texture_resize: Option<TextureResize>,

    /// Geometry codec, always applied last
    #[arg(long, value_enum)]
    geometry_compression: Option<GeometryCodec>,
}

impl StepArgs {
    fn apply(&self, pipeline: &mut PipelineConfig) {
        pipeline.dedup |= self.dedup;
        pipeline.instance |= self.instance;
        pipeline.palette |= self.palette;
        pipeline.flatten |= self.flatten;
        pipeline.join |= self.join;
        pipeline.weld |= self.weld;
        pipeline.simplify |= self.simplify;
        pipeline.resample |= self.resample;
        pipeline.prune |= self.prune;
        pipeline.sparse |= self.sparse;

        if let Some(min) = self.instance_min {
            pipeline.instance_min = min;
        }
        if let Some(min) = self.palette_min {
            pipeline.palette_min = min;
        }
        if let Some(ratio) = self.simplify_ratio {
            pipeline.simplify_ratio = ratio;
        }
        if let Some(codec) = self.texture_compression {
            pipeline.texture_compression = codec;
        }
        if let Some(resize) = self.texture_resize {
            pipeline.texture_resize = resize;
        }
        if let Some(codec) = self.geometry_compression {
            pipeline.geometry_compression = codec;
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging on stderr, stdout is reserved for results
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.clone().or_else(Config::default_path);
    let mut config = match &config_path {
        Some(path) => Config::from_file(path)
            .await
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    config.json_output |= cli.json;
    if !cli.search_dirs.is_empty() {
        config.tools.search_dirs = cli.search_dirs.clone();
    }
    if let Command::Optimize { steps, .. } = &cli.command {
        steps.apply(&mut config.pipeline);
    }
    config.validate()?;

    if cli.save_config {
        let path = config_path.context("No configuration directory available, use --config")?;
        config.save_to_file(&path).await?;
        info!("Saved configuration to {}", path.display());
    }

    let runner = ShellRunner::new(config.tools.search_dirs.clone());

    match cli.command {
        Command::Tools => {
            print!(
                "{}",
                runner.tools_report(&[config.tools.gltf_transform.as_str(), config.tools.texture_tool.as_str()])
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::Optimize { files, dry_run: true, .. } => {
            let mode = OptimizeMode::Custom(config.pipeline.clone());
            print_plan(&runner, &config, &files, &mode)
        }
        Command::Optimize { files, .. } => {
            let mode = OptimizeMode::Custom(config.pipeline.clone());
            run_optimization(runner, &config, &files, &mode).await
        }
        Command::Preset { preset, files } => {
            let mode = OptimizeMode::Preset(preset);
            run_optimization(runner, &config, &files, &mode).await
        }
        Command::Inspect { files, all } => run_inspection(&runner, &config, &files, all).await,
    }
}

async fn run_optimization(
    runner: ShellRunner,
    config: &Config,
    files: &[PathBuf],
    mode: &OptimizeMode,
) -> Result<ExitCode> {
    check_dependencies(&runner, &config.tools, mode);

    let report = if config.json_output {
        let report = run_batch(runner, JsonReporter, config, files, mode).await;
        if let Some(report) = &report {
            JsonMessage::report(report).emit();
        }
        report
    } else {
        let report = run_batch(runner, ConsoleReporter::new(), config, files, mode).await;
        if let Some(report) = &report {
            print_results(report);
        }
        report
    };

    Ok(match report {
        Some(report) if report.summary.succeeded > 0 => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

/// `None` when the batch aborted before any file was processed
async fn run_batch<E: CommandExecutor, R: ProgressReporter>(
    executor: E,
    reporter: R,
    config: &Config,
    files: &[PathBuf],
    mode: &OptimizeMode,
) -> Option<BatchReport> {
    let mut optimizer = BatchOptimizer::new(executor, reporter, config);
    match optimizer.run(files, mode).await {
        Ok(report) => Some(report),
        Err(e) => {
            debug!("Batch aborted: {}", e);
            None
        }
    }
}

fn print_results(report: &BatchReport) {
    println!();
    for result in &report.results {
        match (&result.error, result.original_size, result.compressed_size) {
            (None, Some(original), Some(compressed)) => println!(
                "✅ {}: {} -> {} ({})",
                result.file,
                FileManager::format_bytes(original),
                FileManager::format_bytes(compressed),
                result
                    .reduction_percent()
                    .map(|p| format!("{:.1}%", p))
                    .unwrap_or_else(|| "N/A".to_string())
            ),
            (error, _, _) => println!("❌ {}: {}", result.file, error.as_deref().unwrap_or("Unknown error")),
        }
    }
    println!("\n{}\n{}", report.summary.title(), report.summary.message());
}

/// Selection for commands that do not run a batch, with failures notified
/// the way a batch notifies them
fn select_files(config: &Config, files: &[PathBuf]) -> Option<Vec<PathBuf>> {
    let selected = if config.json_output {
        resolve_selection(&mut JsonReporter, files, &config.extension)
    } else {
        resolve_selection(&mut ConsoleReporter::new(), files, &config.extension)
    };
    selected.ok()
}

fn print_plan(runner: &ShellRunner, config: &Config, files: &[PathBuf], mode: &OptimizeMode) -> Result<ExitCode> {
    let Some(files) = select_files(config, files) else {
        return Ok(ExitCode::FAILURE);
    };
    let task = TaskOptimizer::new(runner, &config.tools.gltf_transform, mode);

    for file in &files {
        println!("# {}", file.display());
        for command in task.planned_commands(file)? {
            println!("{}", command);
        }
        println!();
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_inspection(runner: &ShellRunner, config: &Config, files: &[PathBuf], all: bool) -> Result<ExitCode> {
    let Some(files) = select_files(config, files) else {
        return Ok(ExitCode::FAILURE);
    };
    check_dependencies(runner, &config.tools, &OptimizeMode::Custom(PipelineConfig::default()));

    let spinner = (!config.json_output)
        .then(|| ConsoleReporter::spinner(&format!("Inspecting {} file(s)...", files.len())));
    let reports = Inspector::new(runner, &config.tools.gltf_transform)
        .inspect_all(&files)
        .await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let exit_code = if reports.iter().any(InspectionReport::is_success) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    };

    if config.json_output {
        for report in &reports {
            JsonMessage::inspection(report).emit();
        }
    } else if all || reports.len() == 1 || !std::io::stdin().is_terminal() {
        for report in &reports {
            println!("{}", report.render());
        }
    } else {
        navigate(ReportNavigator::new(reports)).await?;
    }

    Ok(exit_code)
}

/// Interactive `n` / `p` / `q` navigation over the reports
async fn navigate(mut navigator: ReportNavigator) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    show(navigator.current(), &navigator.position());
    loop {
        eprint!("[n]ext  [p]revious  [q]uit > ");
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "n" | "" => {
                navigator.next_report();
            }
            "p" => {
                navigator.previous_report();
            }
            "q" => break,
            other => {
                eprintln!("Unknown command: {}", other);
                continue;
            }
        }
        show(navigator.current(), &navigator.position());
    }
    Ok(())
}

fn show(report: Option<&InspectionReport>, position: &str) {
    if let Some(report) = report {
        println!("\n{}", report.render());
        eprintln!("({}) {}", position, report.path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_step_flags_override_configuration() {
        let cli = Cli::parse_from([
            "gltf-optimizer",
            "optimize",
            "scene.glb",
            "--weld",
            "--simplify-ratio",
            "0.5",
            "--texture-resize",
            "1024",
            "--geometry-compression",
            "meshopt",
        ]);
        let Command::Optimize { steps, files, dry_run } = cli.command else {
            panic!("expected optimize");
        };
        assert_eq!(files, vec![PathBuf::from("scene.glb")]);
        assert!(!dry_run);

        let mut pipeline = PipelineConfig {
            dedup: true,
            ..Default::default()
        };
        steps.apply(&mut pipeline);

        assert!(pipeline.dedup);
        assert!(pipeline.weld);
        assert!(!pipeline.simplify);
        assert_eq!(pipeline.simplify_ratio, 0.5);
        assert_eq!(pipeline.texture_resize, TextureResize::Max1024);
        assert_eq!(pipeline.geometry_compression, GeometryCodec::Meshopt);
        assert_eq!(pipeline.instance_min, 5);
    }

    #[test]
    fn test_select_files_reports_missing_selection() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config {
            json_output: true,
            ..Default::default()
        };

        assert!(select_files(&config, &[dir.path().join("gone.glb")]).is_none());

        let model = dir.path().join("scene.glb");
        std::fs::write(&model, b"glTF").unwrap();
        assert_eq!(select_files(&config, &[model.clone()]), Some(vec![model]));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "gltf-optimizer",
            "preset",
            "both",
            "models",
            "--json",
            "--search-dir",
            "/opt/a",
            "--search-dir",
            "/opt/b",
        ]);
        assert!(cli.json);
        assert_eq!(cli.search_dirs, vec![PathBuf::from("/opt/a"), PathBuf::from("/opt/b")]);
        assert!(matches!(cli.command, Command::Preset { preset: Preset::Both, .. }));
    }
}
