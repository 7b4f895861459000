//! # Task Optimizer Module
//!
//! Worker per l'ottimizzazione di un singolo file.
//!
//! Esegue la catena di comandi in ordine, si ferma al primo errore e
//! sposta l'output dell'ultima fase nella destinazione. Gli errori di
//! comando e di I/O diventano un `CompressionResult` fallito con il
//! messaggio originale, senza interrompere il batch.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{
    command_runner::CommandExecutor,
    error::OptimizeError,
    file_manager::FileManager,
    optimizer::path_resolver::PathResolver,
    pipeline::{OptimizeMode, Pipeline},
};

/// Outcome of processing one file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompressionResult {
    /// File name shown to the user
    pub file: String,
    pub success: bool,
    pub error: Option<String>,
    pub original_size: Option<u64>,
    pub compressed_size: Option<u64>,
    /// Written file, on success
    pub output: Option<PathBuf>,
}

impl CompressionResult {
    pub fn succeeded(file: &str, original_size: u64, compressed_size: u64, output: Option<PathBuf>) -> Self {
        Self {
            file: file.to_string(),
            success: true,
            error: None,
            original_size: Some(original_size),
            compressed_size: Some(compressed_size),
            output,
        }
    }

    pub fn failed(file: &str, error: String, original_size: Option<u64>) -> Self {
        Self {
            file: file.to_string(),
            success: false,
            error: Some(error),
            original_size,
            compressed_size: None,
            output: None,
        }
    }

    /// Percentage saved for this file
    pub fn reduction_percent(&self) -> Option<f64> {
        match (self.original_size, self.compressed_size) {
            (Some(original), Some(compressed)) => FileManager::calculate_reduction(original, compressed),
            _ => None,
        }
    }
}

/// Display name for a path
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Worker per elaborazione singoli file
pub struct TaskOptimizer<'a, E> {
    executor: &'a E,
    tool: &'a str,
    mode: &'a OptimizeMode,
}

impl<'a, E: CommandExecutor> TaskOptimizer<'a, E> {
    pub fn new(executor: &'a E, tool: &'a str, mode: &'a OptimizeMode) -> Self {
        Self { executor, tool, mode }
    }

    /// Processa un singolo file
    pub async fn process_single_file(&self, input_path: &Path) -> CompressionResult {
        let file = file_name(input_path);

        let original_size = match FileManager::file_size(input_path).await {
            Ok(size) => size,
            Err(e) => return CompressionResult::failed(&file, e.to_string(), None),
        };

        match self.run_chain(input_path).await {
            Ok((output, compressed_size)) => {
                debug!(
                    "{}: {} -> {}",
                    file,
                    FileManager::format_bytes(original_size),
                    FileManager::format_bytes(compressed_size)
                );
                CompressionResult::succeeded(&file, original_size, compressed_size, Some(output))
            }
            Err(e) => CompressionResult::failed(&file, e.to_string(), Some(original_size)),
        }
    }

    /// Pipeline that would run for `input_path`, without touching the filesystem
    pub fn plan(&self, input_path: &Path) -> Result<Pipeline, OptimizeError> {
        let destination = PathResolver::output_path(input_path, self.mode.suffix())?;
        let work_dir = PathResolver::placeholder_work_dir(&destination);
        Ok(self.mode.build(input_path, &work_dir, &destination))
    }

    /// Command lines of [`plan`](Self::plan), in execution order
    pub fn planned_commands(&self, input_path: &Path) -> Result<Vec<String>, OptimizeError> {
        Ok(self.plan(input_path)?.command_lines(self.tool))
    }

    /// Esegue le fasi in ordine e sposta l'ultimo output nella destinazione
    async fn run_chain(&self, input_path: &Path) -> Result<(PathBuf, u64), OptimizeError> {
        let destination = PathResolver::output_path(input_path, self.mode.suffix())?;

        // Rimossa automaticamente al drop, anche in caso di errore
        let work_dir = PathResolver::work_dir(&destination)?;
        let pipeline = self.mode.build(input_path, work_dir.path(), &destination);

        let total = pipeline.steps.len();
        for (index, step) in pipeline.steps.iter().enumerate() {
            let command = step.command_line(self.tool);
            debug!("Step {}/{} ({}): {}", index + 1, total, step.subcommand, command);
            self.executor.execute(&command).await?;
        }

        let final_output = pipeline
            .final_output()
            .ok_or_else(|| OptimizeError::Validation("Pipeline has no steps".to_string()))?;

        tokio::fs::rename(final_output, &destination).await?;
        let compressed_size = FileManager::file_size(&destination).await?;

        Ok((destination, compressed_size))
    }
}
