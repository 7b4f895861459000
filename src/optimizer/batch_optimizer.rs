//! # Batch Optimizer Main Orchestrator
//!
//! Orchestratore principale che elabora la selezione un file alla volta.
//!
//! ## Flusso di esecuzione:
//! 1. **Selezione**: espande la selezione e filtra per estensione
//!    (`SelectionUnavailable` / `NoMatchingFiles` interrompono subito il batch)
//! 2. **Processing sequenziale**: un file e un comando esterno alla volta
//! 3. **Progress**: notifica `indice / totale` e nome file prima di ogni file
//! 4. **Statistiche**: `BatchSummary` calcolato una sola volta a fine batch
//! 5. **Notifica finale**: esattamente una, con conteggi e byte risparmiati
//!
//! ## Error handling:
//! - Errori per singoli file non bloccano il batch
//! - Un file il cui output è anche un input selezionato fallisce senza
//!   eseguire comandi, così nessun file selezionato viene sovrascritto
//! - Il messaggio di errore originale finisce nel `CompressionResult`

use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{
    command_runner::{CommandExecutor, ShellRunner},
    config::{Config, ToolConfig},
    error::OptimizeError,
    file_manager::FileManager,
    optimizer::path_resolver::PathResolver,
    optimizer::task_optimizer::{file_name, CompressionResult, TaskOptimizer},
    pipeline::OptimizeMode,
    progress::{BatchSummary, NotificationStatus, ProgressReporter},
};

/// Results of a completed batch
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub results: Vec<CompressionResult>,
    pub summary: BatchSummary,
}

/// Orchestratore principale
pub struct BatchOptimizer<E, R> {
    executor: E,
    reporter: R,
    tool: String,
    extension: String,
}

impl<E: CommandExecutor, R: ProgressReporter> BatchOptimizer<E, R> {
    pub fn new(executor: E, reporter: R, config: &Config) -> Self {
        Self {
            executor,
            reporter,
            tool: config.tools.gltf_transform.clone(),
            extension: config.extension.clone(),
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Esegue il batch sulla selezione corrente.
    ///
    /// Selection errors are reported through a short notification and
    /// returned; per-file failures are part of the returned report.
    pub async fn run(&mut self, selection: &[PathBuf], mode: &OptimizeMode) -> Result<BatchReport, OptimizeError> {
        let files = resolve_selection(&mut self.reporter, selection, &self.extension)?;

        let results = self.process_batch(&files, mode).await;

        let summary = BatchSummary::from_results(&results);
        self.reporter.finish(summary.status(), &summary.title(), &summary.message());

        Ok(BatchReport { results, summary })
    }

    /// Processa i file in ordine, uno alla volta
    pub async fn process_batch(&mut self, files: &[PathBuf], mode: &OptimizeMode) -> Vec<CompressionResult> {
        let total = files.len();
        let mut results = Vec::with_capacity(total);
        if total == 0 {
            return results;
        }

        info!("Starting optimization of {} file(s): {}", total, mode.describe());
        self.reporter.start(&format!("Optimizing {} file(s)", total), total);

        // Un output che coincide con un altro input lo sovrascriverebbe
        let inputs: HashSet<&Path> = files.iter().map(PathBuf::as_path).collect();

        let task = TaskOptimizer::new(&self.executor, &self.tool, mode);
        for (index, file) in files.iter().enumerate() {
            self.reporter.update(index + 1, total, &file_name(file));

            let result = match PathResolver::output_path(file, mode.suffix()) {
                Ok(output) if inputs.contains(output.as_path()) => {
                    let original_size = FileManager::file_size(file).await.ok();
                    let error = OptimizeError::OutputConflict { output };
                    CompressionResult::failed(&file_name(file), error.to_string(), original_size)
                }
                _ => task.process_single_file(file).await,
            };
            self.reporter.file_finished(&result);
            results.push(result);
        }

        results
    }
}

/// Expands and filters the selection, reporting a failure through a short
/// notification before returning it
pub fn resolve_selection<R: ProgressReporter>(
    reporter: &mut R,
    selection: &[PathBuf],
    extension: &str,
) -> Result<Vec<PathBuf>, OptimizeError> {
    FileManager::resolve_selection(selection, extension).map_err(|e| {
        reporter.notify(NotificationStatus::Failure, &e.to_string());
        e
    })
}

/// Logs a warning for every required tool that cannot be found.
///
/// Missing tools are not fatal here: the affected files fail individually
/// with the shell's own diagnostic.
pub fn check_dependencies(runner: &ShellRunner, tools: &ToolConfig, mode: &OptimizeMode) -> Vec<String> {
    let mut required = vec![tools.gltf_transform.as_str()];
    if mode.needs_texture_tool() {
        required.push(tools.texture_tool.as_str());
    }

    required
        .into_iter()
        .filter(|tool| !runner.is_tool_available(tool))
        .map(|tool| {
            warn!("Required tool not found: {} (run `gltf-optimizer tools` for details)", tool);
            tool.to_string()
        })
        .collect()
}
