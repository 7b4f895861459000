//! # glTF Optimizer Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Configurazione pipeline, tool esterni e persistenza JSON
//! - `error`: Tipi di errore custom (selezione, comandi esterni, I/O)
//! - `file_manager`: Espansione selezione, filtro estensione, dimensioni
//! - `command_runner`: Esecuzione comandi shell con PATH aumentato
//! - `pipeline`: Composizione ordinata degli step di gltf-transform
//! - `optimizer`: Orchestratore del batch e worker per singolo file
//! - `progress`: Notifiche di avanzamento e statistiche aggregate
//! - `json_output`: Notifiche in formato JSON
//! - `report`: Report di ispezione e navigazione
//!
//! ## Utilizzo:
//! ```rust,no_run
//! use gltf_optimizer::{BatchOptimizer, Config, ConsoleReporter, OptimizeMode, ShellRunner};
//! use std::path::PathBuf;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::default();
//! let runner = ShellRunner::new(config.tools.search_dirs.clone());
//! let mode = OptimizeMode::Custom(config.pipeline.clone());
//!
//! let mut optimizer = BatchOptimizer::new(runner, ConsoleReporter::new(), &config);
//! let report = optimizer.run(&[PathBuf::from("models")], &mode).await?;
//! println!("{}", report.summary.message());
//! # Ok(())
//! # }
//! ```

pub mod command_runner;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod json_output;
pub mod optimizer;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod utils;

pub use command_runner::{CommandExecutor, ShellRunner};
pub use config::{Config, PipelineConfig, Preset, ToolConfig};
pub use error::{CommandError, OptimizeError};
pub use json_output::{JsonMessage, JsonReporter};
pub use optimizer::{BatchOptimizer, BatchReport, CompressionResult};
pub use pipeline::{OptimizeMode, PipelineBuilder};
pub use progress::{BatchSummary, ConsoleReporter, NotificationStatus, ProgressReporter};
pub use report::{InspectionReport, Inspector, ReportNavigator};
