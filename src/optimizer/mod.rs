//! # Optimizer Module
//!
//! Modulo che separa le responsabilità in sottomoduli:
//! - `batch_optimizer`: Orchestratore principale del batch
//! - `task_optimizer`: Worker per singoli file
//! - `path_resolver`: Logica di calcolo path centralizzata

pub mod batch_optimizer;
pub mod path_resolver;
pub mod task_optimizer;

pub use batch_optimizer::{check_dependencies, resolve_selection, BatchOptimizer, BatchReport};
pub use path_resolver::PathResolver;
pub use task_optimizer::{CompressionResult, TaskOptimizer};
