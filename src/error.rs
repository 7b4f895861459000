//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `OptimizeError` per gli errori che interrompono un batch o un file
//! - Definisce `CommandError` per i fallimenti dei tool esterni (exit code + stderr)
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `SelectionUnavailable`: Nessuna selezione disponibile (lista vuota o non leggibile)
//! - `NoMatchingFiles`: Selezione presente ma nessun file con l'estensione attesa
//! - `Command`: Tool esterno fallito (exit code != 0 o spawn fallito)
//! - `Io`: Errori di I/O (stat del file, rename finale, etc.)
//! - `OutputConflict`: Il file di output coincide con un altro file selezionato
//! - `Validation`: Parametri di configurazione non validi
//!
//! ## Propagazione:
//! - `Command`, `Io` e `OutputConflict` vengono catturati per singolo file e diventano un
//!   `CompressionResult` fallito, senza interrompere il batch
//! - `SelectionUnavailable` e `NoMatchingFiles` interrompono il batch prima
//!   di eseguire qualsiasi comando

use std::path::PathBuf;

/// Custom error types for glTF batch optimization
#[derive(thiserror::Error, Debug)]
pub enum OptimizeError {
    #[error("No files selected")]
    SelectionUnavailable,

    #[error("No .{extension} files in selection")]
    NoMatchingFiles { extension: String },

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot read {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Output {} is also a selected input", .output.display())]
    OutputConflict { output: PathBuf },

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

/// Failure of a single external tool invocation
#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{}", failure_text(.status, .stderr))]
    Failed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },
}

impl CommandError {
    /// Exit status of the failed process, if it exited normally
    pub fn status(&self) -> Option<i32> {
        match self {
            Self::Spawn { .. } => None,
            Self::Failed { status, .. } => *status,
        }
    }

    /// Command line that produced this error
    pub fn command(&self) -> &str {
        match self {
            Self::Spawn { command, .. } | Self::Failed { command, .. } => command,
        }
    }
}

// stderr is the diagnostic the user sees, so it is kept verbatim when present
fn failure_text(status: &Option<i32>, stderr: &str) -> String {
    let stderr = stderr.trim();
    match (status, stderr.is_empty()) {
        (_, false) => stderr.to_string(),
        (Some(code), true) => format!("Command exited with status {}", code),
        (None, true) => "Command terminated by signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failure_keeps_stderr_verbatim() {
        let err = CommandError::Failed {
            command: "gltf-transform weld".to_string(),
            status: Some(1),
            stderr: "Error: Unable to read input\n".to_string(),
        };
        assert_eq!(err.to_string(), "Error: Unable to read input");
        assert_eq!(err.status(), Some(1));
        assert_eq!(err.command(), "gltf-transform weld");
    }

    #[test]
    fn test_command_failure_without_stderr() {
        let err = CommandError::Failed {
            command: "x".to_string(),
            status: Some(3),
            stderr: String::new(),
        };
        assert_eq!(err.to_string(), "Command exited with status 3");
    }

    #[test]
    fn test_selection_messages_are_distinct() {
        let unavailable = OptimizeError::SelectionUnavailable.to_string();
        let no_match = OptimizeError::NoMatchingFiles { extension: "glb".to_string() }.to_string();
        assert_ne!(unavailable, no_match);
        assert_eq!(no_match, "No .glb files in selection");
    }
}
