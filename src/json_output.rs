//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per i front-end
//! (launcher, script) che guidano il binario.
//!
//! ## Responsabilità:
//! - Emette un messaggio JSON per riga su stdout
//! - Implementa `ProgressReporter` così l'orchestratore non conosce il formato
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio batch (titolo, totale file)
//! - `progress`: Inizio elaborazione di un file (indice, totale, nome)
//! - `file_complete`: Fine elaborazione di un file (`CompressionResult`)
//! - `complete`: Notifica finale (stato, titolo, messaggio)
//! - `notification`: Notifica breve per uscite anticipate
//! - `report`: Risultati e statistiche finali
//! - `inspection`: Documento di ispezione per un file

use serde::Serialize;

use crate::optimizer::{BatchReport, CompressionResult};
use crate::progress::{NotificationStatus, ProgressReporter};
use crate::report::InspectionReport;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage<'a> {
    Start {
        title: &'a str,
        total: usize,
    },
    Progress {
        index: usize,
        total: usize,
        percentage: f64,
        file: &'a str,
    },
    FileComplete {
        #[serde(flatten)]
        result: &'a CompressionResult,
    },
    Complete {
        status: NotificationStatus,
        title: &'a str,
        message: &'a str,
    },
    Notification {
        status: NotificationStatus,
        message: &'a str,
    },
    Report {
        #[serde(flatten)]
        report: &'a BatchReport,
        percent_saved: Option<f64>,
    },
    Inspection {
        file: &'a str,
        success: bool,
        document: String,
    },
}

impl<'a> JsonMessage<'a> {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Some(json) = self.to_json() {
            println!("{}", json);
        }
    }

    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }

    pub fn progress(index: usize, total: usize, file: &'a str) -> Self {
        let percentage = if total > 0 {
            (index as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        Self::Progress {
            index,
            total,
            percentage,
            file,
        }
    }

    pub fn report(report: &'a BatchReport) -> Self {
        Self::Report {
            report,
            percent_saved: report.summary.percent_saved(),
        }
    }

    pub fn inspection(report: &'a InspectionReport) -> Self {
        Self::Inspection {
            file: &report.file_name,
            success: report.is_success(),
            document: report.render(),
        }
    }
}

/// Reporter that writes every notification as a JSON line
#[derive(Debug, Default)]
pub struct JsonReporter;

impl ProgressReporter for JsonReporter {
    fn start(&mut self, title: &str, total: usize) {
        JsonMessage::Start { title, total }.emit();
    }

    fn update(&mut self, index: usize, total: usize, file_name: &str) {
        JsonMessage::progress(index, total, file_name).emit();
    }

    fn file_finished(&mut self, result: &CompressionResult) {
        JsonMessage::FileComplete { result }.emit();
    }

    fn finish(&mut self, status: NotificationStatus, title: &str, message: &str) {
        JsonMessage::Complete { status, title, message }.emit();
    }

    fn notify(&mut self, status: NotificationStatus, message: &str) {
        JsonMessage::Notification { status, message }.emit();
    }
}
