//! # Inspection Reports
//!
//! Runs `gltf-transform inspect "<file>" --format md` and wraps the output in
//! a document titled with the file name. A failed inspection produces an
//! error document for the same file instead of a report body.
//!
//! Inspections are read-only and independent, so a multi-file selection is
//! inspected concurrently; rendering waits for the whole set.
//! [`ReportNavigator`] steps through the resulting documents with wrap-around.

use futures::future::join_all;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::command_runner::CommandExecutor;
use crate::optimizer::task_optimizer::file_name;
use crate::utils::{quote_path, quote_program};

/// Body of an inspection report
#[derive(Debug, Clone, PartialEq)]
pub enum ReportBody {
    /// Markdown produced by the inspect command, verbatim
    Markdown(String),
    /// Failure detail captured from the command
    Failure(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InspectionReport {
    pub file_name: String,
    pub path: PathBuf,
    pub body: ReportBody,
}

impl InspectionReport {
    pub fn is_success(&self) -> bool {
        matches!(self.body, ReportBody::Markdown(_))
    }

    /// Markdown document for display
    pub fn render(&self) -> String {
        match &self.body {
            ReportBody::Markdown(markdown) => format!("# {}\n\n{}", self.file_name, markdown),
            ReportBody::Failure(detail) => format!(
                "# {}\n\n**Inspection failed**\n\n```\n{}\n```\n",
                self.file_name,
                detail.trim_end()
            ),
        }
    }
}

/// Runs the inspect command through a [`CommandExecutor`]
pub struct Inspector<'a, E> {
    executor: &'a E,
    tool: &'a str,
}

impl<'a, E: CommandExecutor> Inspector<'a, E> {
    pub fn new(executor: &'a E, tool: &'a str) -> Self {
        Self { executor, tool }
    }

    /// `<tool> inspect "<input>" --format md`
    pub fn command_line(&self, path: &Path) -> String {
        format!("{} inspect {} --format md", quote_program(self.tool), quote_path(path))
    }

    pub async fn inspect(&self, path: &Path) -> InspectionReport {
        let command = self.command_line(path);
        debug!("Inspecting {}", path.display());

        let body = match self.executor.execute(&command).await {
            Ok(markdown) => ReportBody::Markdown(markdown),
            Err(e) => ReportBody::Failure(e.to_string()),
        };

        InspectionReport {
            file_name: file_name(path),
            path: path.to_path_buf(),
            body,
        }
    }

    /// Inspect every file concurrently; reports keep the input order
    pub async fn inspect_all(&self, paths: &[PathBuf]) -> Vec<InspectionReport> {
        join_all(paths.iter().map(|path| self.inspect(path))).await
    }
}

/// Cyclic navigation over a set of reports
#[derive(Debug, Clone)]
pub struct ReportNavigator {
    reports: Vec<InspectionReport>,
    index: usize,
}

impl ReportNavigator {
    pub fn new(reports: Vec<InspectionReport>) -> Self {
        Self { reports, index: 0 }
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&InspectionReport> {
        self.reports.get(self.index)
    }

    pub fn next_report(&mut self) -> Option<&InspectionReport> {
        if !self.reports.is_empty() {
            self.index = (self.index + 1) % self.reports.len();
        }
        self.current()
    }

    pub fn previous_report(&mut self) -> Option<&InspectionReport> {
        if !self.reports.is_empty() {
            self.index = (self.index + self.reports.len() - 1) % self.reports.len();
        }
        self.current()
    }

    /// "2 / 5" style position
    pub fn position(&self) -> String {
        if self.reports.is_empty() {
            "0 / 0".to_string()
        } else {
            format!("{} / {}", self.index + 1, self.reports.len())
        }
    }

    pub fn reports(&self) -> &[InspectionReport] {
        &self.reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_runner::testing::FakeExecutor;

    fn report(name: &str) -> InspectionReport {
        InspectionReport {
            file_name: name.to_string(),
            path: PathBuf::from(name),
            body: ReportBody::Markdown(String::new()),
        }
    }

    #[test]
    fn test_render_success_document() {
        let report = InspectionReport {
            file_name: "robot.glb".to_string(),
            path: PathBuf::from("/m/robot.glb"),
            body: ReportBody::Markdown("## Meshes\n| name |\n".to_string()),
        };
        assert_eq!(report.render(), "# robot.glb\n\n## Meshes\n| name |\n");
    }

    #[test]
    fn test_render_failure_document() {
        let report = InspectionReport {
            file_name: "bad.glb".to_string(),
            path: PathBuf::from("/m/bad.glb"),
            body: ReportBody::Failure("Error: Invalid GLB\n".to_string()),
        };
        let document = report.render();
        assert!(document.starts_with("# bad.glb\n"));
        assert!(document.contains("**Inspection failed**"));
        assert!(document.contains("```\nError: Invalid GLB\n```"));
        assert!(!report.is_success());
    }

    #[test]
    fn test_next_cycles_back_to_start() {
        let mut navigator = ReportNavigator::new(vec![report("a.glb"), report("b.glb"), report("c.glb")]);
        let start = navigator.index();
        for _ in 0..navigator.len() {
            navigator.next_report();
        }
        assert_eq!(navigator.index(), start);
    }

    #[test]
    fn test_previous_wraps_to_last() {
        let mut navigator = ReportNavigator::new(vec![report("a.glb"), report("b.glb"), report("c.glb")]);
        assert_eq!(navigator.previous_report().unwrap().file_name, "c.glb");
        assert_eq!(navigator.position(), "3 / 3");
        assert_eq!(navigator.next_report().unwrap().file_name, "a.glb");
    }

    #[test]
    fn test_empty_navigator() {
        let mut navigator = ReportNavigator::new(Vec::new());
        assert!(navigator.is_empty());
        assert!(navigator.next_report().is_none());
        assert!(navigator.previous_report().is_none());
        assert_eq!(navigator.position(), "0 / 0");
    }

    #[test]
    fn test_inspect_command_line() {
        let executor = FakeExecutor::new();
        let inspector = Inspector::new(&executor, "gltf-transform");
        assert_eq!(
            inspector.command_line(Path::new("/m/my robot.glb")),
            "gltf-transform inspect \"/m/my robot.glb\" --format md"
        );
    }

    #[test]
    fn test_inspect_all_keeps_order_and_captures_failures() {
        let executor = FakeExecutor::failing_on("bad.glb", "Error: Unexpected EOF");
        let inspector = Inspector::new(&executor, "gltf-transform");
        let paths = vec![PathBuf::from("/m/good.glb"), PathBuf::from("/m/bad.glb")];

        let reports = tokio_test::block_on(inspector.inspect_all(&paths));

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].file_name, "good.glb");
        assert!(reports[0].is_success());
        assert_eq!(reports[1].file_name, "bad.glb");
        assert_eq!(reports[1].body, ReportBody::Failure("Error: Unexpected EOF".to_string()));
        assert_eq!(executor.commands().len(), 2);
    }

    #[test]
    fn test_inspect_output_is_verbatim() {
        let executor = FakeExecutor::with_stdout("## Scenes\n\n| name | rootName |\n");
        let inspector = Inspector::new(&executor, "gltf-transform");
        let report = tokio_test::block_on(inspector.inspect(Path::new("/m/scene.glb")));
        assert_eq!(report.body, ReportBody::Markdown("## Scenes\n\n| name | rootName |\n".to_string()));
    }
}
