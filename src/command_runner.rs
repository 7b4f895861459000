//! # External Command Runner
//!
//! Runs command lines for the external tools (gltf-transform, toktx) in a
//! shell whose `PATH` is the configured search directories followed by the
//! inherited `PATH`. Launchers and file managers usually start processes
//! with a minimal environment, so tools installed by Homebrew or npm would
//! otherwise not be found.
//!
//! The search directories are an explicit value handed to [`ShellRunner`];
//! the process environment is never modified.
//!
//! No timeout is applied: a command runs until the external process exits.

use std::env;
use std::ffi::OsString;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::CommandError;

/// Something that can execute a shell command line and return its stdout.
///
/// [`ShellRunner`] is the real implementation; orchestration code is generic
/// over this trait so it can be driven without spawning processes.
pub trait CommandExecutor: Send + Sync {
    fn execute(&self, command: &str) -> impl Future<Output = Result<String, CommandError>> + Send;
}

/// Shell command runner with an augmented search path
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    /// Directories searched before the inherited PATH
    search_dirs: Vec<PathBuf>,
}

impl ShellRunner {
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        Self { search_dirs }
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Search directories, in lookup order: configured dirs first, then the
    /// inherited PATH
    pub fn search_path_entries(&self) -> Vec<PathBuf> {
        let inherited = env::var_os("PATH")
            .map(|path| env::split_paths(&path).collect::<Vec<_>>())
            .unwrap_or_default();

        self.search_dirs.iter().cloned().chain(inherited).collect()
    }

    /// PATH value passed to spawned shells
    pub fn search_path(&self) -> OsString {
        match env::join_paths(self.search_path_entries()) {
            Ok(path) => path,
            Err(e) => {
                warn!("Ignoring search directories that cannot be joined into PATH: {}", e);
                env::var_os("PATH").unwrap_or_default()
            }
        }
    }

    /// Shell program and flag used to run a command line
    fn shell() -> (&'static str, &'static str) {
        if cfg!(windows) {
            ("cmd", "/C")
        } else {
            ("sh", "-c")
        }
    }

    /// Resolve the path to a tool (explicit path or lookup in the search path)
    pub fn resolve_tool(&self, tool_name: &str) -> Option<PathBuf> {
        let direct = Path::new(tool_name);
        if direct.components().count() > 1 {
            return direct.is_file().then(|| direct.to_path_buf());
        }

        let extension = if cfg!(windows) { ".exe" } else { "" };
        let tool_with_ext = format!("{}{}", tool_name, extension);

        self.search_path_entries()
            .into_iter()
            .map(|dir| dir.join(&tool_with_ext))
            .find(|path| path.is_file())
    }

    /// Check if a specific tool is available
    pub fn is_tool_available(&self, tool_name: &str) -> bool {
        self.resolve_tool(tool_name).is_some()
    }

    /// Installation hint shown for missing tools
    fn install_instructions(tool_name: &str) -> String {
        match tool_name {
            "gltf-transform" => "npm install --global @gltf-transform/cli".to_string(),
            "toktx" => "install KTX-Software from https://github.com/KhronosGroup/KTX-Software/releases".to_string(),
            _ => format!("install {} and make sure it is on PATH", tool_name),
        }
    }

    /// Get a report of tool availability
    pub fn tools_report(&self, tools: &[&str]) -> String {
        let mut report = String::from("Tool availability:\n");
        for tool in tools {
            match self.resolve_tool(tool) {
                Some(path) => report.push_str(&format!("  ✅ {} -> {}\n", tool, path.display())),
                None => report.push_str(&format!(
                    "  ❌ {} (not found, {})\n",
                    tool,
                    Self::install_instructions(tool)
                )),
            }
        }
        report.push_str("\nSearch path:\n");
        for dir in self.search_path_entries() {
            report.push_str(&format!("  {}\n", dir.display()));
        }
        report
    }
}

impl CommandExecutor for ShellRunner {
    async fn execute(&self, command: &str) -> Result<String, CommandError> {
        let (shell, flag) = Self::shell();
        debug!("Running: {}", command);

        let start_time = Instant::now();
        let output = Command::new(shell)
            .arg(flag)
            .arg(command)
            .env("PATH", self.search_path())
            .output()
            .await
            .map_err(|source| CommandError::Spawn {
                command: command.to_string(),
                source,
            })?;
        let elapsed = start_time.elapsed();

        if output.status.success() {
            debug!("Command completed in {:?}", elapsed);
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            // callers decide how loudly a failure is reported
            debug!("Command failed after {:?} ({}): {}", elapsed, output.status, stderr.trim());
            Err(CommandError::Failed {
                command: command.to_string(),
                status: output.status.code(),
                stderr,
            })
        }
    }
}

/// Executor double that records command lines instead of spawning processes
#[cfg(test)]
pub(crate) mod testing {
    use super::CommandExecutor;
    use crate::error::CommandError;
    use std::sync::Mutex;

    pub struct FakeExecutor {
        commands: Mutex<Vec<String>>,
        fail_on: Option<(String, String)>,
        stdout: String,
    }

    impl FakeExecutor {
        /// Content written to every declared output
        pub const OUTPUT: &'static [u8] = b"optimized-glb";

        pub fn new() -> Self {
            Self {
                commands: Mutex::new(Vec::new()),
                fail_on: None,
                stdout: String::new(),
            }
        }

        /// Fail every command line containing `pattern` with `stderr`
        pub fn failing_on(pattern: &str, stderr: &str) -> Self {
            Self {
                fail_on: Some((pattern.to_string(), stderr.to_string())),
                ..Self::new()
            }
        }

        pub fn with_stdout(stdout: &str) -> Self {
            Self {
                stdout: stdout.to_string(),
                ..Self::new()
            }
        }

        pub fn commands(&self) -> Vec<String> {
            self.commands.lock().unwrap().clone()
        }
    }

    impl CommandExecutor for FakeExecutor {
        async fn execute(&self, command: &str) -> Result<String, CommandError> {
            self.commands.lock().unwrap().push(command.to_string());

            if let Some((pattern, stderr)) = &self.fail_on {
                if command.contains(pattern.as_str()) {
                    return Err(CommandError::Failed {
                        command: command.to_string(),
                        status: Some(1),
                        stderr: stderr.clone(),
                    });
                }
            }

            // <tool> <subcommand> "<input>" "<output>" [flags]
            if let Some(output) = command.split('"').nth(3) {
                std::fs::write(output, Self::OUTPUT).map_err(|source| CommandError::Spawn {
                    command: command.to_string(),
                    source,
                })?;
            }
            Ok(self.stdout.clone())
        }
    }
}
