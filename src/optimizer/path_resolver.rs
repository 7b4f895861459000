//! # Path Resolution Module
//!
//! Centralizza il calcolo dei path di output e delle directory di lavoro.
//!
//! - Output: `<stem>_<suffix>.<ext>` accanto al file originale, mai uguale all'input
//! - Directory di lavoro: temporanea, nella stessa directory della destinazione,
//!   così il rename finale resta sullo stesso filesystem

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

use crate::error::OptimizeError;

/// Prefix of the per-file work directories
pub const WORK_DIR_PREFIX: &str = ".gltf-optimizer-";

/// Utility per calcolare i path di output in modo centralizzato
pub struct PathResolver;

impl PathResolver {
    /// Calcola il path di output per un file dato
    pub fn output_path(input_path: &Path, suffix: &str) -> Result<PathBuf, OptimizeError> {
        let file_stem = input_path
            .file_stem()
            .ok_or_else(|| OptimizeError::Validation(format!("Invalid file name: {}", input_path.display())))?
            .to_string_lossy();

        let filename = match input_path.extension() {
            Some(ext) => format!("{}_{}.{}", file_stem, suffix, ext.to_string_lossy()),
            None => format!("{}_{}", file_stem, suffix),
        };

        let output = input_path.with_file_name(filename);
        debug!("Resolved output path: {} -> {}", input_path.display(), output.display());
        Ok(output)
    }

    /// Crea la directory di lavoro per le fasi intermedie
    pub fn work_dir(destination: &Path) -> Result<TempDir, OptimizeError> {
        let dir = tempfile::Builder::new()
            .prefix(WORK_DIR_PREFIX)
            .tempdir_in(Self::parent_dir(destination))?;
        debug!("Created work directory: {}", dir.path().display());
        Ok(dir)
    }

    /// Work directory name shown by dry runs, nothing is created
    pub fn placeholder_work_dir(destination: &Path) -> PathBuf {
        Self::parent_dir(destination).join(format!("{}XXXXXX", WORK_DIR_PREFIX))
    }

    fn parent_dir(destination: &Path) -> &Path {
        match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_appends_suffix() {
        let output = PathResolver::output_path(Path::new("/models/robot.glb"), "optimized").unwrap();
        assert_eq!(output, PathBuf::from("/models/robot_optimized.glb"));

        let draco = PathResolver::output_path(Path::new("/models/robot.GLB"), "draco").unwrap();
        assert_eq!(draco, PathBuf::from("/models/robot_draco.GLB"));
    }

    #[test]
    fn test_output_never_equals_input() {
        for name in ["a.glb", "a_optimized.glb", "/x/y/scene.v2.glb", "noext"] {
            let input = Path::new(name);
            assert_ne!(PathResolver::output_path(input, "optimized").unwrap(), input);
        }
    }

    #[test]
    fn test_invalid_name_is_rejected() {
        assert!(PathResolver::output_path(Path::new("/"), "optimized").is_err());
    }

    #[test]
    fn test_work_dir_is_next_to_destination_and_removed_on_drop() {
        let root = TempDir::new().unwrap();
        let destination = root.path().join("robot_optimized.glb");

        let work_dir = PathResolver::work_dir(&destination).unwrap();
        let work_path = work_dir.path().to_path_buf();
        assert_eq!(work_path.parent(), Some(root.path()));
        assert!(work_path.exists());

        drop(work_dir);
        assert!(!work_path.exists());
    }

    #[test]
    fn test_placeholder_work_dir_is_not_created() {
        let placeholder = PathResolver::placeholder_work_dir(Path::new("/models/robot_optimized.glb"));
        assert_eq!(placeholder, PathBuf::from("/models/.gltf-optimizer-XXXXXX"));
        assert!(!placeholder.exists());
    }
}
