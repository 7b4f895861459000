//! # File Management Module
//!
//! Questo modulo gestisce le operazioni sui file e la selezione dei modelli.
//!
//! ## Responsabilità:
//! - Espansione della selezione (file singoli e directory ricorsive)
//! - Filtro per estensione attesa (default: `.glb`, case-insensitive)
//! - Lettura dimensione file
//! - Formattazione human-readable delle dimensioni (Bytes, KB, MB, GB)
//!
//! ## Selezione:
//! - Selezione vuota o con soli path inesistenti → `SelectionUnavailable`
//! - Selezione valida ma senza file con l'estensione attesa → `NoMatchingFiles`
//! - Nelle directory vengono saltati le directory di lavoro rimaste da
//!   esecuzioni interrotte e gli output `<nome>_<suffisso>` già prodotti;
//!   i file selezionati esplicitamente vengono sempre inclusi
//!
//! ## Esempio:
//! ```rust
//! use gltf_optimizer::file_manager::FileManager;
//!
//! assert_eq!(FileManager::format_bytes(0), "0 Bytes");
//! assert_eq!(FileManager::format_bytes(1536), "1.5 KB");
//! ```

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::OptimizeError;
use crate::optimizer::path_resolver::WORK_DIR_PREFIX;
use crate::pipeline::OUTPUT_SUFFIXES;

/// Manages file operations and selection
pub struct FileManager;

impl FileManager {
    /// Size of a file in bytes
    pub async fn file_size(path: &Path) -> Result<u64, OptimizeError> {
        let metadata = fs::metadata(path).await.map_err(|source| OptimizeError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(metadata.len())
    }

    /// Expand the selected paths into the list of files to process.
    ///
    /// Directories are walked recursively. The result is sorted and free of
    /// duplicates so that progress order is stable.
    pub fn expand_selection(selected: &[PathBuf]) -> Result<Vec<PathBuf>, OptimizeError> {
        let mut files = Vec::new();

        for path in selected {
            if path.is_dir() {
                files.extend(
                    WalkDir::new(path)
                        .into_iter()
                        .filter_entry(|e| e.depth() == 0 || !Self::is_work_dir(e.path()))
                        .filter_map(|e| e.ok())
                        .filter(|e| e.file_type().is_file())
                        .map(|e| e.into_path())
                        .filter(|p| {
                            let generated = Self::is_generated_output(p);
                            if generated {
                                debug!("Skipping previous output: {}", p.display());
                            }
                            !generated
                        }),
                );
            } else if path.is_file() {
                files.push(path.clone());
            } else {
                warn!("Selected path does not exist: {}", path.display());
            }
        }

        if files.is_empty() {
            return Err(OptimizeError::SelectionUnavailable);
        }

        files.sort();
        files.dedup();
        Ok(files)
    }

    /// Keep only files with the expected extension
    pub fn filter_by_extension(files: Vec<PathBuf>, extension: &str) -> Result<Vec<PathBuf>, OptimizeError> {
        let total = files.len();
        let matching: Vec<PathBuf> = files
            .into_iter()
            .filter(|path| Self::has_extension(path, extension))
            .collect();

        debug!("{} of {} selected files match .{}", matching.len(), total, extension);

        if matching.is_empty() {
            return Err(OptimizeError::NoMatchingFiles {
                extension: extension.to_string(),
            });
        }
        Ok(matching)
    }

    /// Selection expansion followed by extension filtering
    pub fn resolve_selection(selected: &[PathBuf], extension: &str) -> Result<Vec<PathBuf>, OptimizeError> {
        let files = Self::expand_selection(selected)?;
        Self::filter_by_extension(files, extension)
    }

    /// Leftover stage directory of an interrupted run
    pub fn is_work_dir(path: &Path) -> bool {
        path.file_name()
            .map(|name| name.to_string_lossy().starts_with(WORK_DIR_PREFIX))
            .unwrap_or(false)
    }

    /// `<stem>_<suffix>.<ext>` written by an earlier batch
    pub fn is_generated_output(path: &Path) -> bool {
        path.file_stem()
            .map(|stem| {
                let stem = stem.to_string_lossy();
                OUTPUT_SUFFIXES
                    .iter()
                    .any(|suffix| stem.ends_with(&format!("_{}", suffix)))
            })
            .unwrap_or(false)
    }

    /// Case-insensitive extension check
    pub fn has_extension(path: &Path, extension: &str) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension.trim_start_matches('.')))
            .unwrap_or(false)
    }

    /// Get human-readable file size.
    ///
    /// Scaled values carry two decimals; a trailing zero after a non-zero
    /// first decimal is dropped ("1.5 KB"), while whole values keep both
    /// ("1.00 GB").
    pub fn format_bytes(bytes: u64) -> String {
        const UNITS: &[&str] = &["Bytes", "KB", "MB", "GB"];

        if bytes == 0 {
            return "0 Bytes".to_string();
        }

        let mut size = bytes as f64;
        let mut unit_index = 0;
        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            return format!("{} {}", bytes, UNITS[0]);
        }

        let fixed = format!("{:.2}", size);
        let shown = if fixed.ends_with('0') && !fixed.ends_with(".00") {
            &fixed[..fixed.len() - 1]
        } else {
            fixed.as_str()
        };
        format!("{} {}", shown, UNITS[unit_index])
    }

    /// Percentage saved going from `original` to `new` bytes
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> Option<f64> {
        if original_size == 0 {
            None
        } else {
            Some(((original_size as f64 - new_size as f64) / original_size as f64) * 100.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_bytes() {
        assert_eq!(FileManager::format_bytes(0), "0 Bytes");
        assert_eq!(FileManager::format_bytes(1), "1 Bytes");
        assert_eq!(FileManager::format_bytes(1023), "1023 Bytes");
        assert_eq!(FileManager::format_bytes(1536), "1.5 KB");
        assert_eq!(FileManager::format_bytes(1024), "1.00 KB");
        assert_eq!(FileManager::format_bytes(1073741824), "1.00 GB");
        assert_eq!(FileManager::format_bytes(5 * 1024 * 1024 + 256 * 1024), "5.25 MB");
    }

    #[test]
    fn test_format_bytes_caps_at_gigabytes() {
        assert_eq!(FileManager::format_bytes(2048 * 1024 * 1024 * 1024), "2048.00 GB");
        assert!(FileManager::format_bytes(u64::MAX).ends_with(" GB"));
    }

    #[test]
    fn test_calculate_reduction() {
        assert_eq!(FileManager::calculate_reduction(300, 150), Some(50.0));
        assert_eq!(FileManager::calculate_reduction(0, 0), None);
    }

    #[test]
    fn test_has_extension_case_insensitive() {
        assert!(FileManager::has_extension(Path::new("/a/Model.GLB"), "glb"));
        assert!(FileManager::has_extension(Path::new("model.glb"), ".glb"));
        assert!(!FileManager::has_extension(Path::new("model.gltf"), "glb"));
        assert!(!FileManager::has_extension(Path::new("glb"), "glb"));
    }

    #[test]
    fn test_empty_selection_is_unavailable() {
        let result = FileManager::resolve_selection(&[], "glb");
        assert!(matches!(result, Err(OptimizeError::SelectionUnavailable)));
    }

    #[test]
    fn test_selection_without_matching_extension() {
        let dir = TempDir::new().unwrap();
        let texture = dir.path().join("texture.png");
        std::fs::write(&texture, b"png").unwrap();

        let result = FileManager::resolve_selection(&[texture], "glb");
        assert!(matches!(result, Err(OptimizeError::NoMatchingFiles { .. })));
    }

    #[test]
    fn test_directories_are_expanded() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("props");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(dir.path().join("b.glb"), b"b").unwrap();
        std::fs::write(nested.join("a.glb"), b"a").unwrap();
        std::fs::write(nested.join("notes.txt"), b"n").unwrap();

        let files = FileManager::resolve_selection(
            &[dir.path().to_path_buf(), dir.path().join("b.glb")],
            "glb",
        )
        .unwrap();

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| FileManager::has_extension(f, "glb")));
    }

    #[test]
    fn test_walk_skips_work_dirs_and_previous_outputs() {
        let dir = TempDir::new().unwrap();
        let work = dir.path().join(".gltf-optimizer-abc123");
        std::fs::create_dir(&work).unwrap();
        std::fs::write(dir.path().join("robot.glb"), b"r").unwrap();
        std::fs::write(dir.path().join("robot_optimized.glb"), b"o").unwrap();
        std::fs::write(dir.path().join("robot_draco.glb"), b"d").unwrap();
        std::fs::write(work.join("01-weld.glb"), b"w").unwrap();

        let files = FileManager::resolve_selection(&[dir.path().to_path_buf()], "glb").unwrap();

        assert_eq!(files, vec![dir.path().join("robot.glb")]);
    }

    #[test]
    fn test_explicit_selection_keeps_previous_output() {
        let dir = TempDir::new().unwrap();
        let previous = dir.path().join("robot_compressed.glb");
        std::fs::write(&previous, b"c").unwrap();

        let files = FileManager::resolve_selection(&[previous.clone()], "glb").unwrap();
        assert_eq!(files, vec![previous]);
    }

    #[test]
    fn test_generated_output_names() {
        assert!(FileManager::is_generated_output(Path::new("/m/car_ktx.glb")));
        assert!(!FileManager::is_generated_output(Path::new("/m/car.glb")));
        assert!(!FileManager::is_generated_output(Path::new("/m/draco.glb")));
        assert!(FileManager::is_work_dir(Path::new("/m/.gltf-optimizer-x1y2z3")));
    }

    #[tokio::test]
    async fn test_file_size() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.glb");
        std::fs::write(&path, vec![0u8; 1234]).unwrap();

        assert_eq!(FileManager::file_size(&path).await.unwrap(), 1234);
        assert!(matches!(
            FileManager::file_size(&dir.path().join("missing.glb")).await,
            Err(OptimizeError::FileAccess { .. })
        ));
    }
}
