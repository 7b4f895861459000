//! # Utility Functions Module
//!
//! Helpers for building the argument lists and shell command lines handed
//! to the external tools.

use std::path::Path;

/// Converts a collection of string-like items to `Vec<String>`.
///
/// # Example
/// ```rust
/// use gltf_optimizer::utils::to_string_vec;
///
/// let min = 5;
/// let args = to_string_vec(["--min", &min.to_string()]);
/// assert_eq!(args, vec!["--min".to_string(), "5".to_string()]);
/// ```
pub fn to_string_vec<T, I>(items: I) -> Vec<String>
where
    T: ToString,
    I: IntoIterator<Item = T>,
{
    items.into_iter().map(|item| item.to_string()).collect()
}

/// Macro for argument vectors with mixed item types.
///
/// ```rust
/// use gltf_optimizer::args;
///
/// let ratio = 0.5;
/// assert_eq!(args!["--ratio", ratio], vec!["--ratio".to_string(), "0.5".to_string()]);
/// ```
#[macro_export]
macro_rules! args {
    [$($item:expr),* $(,)?] => {
        $crate::utils::to_string_vec([$($item.to_string()),*])
    };
}

/// Wraps a path in double quotes for `sh -c`, escaping the characters the
/// shell still interprets inside double quotes.
pub fn quote_path(path: &Path) -> String {
    quote(&path.to_string_lossy())
}

/// Program name as the first shell word; quoted only when it contains
/// whitespace so plain names stay readable in logs.
pub fn quote_program(program: &str) -> String {
    if program.contains(char::is_whitespace) {
        quote(program)
    } else {
        program.to_string()
    }
}

/// Double-quotes a single shell word.
///
/// `sh` still expands `"`, `\`, `$` and `` ` `` inside double quotes, so
/// they are escaped. `cmd` has no such escapes and Windows paths cannot
/// contain `"`, so the value is kept verbatim there.
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if cfg!(unix) && matches!(c, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_string_vec_mixed_types() {
        let num = 42;
        let result = to_string_vec(["--min", &num.to_string()]);
        assert_eq!(result, vec!["--min".to_string(), "42".to_string()]);
    }

    #[test]
    fn test_to_string_vec_empty() {
        let result: Vec<String> = to_string_vec(Vec::<&str>::new());
        assert!(result.is_empty());
    }

    #[test]
    fn test_args_macro() {
        let width = 1024;
        let result = args!["--width", width, "--height", width];
        assert_eq!(result, vec!["--width", "1024", "--height", "1024"]);
    }

    #[test]
    fn test_quote_plain_path() {
        assert_eq!(quote_path(Path::new("/tmp/my model.glb")), "\"/tmp/my model.glb\"");
    }

    #[test]
    fn test_quote_program() {
        assert_eq!(quote_program("gltf-transform"), "gltf-transform");
        assert_eq!(quote_program("/opt/my tools/gltf-transform"), "\"/opt/my tools/gltf-transform\"");
    }

    #[cfg(unix)]
    #[test]
    fn test_quote_escapes_shell_specials() {
        assert_eq!(quote("a\"b$c`d\\e"), "\"a\\\"b\\$c\\`d\\\\e\"");
    }

    #[cfg(windows)]
    #[test]
    fn test_quote_keeps_windows_paths_verbatim() {
        assert_eq!(quote_path(Path::new(r"C:\m\$a.glb")), r#""C:\m\$a.glb""#);
    }
}
