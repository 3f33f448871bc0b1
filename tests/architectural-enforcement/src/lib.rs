//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce the workspace layering:
//! - Core stays headless (no terminal crates)
//! - Only the HTTP client layer talks to reqwest
//! - Views and surfaces reach the backend through `Request` values only
//! - The default backend origin lives in one place
//!
//! The helpers here scan production source. Comments and `#[cfg(test)]`
//! modules are skipped.

use std::fs;
use std::path::{Path, PathBuf};

/// Workspace root, two levels above this package
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// All `.rs` files under `dir` (relative to the workspace root)
#[must_use]
pub fn rust_files(dir: &str) -> Vec<PathBuf> {
    let path = workspace_root().join(dir);
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(walkdir::DirEntry::into_path)
        .collect();
    files.sort();
    files
}

/// One line of production code
#[derive(Debug, Clone)]
pub struct CodeLine {
    /// File the line came from
    pub path: PathBuf,
    /// 1-based line number
    pub number: usize,
    /// Code with any trailing `//` comment removed
    pub code: String,
}

impl std::fmt::Display for CodeLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let root = workspace_root();
        let shown = self.path.strip_prefix(&root).unwrap_or(&self.path);
        write!(f, "{}:{} - {}", shown.display(), self.number, self.code.trim())
    }
}

/// Production lines of one file: everything before the first `#[cfg(test)]`,
/// minus comments
#[must_use]
pub fn production_lines(path: &Path) -> Vec<CodeLine> {
    let Ok(content) = fs::read_to_string(path) else {
        return Vec::new();
    };

    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| line.trim() != "#[cfg(test)]")
        .filter_map(|(idx, line)| {
            let code = strip_comment(line);
            if code.trim().is_empty() {
                return None;
            }
            Some(CodeLine {
                path: path.to_path_buf(),
                number: idx + 1,
                code: code.to_string(),
            })
        })
        .collect()
}

/// Production lines under `dir` that contain any of `needles`
#[must_use]
pub fn find_violations(dir: &str, needles: &[&str]) -> Vec<CodeLine> {
    rust_files(dir)
        .iter()
        .flat_map(|path| production_lines(path))
        .filter(|line| needles.iter().any(|needle| line.code.contains(needle)))
        .collect()
}

/// Code before a `//` comment, ignoring `//` inside string literals
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut prev = '\0';
    for (idx, ch) in line.char_indices() {
        match ch {
            '"' if prev != '\\' => in_string = !in_string,
            '/' if !in_string && prev == '/' => return &line[..idx - 1],
            _ => {}
        }
        prev = ch;
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_comment() {
        assert_eq!(strip_comment("let x = 1; // note"), "let x = 1; ");
        assert_eq!(strip_comment("/// doc"), "");
        assert_eq!(
            strip_comment(r#"let url = "http://localhost";"#),
            r#"let url = "http://localhost";"#
        );
    }

    #[test]
    fn test_workspace_root_has_manifest() {
        assert!(workspace_root().join("Cargo.toml").exists());
    }
}
