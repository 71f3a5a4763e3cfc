//! Test utilities for frontweave
//!
//! Shared helpers used by the core and CLI test suites: workspace-local temp
//! directories and small fixture writers for templates, schemas and documents.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Creates a temporary directory within `.tmp/` at the project root
///
/// All test temporary files land in a single gitignored location that is easy
/// to clean up by hand.
///
/// # Panics
///
/// Panics if:
/// - Unable to determine current directory
/// - Unable to create `.tmp/` directory
/// - Unable to create temporary subdirectory
///
/// # Examples
///
/// ```rust
/// use frontweave_testkit::temp_dir_in_workspace;
///
/// let temp = temp_dir_in_workspace();
/// let file_path = temp.path().join("test.txt");
/// std::fs::write(&file_path, "test data").unwrap();
/// // Cleanup happens automatically when temp is dropped
/// ```
pub fn temp_dir_in_workspace() -> TempDir {
    try_temp_dir_in_workspace().expect("Failed to create temporary directory in .tmp/")
}

/// Alternative with Result for non-test code
pub fn try_temp_dir_in_workspace() -> std::io::Result<TempDir> {
    let workspace_root = std::env::current_dir()?;
    let tmp_base = workspace_root.join(".tmp");
    std::fs::create_dir_all(&tmp_base)?;
    TempDir::new_in(&tmp_base)
}

/// Write `content` to `root/relative`, creating parent directories
///
/// Returns the absolute path of the written file.
///
/// # Panics
///
/// Panics if the directories or the file cannot be written.
pub fn write_file(root: &Path, relative: impl AsRef<Path>, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("Failed to create {}: {}", parent.display(), e));
    }
    std::fs::write(&path, content)
        .unwrap_or_else(|e| panic!("Failed to write {}: {}", path.display(), e));
    path
}

/// Write a Markdown document whose frontmatter block holds `yaml`
pub fn write_document(root: &Path, relative: impl AsRef<Path>, yaml: &str, body: &str) -> PathBuf {
    let content = format!("---\n{}---\n{}", ensure_newline(yaml), body);
    write_file(root, relative, &content)
}

/// JSON Schema text flagging `field` as the hierarchy root
pub fn hierarchy_schema(field: &str) -> String {
    format!(
        r#"{{
  "type": "object",
  "properties": {{
    "{field}": {{ "type": "array", "x-frontmatter-part": true }}
  }}
}}
"#
    )
}

fn ensure_newline(text: &str) -> String {
    if text.is_empty() || text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{}\n", text)
    }
}
