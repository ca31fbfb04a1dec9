//! Editor launching and the helper's file lookup.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::Error;
use crate::normalize;

/// Something that can open a file at a line.
#[async_trait]
pub trait Editor: Send + Sync {
    /// Executable name, as reported back to the browser.
    fn command(&self) -> &str;

    /// Human-facing editor name.
    fn display_name(&self) -> &str;

    /// Whether the editor can be launched at all.
    async fn is_available(&self) -> bool;

    /// Open `path` with the cursor on `line`.
    ///
    /// # Errors
    ///
    /// Returns `Error::EditorLaunch` if the editor cannot be spawned or exits
    /// with a failure status.
    async fn open(&self, path: &Path, line: u32) -> Result<(), Error>;
}

/// VS Code or any editor sharing its `--goto path:line` command line.
#[derive(Debug, Clone)]
pub struct CodeEditor {
    /// Executable looked up on `PATH`.
    command: String,
    /// Name shown in responses and notices.
    display_name: String,
}

impl CodeEditor {
    /// Editor run as `command`. `code` is reported as "VS Code".
    pub fn new(command: impl Into<String>) -> Self {
        let command = command.into();
        let display_name = if command == "code" { "VS Code".to_string() } else { command.clone() };
        return Self { command, display_name };
    }
}

#[async_trait]
impl Editor for CodeEditor {
    fn command(&self) -> &str {
        return &self.command;
    }

    fn display_name(&self) -> &str {
        return &self.display_name;
    }

    async fn is_available(&self) -> bool {
        let lookup = if cfg!(windows) { "where" } else { "which" };
        return match Command::new(lookup).arg(&self.command).output().await {
            Ok(output) => output.status.success() && !output.stdout.is_empty(),
            Err(e) => {
                debug!(lookup, error = %e, "editor lookup could not run");
                false
            },
        };
    }

    async fn open(&self, path: &Path, line: u32) -> Result<(), Error> {
        let target = format!("{}:{line}", path.display());
        info!(editor = %self.command, %target, "opening in editor");

        // Arguments go straight to the process, never through a shell.
        let output = Command::new(&self.command)
            .arg("--reuse-window")
            .arg("--goto")
            .arg(&target)
            .output()
            .await
            .map_err(|e| return Error::EditorLaunch { command: self.command.clone(), reason: e.to_string() })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let reason = if stderr.is_empty() { output.status.to_string() } else { stderr };
            warn!(editor = %self.command, %reason, "editor exited with failure");
            return Err(Error::EditorLaunch { command: self.command.clone(), reason });
        }
        return Ok(());
    }
}

/// Turns a requested path into a file on disk.
#[derive(Debug, Clone)]
pub struct PathResolver {
    /// Directory relative paths are joined onto; the helper's working directory.
    root: PathBuf,
    /// Maximum depth of the basename search under each search dir.
    search_depth: usize,
    /// Folders under `root` searched by basename.
    search_dirs: Vec<String>,
}

impl PathResolver {
    /// Resolver rooted at `root`.
    pub fn new(root: PathBuf, search_dirs: Vec<String>, search_depth: usize) -> Self {
        return Self { root, search_depth, search_dirs };
    }

    /// Resolve `file` to an existing path.
    ///
    /// Bundler schemes and a leading `./` are stripped. Absolute paths are
    /// used as is; anything else is joined onto the root. If that does not
    /// exist the search dirs are walked for a file with the same basename,
    /// in configured order, shallowest first.
    pub fn resolve(&self, file: &str) -> Option<PathBuf> {
        let candidate = self.candidate(file);
        if candidate.exists() {
            return Some(candidate);
        }
        debug!(candidate = %candidate.display(), "requested path missing, searching by name");

        let basename = candidate.file_name()?;
        for dir in &self.search_dirs {
            let found = WalkDir::new(self.root.join(dir))
                .min_depth(1)
                .max_depth(self.search_depth)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
                .find(|entry| return !entry.file_type().is_dir() && entry.file_name() == basename);
            if let Some(entry) = found {
                info!(path = %entry.path().display(), "found file by name");
                return Some(entry.into_path());
            }
        }
        return None;
    }

    /// The path `file` names before any search.
    fn candidate(&self, file: &str) -> PathBuf {
        let stripped = normalize::strip_bundler_prefix(file);
        let path = Path::new(&stripped);
        if path.is_absolute() {
            return path.to_path_buf();
        }
        return self.root.join(path);
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src/components")).unwrap();
        std::fs::write(dir.path().join("src/App.tsx"), "export default App;\n").unwrap();
        std::fs::write(dir.path().join("src/components/Card.tsx"), "export const Card = 1;\n").unwrap();
        return dir;
    }

    fn resolver(root: &Path, depth: usize) -> PathResolver {
        let dirs = ["src", "app", "components", "pages"].iter().map(ToString::to_string).collect();
        return PathResolver::new(root.to_path_buf(), dirs, depth);
    }

    #[test]
    fn relative_and_prefixed_paths_join_the_root() {
        let dir = project();
        let resolver = resolver(dir.path(), 1);
        let expected = dir.path().join("src/App.tsx");
        assert_eq!(resolver.resolve("src/App.tsx"), Some(expected.clone()));
        assert_eq!(resolver.resolve("./src/App.tsx"), Some(expected.clone()));
        assert_eq!(resolver.resolve("webpack:///src/App.tsx"), Some(expected));
    }

    #[test]
    fn absolute_paths_are_used_as_is() {
        let dir = project();
        let absolute = dir.path().join("src/App.tsx");
        let resolver = resolver(Path::new("/nonexistent-root"), 1);
        assert_eq!(resolver.resolve(&absolute.display().to_string()), Some(absolute));
    }

    #[test]
    fn missing_path_falls_back_to_basename_search() {
        let dir = project();
        let shallow = resolver(dir.path(), 1);
        assert_eq!(shallow.resolve("/elsewhere/App.tsx"), Some(dir.path().join("src/App.tsx")));
        assert_eq!(shallow.resolve("/elsewhere/Card.tsx"), None, "Card.tsx sits one level too deep");

        let deep = resolver(dir.path(), 2);
        assert_eq!(deep.resolve("/elsewhere/Card.tsx"), Some(dir.path().join("src/components/Card.tsx")));
        assert_eq!(deep.resolve("Missing.tsx"), None);
    }

    #[test]
    fn code_is_reported_as_vs_code() {
        assert_eq!(CodeEditor::new("code").display_name(), "VS Code");
        assert_eq!(CodeEditor::new("codium").display_name(), "codium");
    }

    #[tokio::test]
    async fn missing_editor_is_unavailable_and_fails_to_launch() {
        let editor = CodeEditor::new("jumptocode-no-such-editor");
        assert!(!editor.is_available().await);
        let result = editor.open(Path::new("/tmp/App.tsx"), 3).await;
        assert!(matches!(result, Err(Error::EditorLaunch { .. })));
    }
}
