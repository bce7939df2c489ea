//! Filesystem tools. Every tool is constructed with an explicit working
//! directory and resolves relative paths against it; there is no shared
//! process-wide current directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use regex::Regex;
use walkdir::WalkDir;

use crate::errors::{AgentError, AgentResult};
use crate::tools::Tool;

/// Files larger than this are reported instead of read into the transcript.
const MAX_READ_BYTES: u64 = 1024 * 1024;

fn resolve(working_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    }
}

pub struct ReadFileTool {
    working_dir: PathBuf,
}

impl ReadFileTool {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the contents of a text file"
    }

    fn params(&self) -> &[&'static str] {
        &["path"]
    }

    async fn call(&self, args: &[String]) -> AgentResult<String> {
        let path = resolve(&self.working_dir, &args[0]);

        // Missing and oversize files are ordinary observations the model can
        // react to, not failures.
        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(_) => return Ok(format!("file does not exist: {}", path.display())),
        };
        if metadata.len() > MAX_READ_BYTES {
            return Ok(format!(
                "file too large ({} bytes): {}",
                metadata.len(),
                path.display()
            ));
        }

        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| AgentError::ExecutionError(format!("read {}: {}", path.display(), e)))
    }
}

pub struct WriteFileTool {
    working_dir: PathBuf,
}

impl WriteFileTool {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_to_file"
    }

    fn description(&self) -> &str {
        "Write content to a file, creating it and any parent directories if needed"
    }

    fn params(&self) -> &[&'static str] {
        &["path", "content"]
    }

    async fn call(&self, args: &[String]) -> AgentResult<String> {
        let path = resolve(&self.working_dir, &args[0]);
        let content = &args[1];

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AgentError::ExecutionError(format!("create {}: {}", parent.display(), e))
            })?;
        }

        let existed = path.exists();
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| AgentError::ExecutionError(format!("write {}: {}", path.display(), e)))?;

        if existed {
            Ok(format!("updated file: {}", path.display()))
        } else {
            Ok(format!("created file: {}", path.display()))
        }
    }
}

pub struct ListDirectoryTool {
    working_dir: PathBuf,
}

impl ListDirectoryTool {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }
}

#[async_trait]
impl Tool for ListDirectoryTool {
    fn name(&self) -> &str {
        "list_directory"
    }

    fn description(&self) -> &str {
        "List the entries of a directory"
    }

    fn params(&self) -> &[&'static str] {
        &["path"]
    }

    async fn call(&self, args: &[String]) -> AgentResult<String> {
        let path = resolve(&self.working_dir, &args[0]);
        if !path.is_dir() {
            return Ok(format!("directory does not exist: {}", path.display()));
        }

        let mut read_dir = tokio::fs::read_dir(&path)
            .await
            .map_err(|e| AgentError::ExecutionError(format!("list {}: {}", path.display(), e)))?;

        let mut entries = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| AgentError::ExecutionError(format!("list {}: {}", path.display(), e)))?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            entries.push(if is_dir { format!("{}/", name) } else { name });
        }
        entries.sort();

        let mut lines = vec![format!("contents of {}:", path.display())];
        lines.extend(entries);
        Ok(lines.join("\n"))
    }
}

pub struct CreateDirectoryTool {
    working_dir: PathBuf,
}

impl CreateDirectoryTool {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }
}

#[async_trait]
impl Tool for CreateDirectoryTool {
    fn name(&self) -> &str {
        "create_directory"
    }

    fn description(&self) -> &str {
        "Create a directory, including missing parents"
    }

    fn params(&self) -> &[&'static str] {
        &["path"]
    }

    async fn call(&self, args: &[String]) -> AgentResult<String> {
        let path = resolve(&self.working_dir, &args[0]);
        if path.is_dir() {
            return Ok(format!("directory already exists: {}", path.display()));
        }

        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|e| AgentError::ExecutionError(format!("create {}: {}", path.display(), e)))?;
        Ok(format!("created directory: {}", path.display()))
    }
}

pub struct SearchFilesTool {
    working_dir: PathBuf,
}

impl SearchFilesTool {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }
}

#[async_trait]
impl Tool for SearchFilesTool {
    fn name(&self) -> &str {
        "search_files"
    }

    fn description(&self) -> &str {
        "Recursively search a directory for file names matching a wildcard pattern"
    }

    fn params(&self) -> &[&'static str] {
        &["pattern", "path"]
    }

    async fn call(&self, args: &[String]) -> AgentResult<String> {
        let pattern = wildcard_to_regex(&args[0])
            .map_err(|e| AgentError::ExecutionError(format!("bad pattern {}: {}", args[0], e)))?;
        let root = if args[1].is_empty() {
            self.working_dir.clone()
        } else {
            resolve(&self.working_dir, &args[1])
        };
        if !root.is_dir() {
            return Ok(format!("directory does not exist: {}", root.display()));
        }

        let mut matches = Vec::new();
        for entry in WalkDir::new(&root).into_iter().filter_map(Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if pattern.is_match(&name) {
                let shown = entry
                    .path()
                    .strip_prefix(&root)
                    .unwrap_or(entry.path())
                    .display()
                    .to_string();
                matches.push(shown);
            }
        }
        matches.sort();

        if matches.is_empty() {
            return Ok(format!(
                "no files matching {} under {}",
                args[0],
                root.display()
            ));
        }
        let count = matches.len();
        matches.push(format!("{} file(s) found", count));
        Ok(matches.join("\n"))
    }
}

/// Translate a `*`/`?` wildcard into an anchored regex over file names.
fn wildcard_to_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let mut translated = String::from("^");
    for ch in pattern.chars() {
        match ch {
            '*' => translated.push_str(".*"),
            '?' => translated.push('.'),
            other => translated.push_str(&regex::escape(&other.to_string())),
        }
    }
    translated.push('$');
    Regex::new(&translated)
}
