//! System prompt loading and memoization.
//!
//! The prompt steering the model towards SQL lives in a plain-text file next
//! to the application. It is read at most once per [`PromptCache`] that
//! succeeds; a failed read is not remembered, so the next request tries again.
//!
//! # Example
//!
//! ```
//! use nl_sql_bridge::prompt::{PromptCache, StaticPrompt};
//!
//! let cache = PromptCache::new(StaticPrompt("Answer with SQL only".into()));
//! assert_eq!(cache.get().unwrap(), "Answer with SQL only");
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
    sync::OnceLock
};

use crate::error::{AppResult, prompt_read_error};

/// Default prompt location relative to the install root
pub const DEFAULT_PROMPT_FILE: &str = "prompts/system_prompt.txt";

/// Backing resource for the system prompt.
pub trait PromptSource: Send + Sync {
    /// Read the full prompt text.
    fn read(&self) -> AppResult<String>;
}

/// Prompt stored in a file on disk.
#[derive(Debug, Clone)]
pub struct FilePromptSource {
    path: PathBuf
}

impl FilePromptSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into()
        }
    }

    /// Prompt file shipped with the crate
    pub fn installed() -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_PROMPT_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PromptSource for FilePromptSource {
    fn read(&self) -> AppResult<String> {
        fs::read_to_string(&self.path)
            .map_err(|e| prompt_read_error(&self.path.display().to_string(), e))
    }
}

/// Prompt text held in memory.
#[derive(Debug, Clone)]
pub struct StaticPrompt(pub String);

impl PromptSource for StaticPrompt {
    fn read(&self) -> AppResult<String> {
        Ok(self.0.clone())
    }
}

/// Write-once holder for the system prompt.
pub struct PromptCache {
    source: Box<dyn PromptSource>,
    value:  OnceLock<String>
}

impl PromptCache {
    pub fn new(source: impl PromptSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            value:  OnceLock::new()
        }
    }

    /// Return the prompt, reading the source only while nothing is stored.
    ///
    /// Concurrent first calls may both read; the first stored text wins.
    pub fn get(&self) -> AppResult<&str> {
        if let Some(text) = self.value.get() {
            return Ok(text.as_str());
        }
        let text = self.source.read()?;
        Ok(self.value.get_or_init(|| text).as_str())
    }

    /// Whether a prompt has been stored
    pub fn is_loaded(&self) -> bool {
        self.value.get().is_some()
    }
}

impl std::fmt::Debug for PromptCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptCache")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
