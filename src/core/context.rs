//! Master context document loading

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::core::errors::ContextLoadError;

/// Minimum line count of a complete Master document
pub const DEFAULT_MIN_CONTEXT_LINES: usize = 47_000;

/// Immutable glossary and style document sent as system grounding on every call
#[derive(Clone)]
pub struct Context {
    text: Arc<str>,
    lines: usize,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("lines", &self.lines)
            .field("bytes", &self.text.len())
            .finish()
    }
}

impl Context {
    /// Read the whole document at `path` and check it is not truncated
    pub fn load(path: impl AsRef<Path>, min_lines: usize) -> Result<Self, ContextLoadError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ContextLoadError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let text = std::fs::read_to_string(path).map_err(|source| ContextLoadError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let context = Self::from_text(text, min_lines)?;
        info!(
            "Master loaded from {}: {} lines, {} bytes",
            path.display(),
            context.lines,
            context.text.len()
        );
        Ok(context)
    }

    /// Validate an in-memory document
    pub fn from_text(text: impl Into<String>, min_lines: usize) -> Result<Self, ContextLoadError> {
        let text: String = text.into();
        let lines = count_lines(&text);
        if lines < min_lines {
            return Err(ContextLoadError::Truncated {
                expected: min_lines,
                actual: lines,
            });
        }
        Ok(Self {
            text: Arc::from(text),
            lines,
        })
    }

    /// Full document text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Line count as validated
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the document has no bytes
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Number of newline-separated segments; a trailing newline opens one more.
fn count_lines(text: &str) -> usize {
    text.split('\n').count()
}
