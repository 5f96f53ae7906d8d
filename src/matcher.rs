//! Pattern matching over the files of one gist.
//!
//! A file matches only when the pattern matches at the very start of its
//! text, not anywhere inside it: `import` matches `"import os"` but not
//! `"# comment\nimport os"`. Callers expecting substring search should
//! write `.*import` or `(?s).*import`.

use futures::{Stream, TryStreamExt};
use regex::Regex;
use std::pin::pin;

use crate::error::{AppError, Result};
use crate::gist::ResolvedFile;

#[derive(Debug, Clone)]
pub struct Matcher {
    /// The pattern wrapped as `\A(?:pattern)`, so a search never scans past offset 0.
    anchored: Regex,
}

impl Matcher {
    /// Compiles `pattern`; a pattern that does not compile is a bad request.
    pub fn new(pattern: &str) -> Result<Self> {
        let invalid = |e: regex::Error| AppError::BadRequest(format!("invalid pattern {:?}: {}", pattern, e));

        // validate the pattern as written before wrapping it
        Regex::new(pattern).map_err(invalid)?;

        // a trailing `(?x)` comment would swallow the closing paren; end it with a newline
        let anchored = Regex::new(&format!(r"\A(?:{})", pattern))
            .or_else(|_| Regex::new(&format!("\\A(?:{}\n)", pattern)))
            .map_err(invalid)?;

        Ok(Self { anchored })
    }

    /// Whether the pattern matches a prefix of `text`.
    pub fn is_match_at_start(&self, text: &str) -> bool {
        self.anchored.is_match(text)
    }

    /// Pulls files until one matches and returns it; later files are never polled.
    ///
    /// The first error from `files` ends the scan.
    pub async fn first_match<S>(&self, files: S) -> Result<Option<ResolvedFile>>
    where
        S: Stream<Item = Result<ResolvedFile>>,
    {
        let mut files = pin!(files);
        while let Some(file) = files.try_next().await? {
            if self.is_match_at_start(&file.text) {
                return Ok(Some(file));
            }
        }
        Ok(None)
    }
}
