//! Shared-secret whitelist consulted by the daemon's auth guard.
//!
//! The whitelist is assembled once at startup from inline tokens and an
//! optional token file, then shared read-only for the lifetime of the
//! process.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Read-only set of accepted application tokens.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthWhitelist {
    tokens: HashSet<String>,
}

impl AuthWhitelist {
    /// Builds a whitelist from the supplied tokens.
    ///
    /// Tokens are trimmed; blank entries are ignored.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut whitelist = Self::default();
        whitelist.extend(tokens);
        whitelist
    }

    /// Reads one token per line from `path`.
    ///
    /// Blank lines and lines starting with `#` are skipped.
    pub fn from_file(path: &Path) -> Result<Self, WhitelistError> {
        let contents = fs::read_to_string(path).map_err(|source| WhitelistError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let tokens = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.starts_with('#'));
        Ok(Self::new(tokens))
    }

    /// Returns whether `token` is an accepted shared secret.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    /// Number of accepted tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` when no token is accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub(crate) fn extend<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tokens.extend(
            tokens
                .into_iter()
                .map(|token| token.as_ref().trim().to_owned())
                .filter(|token| !token.is_empty()),
        );
    }
}

// Secrets never reach logs through `{:?}`.
impl fmt::Debug for AuthWhitelist {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthWhitelist")
            .field("tokens", &self.tokens.len())
            .finish()
    }
}

/// Errors raised while loading the whitelist.
#[derive(Debug, Error)]
pub enum WhitelistError {
    /// The token file could not be read.
    #[error("failed to read token file '{path}': {source}")]
    Read {
        /// Path of the token file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}
