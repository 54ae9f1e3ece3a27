//! Python operations.
//!
//! Holds the options shared by every pass over a directory.

pub mod unstar;

use crate::resolve::ResolveOptions;
use crate::rewrite::RewriteMode;

/// Options for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnstarOptions {
    pub resolve: ResolveOptions,
    pub mode: RewriteMode,
}

impl UnstarOptions {
    /// Commit-mode defaults.
    pub fn commit() -> Self {
        UnstarOptions {
            resolve: ResolveOptions::default(),
            mode: RewriteMode::Commit,
        }
    }

    /// Preview-mode defaults.
    pub fn preview() -> Self {
        UnstarOptions {
            mode: RewriteMode::Preview,
            ..Self::commit()
        }
    }

    pub fn is_preview(&self) -> bool {
        self.mode == RewriteMode::Preview
    }
}
