// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

use crate::notice::Notice;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("could not encode history: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("stored history is malformed: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{message}")]
    Validation {
        title: &'static str,
        message: String,
    },
    #[error("{message}")]
    Precondition {
        title: &'static str,
        message: String,
    },
    #[error("could not persist history: {source}")]
    Persistence {
        title: &'static str,
        #[source]
        source: StoreError,
    },
}

impl LedgerError {
    pub fn validation(title: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            title,
            message: message.into(),
        }
    }

    pub fn precondition(title: &'static str, message: impl Into<String>) -> Self {
        Self::Precondition {
            title,
            message: message.into(),
        }
    }

    pub fn persistence(title: &'static str, source: StoreError) -> Self {
        Self::Persistence { title, source }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Validation { title, .. }
            | Self::Precondition { title, .. }
            | Self::Persistence { title, .. } => title,
        }
    }

    /// Display form of the failure; always a destructive warning.
    pub fn notice(&self) -> Notice {
        Notice::destructive(self.title(), self.to_string())
    }
}
