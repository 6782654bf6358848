// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

pub mod config;
pub mod index;
pub mod llm;
pub mod pipeline;
pub mod places;
pub mod session;

use std::path::PathBuf;
use thiserror::Error;
use tripmate_answer::QueryError;

use crate::llm::LlmError;

#[derive(Error, Debug)]
pub enum TripmateError {
    #[error("No usable place data in the configured files")]
    NoPlaceData,
    #[error("No documents to index; check the configured data files")]
    NoDocuments,
    #[error("Conversation {0} does not exist")]
    ConversationNotFound(usize),
    #[error("Invalid request: {0}")]
    Query(#[from] QueryError),
    #[error("Retrieval failed: {0}")]
    Retrieval(#[source] LlmError),
    #[error("Answer generation failed: {0}")]
    Generation(#[source] LlmError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Per-user directory for config, history and the index cache.
pub fn get_config_root() -> PathBuf {
    directories::ProjectDirs::from("org", "tripmate", "Tripmate")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".tripmate"))
}
