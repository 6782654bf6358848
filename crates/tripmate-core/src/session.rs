// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tripmate_answer::query::NO_STYLE_LABEL;
use tripmate_answer::UserQuery;

use crate::TripmateError;

const PREVIEW_MAX_CHARS: usize = 20;
const PREVIEW_KEEP_CHARS: usize = 17;

/// One finished question and the raw answer it got.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub created_at: DateTime<Utc>,
    pub query: UserQuery,
    pub raw_answer: String,
    pub style_label: String,
}

impl ConversationRecord {
    pub fn new(query: UserQuery, raw_answer: String) -> Self {
        let style_label = query.style_label();
        Self {
            created_at: Utc::now(),
            query,
            raw_answer,
            style_label,
        }
    }

    /// Short label for listing: style and truncated question, or `대화 <n>`
    /// when neither is available. `position` is zero-based.
    pub fn preview(&self, position: usize) -> String {
        let mut lines = Vec::new();
        if !self.style_label.is_empty() && self.style_label != NO_STYLE_LABEL {
            lines.push(format!("성향: {}", self.style_label));
        }
        let question = self.query.question.trim();
        if !question.is_empty() {
            lines.push(format!("질문: {}", truncate_preview(question)));
        }
        if lines.is_empty() {
            return format!("대화 {}", position + 1);
        }
        lines.join("\n")
    }
}

fn truncate_preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_MAX_CHARS {
        return text.to_string();
    }
    let kept: String = text.chars().take(PREVIEW_KEEP_CHARS).collect();
    format!("{}...", kept)
}

/// Conversation log plus the currently selected entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    records: Vec<ConversationRecord>,
    #[serde(skip)]
    selected: Option<usize>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[ConversationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends and returns the new record's index.
    pub fn append(&mut self, record: ConversationRecord) -> usize {
        self.records.push(record);
        self.records.len() - 1
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.selected = None;
    }

    pub fn select(&mut self, index: usize) -> Result<&ConversationRecord, TripmateError> {
        let record = self
            .records
            .get(index)
            .ok_or(TripmateError::ConversationNotFound(index))?;
        self.selected = Some(index);
        Ok(record)
    }

    /// Drops the selection so the next view is a fresh query.
    pub fn start_new(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_record(&self) -> Option<&ConversationRecord> {
        self.selected.and_then(|i| self.records.get(i))
    }

    /// `(index, preview)` pairs, newest first.
    pub fn previews(&self) -> Vec<(usize, String)> {
        self.records
            .iter()
            .enumerate()
            .rev()
            .map(|(i, r)| (i, r.preview(i)))
            .collect()
    }
}

/// Persists a [`Session`]'s log as JSON.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> PathBuf {
        crate::get_config_root().join("history.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Session> {
        if !self.path.exists() {
            return Ok(Session::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read history {}", self.path.display()))?;
        let session: Session =
            serde_json::from_str(&content).context("Failed to parse conversation history")?;
        log::debug!(
            "Loaded conversation history — path={} records={}",
            self.path.display(),
            session.len()
        );
        Ok(session)
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).context("Failed to create history directory")?;
            }
        }
        let content =
            serde_json::to_string_pretty(session).context("Failed to serialize history")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write history {}", self.path.display()))
    }
}
