// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::llm::Embedder;
use crate::places::{clean_header, read_source_text};
use crate::TripmateError;

const CURRENT_INDEX_VERSION: u32 = 1;

/// Finds the source text most relevant to a question.
pub trait Retriever {
    fn retrieve(&self, question: &str, k: usize) -> Result<Vec<String>, TripmateError>;
}

/// One source table row rendered as `column: value` lines.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    pub source: String,
    pub row: usize,
    pub content: String,
}

/// Reads every row of every readable file. Unreadable files are skipped.
pub fn load_documents(files: &[PathBuf]) -> Vec<SourceDocument> {
    let mut documents = Vec::new();
    for path in files {
        if !path.exists() {
            warn!("Index source not found; skipping — path={}", path.display());
            continue;
        }
        match read_documents(path) {
            Ok(mut docs) => documents.append(&mut docs),
            Err(e) => warn!("Skipping index source — path={} error={:#}", path.display(), e),
        }
    }
    documents
}

fn read_documents(path: &Path) -> Result<Vec<SourceDocument>> {
    let text = read_source_text(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = rdr.headers()?.iter().map(clean_header).collect();
    let source = path.display().to_string();

    let mut documents = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Bad record at row {}", row + 2))?;
        let content = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| format!("{}: {}", h, v.trim()))
            .collect::<Vec<_>>()
            .join("\n");
        documents.push(SourceDocument {
            source: source.clone(),
            row,
            content,
        });
    }
    Ok(documents)
}

/// Splits text into chunks of at most `chunk_size` characters, preferring
/// paragraph, then line, then word boundaries. Neighbouring chunks share up to
/// `chunk_overlap` characters.
#[derive(Debug, Clone, Copy)]
pub struct TextSplitter {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, &SEPARATORS)
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let pos = separators
            .iter()
            .position(|s| s.is_empty() || text.contains(s))
            .unwrap_or(separators.len() - 1);
        let separator = separators[pos];
        let finer = &separators[pos + 1..];

        let pieces: Vec<String> = if separator.is_empty() {
            text.chars().map(String::from).collect()
        } else {
            text.split(separator)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect()
        };

        let mut chunks = Vec::new();
        let mut pending = Vec::new();
        for piece in pieces {
            if char_len(&piece) <= self.chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                chunks.extend(self.merge(&pending, separator));
                pending.clear();
            }
            if finer.is_empty() {
                chunks.push(piece);
            } else {
                chunks.extend(self.split_with(&piece, finer));
            }
        }
        if !pending.is_empty() {
            chunks.extend(self.merge(&pending, separator));
        }
        chunks
    }

    fn merge(&self, pieces: &[String], separator: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: Vec<&str> = Vec::new();

        for piece in pieces {
            let grown = joined_len(&window, separator) + char_len(separator) + char_len(piece);
            if !window.is_empty() && grown > self.chunk_size {
                push_chunk(&mut chunks, &window, separator);
                while !window.is_empty()
                    && (joined_len(&window, separator) > self.chunk_overlap
                        || joined_len(&window, separator) + char_len(separator) + char_len(piece)
                            > self.chunk_size)
                {
                    window.remove(0);
                }
            }
            window.push(piece);
        }
        push_chunk(&mut chunks, &window, separator);
        chunks
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn joined_len(window: &[&str], separator: &str) -> usize {
    if window.is_empty() {
        return 0;
    }
    window.iter().map(|p| char_len(p)).sum::<usize>() + char_len(separator) * (window.len() - 1)
}

fn push_chunk(chunks: &mut Vec<String>, window: &[&str], separator: &str) {
    let chunk = window.join(separator);
    let chunk = chunk.trim();
    if !chunk.is_empty() {
        chunks.push(chunk.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedChunk {
    pub source: String,
    pub row: usize,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// Embedded chunks of the place documents, cached on disk as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorIndex {
    #[serde(default)]
    pub version: u32,
    pub embedding_model: String,
    pub chunks: Vec<IndexedChunk>,
}

impl VectorIndex {
    pub fn build(
        documents: &[SourceDocument],
        splitter: &TextSplitter,
        embedder: &impl Embedder,
    ) -> Result<Self, TripmateError> {
        if documents.is_empty() {
            return Err(TripmateError::NoDocuments);
        }

        let mut pieces = Vec::new();
        for doc in documents {
            for text in splitter.split(&doc.content) {
                pieces.push((doc, text));
            }
        }
        let texts: Vec<String> = pieces.iter().map(|(_, t)| t.clone()).collect();
        info!(
            "Embedding place documents — documents={} chunks={} model={}",
            documents.len(),
            texts.len(),
            embedder.model()
        );
        let embeddings = embedder.embed(&texts).map_err(TripmateError::Retrieval)?;

        let chunks = pieces
            .into_iter()
            .zip(embeddings)
            .map(|((doc, text), embedding)| IndexedChunk {
                source: doc.source.clone(),
                row: doc.row,
                text,
                embedding,
            })
            .collect();

        Ok(Self {
            version: CURRENT_INDEX_VERSION,
            embedding_model: embedder.model().to_string(),
            chunks,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read index {}", path.display()))?;
        serde_json::from_str(&content).context("Failed to parse index")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("Failed to create index directory")?;
            }
        }
        let content = serde_json::to_string(self).context("Failed to serialize index")?;
        fs::write(path, content).with_context(|| format!("Failed to write index {}", path.display()))
    }

    /// Uses the cached index when it exists and was built with the same
    /// embedding model; otherwise builds from `files` and writes the cache.
    pub fn load_or_build(
        path: &Path,
        files: &[PathBuf],
        splitter: &TextSplitter,
        embedder: &impl Embedder,
    ) -> Result<Self, TripmateError> {
        if path.exists() {
            match Self::load(path) {
                Ok(index)
                    if index.version == CURRENT_INDEX_VERSION
                        && index.embedding_model == embedder.model() =>
                {
                    debug!(
                        "Using cached index — path={} chunks={}",
                        path.display(),
                        index.chunks.len()
                    );
                    return Ok(index);
                }
                Ok(index) => warn!(
                    "Cached index is stale; rebuilding — path={} version={} model={}",
                    path.display(),
                    index.version,
                    index.embedding_model
                ),
                Err(e) => warn!(
                    "Failed to load cached index; rebuilding — path={} error={:#}",
                    path.display(),
                    e
                ),
            }
        }
        Self::rebuild(path, files, splitter, embedder)
    }

    pub fn rebuild(
        path: &Path,
        files: &[PathBuf],
        splitter: &TextSplitter,
        embedder: &impl Embedder,
    ) -> Result<Self, TripmateError> {
        let documents = load_documents(files);
        let index = Self::build(&documents, splitter, embedder)?;
        if let Err(e) = index.save(path) {
            warn!("Failed to cache index — path={} error={:#}", path.display(), e);
        }
        Ok(index)
    }

    /// The `k` chunks most similar to `query` by cosine similarity, best first.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<&IndexedChunk> {
        let mut scored: Vec<(f32, &IndexedChunk)> = self
            .chunks
            .iter()
            .map(|c| (cosine_similarity(query, &c.embedding), c))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.into_iter().take(k).map(|(_, c)| c).collect()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Retrieval backed by a [`VectorIndex`] and the embedder it was built with.
pub struct IndexRetriever<'a, E: Embedder> {
    index: &'a VectorIndex,
    embedder: &'a E,
}

impl<'a, E: Embedder> IndexRetriever<'a, E> {
    pub fn new(index: &'a VectorIndex, embedder: &'a E) -> Self {
        Self { index, embedder }
    }
}

impl<E: Embedder> Retriever for IndexRetriever<'_, E> {
    fn retrieve(&self, question: &str, k: usize) -> Result<Vec<String>, TripmateError> {
        let query = self
            .embedder
            .embed(&[question.to_string()])
            .map_err(TripmateError::Retrieval)?
            .into_iter()
            .next()
            .unwrap_or_default();
        let hits: Vec<String> = self
            .index
            .search(&query, k)
            .into_iter()
            .map(|c| c.text.clone())
            .collect();
        debug!("Retrieved context — hits={}", hits.len());
        Ok(hits)
    }
}
