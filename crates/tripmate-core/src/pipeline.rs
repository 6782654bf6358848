// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Question in, formatted recommendation out.

use log::{error, info};
use tripmate_answer::prompt::render_prompt;
use tripmate_answer::{format_answer, AnswerMarkers, FormattedAnswer, UserQuery};

use crate::index::Retriever;
use crate::llm::Generator;
use crate::places::PlaceCatalog;
use crate::session::{ConversationRecord, Session};
use crate::TripmateError;

pub struct Recommender<G: Generator, R: Retriever> {
    places: PlaceCatalog,
    retriever: R,
    generator: G,
    markers: AnswerMarkers,
    top_k: usize,
}

impl<G: Generator, R: Retriever> Recommender<G, R> {
    pub fn new(places: PlaceCatalog, retriever: R, generator: G, top_k: usize) -> Self {
        Self {
            places,
            retriever,
            generator,
            markers: AnswerMarkers::default(),
            top_k,
        }
    }

    pub fn with_markers(mut self, markers: AnswerMarkers) -> Self {
        self.markers = markers;
        self
    }

    pub fn places(&self) -> &PlaceCatalog {
        &self.places
    }

    /// Answers `query` and records it in `session`.
    ///
    /// Nothing is appended when validation, retrieval or generation fails.
    pub fn recommend(
        &self,
        session: &mut Session,
        query: UserQuery,
    ) -> Result<FormattedAnswer, TripmateError> {
        query.validate()?;

        let context = self
            .retriever
            .retrieve(&query.question, self.top_k)?
            .join("\n\n");
        let prompt = render_prompt(&query, &context);

        info!(
            "Generating recommendation — age={} styles={} days={}",
            query.age_band,
            query.style_label(),
            query.duration_days
        );
        let raw = self.generator.generate(&prompt).map_err(|e| {
            error!("Generation failed — error={}", e);
            TripmateError::Generation(e)
        })?;

        let formatted = format_answer(&raw, &self.places, query.location(), &self.markers);
        let index = session.append(ConversationRecord::new(query, raw));
        info!(
            "Recommendation ready — conversation={} places={}",
            index + 1,
            formatted.recommendations.len()
        );
        Ok(formatted)
    }

    /// Formats a stored conversation against its own location.
    pub fn review(&self, record: &ConversationRecord) -> FormattedAnswer {
        review_with(&self.places, record, &self.markers)
    }
}

/// Formats without a model: for answers saved earlier or produced elsewhere.
pub fn review_with(
    places: &PlaceCatalog,
    record: &ConversationRecord,
    markers: &AnswerMarkers,
) -> FormattedAnswer {
    format_answer(&record.raw_answer, places, record.query.location(), markers)
}
