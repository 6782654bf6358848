// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Pure request/answer logic for the trip assistant: distance math, the user
//! query model, prompt rendering and the answer formatter.

pub mod answer;
pub mod geo;
pub mod place;
pub mod plan_table;
pub mod prompt;
pub mod query;

pub use answer::{
    format_answer, AnswerMarkers, Distance, FormattedAnswer, PlanOutcome, RecommendationEntry,
};
pub use geo::{distance_km, Coordinate};
pub use place::{PlaceLookup, PlaceRecord};
pub use plan_table::{PlanRow, PlanTable, PlanTableError, PlanWarning};
pub use query::{AgeBand, QueryError, TravelStyle, UserQuery};
