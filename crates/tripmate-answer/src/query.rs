// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::geo::{Coordinate, DEFAULT_LOCATION};

pub const NO_STYLE_LABEL: &str = "특정 없음";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("location is missing or (0, 0); enter a latitude and longitude")]
    InvalidLocation,
    #[error("question is empty")]
    EmptyQuestion,
    #[error("trip duration must be at least one day")]
    ZeroDuration,
    #[error("party size must be at least one person")]
    EmptyParty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeBand {
    Teens,
    Twenties,
    Thirties,
    Forties,
    FiftiesPlus,
}

impl AgeBand {
    pub const ALL: [AgeBand; 5] = [
        AgeBand::Teens,
        AgeBand::Twenties,
        AgeBand::Thirties,
        AgeBand::Forties,
        AgeBand::FiftiesPlus,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AgeBand::Teens => "10대",
            AgeBand::Twenties => "20대",
            AgeBand::Thirties => "30대",
            AgeBand::Forties => "40대",
            AgeBand::FiftiesPlus => "50대 이상",
        }
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TravelStyle {
    Nature,
    History,
    Experience,
    Relaxation,
    Culture,
    Family,
    Activity,
}

impl TravelStyle {
    pub fn label(&self) -> &'static str {
        match self {
            TravelStyle::Nature => "자연",
            TravelStyle::History => "역사",
            TravelStyle::Experience => "체험",
            TravelStyle::Relaxation => "휴식",
            TravelStyle::Culture => "문화",
            TravelStyle::Family => "가족",
            TravelStyle::Activity => "액티비티",
        }
    }
}

impl fmt::Display for TravelStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything the user supplied for one recommendation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserQuery {
    pub age_band: AgeBand,
    /// In the order the user picked them.
    pub travel_styles: Vec<TravelStyle>,
    pub latitude: f64,
    pub longitude: f64,
    pub duration_days: u32,
    pub budget: u64,
    pub party_size: u32,
    #[serde(default)]
    pub special_requests: String,
    pub question: String,
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            age_band: AgeBand::Twenties,
            travel_styles: Vec::new(),
            latitude: DEFAULT_LOCATION.lat,
            longitude: DEFAULT_LOCATION.lon,
            duration_days: 3,
            budget: 500_000,
            party_size: 2,
            special_requests: String::new(),
            question: String::new(),
        }
    }
}

impl UserQuery {
    /// Adds a style unless it was already picked.
    pub fn pick_style(&mut self, style: TravelStyle) {
        if !self.travel_styles.contains(&style) {
            self.travel_styles.push(style);
        }
    }

    pub fn location(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Styles joined in pick order, or "특정 없음" when none were picked.
    pub fn style_label(&self) -> String {
        if self.travel_styles.is_empty() {
            return NO_STYLE_LABEL.to_string();
        }
        let mut labels: Vec<&str> = Vec::new();
        for style in &self.travel_styles {
            if !labels.contains(&style.label()) {
                labels.push(style.label());
            }
        }
        labels.join(", ")
    }

    pub fn validate(&self) -> Result<(), QueryError> {
        let location = self.location();
        if !location.lat.is_finite() || !location.lon.is_finite() || location.is_unset() {
            return Err(QueryError::InvalidLocation);
        }
        if self.question.trim().is_empty() {
            return Err(QueryError::EmptyQuestion);
        }
        if self.duration_days == 0 {
            return Err(QueryError::ZeroDuration);
        }
        if self.party_size == 0 {
            return Err(QueryError::EmptyParty);
        }
        Ok(())
    }
}
