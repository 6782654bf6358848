// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::geo::Coordinate;
use crate::place::PlaceLookup;
use crate::plan_table::{PlanRow, PlanTable, PlanTableError, PlanWarning};

/// Markers the formatter looks for in a model answer.
#[derive(Debug, Clone)]
pub struct AnswerMarkers {
    /// Heading that starts the day-by-day plan. Everything after it is plan text.
    pub plan_heading: String,
    /// Must capture the place name in group 1.
    pub place_name: Regex,
    /// Substring identifying a distance line.
    pub distance_label: String,
    pub day_column: String,
    pub distance_prefix: String,
    pub distance_unavailable: String,
}

impl Default for AnswerMarkers {
    fn default() -> Self {
        Self {
            plan_heading: "상세 여행 계획".to_string(),
            place_name: Regex::new(r"관광지 이름:\s*(.+)").unwrap(),
            distance_label: "거리(km):".to_string(),
            day_column: "일차".to_string(),
            distance_prefix: "- 사용자 위치 기준 거리(km):".to_string(),
            distance_unavailable: "정보 없음 (데이터 불일치 또는 좌표 누락)".to_string(),
        }
    }
}

impl AnswerMarkers {
    fn is_plan_heading(&self, line: &str) -> bool {
        line.contains(&self.plan_heading) && !line.trim_start().starts_with('|')
    }

    fn is_distance_line(&self, line: &str) -> bool {
        line.contains(&self.distance_label)
    }

    fn place_name<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.place_name
            .captures(line)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim())
    }

    fn distance_line(&self, distance: Distance) -> String {
        match distance {
            Distance::Km(km) => format!("{} 약 **{:.2}** km", self.distance_prefix, km),
            Distance::Unavailable => {
                format!("{} {}", self.distance_prefix, self.distance_unavailable)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Distance {
    Km(f64),
    Unavailable,
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Km(km) => write!(f, "{:.2} km", km),
            Distance::Unavailable => write!(f, "unavailable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationEntry {
    pub place_name: String,
    pub distance: Distance,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanOutcome {
    /// The answer had no plan section.
    Absent,
    Table {
        table: PlanTable,
        warnings: Vec<PlanWarning>,
    },
    /// The plan section could not be read as a table; `raw` is shown instead.
    Fallback { raw: String, error: PlanTableError },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormattedAnswer {
    pub text: String,
    pub recommendations: Vec<RecommendationEntry>,
    pub plan: PlanOutcome,
}

impl FormattedAnswer {
    pub fn plan_rows(&self) -> &[PlanRow] {
        match &self.plan {
            PlanOutcome::Table { table, .. } => &table.rows,
            _ => &[],
        }
    }

    pub fn plan_table(&self) -> Option<&PlanTable> {
        match &self.plan {
            PlanOutcome::Table { table, .. } => Some(table),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Recommendations,
    Plan,
}

struct Scan {
    section: Section,
    seen: HashSet<String>,
    output: Vec<String>,
    recommendations: Vec<RecommendationEntry>,
    plan_text: String,
}

/// Splits a model answer into display text and an itinerary table.
///
/// Each newly seen place gets a distance line computed from `user`; repeated
/// place lines and the model's own distance lines are dropped. The plan heading
/// switches to plan mode for the rest of the answer.
pub fn format_answer(
    raw: &str,
    places: &impl PlaceLookup,
    user: Coordinate,
    markers: &AnswerMarkers,
) -> FormattedAnswer {
    let start = Scan {
        section: Section::Recommendations,
        seen: HashSet::new(),
        output: Vec::new(),
        recommendations: Vec::new(),
        plan_text: String::new(),
    };

    let scan = raw.split('\n').fold(start, |mut scan, line| {
        if markers.is_plan_heading(line) {
            scan.output.push(line.to_string());
            scan.section = Section::Plan;
            return scan;
        }

        match scan.section {
            Section::Recommendations => {
                scan_recommendation_line(&mut scan, line, places, user, markers)
            }
            Section::Plan => {
                scan.plan_text.push_str(line);
                scan.plan_text.push('\n');
            }
        }
        scan
    });

    let plan = if scan.plan_text.trim().is_empty() {
        PlanOutcome::Absent
    } else {
        match PlanTable::parse(scan.plan_text.trim(), &markers.day_column) {
            Ok((table, warnings)) => PlanOutcome::Table { table, warnings },
            Err(error) => {
                log::warn!(
                    "Plan section is not a valid table; showing raw text — error={}",
                    error
                );
                PlanOutcome::Fallback {
                    raw: scan.plan_text,
                    error,
                }
            }
        }
    };

    FormattedAnswer {
        text: scan.output.join("\n"),
        recommendations: scan.recommendations,
        plan,
    }
}

fn scan_recommendation_line(
    scan: &mut Scan,
    line: &str,
    places: &impl PlaceLookup,
    user: Coordinate,
    markers: &AnswerMarkers,
) {
    let Some(name) = markers.place_name(line) else {
        if !markers.is_distance_line(line) {
            scan.output.push(line.to_string());
        }
        return;
    };

    if !scan.seen.insert(name.to_string()) {
        log::debug!("Skipping repeated place line — name={}", name);
        return;
    }

    scan.output.push(line.to_string());
    let distance = match places.find_place(name).and_then(|p| p.coordinate()) {
        Some(place) => Distance::Km(user.distance_km(&place)),
        None => {
            log::debug!("No coordinates for recommended place — name={}", name);
            Distance::Unavailable
        }
    };
    scan.output.push(markers.distance_line(distance));
    scan.recommendations.push(RecommendationEntry {
        place_name: name.to_string(),
        distance,
    });
}
