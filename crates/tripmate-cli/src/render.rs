// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use tripmate_answer::{FormattedAnswer, PlanOutcome, PlanTable};

const NO_PLAN: &str = "상세 여행 계획이 제공되지 않았습니다.";

/// Full terminal rendering of a formatted answer.
pub fn render_answer(answer: &FormattedAnswer) -> String {
    let mut out = answer.text.trim_end().to_string();
    out.push_str("\n\n");

    match &answer.plan {
        PlanOutcome::Absent => out.push_str(NO_PLAN),
        PlanOutcome::Table { table, warnings } => {
            out.push_str("🗓️ 추천 여행 계획표\n");
            out.push_str(&render_table(table));
            for warning in warnings {
                out.push_str(&format!("\n[warn] {}", warning));
            }
        }
        PlanOutcome::Fallback { raw, error } => {
            out.push_str(&format!(
                "[warn] 여행 계획이 유효한 표 형식으로 제공되지 않았습니다 ({}).\n",
                error
            ));
            out.push_str(raw.trim_end());
        }
    }
    out
}

/// Column-aligned grid. Widths count hangul and other wide glyphs as two cells.
pub fn render_table(table: &PlanTable) -> String {
    let mut widths: Vec<usize> = table.columns.iter().map(|c| display_width(c)).collect();
    for row in &table.rows {
        for (w, cell) in widths.iter_mut().zip(row.cells()) {
            *w = (*w).max(display_width(cell));
        }
    }

    let mut lines = Vec::with_capacity(table.rows.len() + 2);
    lines.push(grid_line(table.columns.iter().map(String::as_str), &widths));
    lines.push(format!(
        "|{}|",
        widths
            .iter()
            .map(|&w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("|")
    ));
    for row in &table.rows {
        lines.push(grid_line(row.cells().iter().map(String::as_str), &widths));
    }
    lines.join("\n")
}

fn grid_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(c, &w)| format!("{}{}", c, " ".repeat(w.saturating_sub(display_width(c)))))
        .collect();
    format!("| {} |", padded.join(" | "))
}

fn display_width(s: &str) -> usize {
    s.chars().map(|c| if is_wide(c) { 2 } else { 1 }).sum()
}

fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F
        | 0x2E80..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x1F300..=0x1FAFF)
}
