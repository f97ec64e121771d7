// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout tree — the render-agnostic hierarchy of header/section/item blocks
// a resume record is composed into. Every render backend consumes this
// vocabulary (the vector backend re-derives an equivalent structure of its
// own, see the document crate).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The composed document: one header followed by zero or more sections.
///
/// A header-only tree (blank record) is valid output, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutTree {
    pub header: HeaderBlock,
    pub sections: Vec<SectionBlock>,
}

/// Name plus the present contact fields, already ordered for rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeaderBlock {
    pub name: String,
    /// Fixed field order: email, phone, linkedin, github, website.
    /// Absent fields are omitted; present ones are never reordered.
    pub contacts: Vec<String>,
}

/// The nine section slots, in canonical render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionKind {
    Summary,
    Education,
    Experience,
    Projects,
    Skills,
    Positions,
    Achievements,
    Activities,
    Hobbies,
}

impl SectionKind {
    /// Canonical order sections appear in the document.
    pub const CANONICAL_ORDER: [SectionKind; 9] = [
        SectionKind::Summary,
        SectionKind::Education,
        SectionKind::Experience,
        SectionKind::Projects,
        SectionKind::Skills,
        SectionKind::Positions,
        SectionKind::Achievements,
        SectionKind::Activities,
        SectionKind::Hobbies,
    ];

    /// Heading text shown in the rendered document.
    pub fn display_title(&self) -> &'static str {
        match self {
            Self::Summary => "Professional Summary",
            Self::Education => "Education",
            Self::Experience => "Experience",
            Self::Projects => "Projects",
            Self::Skills => "Skills",
            Self::Positions => "Positions of Responsibility",
            Self::Achievements => "Achievements",
            Self::Activities => "Extracurricular Activities",
            Self::Hobbies => "Hobbies & Interests",
        }
    }
}

/// A section heading plus its content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionBlock {
    pub kind: SectionKind,
    pub content: SectionContent,
}

/// How a section's entries project into the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SectionContent {
    /// One item block per collection entry, in insertion order.
    Items(Vec<ItemBlock>),
    /// Inline tag chips (skills), in insertion order.
    TagRow(Vec<String>),
    /// One flowing paragraph (summary; hobbies comma-joined).
    Text(String),
}

/// One entry's visual block. The item is the minimum pagination unit —
/// it is never split across pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemBlock {
    pub title: String,
    /// Pre-formatted, right-aligned date text ("Jan 2020 – May 2024",
    /// "Jan 2020 – Present", or a single "Mar 2023").
    pub date_text: Option<String>,
    /// Institution/company/organization line, location comma-joined.
    pub subtitle: Option<String>,
    pub body: Vec<BodyBlock>,
}

/// Body content of an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BodyBlock {
    Paragraph(String),
    Bullets(Vec<String>),
    Tags(Vec<String>),
}

// -- Date formatting ----------------------------------------------------------

/// Format a `"YYYY-MM"` field as `"Mon YYYY"` ("2020-01" → "Jan 2020").
///
/// Blank input yields `None`; text that does not parse is passed through
/// verbatim rather than dropped.
pub fn format_month(date: &str) -> Option<String> {
    let date = date.trim();
    if date.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(&format!("{date}-01"), "%Y-%m-%d") {
        Ok(parsed) => Some(parsed.format("%b %Y").to_string()),
        Err(_) => Some(date.to_string()),
    }
}

/// Date-range text for an item, or `None` when both sides are blank.
///
/// An empty end with a non-empty start renders as "Present".
pub fn format_date_range(start: &str, end: &str) -> Option<String> {
    match (format_month(start), format_month(end)) {
        (None, None) => None,
        (Some(s), Some(e)) => Some(format!("{s} – {e}")),
        (Some(s), None) => Some(format!("{s} – Present")),
        (None, Some(e)) => Some(format!("– {e}")),
    }
}
