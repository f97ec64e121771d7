// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Resume record — the structured personal/career dataset one document is
// built from, plus its mutation API.
//
// The record is built incrementally by the data-entry wizard and is strictly
// read-only from the document pipeline's perspective: the pipeline projects
// it into layout and render artifacts, never mutates it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::EntryId;

/// Contact and summary fields. All optional from the pipeline's point of
/// view — the entry form requires a few of them, but rendering tolerates
/// every field empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub linkedin: String,
    pub github: String,
    pub website: String,
    pub summary: String,
}

impl PersonalInfo {
    /// Full name with single-space joining; either half may be blank.
    pub fn full_name(&self) -> String {
        let first = self.first_name.trim();
        let last = self.last_name.trim();
        match (first.is_empty(), last.is_empty()) {
            (true, true) => String::new(),
            (true, false) => last.to_string(),
            (false, true) => first.to_string(),
            (false, false) => format!("{first} {last}"),
        }
    }
}

// -- Section entry types ------------------------------------------------------
//
// Dates are "YYYY-MM" or empty throughout.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub id: EntryId,
    pub degree: String,
    pub institution: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub grade: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub id: EntryId,
    pub title: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    /// Ordered bullet points; may be empty.
    pub description: Vec<String>,
    /// Unique technology tags, insertion order preserved.
    pub technologies: Vec<String>,
}

impl Experience {
    /// Add a technology tag. Blank and duplicate (case-sensitive, trimmed)
    /// values are ignored; returns whether the tag was added.
    pub fn add_technology(&mut self, value: &str) -> bool {
        push_technology(&mut self.technologies, value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: EntryId,
    pub title: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub link: String,
    pub start_date: String,
    pub end_date: String,
}

impl Project {
    /// Add a technology tag. Blank and duplicate (case-sensitive, trimmed)
    /// values are ignored; returns whether the tag was added.
    pub fn add_technology(&mut self, value: &str) -> bool {
        push_technology(&mut self.technologies, value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: EntryId,
    pub name: String,
    /// Proficiency, 1..=5 inclusive. Clamped on insertion and update.
    pub level: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: EntryId,
    pub title: String,
    pub organization: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: EntryId,
    pub title: String,
    /// Single date, not a range.
    pub date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: EntryId,
    pub title: String,
    pub organization: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hobby {
    pub id: EntryId,
    pub name: String,
}

/// Push a technology tag onto a list, trimming whitespace. Blank values and
/// values already present (case-sensitive comparison) are silently ignored.
pub fn push_technology(list: &mut Vec<String>, value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() || list.iter().any(|t| t == trimmed) {
        return false;
    }
    list.push(trimmed.to_string());
    true
}

/// Trim, drop blanks, and keep only the first occurrence of each tag.
fn dedup_technologies(list: &mut Vec<String>) {
    let mut kept: Vec<String> = Vec::with_capacity(list.len());
    for tag in list.drain(..) {
        let trimmed = tag.trim();
        if !trimmed.is_empty() && !kept.iter().any(|t| t == trimmed) {
            kept.push(trimmed.to_string());
        }
    }
    *list = kept;
}

/// Field normalization applied when an entry enters the record and after
/// every update, so collection invariants survive arbitrary patches.
trait Normalize {
    fn normalize(&mut self) {}
}

impl Normalize for Education {}
impl Normalize for Position {}
impl Normalize for Achievement {}
impl Normalize for Activity {}
impl Normalize for Hobby {}

impl Normalize for Skill {
    fn normalize(&mut self) {
        self.level = self.level.clamp(1, 5);
    }
}

impl Normalize for Experience {
    fn normalize(&mut self) {
        dedup_technologies(&mut self.technologies);
    }
}

impl Normalize for Project {
    fn normalize(&mut self) {
        dedup_technologies(&mut self.technologies);
    }
}

// -- Resume record ------------------------------------------------------------

/// The complete structured dataset for one document: personal info plus
/// eight ordered collections. Insertion order is render order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub personal_info: PersonalInfo,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
    pub projects: Vec<Project>,
    pub skills: Vec<Skill>,
    pub positions: Vec<Position>,
    pub achievements: Vec<Achievement>,
    pub activities: Vec<Activity>,
    pub hobbies: Vec<Hobby>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Generates the add/update/remove triple for one collection.
///
/// Semantics shared by all eight collections:
/// - add stamps a fresh identifier, so identifiers are unique by construction;
/// - update applies the caller's patch to the matching entry only, restores
///   the identifier afterwards (identifiers are immutable), and is a no-op
///   for unknown ids;
/// - remove is a no-op for unknown ids.
macro_rules! collection_ops {
    ($add:ident, $update:ident, $remove:ident, $field:ident, $ty:ty) => {
        pub fn $add(&mut self, mut entry: $ty) -> EntryId {
            entry.id = EntryId::new();
            entry.normalize();
            let id = entry.id;
            self.$field.push(entry);
            self.touch();
            id
        }

        pub fn $update(&mut self, id: EntryId, patch: impl FnOnce(&mut $ty)) {
            if let Some(entry) = self.$field.iter_mut().find(|e| e.id == id) {
                patch(entry);
                entry.id = id;
                entry.normalize();
                self.touch();
            }
        }

        pub fn $remove(&mut self, id: EntryId) {
            let before = self.$field.len();
            self.$field.retain(|e| e.id != id);
            if self.$field.len() != before {
                self.touch();
            }
        }
    };
}

impl ResumeRecord {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            created_at: Some(now),
            updated_at: Some(now),
            ..Self::default()
        }
    }

    /// Merge changes into the personal info block.
    pub fn update_personal_info(&mut self, patch: impl FnOnce(&mut PersonalInfo)) {
        patch(&mut self.personal_info);
        self.touch();
    }

    collection_ops!(add_education, update_education, remove_education, education, Education);
    collection_ops!(add_experience, update_experience, remove_experience, experience, Experience);
    collection_ops!(add_project, update_project, remove_project, projects, Project);
    collection_ops!(add_skill, update_skill, remove_skill, skills, Skill);
    collection_ops!(add_position, update_position, remove_position, positions, Position);
    collection_ops!(add_achievement, update_achievement, remove_achievement, achievements, Achievement);
    collection_ops!(add_activity, update_activity, remove_activity, activities, Activity);
    collection_ops!(add_hobby, update_hobby, remove_hobby, hobbies, Hobby);

    /// True when every collection is empty and all personal fields are blank.
    pub fn is_blank(&self) -> bool {
        let p = &self.personal_info;
        [
            &p.first_name,
            &p.last_name,
            &p.email,
            &p.phone,
            &p.address,
            &p.city,
            &p.state,
            &p.pincode,
            &p.linkedin,
            &p.github,
            &p.website,
            &p.summary,
        ]
        .iter()
        .all(|f| f.trim().is_empty())
            && self.education.is_empty()
            && self.experience.is_empty()
            && self.projects.is_empty()
            && self.skills.is_empty()
            && self.positions.is_empty()
            && self.achievements.is_empty()
            && self.activities.is_empty()
            && self.hobbies.is_empty()
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

// -- Record ownership ---------------------------------------------------------

/// The one explicit owner of the current resume record.
///
/// Constructed at application start and threaded through to whatever needs
/// the record — there is no ambient singleton. Mutation rights live here;
/// the pipeline borrows the record immutably.
#[derive(Debug, Default)]
pub struct ResumeStore {
    record: Option<ResumeRecord>,
}

impl ResumeStore {
    /// An empty store: no record loaded yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with `record`.
    pub fn open(record: ResumeRecord) -> Self {
        Self {
            record: Some(record),
        }
    }

    /// Begin a fresh blank record, replacing any existing one.
    pub fn start_blank(&mut self) -> &mut ResumeRecord {
        self.record = Some(ResumeRecord::new());
        self.record.as_mut().expect("record just set")
    }

    pub fn record(&self) -> Option<&ResumeRecord> {
        self.record.as_ref()
    }

    pub fn record_mut(&mut self) -> Option<&mut ResumeRecord> {
        self.record.as_mut()
    }

    /// Replace the current record, returning the previous one if any.
    pub fn replace(&mut self, record: ResumeRecord) -> Option<ResumeRecord> {
        self.record.replace(record)
    }

    pub fn clear(&mut self) {
        self.record = None;
    }
}

// -- Tests --------------------------------------------------------------------
