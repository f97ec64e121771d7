// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout composer — projects a resume record into the layout tree.
//
// Pure function of its input: no side effects, no mutation of the record.
// Sections are present iff their collection is non-empty; within a section,
// items follow the collection's insertion order.

use tracing::debug;
use vitawerk_core::resume::ResumeRecord;

use crate::tree::{
    BodyBlock, HeaderBlock, ItemBlock, LayoutTree, SectionBlock, SectionContent, SectionKind,
    format_date_range, format_month,
};

/// Compose `record` into an ordered layout tree.
///
/// A record with blank personal info and empty collections yields a
/// header-only tree.
pub fn compose(record: &ResumeRecord) -> LayoutTree {
    let mut sections = Vec::new();

    for kind in SectionKind::CANONICAL_ORDER {
        if let Some(section) = compose_section(record, kind) {
            sections.push(section);
        }
    }

    debug!(sections = sections.len(), "resume composed");

    LayoutTree {
        header: compose_header(record),
        sections,
    }
}

fn compose_header(record: &ResumeRecord) -> HeaderBlock {
    let info = &record.personal_info;
    // Fixed contact order; absent fields are dropped, present ones are
    // never reordered.
    let contacts = [
        &info.email,
        &info.phone,
        &info.linkedin,
        &info.github,
        &info.website,
    ]
    .into_iter()
    .map(|f| f.trim())
    .filter(|f| !f.is_empty())
    .map(str::to_string)
    .collect();

    HeaderBlock {
        name: info.full_name(),
        contacts,
    }
}

fn compose_section(record: &ResumeRecord, kind: SectionKind) -> Option<SectionBlock> {
    let content = match kind {
        SectionKind::Summary => {
            let summary = record.personal_info.summary.trim();
            if summary.is_empty() {
                return None;
            }
            SectionContent::Text(summary.to_string())
        }

        SectionKind::Education => {
            if record.education.is_empty() {
                return None;
            }
            SectionContent::Items(record.education.iter().map(education_item).collect())
        }

        SectionKind::Experience => {
            if record.experience.is_empty() {
                return None;
            }
            SectionContent::Items(record.experience.iter().map(experience_item).collect())
        }

        SectionKind::Projects => {
            if record.projects.is_empty() {
                return None;
            }
            SectionContent::Items(record.projects.iter().map(project_item).collect())
        }

        SectionKind::Skills => {
            if record.skills.is_empty() {
                return None;
            }
            SectionContent::TagRow(record.skills.iter().map(|s| s.name.clone()).collect())
        }

        SectionKind::Positions => {
            if record.positions.is_empty() {
                return None;
            }
            SectionContent::Items(record.positions.iter().map(position_item).collect())
        }

        SectionKind::Achievements => {
            if record.achievements.is_empty() {
                return None;
            }
            SectionContent::Items(record.achievements.iter().map(achievement_item).collect())
        }

        SectionKind::Activities => {
            if record.activities.is_empty() {
                return None;
            }
            SectionContent::Items(record.activities.iter().map(activity_item).collect())
        }

        SectionKind::Hobbies => {
            if record.hobbies.is_empty() {
                return None;
            }
            let joined = record
                .hobbies
                .iter()
                .map(|h| h.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            SectionContent::Text(joined)
        }
    };

    Some(SectionBlock { kind, content })
}

// -- Per-entry projections ----------------------------------------------------

/// Join a primary line with an optional location: "X U, Pune".
fn with_location(primary: &str, location: &str) -> Option<String> {
    let primary = primary.trim();
    let location = location.trim();
    match (primary.is_empty(), location.is_empty()) {
        (true, true) => None,
        (false, true) => Some(primary.to_string()),
        (true, false) => Some(location.to_string()),
        (false, false) => Some(format!("{primary}, {location}")),
    }
}

fn education_item(edu: &vitawerk_core::resume::Education) -> ItemBlock {
    let mut body = Vec::new();
    if !edu.grade.trim().is_empty() {
        body.push(BodyBlock::Paragraph(format!("Grade: {}", edu.grade.trim())));
    }
    ItemBlock {
        title: edu.degree.trim().to_string(),
        date_text: format_date_range(&edu.start_date, &edu.end_date),
        subtitle: with_location(&edu.institution, &edu.location),
        body,
    }
}

fn experience_item(exp: &vitawerk_core::resume::Experience) -> ItemBlock {
    let mut body = Vec::new();
    let bullets: Vec<String> = exp
        .description
        .iter()
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .collect();
    if !bullets.is_empty() {
        body.push(BodyBlock::Bullets(bullets));
    }
    if !exp.technologies.is_empty() {
        body.push(BodyBlock::Tags(exp.technologies.clone()));
    }
    ItemBlock {
        title: exp.title.trim().to_string(),
        date_text: format_date_range(&exp.start_date, &exp.end_date),
        subtitle: with_location(&exp.company, &exp.location),
        body,
    }
}

fn project_item(project: &vitawerk_core::resume::Project) -> ItemBlock {
    let mut body = Vec::new();
    if !project.description.trim().is_empty() {
        body.push(BodyBlock::Paragraph(project.description.trim().to_string()));
    }
    if !project.technologies.is_empty() {
        body.push(BodyBlock::Tags(project.technologies.clone()));
    }
    if !project.link.trim().is_empty() {
        body.push(BodyBlock::Paragraph(format!("Link: {}", project.link.trim())));
    }
    ItemBlock {
        title: project.title.trim().to_string(),
        date_text: format_date_range(&project.start_date, &project.end_date),
        subtitle: None,
        body,
    }
}

fn position_item(pos: &vitawerk_core::resume::Position) -> ItemBlock {
    let mut body = Vec::new();
    if !pos.description.trim().is_empty() {
        body.push(BodyBlock::Paragraph(pos.description.trim().to_string()));
    }
    ItemBlock {
        title: pos.title.trim().to_string(),
        date_text: format_date_range(&pos.start_date, &pos.end_date),
        subtitle: with_location(&pos.organization, ""),
        body,
    }
}

fn achievement_item(ach: &vitawerk_core::resume::Achievement) -> ItemBlock {
    let mut body = Vec::new();
    if !ach.description.trim().is_empty() {
        body.push(BodyBlock::Paragraph(ach.description.trim().to_string()));
    }
    ItemBlock {
        title: ach.title.trim().to_string(),
        // Single date, not a range.
        date_text: format_month(&ach.date),
        subtitle: None,
        body,
    }
}

fn activity_item(act: &vitawerk_core::resume::Activity) -> ItemBlock {
    let mut body = Vec::new();
    if !act.description.trim().is_empty() {
        body.push(BodyBlock::Paragraph(act.description.trim().to_string()));
    }
    ItemBlock {
        title: act.title.trim().to_string(),
        date_text: format_date_range(&act.start_date, &act.end_date),
        subtitle: with_location(&act.organization, ""),
        body,
    }
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use vitawerk_core::resume::{
        Achievement, Activity, Education, Experience, Hobby, Position, Project, ResumeRecord,
        Skill,
    };

    #[test]
    fn blank_record_composes_to_header_only() {
        let record = ResumeRecord::new();
        let tree = compose(&record);
        assert!(tree.sections.is_empty());
        assert_eq!(tree.header.name, "");
        assert!(tree.header.contacts.is_empty());
    }

    #[test]
    fn name_only_record_keeps_header() {
        let mut record = ResumeRecord::new();
        record.personal_info.first_name = "Ada".into();
        record.personal_info.last_name = "Lovelace".into();
        let tree = compose(&record);
        assert_eq!(tree.header.name, "Ada Lovelace");
        assert!(tree.sections.is_empty());
    }

    #[test]
    fn contact_fields_keep_fixed_order() {
        let mut record = ResumeRecord::new();
        record.personal_info.website = "https://ada.dev".into();
        record.personal_info.email = "ada@example.com".into();
        record.personal_info.github = "github.com/ada".into();
        let tree = compose(&record);
        assert_eq!(
            tree.header.contacts,
            vec!["ada@example.com", "github.com/ada", "https://ada.dev"]
        );
    }

    #[test]
    fn each_section_present_iff_nonempty() {
        // One mutation per section type, checked independently.
        let cases: Vec<(SectionKind, Box<dyn Fn(&mut ResumeRecord)>)> = vec![
            (
                SectionKind::Summary,
                Box::new(|r| r.personal_info.summary = "Engineer.".into()),
            ),
            (
                SectionKind::Education,
                Box::new(|r| {
                    r.add_education(Education::default());
                }),
            ),
            (
                SectionKind::Experience,
                Box::new(|r| {
                    r.add_experience(Experience::default());
                }),
            ),
            (
                SectionKind::Projects,
                Box::new(|r| {
                    r.add_project(Project::default());
                }),
            ),
            (
                SectionKind::Skills,
                Box::new(|r| {
                    r.add_skill(Skill {
                        name: "Rust".into(),
                        level: 4,
                        ..Skill::default()
                    });
                }),
            ),
            (
                SectionKind::Positions,
                Box::new(|r| {
                    r.add_position(Position::default());
                }),
            ),
            (
                SectionKind::Achievements,
                Box::new(|r| {
                    r.add_achievement(Achievement::default());
                }),
            ),
            (
                SectionKind::Activities,
                Box::new(|r| {
                    r.add_activity(Activity::default());
                }),
            ),
            (
                SectionKind::Hobbies,
                Box::new(|r| {
                    r.add_hobby(Hobby {
                        name: "Chess".into(),
                        ..Hobby::default()
                    });
                }),
            ),
        ];

        for (kind, mutate) in cases {
            let empty = compose(&ResumeRecord::new());
            assert!(
                !empty.sections.iter().any(|s| s.kind == kind),
                "{kind:?} should be absent for an empty record"
            );

            let mut record = ResumeRecord::new();
            mutate(&mut record);
            let tree = compose(&record);
            assert_eq!(
                tree.sections.len(),
                1,
                "{kind:?} should be the only section"
            );
            assert_eq!(tree.sections[0].kind, kind);
        }
    }

    #[test]
    fn sections_follow_canonical_order() {
        let mut record = ResumeRecord::new();
        record.add_hobby(Hobby {
            name: "Chess".into(),
            ..Hobby::default()
        });
        record.add_education(Education::default());
        record.personal_info.summary = "Engineer.".into();
        record.add_skill(Skill {
            name: "Rust".into(),
            level: 5,
            ..Skill::default()
        });

        let kinds: Vec<_> = compose(&record).sections.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SectionKind::Summary,
                SectionKind::Education,
                SectionKind::Skills,
                SectionKind::Hobbies
            ]
        );
    }

    #[test]
    fn education_item_formats_dates_and_subtitle() {
        let mut record = ResumeRecord::new();
        record.add_education(Education {
            degree: "B.Sc.".into(),
            institution: "X U".into(),
            start_date: "2020-01".into(),
            end_date: "2024-05".into(),
            grade: "9.0".into(),
            ..Education::default()
        });
        let tree = compose(&record);
        let SectionContent::Items(items) = &tree.sections[0].content else {
            panic!("education should compose to items");
        };
        assert_eq!(items[0].date_text.as_deref(), Some("Jan 2020 – May 2024"));
        assert_eq!(items[0].subtitle.as_deref(), Some("X U"));
        assert_eq!(
            items[0].body,
            vec![BodyBlock::Paragraph("Grade: 9.0".into())]
        );
    }

    #[test]
    fn open_ended_experience_renders_present() {
        let mut record = ResumeRecord::new();
        record.add_experience(Experience {
            title: "Engineer".into(),
            company: "Initech".into(),
            location: "Pune".into(),
            start_date: "2022-03".into(),
            ..Experience::default()
        });
        let tree = compose(&record);
        let SectionContent::Items(items) = &tree.sections[0].content else {
            panic!("experience should compose to items");
        };
        assert_eq!(items[0].date_text.as_deref(), Some("Mar 2022 – Present"));
        assert_eq!(items[0].subtitle.as_deref(), Some("Initech, Pune"));
    }

    #[test]
    fn dateless_entry_has_no_date_line() {
        let mut record = ResumeRecord::new();
        record.add_education(Education {
            degree: "B.Sc.".into(),
            institution: "X U".into(),
            ..Education::default()
        });
        let tree = compose(&record);
        let SectionContent::Items(items) = &tree.sections[0].content else {
            panic!("education should compose to items");
        };
        assert_eq!(items[0].date_text, None);
    }

    #[test]
    fn experience_bullets_and_tags_project_in_order() {
        let mut record = ResumeRecord::new();
        let mut exp = Experience {
            title: "Engineer".into(),
            company: "Initech".into(),
            description: vec!["Built pipelines".into(), "Cut latency".into()],
            ..Experience::default()
        };
        exp.add_technology("Rust");
        exp.add_technology("Postgres");
        record.add_experience(exp);

        let tree = compose(&record);
        let SectionContent::Items(items) = &tree.sections[0].content else {
            panic!("experience should compose to items");
        };
        assert_eq!(
            items[0].body,
            vec![
                BodyBlock::Bullets(vec!["Built pipelines".into(), "Cut latency".into()]),
                BodyBlock::Tags(vec!["Rust".into(), "Postgres".into()]),
            ]
        );
    }

    #[test]
    fn hobbies_join_into_one_paragraph() {
        let mut record = ResumeRecord::new();
        for name in ["Chess", "Running"] {
            record.add_hobby(Hobby {
                name: name.into(),
                ..Hobby::default()
            });
        }
        let tree = compose(&record);
        assert_eq!(
            tree.sections[0].content,
            SectionContent::Text("Chess, Running".into())
        );
    }

    #[test]
    fn skills_project_to_tag_row() {
        let mut record = ResumeRecord::new();
        for name in ["Rust", "SQL"] {
            record.add_skill(Skill {
                name: name.into(),
                level: 3,
                ..Skill::default()
            });
        }
        let tree = compose(&record);
        assert_eq!(
            tree.sections[0].content,
            SectionContent::TagRow(vec!["Rust".into(), "SQL".into()])
        );
    }
}
