// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Vector backend — re-emits the resume as native PDF text operations with
// the built-in Helvetica fonts. Crisp at any zoom and much smaller than the
// raster output.
//
// Layout is re-derived directly from the record with the same presence and
// ordering rules as the composer (its layout primitives are styled text
// lines, not tree blocks). Pagination is a line-budget walk with section
// titles kept attached to the line group that follows them.

use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, TextItem,
};
use tracing::{debug, instrument};

use vitawerk_core::error::Result;
use vitawerk_core::resume::ResumeRecord;
use vitawerk_core::types::BackendKind;
use vitawerk_layout::metrics::{HelveticaMetrics, PT_TO_MM, TextMeasurer};
use vitawerk_layout::style::LayoutStyle;
use vitawerk_layout::tree::{SectionKind, format_date_range, format_month};

use crate::backend::{RenderBackend, RenderOptions, RenderedDocument};

/// Native-text PDF backend.
pub struct VectorBackend;

/// One styled text line, optionally with a right-aligned companion (dates).
struct Line {
    text: String,
    size_pt: f32,
    font: BuiltinFont,
    indent_mm: f32,
    right: Option<String>,
}

/// Lines that paginate as a unit, with vertical gaps around them.
struct LineGroup {
    gap_before_mm: f32,
    gap_after_mm: f32,
    /// Section titles: never left as the last group on a page.
    keep_with_next: bool,
    lines: Vec<Line>,
}

impl LineGroup {
    fn lines_height_mm(&self, style: &LayoutStyle) -> f32 {
        self.lines
            .iter()
            .map(|l| style.line_height_mm(l.size_pt))
            .sum()
    }
}

impl RenderBackend for VectorBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Vector
    }

    #[instrument(skip_all)]
    fn render(
        &self,
        record: &ResumeRecord,
        _tree: &vitawerk_layout::tree::LayoutTree,
        opts: &RenderOptions,
    ) -> Result<RenderedDocument> {
        let style = &opts.style;
        let measurer = HelveticaMetrics;
        let usable_w = opts.page.usable_width_mm(opts.margin_mm);
        let usable_h = opts.page.usable_height_mm(opts.margin_mm);

        let groups = flatten_record(record, style, &measurer, usable_w);
        let page_groups = break_into_pages(&groups, style, usable_h);

        let page_w = Mm(opts.page.width_mm);
        let page_h = Mm(opts.page.height_mm);
        let page_h_pt = page_h.into_pt().0;
        let margin_pt = Mm(opts.margin_mm).into_pt().0;

        let title = if record.personal_info.full_name().is_empty() {
            "Resume".to_string()
        } else {
            format!("{} — Resume", record.personal_info.full_name())
        };
        let mut doc = PdfDocument::new(&title);
        let mut pdf_pages: Vec<PdfPage> = Vec::new();

        for group_indices in &page_groups {
            let mut ops: Vec<Op> = Vec::new();
            let mut y_mm = 0.0_f32;

            for (slot, &gi) in group_indices.iter().enumerate() {
                let group = &groups[gi];
                if slot > 0 {
                    y_mm += group.gap_before_mm;
                }
                for line in &group.lines {
                    emit_line(
                        &mut ops,
                        line,
                        y_mm,
                        page_h_pt,
                        margin_pt,
                        usable_w,
                        style,
                        &measurer,
                    );
                    y_mm += style.line_height_mm(line.size_pt);
                }
                y_mm += group.gap_after_mm;
            }

            pdf_pages.push(PdfPage::new(page_w, page_h, ops));
        }

        // A fully blank record still exports a single empty page.
        if pdf_pages.is_empty() {
            pdf_pages.push(PdfPage::new(page_w, page_h, Vec::new()));
        }

        let page_count = pdf_pages.len();
        doc.with_pages(pdf_pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
        debug!(bytes = bytes.len(), page_count, "vector PDF serialised");

        Ok(RenderedDocument::Pdf { bytes, page_count })
    }
}

/// Write one line's text run(s) at the given offset from the top margin.
#[allow(clippy::too_many_arguments)]
fn emit_line(
    ops: &mut Vec<Op>,
    line: &Line,
    y_mm: f32,
    page_h_pt: f32,
    margin_pt: f32,
    usable_w: f32,
    style: &LayoutStyle,
    measurer: &HelveticaMetrics,
) {
    // Baseline sits roughly 80% of the font size below the line top.
    let baseline_mm = y_mm + line.size_pt * PT_TO_MM * 0.8;
    let y_pt = page_h_pt - margin_pt - Mm(baseline_mm).into_pt().0;

    if !line.text.is_empty() {
        let x_pt = margin_pt + Mm(line.indent_mm).into_pt().0;
        push_text_run(ops, &line.text, line.size_pt, line.font, x_pt, y_pt);
    }

    if let Some(right) = &line.right {
        let right_w = measurer.text_width_mm(right, style.body_size_pt);
        let x_pt = margin_pt + Mm(usable_w - right_w).into_pt().0;
        push_text_run(
            ops,
            right,
            style.body_size_pt,
            BuiltinFont::Helvetica,
            x_pt,
            y_pt,
        );
    }
}

fn push_text_run(
    ops: &mut Vec<Op>,
    text: &str,
    size_pt: f32,
    font: BuiltinFont,
    x_pt: f32,
    y_pt: f32,
) {
    ops.push(Op::StartTextSection);
    ops.push(Op::SetTextCursor {
        pos: Point {
            x: Pt(x_pt),
            y: Pt(y_pt),
        },
    });
    ops.push(Op::SetFontSizeBuiltinFont {
        size: Pt(size_pt),
        font,
    });
    ops.push(Op::WriteTextBuiltinFont {
        items: vec![TextItem::Text(text.to_string())],
        font,
    });
    ops.push(Op::EndTextSection);
}

// -- Line-budget pagination ---------------------------------------------------

const FIT_EPSILON_MM: f32 = 0.01;

/// Chunk groups into pages. A group whose lines exceed the remaining budget
/// starts a new page; a `keep_with_next` group (section title) left trailing
/// is carried over with it.
fn break_into_pages(
    groups: &[LineGroup],
    style: &LayoutStyle,
    usable_h: f32,
) -> Vec<Vec<usize>> {
    let mut pages: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut y = 0.0_f32;

    for (gi, group) in groups.iter().enumerate() {
        let gap_before = if current.is_empty() {
            0.0
        } else {
            group.gap_before_mm
        };
        let needed = gap_before + group.lines_height_mm(style);

        if y + needed > usable_h + FIT_EPSILON_MM && !current.is_empty() {
            let last_keeps = current
                .last()
                .is_some_and(|&last| groups[last].keep_with_next);

            if last_keeps && current.len() == 1 {
                // A title alone with an oversized follower: keep them
                // together and let the page overflow.
            } else if last_keeps {
                let carried = current.pop().expect("checked non-empty");
                pages.push(std::mem::take(&mut current));
                y = 0.0;
                current.push(carried);
                y += groups[carried].lines_height_mm(style) + groups[carried].gap_after_mm;
            } else {
                pages.push(std::mem::take(&mut current));
                y = 0.0;
            }
        }

        let gap_before = if current.is_empty() {
            0.0
        } else {
            group.gap_before_mm
        };
        current.push(gi);
        y += gap_before + group.lines_height_mm(style) + group.gap_after_mm;
    }

    if !current.is_empty() {
        pages.push(current);
    }
    pages
}

// -- Record flattening --------------------------------------------------------
//
// Deliberately mirrors the composer's presence and ordering rules without
// consuming its tree; `present_sections` is pinned against the composer in
// tests to catch drift.

/// Sections this backend will render for `record`, in order.
pub(crate) fn present_sections(record: &ResumeRecord) -> Vec<SectionKind> {
    SectionKind::CANONICAL_ORDER
        .into_iter()
        .filter(|kind| match kind {
            SectionKind::Summary => !record.personal_info.summary.trim().is_empty(),
            SectionKind::Education => !record.education.is_empty(),
            SectionKind::Experience => !record.experience.is_empty(),
            SectionKind::Projects => !record.projects.is_empty(),
            SectionKind::Skills => !record.skills.is_empty(),
            SectionKind::Positions => !record.positions.is_empty(),
            SectionKind::Achievements => !record.achievements.is_empty(),
            SectionKind::Activities => !record.activities.is_empty(),
            SectionKind::Hobbies => !record.hobbies.is_empty(),
        })
        .collect()
}

fn flatten_record(
    record: &ResumeRecord,
    style: &LayoutStyle,
    measurer: &HelveticaMetrics,
    usable_w: f32,
) -> Vec<LineGroup> {
    let mut groups: Vec<LineGroup> = Vec::new();

    // Header.
    let info = &record.personal_info;
    let mut header_lines: Vec<Line> = Vec::new();
    let name = info.full_name();
    if !name.is_empty() {
        header_lines.push(Line {
            text: name,
            size_pt: style.name_size_pt,
            font: BuiltinFont::HelveticaBold,
            indent_mm: 0.0,
            right: None,
        });
    }
    let contacts: Vec<&str> = [
        info.email.as_str(),
        info.phone.as_str(),
        info.linkedin.as_str(),
        info.github.as_str(),
        info.website.as_str(),
    ]
    .into_iter()
    .map(str::trim)
    .filter(|f| !f.is_empty())
    .collect();
    if !contacts.is_empty() {
        let joined = contacts.join(LayoutStyle::CONTACT_SEPARATOR);
        header_lines.extend(paragraph(
            &joined,
            style.contact_size_pt,
            BuiltinFont::Helvetica,
            0.0,
            measurer,
            usable_w,
        ));
    }
    if !header_lines.is_empty() {
        groups.push(LineGroup {
            gap_before_mm: 0.0,
            gap_after_mm: style.header_rule_gap_mm,
            keep_with_next: false,
            lines: header_lines,
        });
    }

    for kind in present_sections(record) {
        groups.push(title_group(kind, style));
        match kind {
            SectionKind::Summary => {
                groups.push(text_group(
                    record.personal_info.summary.trim(),
                    style,
                    measurer,
                    usable_w,
                ));
            }
            SectionKind::Education => {
                for edu in &record.education {
                    let mut lines = title_lines(
                        &edu.degree,
                        format_date_range(&edu.start_date, &edu.end_date),
                        style,
                        measurer,
                        usable_w,
                    );
                    lines.extend(subtitle_lines(
                        &edu.institution,
                        &edu.location,
                        style,
                        measurer,
                        usable_w,
                    ));
                    if !edu.grade.trim().is_empty() {
                        lines.extend(paragraph(
                            &format!("Grade: {}", edu.grade.trim()),
                            style.body_size_pt,
                            BuiltinFont::Helvetica,
                            0.0,
                            measurer,
                            usable_w,
                        ));
                    }
                    groups.push(item_group(lines, style));
                }
            }
            SectionKind::Experience => {
                for exp in &record.experience {
                    let mut lines = title_lines(
                        &exp.title,
                        format_date_range(&exp.start_date, &exp.end_date),
                        style,
                        measurer,
                        usable_w,
                    );
                    lines.extend(subtitle_lines(
                        &exp.company,
                        &exp.location,
                        style,
                        measurer,
                        usable_w,
                    ));
                    for bullet in &exp.description {
                        lines.extend(bullet_lines(bullet, style, measurer, usable_w));
                    }
                    if !exp.technologies.is_empty() {
                        lines.extend(paragraph(
                            &exp.technologies.join("  ·  "),
                            style.body_size_pt,
                            BuiltinFont::HelveticaOblique,
                            0.0,
                            measurer,
                            usable_w,
                        ));
                    }
                    groups.push(item_group(lines, style));
                }
            }
            SectionKind::Projects => {
                for project in &record.projects {
                    let mut lines = title_lines(
                        &project.title,
                        format_date_range(&project.start_date, &project.end_date),
                        style,
                        measurer,
                        usable_w,
                    );
                    if !project.description.trim().is_empty() {
                        lines.extend(paragraph(
                            project.description.trim(),
                            style.body_size_pt,
                            BuiltinFont::Helvetica,
                            0.0,
                            measurer,
                            usable_w,
                        ));
                    }
                    if !project.technologies.is_empty() {
                        lines.extend(paragraph(
                            &project.technologies.join("  ·  "),
                            style.body_size_pt,
                            BuiltinFont::HelveticaOblique,
                            0.0,
                            measurer,
                            usable_w,
                        ));
                    }
                    if !project.link.trim().is_empty() {
                        lines.extend(paragraph(
                            &format!("Link: {}", project.link.trim()),
                            style.body_size_pt,
                            BuiltinFont::Helvetica,
                            0.0,
                            measurer,
                            usable_w,
                        ));
                    }
                    groups.push(item_group(lines, style));
                }
            }
            SectionKind::Skills => {
                let joined = record
                    .skills
                    .iter()
                    .map(|s| s.name.as_str())
                    .collect::<Vec<_>>()
                    .join("  ·  ");
                groups.push(text_group(&joined, style, measurer, usable_w));
            }
            SectionKind::Positions => {
                for pos in &record.positions {
                    let mut lines = title_lines(
                        &pos.title,
                        format_date_range(&pos.start_date, &pos.end_date),
                        style,
                        measurer,
                        usable_w,
                    );
                    lines.extend(subtitle_lines(&pos.organization, "", style, measurer, usable_w));
                    if !pos.description.trim().is_empty() {
                        lines.extend(paragraph(
                            pos.description.trim(),
                            style.body_size_pt,
                            BuiltinFont::Helvetica,
                            0.0,
                            measurer,
                            usable_w,
                        ));
                    }
                    groups.push(item_group(lines, style));
                }
            }
            SectionKind::Achievements => {
                for ach in &record.achievements {
                    let mut lines = title_lines(
                        &ach.title,
                        format_month(&ach.date),
                        style,
                        measurer,
                        usable_w,
                    );
                    if !ach.description.trim().is_empty() {
                        lines.extend(paragraph(
                            ach.description.trim(),
                            style.body_size_pt,
                            BuiltinFont::Helvetica,
                            0.0,
                            measurer,
                            usable_w,
                        ));
                    }
                    groups.push(item_group(lines, style));
                }
            }
            SectionKind::Activities => {
                for act in &record.activities {
                    let mut lines = title_lines(
                        &act.title,
                        format_date_range(&act.start_date, &act.end_date),
                        style,
                        measurer,
                        usable_w,
                    );
                    lines.extend(subtitle_lines(&act.organization, "", style, measurer, usable_w));
                    if !act.description.trim().is_empty() {
                        lines.extend(paragraph(
                            act.description.trim(),
                            style.body_size_pt,
                            BuiltinFont::Helvetica,
                            0.0,
                            measurer,
                            usable_w,
                        ));
                    }
                    groups.push(item_group(lines, style));
                }
            }
            SectionKind::Hobbies => {
                let joined = record
                    .hobbies
                    .iter()
                    .map(|h| h.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                groups.push(text_group(&joined, style, measurer, usable_w));
            }
        }
    }

    groups
}

fn title_group(kind: SectionKind, style: &LayoutStyle) -> LineGroup {
    LineGroup {
        gap_before_mm: style.section_gap_mm,
        gap_after_mm: style.section_title_gap_mm,
        keep_with_next: true,
        lines: vec![Line {
            text: kind.display_title().to_string(),
            size_pt: style.section_title_size_pt,
            font: BuiltinFont::HelveticaBold,
            indent_mm: 0.0,
            right: None,
        }],
    }
}

fn item_group(lines: Vec<Line>, style: &LayoutStyle) -> LineGroup {
    LineGroup {
        gap_before_mm: 0.0,
        gap_after_mm: style.item_gap_mm,
        keep_with_next: false,
        lines,
    }
}

fn text_group(
    text: &str,
    style: &LayoutStyle,
    measurer: &HelveticaMetrics,
    usable_w: f32,
) -> LineGroup {
    item_group(
        paragraph(
            text,
            style.body_size_pt,
            BuiltinFont::Helvetica,
            0.0,
            measurer,
            usable_w,
        ),
        style,
    )
}

/// Item title wrapped beside the right-aligned date text.
fn title_lines(
    title: &str,
    date_text: Option<String>,
    style: &LayoutStyle,
    measurer: &HelveticaMetrics,
    usable_w: f32,
) -> Vec<Line> {
    let title = title.trim();
    let avail = match &date_text {
        Some(date) => (usable_w
            - measurer.text_width_mm(date, style.body_size_pt)
            - 4.0)
            .max(usable_w * 0.4),
        None => usable_w,
    };

    if title.is_empty() {
        return match date_text {
            Some(date) => vec![Line {
                text: String::new(),
                size_pt: style.item_title_size_pt,
                font: BuiltinFont::HelveticaBold,
                indent_mm: 0.0,
                right: Some(date),
            }],
            None => Vec::new(),
        };
    }

    let mut lines: Vec<Line> = measurer
        .wrap(title, style.item_title_size_pt, avail)
        .into_iter()
        .map(|text| Line {
            text,
            size_pt: style.item_title_size_pt,
            font: BuiltinFont::HelveticaBold,
            indent_mm: 0.0,
            right: None,
        })
        .collect();
    if let Some(first) = lines.first_mut() {
        first.right = date_text;
    }
    lines
}

fn subtitle_lines(
    primary: &str,
    location: &str,
    style: &LayoutStyle,
    measurer: &HelveticaMetrics,
    usable_w: f32,
) -> Vec<Line> {
    let primary = primary.trim();
    let location = location.trim();
    let text = match (primary.is_empty(), location.is_empty()) {
        (true, true) => return Vec::new(),
        (false, true) => primary.to_string(),
        (true, false) => location.to_string(),
        (false, false) => format!("{primary}, {location}"),
    };
    paragraph(
        &text,
        style.body_size_pt,
        BuiltinFont::HelveticaOblique,
        0.0,
        measurer,
        usable_w,
    )
}

fn bullet_lines(
    bullet: &str,
    style: &LayoutStyle,
    measurer: &HelveticaMetrics,
    usable_w: f32,
) -> Vec<Line> {
    let bullet = bullet.trim();
    if bullet.is_empty() {
        return Vec::new();
    }
    measurer
        .wrap(bullet, style.body_size_pt, usable_w - style.bullet_indent_mm)
        .into_iter()
        .enumerate()
        .map(|(i, seg)| {
            if i == 0 {
                Line {
                    text: format!("\u{2022}  {seg}"),
                    size_pt: style.body_size_pt,
                    font: BuiltinFont::Helvetica,
                    indent_mm: (style.bullet_indent_mm - 3.0).max(0.0),
                    right: None,
                }
            } else {
                Line {
                    text: seg,
                    size_pt: style.body_size_pt,
                    font: BuiltinFont::Helvetica,
                    indent_mm: style.bullet_indent_mm,
                    right: None,
                }
            }
        })
        .collect()
}

fn paragraph(
    text: &str,
    size_pt: f32,
    font: BuiltinFont,
    indent_mm: f32,
    measurer: &HelveticaMetrics,
    usable_w: f32,
) -> Vec<Line> {
    measurer
        .wrap(text, size_pt, usable_w - indent_mm)
        .into_iter()
        .map(|line| Line {
            text: line,
            size_pt,
            font,
            indent_mm,
            right: None,
        })
        .collect()
}

// -- Tests --------------------------------------------------------------------
