// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Paginator — splits a composed layout tree into fixed-height pages.
//
// Blocks walk in tree order accumulating measured height; when the next
// block would exceed the remaining space, a new page starts. Item blocks are
// the minimum pagination unit and never split. A section header is never
// left as the last block on a page: it moves to the next page together with
// its first item.

use serde::{Deserialize, Serialize};
use tracing::debug;
use vitawerk_core::types::PageBox;

use crate::metrics::TextMeasurer;
use crate::style::{LayoutStyle, tag_rows};
use crate::tree::{BodyBlock, LayoutTree, SectionContent};

/// Reference to one block of a layout tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockRef {
    Header,
    /// Section title, by section index.
    SectionHeader(usize),
    /// Item, by (section index, item index).
    Item(usize, usize),
    /// Tag-row or text content of a section, by section index.
    SectionBody(usize),
}

/// One block placed on a page at a vertical offset from the top margin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub block: BlockRef,
    pub y_mm: f32,
    pub height_mm: f32,
}

/// An ordered list of placements guaranteed to fit the usable page height,
/// except for a single block that alone exceeds it (overflow permitted,
/// never truncated).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub placements: Vec<Placement>,
}

impl Page {
    /// Total placed height, from the top margin to the bottom of the last block.
    pub fn content_height_mm(&self) -> f32 {
        self.placements
            .last()
            .map(|p| p.y_mm + p.height_mm)
            .unwrap_or(0.0)
    }
}

/// Walk order of a tree's blocks.
pub fn flatten(tree: &LayoutTree) -> Vec<BlockRef> {
    let mut blocks = vec![BlockRef::Header];
    for (si, section) in tree.sections.iter().enumerate() {
        blocks.push(BlockRef::SectionHeader(si));
        match &section.content {
            SectionContent::Items(items) => {
                for ii in 0..items.len() {
                    blocks.push(BlockRef::Item(si, ii));
                }
            }
            SectionContent::TagRow(_) | SectionContent::Text(_) => {
                blocks.push(BlockRef::SectionBody(si));
            }
        }
    }
    blocks
}

/// Measured height of one block at the given usable width.
pub fn block_height(
    tree: &LayoutTree,
    block: BlockRef,
    style: &LayoutStyle,
    measurer: &dyn TextMeasurer,
    usable_w_mm: f32,
) -> f32 {
    match block {
        BlockRef::Header => {
            let header = &tree.header;
            let mut h = 0.0;
            if !header.name.is_empty() {
                h += style.line_height_mm(style.name_size_pt);
            }
            if !header.contacts.is_empty() {
                let joined = header.contacts.join(LayoutStyle::CONTACT_SEPARATOR);
                let lines = measurer.line_count(&joined, style.contact_size_pt, usable_w_mm);
                h += lines as f32 * style.line_height_mm(style.contact_size_pt);
            }
            h + style.header_rule_gap_mm
        }

        BlockRef::SectionHeader(_) => {
            style.section_gap_mm
                + style.line_height_mm(style.section_title_size_pt)
                + style.section_title_gap_mm
        }

        BlockRef::Item(si, ii) => {
            let SectionContent::Items(items) = &tree.sections[si].content else {
                return 0.0;
            };
            let item = &items[ii];
            let mut h = 0.0;

            // Title row shares the line with the right-aligned date.
            let title_avail = match &item.date_text {
                Some(date) => {
                    (usable_w_mm
                        - measurer.text_width_mm(date, style.body_size_pt)
                        - 4.0)
                        .max(usable_w_mm * 0.4)
                }
                None => usable_w_mm,
            };
            let title_lines = if item.title.is_empty() {
                usize::from(item.date_text.is_some())
            } else {
                measurer
                    .line_count(&item.title, style.item_title_size_pt, title_avail)
                    .max(1)
            };
            h += title_lines as f32 * style.line_height_mm(style.item_title_size_pt);

            if let Some(subtitle) = &item.subtitle {
                let lines = measurer.line_count(subtitle, style.body_size_pt, usable_w_mm);
                h += lines as f32 * style.line_height_mm(style.body_size_pt);
            }

            for body in &item.body {
                h += body_height(body, style, measurer, usable_w_mm);
            }

            h + style.item_gap_mm
        }

        BlockRef::SectionBody(si) => {
            let h = match &tree.sections[si].content {
                SectionContent::TagRow(tags) => {
                    tag_rows(tags, style, measurer, usable_w_mm).len() as f32
                        * style.tag_row_height_mm
                }
                SectionContent::Text(text) => {
                    let lines = measurer.line_count(text, style.body_size_pt, usable_w_mm);
                    lines as f32 * style.line_height_mm(style.body_size_pt)
                }
                SectionContent::Items(_) => 0.0,
            };
            h + style.item_gap_mm
        }
    }
}

fn body_height(
    body: &BodyBlock,
    style: &LayoutStyle,
    measurer: &dyn TextMeasurer,
    usable_w_mm: f32,
) -> f32 {
    let body_line = style.line_height_mm(style.body_size_pt);
    match body {
        BodyBlock::Paragraph(text) => {
            measurer.line_count(text, style.body_size_pt, usable_w_mm) as f32 * body_line
        }
        BodyBlock::Bullets(bullets) => bullets
            .iter()
            .map(|b| {
                measurer.line_count(b, style.body_size_pt, usable_w_mm - style.bullet_indent_mm)
                    as f32
                    * body_line
            })
            .sum(),
        BodyBlock::Tags(tags) => {
            tag_rows(tags, style, measurer, usable_w_mm).len() as f32 * style.tag_row_height_mm
        }
    }
}

/// Total natural content height of the tree at the given usable width.
pub fn natural_height(
    tree: &LayoutTree,
    style: &LayoutStyle,
    measurer: &dyn TextMeasurer,
    usable_w_mm: f32,
) -> f32 {
    flatten(tree)
        .into_iter()
        .map(|b| block_height(tree, b, style, measurer, usable_w_mm))
        .sum()
}

/// Uniform shrink ratio fitting content of the given natural size onto one
/// page: `min(pageWidth/contentWidth, pageHeight/contentHeight)`, capped at
/// 1.0 so content is never upscaled.
pub fn shrink_ratio(content_w_mm: f32, content_h_mm: f32, page: &PageBox) -> f32 {
    if content_w_mm <= 0.0 || content_h_mm <= 0.0 {
        return 1.0;
    }
    (page.width_mm / content_w_mm)
        .min(page.height_mm / content_h_mm)
        .min(1.0)
}

const FIT_EPSILON_MM: f32 = 0.01;

/// Split the tree into pages of `page_box` with a uniform margin.
pub fn paginate(
    tree: &LayoutTree,
    page_box: &PageBox,
    margin_mm: f32,
    style: &LayoutStyle,
    measurer: &dyn TextMeasurer,
) -> Vec<Page> {
    let usable_h = page_box.usable_height_mm(margin_mm);
    let usable_w = page_box.usable_width_mm(margin_mm);

    let mut pages: Vec<Page> = Vec::new();
    let mut current: Vec<Placement> = Vec::new();
    let mut y = 0.0_f32;

    for block in flatten(tree) {
        let h = block_height(tree, block, style, measurer, usable_w);
        let fits = y + h <= usable_h + FIT_EPSILON_MM;

        if !fits && !current.is_empty() {
            // A section header must not be stranded at the bottom of the
            // page while its first item moves on: carry it over too.
            let carry_header = matches!(
                (current.last().map(|p| p.block), first_of_section(block)),
                (Some(BlockRef::SectionHeader(s)), Some(section)) if s == section
            );

            if carry_header && current.len() > 1 {
                let mut carried = current.pop().expect("checked non-empty");
                pages.push(Page {
                    placements: std::mem::take(&mut current),
                });
                y = 0.0;
                carried.y_mm = y;
                y += carried.height_mm;
                current.push(carried);
            } else if !carry_header {
                pages.push(Page {
                    placements: std::mem::take(&mut current),
                });
                y = 0.0;
            }
            // carry_header with a single-placement page: the header and its
            // first item exceed the page on their own — keep them together
            // and let the page overflow.
        }

        current.push(Placement {
            block,
            y_mm: y,
            height_mm: h,
        });
        y += h;
    }

    if !current.is_empty() {
        pages.push(Page {
            placements: current,
        });
    }

    debug!(pages = pages.len(), usable_h, "pagination complete");
    pages
}

/// If `block` is the first content block of a section, that section's index.
fn first_of_section(block: BlockRef) -> Option<usize> {
    match block {
        BlockRef::Item(s, 0) => Some(s),
        BlockRef::SectionBody(s) => Some(s),
        _ => None,
    }
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::compose;
    use crate::metrics::HelveticaMetrics;
    use vitawerk_core::resume::{Experience, ResumeRecord};

    fn experience(bullets: usize) -> Experience {
        Experience {
            title: "Software Engineer".into(),
            company: "Initech".into(),
            location: "Pune".into(),
            start_date: "2021-06".into(),
            end_date: "2023-08".into(),
            description: (0..bullets)
                .map(|i| {
                    format!(
                        "Delivered milestone {i} across services with measured rollouts \
                         and careful capacity planning for sustained load"
                    )
                })
                .collect(),
            ..Experience::default()
        }
    }

    fn record_with_experiences(count: usize, bullets: usize) -> ResumeRecord {
        let mut record = ResumeRecord::new();
        record.personal_info.first_name = "Ada".into();
        record.personal_info.last_name = "Lovelace".into();
        record.personal_info.email = "ada@example.com".into();
        for _ in 0..count {
            record.add_experience(experience(bullets));
        }
        record
    }

    fn assert_page_invariants(pages: &[Page], usable_h: f32) {
        for page in pages {
            assert!(!page.placements.is_empty(), "no empty pages");

            // Fits the budget, unless a single oversized block (or a section
            // header glued to an oversized first item) owns the page.
            if page.content_height_mm() > usable_h + FIT_EPSILON_MM {
                assert!(
                    page.placements.len() <= 2,
                    "an overflowing page may only hold one oversized block \
                     (optionally with its section header)"
                );
            }

            // A section header is never the last block on a page.
            if let Some(last) = page.placements.last() {
                assert!(
                    !matches!(last.block, BlockRef::SectionHeader(_)),
                    "section header orphaned at page bottom"
                );
            }

            // Offsets are consistent and monotonic.
            let mut expected_y = 0.0;
            for p in &page.placements {
                assert!((p.y_mm - expected_y).abs() < 1e-3);
                expected_y += p.height_mm;
            }
        }
    }

    #[test]
    fn short_record_fits_one_page() {
        let record = record_with_experiences(1, 2);
        let tree = compose(&record);
        let pages = paginate(
            &tree,
            &PageBox::a4(),
            15.0,
            &LayoutStyle::default(),
            &HelveticaMetrics,
        );
        assert_eq!(pages.len(), 1);
        assert_page_invariants(&pages, PageBox::a4().usable_height_mm(15.0));
    }

    #[test]
    fn long_record_spills_to_multiple_pages() {
        // Three experiences with enough bullets to exceed one A4 page.
        let record = record_with_experiences(3, 14);
        let tree = compose(&record);
        let page_box = PageBox::a4();
        let pages = paginate(
            &tree,
            &page_box,
            15.0,
            &LayoutStyle::default(),
            &HelveticaMetrics,
        );
        assert!(pages.len() >= 2, "expected at least two pages");
        assert_page_invariants(&pages, page_box.usable_height_mm(15.0));
    }

    #[test]
    fn invariants_hold_across_many_shapes() {
        // Sweep item counts and bullet counts so page boundaries land in
        // many different places, including just before section headers.
        let page_box = PageBox::a4();
        let usable_h = page_box.usable_height_mm(15.0);
        for count in [1, 2, 4, 7, 10] {
            for bullets in 0..6 {
                let mut record = record_with_experiences(count, bullets);
                record.personal_info.summary =
                    "Engineer focused on storage and document systems.".into();
                for i in 0..count {
                    record.add_project(vitawerk_core::resume::Project {
                        title: format!("Project {i}"),
                        description: "A small tool.".repeat(bullets + 1),
                        ..Default::default()
                    });
                }
                let tree = compose(&record);
                let pages = paginate(
                    &tree,
                    &page_box,
                    15.0,
                    &LayoutStyle::default(),
                    &HelveticaMetrics,
                );
                assert_page_invariants(&pages, usable_h);

                // Every block is placed exactly once, in walk order.
                let placed: Vec<BlockRef> = pages
                    .iter()
                    .flat_map(|p| p.placements.iter().map(|pl| pl.block))
                    .collect();
                assert_eq!(placed, flatten(&tree));
            }
        }
    }

    #[test]
    fn oversized_item_gets_its_own_page_without_truncation() {
        let mut record = ResumeRecord::new();
        record.add_experience(Experience {
            title: "Engineer".into(),
            company: "Initech".into(),
            description: (0..80)
                .map(|i| format!("Bullet {i} with some additional explanatory text"))
                .collect(),
            ..Experience::default()
        });
        let tree = compose(&record);
        let page_box = PageBox::a4();
        let usable_h = page_box.usable_height_mm(15.0);
        let pages = paginate(
            &tree,
            &page_box,
            15.0,
            &LayoutStyle::default(),
            &HelveticaMetrics,
        );

        let item_page = pages
            .iter()
            .find(|p| {
                p.placements
                    .iter()
                    .any(|pl| matches!(pl.block, BlockRef::Item(_, _)))
            })
            .expect("item must be placed somewhere");
        assert!(
            item_page.content_height_mm() > usable_h,
            "oversized item should overflow rather than be truncated"
        );
    }

    #[test]
    fn blank_tree_paginates_to_a_single_header_page() {
        let tree = compose(&ResumeRecord::new());
        let pages = paginate(
            &tree,
            &PageBox::a4(),
            15.0,
            &LayoutStyle::default(),
            &HelveticaMetrics,
        );
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].placements.len(), 1);
        assert_eq!(pages[0].placements[0].block, BlockRef::Header);
    }

    #[test]
    fn shrink_ratio_fits_both_axes() {
        let page = PageBox::a4();
        let ratio = shrink_ratio(180.0, 594.0, &page);
        assert!((ratio - 0.5).abs() < 1e-3);

        // Content already smaller than the page is not upscaled.
        assert_eq!(shrink_ratio(100.0, 100.0, &page), 1.0);
    }

    #[test]
    fn natural_height_matches_sum_of_pages() {
        let record = record_with_experiences(3, 5);
        let tree = compose(&record);
        let style = LayoutStyle::default();
        let usable_w = PageBox::a4().usable_width_mm(15.0);
        let natural = natural_height(&tree, &style, &HelveticaMetrics, usable_w);
        let pages = paginate(
            &tree,
            &PageBox::a4(),
            15.0,
            &style,
            &HelveticaMetrics,
        );
        let placed_sum: f32 = pages
            .iter()
            .flat_map(|p| p.placements.iter().map(|pl| pl.height_mm))
            .sum();
        assert!((natural - placed_sum).abs() < 1e-2);
    }
}
