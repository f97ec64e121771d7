// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fixed template geometry: font sizes, line heights, and spacing used by the
// paginator and the backends that draw from the layout tree. One template —
// template selection is out of scope.

use serde::{Deserialize, Serialize};

use crate::metrics::{PT_TO_MM, TextMeasurer};

/// Visual parameters of the single resume template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutStyle {
    pub name_size_pt: f32,
    pub contact_size_pt: f32,
    pub section_title_size_pt: f32,
    pub item_title_size_pt: f32,
    pub body_size_pt: f32,
    /// Line height as a multiple of the font size.
    pub line_spacing: f32,
    /// Rule plus breathing room under the header block.
    pub header_rule_gap_mm: f32,
    /// Space above each section title.
    pub section_gap_mm: f32,
    /// Space between a section title (with its rule) and its first item.
    pub section_title_gap_mm: f32,
    /// Space after each item.
    pub item_gap_mm: f32,
    /// Left indent of bullet text.
    pub bullet_indent_mm: f32,
    /// Horizontal padding inside one tag chip.
    pub tag_pad_mm: f32,
    /// Gap between adjacent chips.
    pub tag_gap_mm: f32,
    /// Height of one chip row.
    pub tag_row_height_mm: f32,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            name_size_pt: 22.0,
            contact_size_pt: 9.0,
            section_title_size_pt: 12.0,
            item_title_size_pt: 10.5,
            body_size_pt: 9.5,
            line_spacing: 1.35,
            header_rule_gap_mm: 4.0,
            section_gap_mm: 4.0,
            section_title_gap_mm: 2.0,
            item_gap_mm: 2.5,
            bullet_indent_mm: 5.0,
            tag_pad_mm: 2.0,
            tag_gap_mm: 2.0,
            tag_row_height_mm: 6.0,
        }
    }
}

impl LayoutStyle {
    /// Height of one text line at `size_pt`, in millimetres.
    pub fn line_height_mm(&self, size_pt: f32) -> f32 {
        size_pt * PT_TO_MM * self.line_spacing
    }

    /// Separator used between header contact fields.
    pub const CONTACT_SEPARATOR: &'static str = "  ·  ";
}

/// Partition tag chips into rows that fit `usable_w_mm`, returning indices
/// into `tags` per row. A chip wider than the row gets a row of its own.
pub fn tag_rows(
    tags: &[String],
    style: &LayoutStyle,
    measurer: &dyn TextMeasurer,
    usable_w_mm: f32,
) -> Vec<Vec<usize>> {
    let mut rows: Vec<Vec<usize>> = Vec::new();
    let mut row: Vec<usize> = Vec::new();
    let mut x = 0.0_f32;

    for (i, tag) in tags.iter().enumerate() {
        let chip_w =
            measurer.text_width_mm(tag, style.body_size_pt) + 2.0 * style.tag_pad_mm;
        let advance = if row.is_empty() {
            chip_w
        } else {
            style.tag_gap_mm + chip_w
        };
        if !row.is_empty() && x + advance > usable_w_mm {
            rows.push(std::mem::take(&mut row));
            x = 0.0;
            row.push(i);
            x += chip_w;
        } else {
            row.push(i);
            x += advance;
        }
    }
    if !row.is_empty() {
        rows.push(row);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::HelveticaMetrics;

    #[test]
    fn line_height_scales_with_size() {
        let style = LayoutStyle::default();
        assert!(style.line_height_mm(20.0) > style.line_height_mm(10.0));
    }

    #[test]
    fn few_tags_fit_one_row() {
        let style = LayoutStyle::default();
        let tags: Vec<String> = ["Rust", "SQL"].iter().map(|s| s.to_string()).collect();
        let rows = tag_rows(&tags, &style, &HelveticaMetrics, 180.0);
        assert_eq!(rows, vec![vec![0, 1]]);
    }

    #[test]
    fn tags_wrap_when_the_row_is_full() {
        let style = LayoutStyle::default();
        let tags: Vec<String> = (0..30)
            .map(|i| format!("technology-number-{i}"))
            .collect();
        let rows = tag_rows(&tags, &style, &HelveticaMetrics, 60.0);
        assert!(rows.len() > 1);
        let total: usize = rows.iter().map(|r| r.len()).sum();
        assert_eq!(total, 30);
    }
}
