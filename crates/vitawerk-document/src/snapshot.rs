// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Off-screen snapshot surface for the raster backend.
//
// Resolves a real TTF/OTF once per export, measures with its actual glyph
// metrics, and draws placed layout blocks into an RGB bitmap at an
// oversampling factor. Each export owns its surface; nothing is shared or
// cached between invocations.

use std::path::Path;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use tracing::{debug, warn};

use vitawerk_core::error::{Result, VitawerkError};
use vitawerk_core::types::PageBox;
use vitawerk_layout::metrics::{PT_TO_MM, TextMeasurer};
use vitawerk_layout::paginate::{BlockRef, Placement, block_height, flatten};
use vitawerk_layout::style::{LayoutStyle, tag_rows};
use vitawerk_layout::tree::{BodyBlock, LayoutTree, SectionContent};

/// Reference raster density before oversampling (CSS pixel density).
const BASE_DPI: f32 = 96.0;

const PAGE_BG: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([33, 33, 33]);
const ACCENT: Rgb<u8> = Rgb([44, 62, 80]);
const MUTED: Rgb<u8> = Rgb([95, 99, 104]);
const RULE: Rgb<u8> = Rgb([189, 195, 199]);
const CHIP_BG: Rgb<u8> = Rgb([236, 238, 240]);

/// Candidate font files scanned when no explicit font is configured.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// The font a snapshot draws and measures with.
pub struct SnapshotFont {
    font: FontVec,
}

impl SnapshotFont {
    /// Resolve a usable font.
    ///
    /// An explicitly configured file is tried first; if it cannot be read or
    /// parsed, the failure is absorbed with a warning and the system scan
    /// runs instead. Only a machine with no candidate font at all fails,
    /// and that surfaces as a render error — there is nothing to draw with.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            match Self::try_read(path) {
                Ok(font) => {
                    debug!(path = %path.display(), "using configured snapshot font");
                    return Ok(Self { font });
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        %err,
                        "configured snapshot font unusable, falling back to system fonts"
                    );
                }
            }
        }

        for candidate in SYSTEM_FONT_CANDIDATES {
            let path = Path::new(candidate);
            if let Ok(font) = Self::try_read(path) {
                debug!(path = candidate, "using system snapshot font");
                return Ok(Self { font });
            }
        }

        Err(VitawerkError::Render(
            "no usable snapshot font found; configure one via AppConfig::snapshot_font".into(),
        ))
    }

    fn try_read(path: &Path) -> Result<FontVec> {
        let bytes = std::fs::read(path)
            .map_err(|err| VitawerkError::Resource(format!("{}: {err}", path.display())))?;
        FontVec::try_from_vec(bytes)
            .map_err(|err| VitawerkError::Resource(format!("{}: {err}", path.display())))
    }

    pub fn as_font(&self) -> &FontVec {
        &self.font
    }

    /// Measurer backed by this font's real glyph metrics.
    pub fn measurer(&self) -> SnapshotMeasurer<'_> {
        SnapshotMeasurer { font: &self.font }
    }
}

/// [`TextMeasurer`] over the snapshot font, so pagination and drawing agree
/// on where text wraps.
pub struct SnapshotMeasurer<'a> {
    font: &'a FontVec,
}

impl TextMeasurer for SnapshotMeasurer<'_> {
    fn text_width_mm(&self, text: &str, size_pt: f32) -> f32 {
        // Scale the font so one px equals one pt, then convert to mm.
        let scaled = self.font.as_scaled(PxScale::from(size_pt));
        let mut width = 0.0_f32;
        let mut prev = None;
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev_id) = prev {
                width += scaled.kern(prev_id, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }
        width * PT_TO_MM
    }
}

/// A rendered page bitmap with its physical dimensions.
pub struct Snapshot {
    pub image: RgbImage,
    pub width_mm: f32,
    pub height_mm: f32,
}

/// Render one paginated page into a bitmap of the full page box.
pub fn snapshot_page(
    tree: &LayoutTree,
    placements: &[Placement],
    page: &PageBox,
    margin_mm: f32,
    style: &LayoutStyle,
    font: &SnapshotFont,
    oversample: u8,
) -> Snapshot {
    let surface = Surface::new(page.width_mm, page.height_mm, margin_mm, style, font, oversample);
    surface.render(tree, placements, page.usable_width_mm(margin_mm))
}

/// Render the whole tree as one continuous strip at natural height — the
/// shrink-to-fit input. The strip is page-wide; its height is the content's.
pub fn snapshot_strip(
    tree: &LayoutTree,
    page: &PageBox,
    margin_mm: f32,
    style: &LayoutStyle,
    font: &SnapshotFont,
    oversample: u8,
) -> Snapshot {
    let usable_w = page.usable_width_mm(margin_mm);
    let measurer = font.measurer();

    let mut placements = Vec::new();
    let mut y = 0.0_f32;
    for block in flatten(tree) {
        let h = block_height(tree, block, style, &measurer, usable_w);
        placements.push(Placement {
            block,
            y_mm: y,
            height_mm: h,
        });
        y += h;
    }

    let surface = Surface::new(
        page.width_mm,
        y + 2.0 * margin_mm,
        margin_mm,
        style,
        font,
        oversample,
    );
    surface.render(tree, &placements, usable_w)
}

// -- Drawing ------------------------------------------------------------------

struct Surface<'a> {
    width_mm: f32,
    height_mm: f32,
    margin_mm: f32,
    px_per_mm: f32,
    style: &'a LayoutStyle,
    font: &'a SnapshotFont,
}

impl<'a> Surface<'a> {
    fn new(
        width_mm: f32,
        height_mm: f32,
        margin_mm: f32,
        style: &'a LayoutStyle,
        font: &'a SnapshotFont,
        oversample: u8,
    ) -> Self {
        let oversample = oversample.max(2);
        Self {
            width_mm,
            height_mm,
            margin_mm,
            px_per_mm: BASE_DPI / 25.4 * oversample as f32,
            style,
            font,
        }
    }

    fn render(&self, tree: &LayoutTree, placements: &[Placement], usable_w: f32) -> Snapshot {
        let w_px = (self.width_mm * self.px_per_mm).ceil().max(1.0) as u32;
        let h_px = (self.height_mm * self.px_per_mm).ceil().max(1.0) as u32;
        let mut image = RgbImage::from_pixel(w_px, h_px, PAGE_BG);

        let measurer = self.font.measurer();
        for placement in placements {
            let y = self.margin_mm + placement.y_mm;
            match placement.block {
                BlockRef::Header => self.draw_header(&mut image, tree, &measurer, y, usable_w),
                BlockRef::SectionHeader(si) => {
                    self.draw_section_header(&mut image, tree, si, y, usable_w)
                }
                BlockRef::Item(si, ii) => {
                    self.draw_item(&mut image, tree, &measurer, si, ii, y, usable_w)
                }
                BlockRef::SectionBody(si) => {
                    self.draw_section_body(&mut image, tree, &measurer, si, y, usable_w)
                }
            }
        }

        debug!(w_px, h_px, blocks = placements.len(), "page snapshot drawn");
        Snapshot {
            image,
            width_mm: self.width_mm,
            height_mm: self.height_mm,
        }
    }

    fn px(&self, mm: f32) -> i32 {
        (mm * self.px_per_mm).round() as i32
    }

    fn text(&self, image: &mut RgbImage, x_mm: f32, y_mm: f32, size_pt: f32, color: Rgb<u8>, s: &str) {
        let scale = PxScale::from(size_pt * PT_TO_MM * self.px_per_mm);
        draw_text_mut(
            image,
            color,
            self.px(self.margin_mm + x_mm),
            self.px(y_mm),
            scale,
            self.font.as_font(),
            s,
        );
    }

    fn rect(&self, image: &mut RgbImage, x_mm: f32, y_mm: f32, w_mm: f32, h_mm: f32, color: Rgb<u8>) {
        let w = (w_mm * self.px_per_mm).round().max(1.0) as u32;
        let h = (h_mm * self.px_per_mm).round().max(1.0) as u32;
        let rect = Rect::at(self.px(self.margin_mm + x_mm), self.px(y_mm)).of_size(w, h);
        draw_filled_rect_mut(image, rect, color);
    }

    fn draw_header(
        &self,
        image: &mut RgbImage,
        tree: &LayoutTree,
        measurer: &SnapshotMeasurer<'_>,
        mut y: f32,
        usable_w: f32,
    ) {
        let style = self.style;
        let header = &tree.header;
        if !header.name.is_empty() {
            self.text(image, 0.0, y, style.name_size_pt, ACCENT, &header.name);
            y += style.line_height_mm(style.name_size_pt);
        }
        if !header.contacts.is_empty() {
            let joined = header.contacts.join(LayoutStyle::CONTACT_SEPARATOR);
            for line in measurer.wrap(&joined, style.contact_size_pt, usable_w) {
                self.text(image, 0.0, y, style.contact_size_pt, MUTED, &line);
                y += style.line_height_mm(style.contact_size_pt);
            }
        }
        self.rect(image, 0.0, y + 1.0, usable_w, 0.6, ACCENT);
    }

    fn draw_section_header(
        &self,
        image: &mut RgbImage,
        tree: &LayoutTree,
        si: usize,
        y: f32,
        usable_w: f32,
    ) {
        let style = self.style;
        let title = tree.sections[si].kind.display_title();
        let title_y = y + style.section_gap_mm;
        self.text(image, 0.0, title_y, style.section_title_size_pt, ACCENT, title);
        let rule_y = title_y + style.line_height_mm(style.section_title_size_pt);
        self.rect(image, 0.0, rule_y, usable_w, 0.3, RULE);
    }

    fn draw_item(
        &self,
        image: &mut RgbImage,
        tree: &LayoutTree,
        measurer: &SnapshotMeasurer<'_>,
        si: usize,
        ii: usize,
        mut y: f32,
        usable_w: f32,
    ) {
        let style = self.style;
        let SectionContent::Items(items) = &tree.sections[si].content else {
            return;
        };
        let item = &items[ii];

        // Title row with the right-aligned date sharing the first line.
        let title_avail = match &item.date_text {
            Some(date) => (usable_w
                - measurer.text_width_mm(date, style.body_size_pt)
                - 4.0)
                .max(usable_w * 0.4),
            None => usable_w,
        };
        if let Some(date) = &item.date_text {
            let date_w = measurer.text_width_mm(date, style.body_size_pt);
            self.text(image, usable_w - date_w, y, style.body_size_pt, MUTED, date);
        }
        if item.title.is_empty() {
            if item.date_text.is_some() {
                y += style.line_height_mm(style.item_title_size_pt);
            }
        } else {
            for line in measurer.wrap(&item.title, style.item_title_size_pt, title_avail) {
                self.text(image, 0.0, y, style.item_title_size_pt, INK, &line);
                y += style.line_height_mm(style.item_title_size_pt);
            }
        }

        if let Some(subtitle) = &item.subtitle {
            for line in measurer.wrap(subtitle, style.body_size_pt, usable_w) {
                self.text(image, 0.0, y, style.body_size_pt, MUTED, &line);
                y += style.line_height_mm(style.body_size_pt);
            }
        }

        for body in &item.body {
            y = self.draw_body(image, measurer, body, y, usable_w);
        }
    }

    fn draw_body(
        &self,
        image: &mut RgbImage,
        measurer: &SnapshotMeasurer<'_>,
        body: &BodyBlock,
        mut y: f32,
        usable_w: f32,
    ) -> f32 {
        let style = self.style;
        let body_line = style.line_height_mm(style.body_size_pt);
        match body {
            BodyBlock::Paragraph(text) => {
                for line in measurer.wrap(text, style.body_size_pt, usable_w) {
                    self.text(image, 0.0, y, style.body_size_pt, INK, &line);
                    y += body_line;
                }
            }
            BodyBlock::Bullets(bullets) => {
                for bullet in bullets {
                    let mut first = true;
                    for line in measurer.wrap(
                        bullet,
                        style.body_size_pt,
                        usable_w - style.bullet_indent_mm,
                    ) {
                        if first {
                            self.text(image, 1.0, y, style.body_size_pt, INK, "\u{2022}");
                            first = false;
                        }
                        self.text(image, style.bullet_indent_mm, y, style.body_size_pt, INK, &line);
                        y += body_line;
                    }
                }
            }
            BodyBlock::Tags(tags) => {
                y = self.draw_tags(image, measurer, tags, y, usable_w);
            }
        }
        y
    }

    fn draw_tags(
        &self,
        image: &mut RgbImage,
        measurer: &SnapshotMeasurer<'_>,
        tags: &[String],
        mut y: f32,
        usable_w: f32,
    ) -> f32 {
        let style = self.style;
        let chip_h = style.tag_row_height_mm - 1.0;
        for row in tag_rows(tags, style, measurer, usable_w) {
            let mut x = 0.0_f32;
            for idx in row {
                let tag = &tags[idx];
                let text_w = measurer.text_width_mm(tag, style.body_size_pt);
                let chip_w = text_w + 2.0 * style.tag_pad_mm;
                self.rect(image, x, y, chip_w, chip_h, CHIP_BG);
                self.text(image, x + style.tag_pad_mm, y + 0.8, style.body_size_pt, INK, tag);
                x += chip_w + style.tag_gap_mm;
            }
            y += style.tag_row_height_mm;
        }
        y
    }

    fn draw_section_body(
        &self,
        image: &mut RgbImage,
        tree: &LayoutTree,
        measurer: &SnapshotMeasurer<'_>,
        si: usize,
        mut y: f32,
        usable_w: f32,
    ) {
        let style = self.style;
        match &tree.sections[si].content {
            SectionContent::TagRow(tags) => {
                self.draw_tags(image, measurer, tags, y, usable_w);
            }
            SectionContent::Text(text) => {
                for line in measurer.wrap(text, style.body_size_pt, usable_w) {
                    self.text(image, 0.0, y, style.body_size_pt, INK, &line);
                    y += style.line_height_mm(style.body_size_pt);
                }
            }
            SectionContent::Items(_) => {}
        }
    }
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use vitawerk_core::resume::{Experience, ResumeRecord, Skill};
    use vitawerk_layout::compose::compose;
    use vitawerk_layout::paginate::paginate;

    fn sample_record() -> ResumeRecord {
        let mut record = ResumeRecord::new();
        record.personal_info.first_name = "Ada".into();
        record.personal_info.last_name = "Lovelace".into();
        record.personal_info.email = "ada@example.com".into();
        record.personal_info.summary = "Engineer working on document pipelines.".into();
        record.add_experience(Experience {
            title: "Engineer".into(),
            company: "Initech".into(),
            start_date: "2021-06".into(),
            description: vec!["Shipped the exporter".into()],
            ..Experience::default()
        });
        record.add_skill(Skill {
            name: "Rust".into(),
            level: 5,
            ..Skill::default()
        });
        record
    }

    #[test]
    fn missing_configured_font_does_not_panic() {
        // Either the system scan rescues the load or it fails cleanly.
        let result = SnapshotFont::load(Some(Path::new("/definitely/not/a/font.ttf")));
        if let Err(err) = result {
            assert!(matches!(err, VitawerkError::Render(_)));
        }
    }

    #[test]
    fn snapshot_draws_ink_when_a_font_is_available() {
        // Environment-dependent: skip on machines without any candidate font.
        let Ok(font) = SnapshotFont::load(None) else {
            return;
        };

        let record = sample_record();
        let tree = compose(&record);
        let style = LayoutStyle::default();
        let page = PageBox::a4();
        let measurer = font.measurer();
        let pages = paginate(&tree, &page, 15.0, &style, &measurer);
        assert_eq!(pages.len(), 1);

        let snap = snapshot_page(&tree, &pages[0].placements, &page, 15.0, &style, &font, 2);
        assert_eq!(snap.width_mm, 210.0);
        assert_eq!(snap.height_mm, 297.0);
        let non_white = snap
            .image
            .pixels()
            .filter(|p| p.0 != [255, 255, 255])
            .count();
        assert!(non_white > 0, "snapshot should contain drawn content");
    }

    #[test]
    fn strip_height_tracks_content() {
        let Ok(font) = SnapshotFont::load(None) else {
            return;
        };
        let record = sample_record();
        let tree = compose(&record);
        let style = LayoutStyle::default();
        let page = PageBox::a4();

        let strip = snapshot_strip(&tree, &page, 15.0, &style, &font, 2);
        assert_eq!(strip.width_mm, 210.0);
        assert!(strip.height_mm > 30.0);

        let mut longer = record.clone();
        for _ in 0..8 {
            longer.add_experience(Experience {
                title: "Engineer".into(),
                company: "Initech".into(),
                description: vec!["More work delivered over a longer period".into(); 4],
                ..Experience::default()
            });
        }
        let longer_strip = snapshot_strip(&compose(&longer), &page, 15.0, &style, &font, 2);
        assert!(longer_strip.height_mm > strip.height_mm);
    }

    #[test]
    fn measurer_orders_text_by_length() {
        let Ok(font) = SnapshotFont::load(None) else {
            return;
        };
        let m = font.measurer();
        assert_eq!(m.text_width_mm("", 10.0), 0.0);
        assert!(m.text_width_mm("wide text here", 10.0) > m.text_width_mm("thin", 10.0));
        assert!(m.text_width_mm("abc", 20.0) > m.text_width_mm("abc", 10.0));
    }
}
