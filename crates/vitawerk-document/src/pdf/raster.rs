// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster backend — snapshot each paginated page into a bitmap at an
// oversampling factor, then embed one full-bleed image per PDF page.
//
// The snapshot step needs real glyph rendering, so measurement here comes
// from the snapshot font itself: the tree is measured once with that font,
// paginated, and each page drawn off-screen before embedding. printpdf 0.8's
// data-oriented API builds pages as `Vec<Op>` and serialises via
// `PdfDocument::save()`.

use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument};

use vitawerk_core::error::Result;
use vitawerk_core::resume::ResumeRecord;
use vitawerk_core::types::{BackendKind, ScaleMode};
use vitawerk_layout::paginate::{paginate, shrink_ratio};
use vitawerk_layout::tree::LayoutTree;

use crate::backend::{RenderBackend, RenderOptions, RenderedDocument};
use crate::snapshot::{Snapshot, SnapshotFont, snapshot_page, snapshot_strip};

/// Snapshot-and-embed PDF backend. The pipeline default.
pub struct RasterBackend;

impl RenderBackend for RasterBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Raster
    }

    #[instrument(skip_all, fields(scale_mode = ?opts.scale_mode))]
    fn render(
        &self,
        _record: &ResumeRecord,
        tree: &LayoutTree,
        opts: &RenderOptions,
    ) -> Result<RenderedDocument> {
        let font = SnapshotFont::load(opts.snapshot_font.as_deref())?;
        let measurer = font.measurer();

        let page_w = Mm(opts.page.width_mm);
        let page_h = Mm(opts.page.height_mm);
        let mut doc = PdfDocument::new(&document_title(tree));
        let mut pdf_pages: Vec<PdfPage> = Vec::new();

        match opts.scale_mode {
            ScaleMode::Paginate => {
                let pages = paginate(tree, &opts.page, opts.margin_mm, &opts.style, &measurer);
                info!(pages = pages.len(), "rasterising paginated resume");
                for page in &pages {
                    let snap = snapshot_page(
                        tree,
                        &page.placements,
                        &opts.page,
                        opts.margin_mm,
                        &opts.style,
                        &font,
                        opts.oversample,
                    );
                    pdf_pages.push(embed_snapshot(&mut doc, snap, page_w, page_h, 1.0));
                }
            }
            ScaleMode::ShrinkToFit => {
                let strip = snapshot_strip(
                    tree,
                    &opts.page,
                    opts.margin_mm,
                    &opts.style,
                    &font,
                    opts.oversample,
                );
                let ratio = shrink_ratio(strip.width_mm, strip.height_mm, &opts.page);
                info!(ratio, strip_h_mm = strip.height_mm, "shrinking resume to one page");
                pdf_pages.push(embed_snapshot(&mut doc, strip, page_w, page_h, ratio));
            }
        }

        let page_count = pdf_pages.len();
        doc.with_pages(pdf_pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
        debug!(bytes = bytes.len(), page_count, "raster PDF serialised");

        Ok(RenderedDocument::Pdf { bytes, page_count })
    }
}

fn document_title(tree: &LayoutTree) -> String {
    if tree.header.name.is_empty() {
        "Resume".to_string()
    } else {
        format!("{} — Resume", tree.header.name)
    }
}

/// Embed one snapshot as the sole image of a new PDF page.
///
/// `fit` of 1.0 stretches the bitmap to the full page box (the snapshot is
/// already page-shaped in paginate mode); smaller values scale the bitmap
/// uniformly and centre it (shrink-to-fit mode).
fn embed_snapshot(
    doc: &mut PdfDocument,
    snap: Snapshot,
    page_w: Mm,
    page_h: Mm,
    fit: f32,
) -> PdfPage {
    let img_w_px = snap.image.width() as usize;
    let img_h_px = snap.image.height() as usize;

    let raw = RawImage {
        pixels: RawImageData::U8(snap.image.into_raw()),
        width: img_w_px,
        height: img_h_px,
        data_format: RawImageFormat::RGB8,
        tag: Vec::new(),
    };
    let xobject_id = doc.add_image(&raw);

    // The bitmap's intrinsic density follows from its physical size.
    let dpi = img_w_px as f32 / (snap.width_mm / 25.4);
    let img_w_pt = img_w_px as f32 / dpi * 72.0;
    let img_h_pt = img_h_px as f32 / dpi * 72.0;

    let page_w_pt = page_w.into_pt().0;
    let page_h_pt = page_h.into_pt().0;

    let (scale_x, scale_y, x_offset, y_offset) = if fit >= 1.0 {
        // Full bleed.
        (page_w_pt / img_w_pt, page_h_pt / img_h_pt, 0.0, 0.0)
    } else {
        let rendered_w_pt = img_w_pt * fit;
        let rendered_h_pt = img_h_pt * fit;
        (
            fit,
            fit,
            (page_w_pt - rendered_w_pt) / 2.0,
            (page_h_pt - rendered_h_pt) / 2.0,
        )
    };

    let ops = vec![Op::UseXobject {
        id: xobject_id,
        transform: XObjectTransform {
            translate_x: Some(Pt(x_offset)),
            translate_y: Some(Pt(y_offset)),
            scale_x: Some(scale_x),
            scale_y: Some(scale_y),
            dpi: Some(dpi),
            rotate: None,
        },
    }];

    PdfPage::new(page_w, page_h, ops)
}

// -- Tests --------------------------------------------------------------------
