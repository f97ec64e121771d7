// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print-view backend — serialises the layout tree into one self-contained
// styled HTML document with a native-print trigger. Pagination is delegated
// entirely to the viewing context; this backend does no pagination math.
//
// The webfont is declared with a local fallback stack, so an unreachable
// font host degrades to system fonts instead of blocking the view.

use std::fmt::Write;

use tracing::{debug, instrument};

use vitawerk_core::error::Result;
use vitawerk_core::resume::ResumeRecord;
use vitawerk_core::types::BackendKind;
use vitawerk_layout::tree::{BodyBlock, ItemBlock, LayoutTree, SectionContent};

use crate::backend::{RenderBackend, RenderOptions, RenderedDocument};

/// Styled-document backend for the host's native print dialog.
pub struct PrintViewBackend;

impl RenderBackend for PrintViewBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::PrintView
    }

    #[instrument(skip_all)]
    fn render(
        &self,
        _record: &ResumeRecord,
        tree: &LayoutTree,
        _opts: &RenderOptions,
    ) -> Result<RenderedDocument> {
        let html = render_document(tree);
        debug!(bytes = html.len(), "print view serialised");
        Ok(RenderedDocument::Html(html))
    }
}

/// Escape text for interpolation into HTML body or attribute positions.
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn render_document(tree: &LayoutTree) -> String {
    let mut out = String::with_capacity(8 * 1024);

    let title = if tree.header.name.is_empty() {
        "Resume".to_string()
    } else {
        format!("{} — Resume", tree.header.name)
    };

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    write!(out, "<title>{}</title>\n", escape_html(&title)).unwrap();
    out.push_str("<link rel=\"preconnect\" href=\"https://fonts.googleapis.com\">\n");
    out.push_str(
        "<link href=\"https://fonts.googleapis.com/css2?family=Inter:wght@400;600;700&display=swap\" rel=\"stylesheet\">\n",
    );
    out.push_str("<style>\n");
    out.push_str(STYLESHEET);
    out.push_str("</style>\n</head>\n<body>\n");

    out.push_str(
        "<div class=\"print-bar\"><button type=\"button\" onclick=\"window.print()\">Print</button></div>\n",
    );
    out.push_str("<main class=\"sheet\">\n");

    render_header(&mut out, tree);
    for section in &tree.sections {
        write!(
            out,
            "<section>\n<h2>{}</h2>\n",
            escape_html(section.kind.display_title())
        )
        .unwrap();
        match &section.content {
            SectionContent::Text(text) => {
                write!(out, "<p>{}</p>\n", escape_html(text)).unwrap();
            }
            SectionContent::TagRow(tags) => render_chips(&mut out, tags),
            SectionContent::Items(items) => {
                for item in items {
                    render_item(&mut out, item);
                }
            }
        }
        out.push_str("</section>\n");
    }

    out.push_str("</main>\n</body>\n</html>\n");
    out
}

fn render_header(out: &mut String, tree: &LayoutTree) {
    out.push_str("<header>\n");
    if !tree.header.name.is_empty() {
        write!(out, "<h1>{}</h1>\n", escape_html(&tree.header.name)).unwrap();
    }
    if !tree.header.contacts.is_empty() {
        out.push_str("<div class=\"contacts\">");
        for (i, contact) in tree.header.contacts.iter().enumerate() {
            if i > 0 {
                out.push_str("<span class=\"sep\">·</span>");
            }
            write!(out, "<span>{}</span>", escape_html(contact)).unwrap();
        }
        out.push_str("</div>\n");
    }
    out.push_str("</header>\n");
}

fn render_item(out: &mut String, item: &ItemBlock) {
    out.push_str("<article class=\"item\">\n");
    if !item.title.is_empty() || item.date_text.is_some() {
        out.push_str("<div class=\"item-head\">");
        write!(out, "<h3>{}</h3>", escape_html(&item.title)).unwrap();
        if let Some(date) = &item.date_text {
            write!(out, "<span class=\"date\">{}</span>", escape_html(date)).unwrap();
        }
        out.push_str("</div>\n");
    }
    if let Some(subtitle) = &item.subtitle {
        write!(out, "<p class=\"subtitle\">{}</p>\n", escape_html(subtitle)).unwrap();
    }
    for body in &item.body {
        match body {
            BodyBlock::Paragraph(text) => {
                write!(out, "<p>{}</p>\n", escape_html(text)).unwrap();
            }
            BodyBlock::Bullets(bullets) => {
                out.push_str("<ul>\n");
                for bullet in bullets {
                    write!(out, "<li>{}</li>\n", escape_html(bullet)).unwrap();
                }
                out.push_str("</ul>\n");
            }
            BodyBlock::Tags(tags) => render_chips(out, tags),
        }
    }
    out.push_str("</article>\n");
}

fn render_chips(out: &mut String, tags: &[String]) {
    out.push_str("<div class=\"chips\">");
    for tag in tags {
        write!(out, "<span class=\"chip\">{}</span>", escape_html(tag)).unwrap();
    }
    out.push_str("</div>\n");
}

const STYLESHEET: &str = r#"
:root { color-scheme: light; }
* { box-sizing: border-box; }
body {
  margin: 0;
  background: #e9ecef;
  font-family: 'Inter', Helvetica, Arial, sans-serif;
  color: #212121;
}
.print-bar { padding: 12px 16px; text-align: right; }
.print-bar button {
  font: inherit;
  padding: 6px 18px;
  cursor: pointer;
}
.sheet {
  max-width: 210mm;
  margin: 0 auto 24px;
  padding: 15mm;
  background: #fff;
  box-shadow: 0 1px 6px rgba(0, 0, 0, 0.2);
}
header { border-bottom: 2px solid #2c3e50; padding-bottom: 8px; }
h1 { margin: 0; font-size: 28px; color: #2c3e50; }
.contacts { margin-top: 6px; font-size: 12px; color: #5f6368; }
.contacts .sep { margin: 0 6px; }
section { margin-top: 14px; }
h2 {
  margin: 0 0 6px;
  font-size: 15px;
  color: #2c3e50;
  border-bottom: 1px solid #bdc3c7;
  padding-bottom: 2px;
}
.item { margin-bottom: 8px; }
.item-head { display: flex; justify-content: space-between; align-items: baseline; }
h3 { margin: 0; font-size: 13px; }
.date { font-size: 11px; color: #5f6368; white-space: nowrap; }
.subtitle { margin: 1px 0; font-size: 12px; color: #5f6368; }
p { margin: 2px 0; font-size: 12px; }
ul { margin: 2px 0; padding-left: 18px; font-size: 12px; }
li { margin: 1px 0; }
.chips { display: flex; flex-wrap: wrap; gap: 5px; margin: 3px 0; }
.chip {
  background: #eceef0;
  border-radius: 3px;
  padding: 2px 8px;
  font-size: 11px;
}
@page { size: A4 portrait; margin: 15mm; }
@media print {
  body { background: #fff; }
  .print-bar { display: none; }
  .sheet { max-width: none; margin: 0; padding: 0; box-shadow: none; }
}
"#;

// -- Tests --------------------------------------------------------------------
