//! A4 PDF layout of a rendered [`Document`] using the built-in Helvetica fonts.

use super::template::{Block, Document};
use super::text::{PT_TO_MM, estimate_text_width_mm, to_pdf_ascii, wrap_text_to_width};
use anyhow::{Context, Result, anyhow};
use log::debug;
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Polygon, Rgb,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN_X: f32 = 20.0;
const TOP: f32 = PAGE_H - 15.0;
const BOTTOM: f32 = 20.0;
const CONTENT_W: f32 = PAGE_W - 2.0 * MARGIN_X;
const LAYER: &str = "Layer 1";

const PRIMARY: (u8, u8, u8) = (0x1a, 0x3a, 0x5c);
const SECONDARY: (u8, u8, u8) = (0x2e, 0x86, 0xab);
const ACCENT: (u8, u8, u8) = (0xe8, 0xf4, 0xfd);
const LIGHT_GRAY: (u8, u8, u8) = (0xf5, 0xf5, 0xf5);
const RULE_GRAY: (u8, u8, u8) = (0xd3, 0xd3, 0xd3);
const TEXT_DARK: (u8, u8, u8) = (0x22, 0x22, 0x22);
const TEXT_MEDIUM: (u8, u8, u8) = (0x55, 0x55, 0x55);
const TEXT_LIGHT: (u8, u8, u8) = (0x88, 0x88, 0x88);
const HEAD_INFO: (u8, u8, u8) = (0xd0, 0xe8, 0xf8);
const WHITE: (u8, u8, u8) = (0xff, 0xff, 0xff);

fn color((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

/// Line height for a font size, in millimetres.
fn lh(size: f32) -> f32 {
    size * PT_TO_MM * 1.45
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Weight {
    Regular,
    Bold,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
}

struct Writer {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    /// Top of the free area on the current page.
    y: f32,
    page: usize,
    footer: String,
}

impl Writer {
    fn new(title: &str, footer: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(to_pdf_ascii(title), Mm(PAGE_W), Mm(PAGE_H), LAYER);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow!("{e:?}"))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| anyhow!("{e:?}"))?;
        let layer = doc.get_page(page).get_layer(layer);
        let mut w = Self {
            doc,
            layer,
            regular,
            bold,
            y: TOP,
            page: 1,
            footer: footer.to_string(),
        };
        w.draw_footer();
        Ok(w)
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), LAYER);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.page += 1;
        self.y = TOP;
        self.draw_footer();
    }

    /// Start a new page unless `height` fits above the bottom margin.
    /// Blocks taller than a full page are not moved.
    fn ensure(&mut self, height: f32) {
        if self.y - height < BOTTOM && self.y < TOP {
            self.new_page();
        }
    }

    fn draw_footer(&mut self) {
        let footer = self.footer.clone();
        self.text(&footer, 8.0, Weight::Regular, TEXT_LIGHT, PAGE_W / 2.0, 10.0, Align::Center);
        let num = format!("Page {}", self.page);
        self.text(&num, 8.0, Weight::Regular, TEXT_LIGHT, PAGE_W - MARGIN_X, 10.0, Align::Right);
    }

    /// Draw one line of text with its baseline at `y`.
    #[allow(clippy::too_many_arguments)]
    fn text(&self, s: &str, size: f32, weight: Weight, rgb: (u8, u8, u8), x: f32, y: f32, align: Align) {
        let s = to_pdf_ascii(s);
        let w = estimate_text_width_mm(&s, size);
        let x = match align {
            Align::Left => x,
            Align::Right => x - w,
            Align::Center => x - w / 2.0,
        };
        let font = match weight {
            Weight::Regular => &self.regular,
            Weight::Bold => &self.bold,
        };
        self.layer.set_fill_color(color(rgb));
        self.layer.use_text(s, size, Mm(x), Mm(y), font);
    }

    /// Lines stacked downward from `top`; returns the y below the last line.
    #[allow(clippy::too_many_arguments)]
    fn lines(&self, lines: &[String], size: f32, weight: Weight, rgb: (u8, u8, u8), x: f32, top: f32, align: Align) -> f32 {
        let mut y = top;
        for l in lines {
            y -= lh(size);
            self.text(l, size, weight, rgb, x, y + lh(size) * 0.25, align);
        }
        y
    }

    fn fill_rect(&self, x: f32, top: f32, w: f32, h: f32, rgb: (u8, u8, u8)) {
        let pts = [(x, top - h), (x + w, top - h), (x + w, top), (x, top)];
        self.layer.set_fill_color(color(rgb));
        self.layer.add_polygon(Polygon {
            rings: vec![
                pts.iter()
                    .map(|(px, py)| (Point::new(Mm(*px), Mm(*py)), false))
                    .collect(),
            ],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    fn stroke_rect(&self, x: f32, top: f32, w: f32, h: f32, rgb: (u8, u8, u8)) {
        let pts = [(x, top - h), (x + w, top - h), (x + w, top), (x, top)];
        self.layer.set_outline_color(color(rgb));
        self.layer.set_outline_thickness(0.5);
        self.layer.add_line(Line {
            points: pts
                .iter()
                .map(|(px, py)| (Point::new(Mm(*px), Mm(*py)), false))
                .collect(),
            is_closed: true,
        });
    }

    fn hline(&self, y: f32, thickness: f32, rgb: (u8, u8, u8)) {
        self.layer.set_outline_color(color(rgb));
        self.layer.set_outline_thickness(thickness);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN_X), Mm(y)), false),
                (Point::new(Mm(PAGE_W - MARGIN_X), Mm(y)), false),
            ],
            is_closed: false,
        });
    }

    fn block(&mut self, block: &Block) {
        match block {
            Block::Letterhead {
                name,
                details,
                reference,
                date,
            } => self.letterhead(name, details, reference, date),
            Block::Recipient { lines, place_date } => {
                let h = lh(9.0) + lines.len() as f32 * lh(10.0);
                self.ensure(h);
                let top = self.y;
                self.lines(&["FOR THE ATTENTION OF".to_string()], 9.0, Weight::Bold, SECONDARY, MARGIN_X, top, Align::Left);
                self.lines(lines, 10.0, Weight::Regular, TEXT_DARK, MARGIN_X, top - lh(9.0), Align::Left);
                self.lines(
                    std::slice::from_ref(place_date),
                    10.0,
                    Weight::Regular,
                    TEXT_MEDIUM,
                    PAGE_W - MARGIN_X,
                    top - 3.0,
                    Align::Right,
                );
                self.y -= h;
            }
            Block::Subject(s) => {
                let wrapped = wrap_text_to_width(&to_pdf_ascii(s), 11.0, CONTENT_W);
                let h = wrapped.len() as f32 * lh(11.0) + 4.0;
                self.ensure(h);
                self.y = self.lines(&wrapped, 11.0, Weight::Bold, PRIMARY, MARGIN_X, self.y - 1.0, Align::Left) - 3.0;
            }
            Block::Paragraph(s) => {
                let wrapped = wrap_text_to_width(&to_pdf_ascii(s), 10.0, CONTENT_W);
                self.flow(&wrapped, MARGIN_X, 10.0);
                self.y -= 2.0;
            }
            Block::Bullets(items) => {
                for item in items {
                    let wrapped = wrap_text_to_width(&to_pdf_ascii(item), 10.0, CONTENT_W - 8.0);
                    self.ensure(lh(10.0));
                    self.text("-", 10.0, Weight::Regular, TEXT_DARK, MARGIN_X + 4.0, self.y - lh(10.0) * 0.75, Align::Left);
                    self.flow(&wrapped, MARGIN_X + 8.0, 10.0);
                }
                self.y -= 2.0;
            }
            Block::Article { number, title } => {
                let bar = 7.0;
                // keep the heading with the start of its body
                self.ensure(bar + 20.0);
                self.y -= 3.0;
                self.fill_rect(MARGIN_X, self.y, CONTENT_W, bar, PRIMARY);
                let label = format!("Article {number} - {title}");
                self.text(&label, 10.0, Weight::Bold, WHITE, MARGIN_X + 3.5, self.y - bar + 2.2, Align::Left);
                self.y -= bar + 3.0;
            }
            Block::Table(rows) => self.table(rows),
            Block::Signatures { left, right } => self.signatures(left, right),
            Block::Rule => {
                self.ensure(3.0);
                self.hline(self.y - 1.0, 0.5, RULE_GRAY);
                self.y -= 3.0;
            }
            Block::Space(mm) => self.y -= *mm,
        }
    }

    /// Lines that may continue on the next page.
    fn flow(&mut self, lines: &[String], x: f32, size: f32) {
        for l in lines {
            self.ensure(lh(size));
            self.y -= lh(size);
            self.text(l, size, Weight::Regular, TEXT_DARK, x, self.y + lh(size) * 0.25, Align::Left);
        }
    }

    fn letterhead(&mut self, name: &str, details: &[String], reference: &str, date: &str) {
        let left_w = 125.0;
        let right_w = CONTENT_W - left_w;
        let pad = 5.0;
        let name_lines = wrap_text_to_width(&to_pdf_ascii(name), 16.0, left_w - 2.0 * pad);
        let info: Vec<String> = details
            .iter()
            .flat_map(|d| wrap_text_to_width(&to_pdf_ascii(d), 8.0, left_w - 2.0 * pad))
            .collect();
        let left_h = 2.0 * pad + name_lines.len() as f32 * lh(16.0) + info.len() as f32 * lh(8.0);
        let right_h = 2.0 * pad + 2.0 * (lh(8.0) + lh(9.0)) + 3.0;
        let h = left_h.max(right_h);
        self.ensure(h);

        let top = self.y;
        self.fill_rect(MARGIN_X, top, left_w, h, PRIMARY);
        self.fill_rect(MARGIN_X + left_w, top, right_w, h, ACCENT);
        let y = self.lines(&name_lines, 16.0, Weight::Bold, WHITE, MARGIN_X + pad, top - pad, Align::Left);
        self.lines(&info, 8.0, Weight::Regular, HEAD_INFO, MARGIN_X + pad, y, Align::Left);

        let rx = PAGE_W - MARGIN_X - 3.0;
        let mut y = top - pad;
        for (label, value) in [("REFERENCE", reference), ("DATE", date)] {
            y = self.lines(&[label.to_string()], 8.0, Weight::Regular, TEXT_LIGHT, rx, y, Align::Right);
            y = self.lines(&[value.to_string()], 9.0, Weight::Bold, TEXT_DARK, rx, y, Align::Right) - 3.0;
        }
        self.y = top - h;
    }

    fn table(&mut self, rows: &[(String, String)]) {
        let label_w = 40.0;
        let value_w = CONTENT_W - label_w;
        for (i, (label, value)) in rows.iter().enumerate() {
            let wrapped = wrap_text_to_width(&to_pdf_ascii(value), 10.0, value_w - 6.0);
            let h = wrapped.len().max(1) as f32 * lh(10.0) + 3.0;
            self.ensure(h);
            let top = self.y;
            let bg = if i % 2 == 0 { ACCENT } else { WHITE };
            self.fill_rect(MARGIN_X, top, CONTENT_W, h, bg);
            self.stroke_rect(MARGIN_X, top, CONTENT_W, h, RULE_GRAY);
            self.lines(std::slice::from_ref(label), 10.0, Weight::Bold, PRIMARY, MARGIN_X + 3.0, top - 1.5, Align::Left);
            self.lines(&wrapped, 10.0, Weight::Regular, TEXT_DARK, MARGIN_X + label_w + 3.0, top - 1.5, Align::Left);
            self.y -= h;
        }
        self.y -= 2.0;
    }

    fn signatures(&mut self, left: &[String], right: &[String]) {
        let gap = 6.0;
        let box_w = (CONTENT_W - gap) / 2.0;
        let sign_space = 18.0;
        let height = |col: &[String]| 6.0 + sign_space + col.len() as f32 * lh(9.0);
        let h = height(left).max(height(right));
        self.ensure(h);
        let top = self.y;
        for (i, col) in [left, right].into_iter().enumerate() {
            let x = MARGIN_X + i as f32 * (box_w + gap);
            let cx = x + box_w / 2.0;
            self.fill_rect(x, top, box_w, h, LIGHT_GRAY);
            self.stroke_rect(x, top, box_w, h, RULE_GRAY);
            let Some((place, rest)) = col.split_first() else {
                continue;
            };
            let y = self.lines(std::slice::from_ref(place), 9.0, Weight::Regular, TEXT_DARK, cx, top - 3.0, Align::Center);
            let mut y = y - sign_space;
            for (n, line) in rest.iter().enumerate() {
                let (weight, rgb) = if n == 0 {
                    (Weight::Bold, TEXT_MEDIUM)
                } else {
                    (Weight::Regular, TEXT_DARK)
                };
                y = self.lines(std::slice::from_ref(line), 9.0, weight, rgb, cx, y, Align::Center);
            }
        }
        self.y = top - h;
    }

    fn finish(self, path: &Path) -> Result<usize> {
        let pages = self.page;
        let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        self.doc
            .save(&mut BufWriter::new(file))
            .map_err(|e| anyhow!("{e:?}"))
            .with_context(|| format!("write {}", path.display()))?;
        Ok(pages)
    }
}

/// Lay the document out on A4 pages and write it to `path`.
/// Returns the number of pages.
pub fn write_pdf<P: AsRef<Path>>(doc: &Document, path: P) -> Result<usize> {
    let path = path.as_ref();
    let mut w = Writer::new(&doc.title, &doc.footer)?;
    for block in &doc.blocks {
        w.block(block);
    }
    let pages = w.finish(path)?;
    debug!("wrote {} ({pages} pages)", path.display());
    Ok(pages)
}
