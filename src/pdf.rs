//! Lays out a [`DocumentTable`] on pages and serializes it with `lopdf`.

use crate::document::{Cell, Color, DocumentTable, Font, TableStyle};
use crate::error::Result;
use crate::metrics::{text_width, win_ansi};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::ops::Range;
use tracing::debug;

/// Helvetica cap height, in em.
const CAP_HEIGHT: f32 = 0.718;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageSetup {
    pub fn letter() -> Self {
        Self {
            width: 612.0,
            height: 792.0,
            margin: 72.0,
        }
    }

    pub fn a4() -> Self {
        Self {
            width: 595.2756,
            height: 841.8898,
            margin: 72.0,
        }
    }

    fn frame_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    fn frame_height(&self) -> f32 {
        self.height - 2.0 * self.margin
    }
}

impl Default for PageSetup {
    fn default() -> Self {
        Self::letter()
    }
}

struct Layout {
    col_widths: Vec<f32>,
    row_heights: Vec<f32>,
}

fn font_for_row(row: usize, style: &TableStyle) -> Font {
    if row == 0 {
        style.header_font
    } else {
        style.body_font
    }
}

fn bottom_padding(row: usize, style: &TableStyle) -> f32 {
    if row == 0 {
        style.header_bottom_padding
    } else {
        style.padding_y
    }
}

fn measure(table: &DocumentTable, style: &TableStyle) -> Layout {
    let cols = table.rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut col_widths = vec![0.0f32; cols];
    let mut row_heights = Vec::with_capacity(table.rows.len());

    for (r, row) in table.rows.iter().enumerate() {
        let font = font_for_row(r, style);
        let mut content_height = 0.0f32;
        for (c, cell) in row.iter().enumerate() {
            let (w, h) = match cell {
                Cell::Text(s) => (text_width(s, font, style.font_size), style.leading),
                Cell::Image(_) => (style.image_width, style.image_height),
            };
            col_widths[c] = col_widths[c].max(w + 2.0 * style.padding_x);
            content_height = content_height.max(h);
        }
        row_heights.push(content_height + style.padding_y + bottom_padding(r, style));
    }

    Layout {
        col_widths,
        row_heights,
    }
}

/// Split rows into consecutive page ranges. A page always takes at least one
/// row, so a row taller than the frame gets a page of its own.
pub fn paginate(row_heights: &[f32], available: f32) -> Vec<Range<usize>> {
    let mut pages = Vec::new();
    let mut start = 0;
    let mut used = 0.0;

    for (i, &h) in row_heights.iter().enumerate() {
        if i > start && used + h > available {
            pages.push(start..i);
            start = i;
            used = 0.0;
        }
        used += h;
    }
    if start < row_heights.len() {
        pages.push(start..row_heights.len());
    }
    pages
}

fn real(v: f32) -> Object {
    Object::Real(v)
}

fn set_fill(ops: &mut Vec<Operation>, c: Color) {
    ops.push(Operation::new("rg", vec![real(c.0), real(c.1), real(c.2)]));
}

fn rect(ops: &mut Vec<Operation>, x: f32, y: f32, w: f32, h: f32, paint: &str) {
    ops.push(Operation::new("re", vec![real(x), real(y), real(w), real(h)]));
    ops.push(Operation::new(paint, vec![]));
}

fn image_xobject(img: &crate::barcode::BarcodeImage) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => Object::Integer(i64::from(img.width)),
            "Height" => Object::Integer(i64::from(img.height)),
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => Object::Integer(8),
        },
        img.pixels.clone(),
    )
}

/// Render the table as a paginated PDF and return the file bytes.
pub fn render_pdf(table: &DocumentTable, style: &TableStyle, page: &PageSetup) -> Result<Vec<u8>> {
    let layout = measure(table, style);
    let table_width: f32 = layout.col_widths.iter().sum();
    let x0 = page.margin + ((page.frame_width() - table_width) / 2.0).max(0.0);
    let ranges = paginate(&layout.row_heights, page.frame_height());

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => Font::Helvetica.base_name(),
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => Font::HelveticaBold.base_name(),
        "Encoding" => "WinAnsiEncoding",
    });
    let font_name = |font: Font| match font {
        Font::Helvetica => "F1",
        Font::HelveticaBold => "F2",
    };

    let mut kids: Vec<Object> = Vec::with_capacity(ranges.len());
    let mut image_count = 0usize;

    for range in &ranges {
        let mut ops = Vec::new();
        let mut xobjects = Dictionary::new();
        let mut top = page.height - page.margin;

        for r in range.clone() {
            let h = layout.row_heights[r];
            let bottom = top - h;
            let (background, text_color) = if r == 0 {
                (style.header_background, style.header_text)
            } else {
                (style.body_background, style.body_text)
            };
            let font = font_for_row(r, style);
            let area_bottom = bottom + bottom_padding(r, style);
            let area_height = h - style.padding_y - bottom_padding(r, style);

            set_fill(&mut ops, background);
            rect(&mut ops, x0, bottom, table_width, h, "f");

            let mut x = x0;
            for (c, cell) in table.rows[r].iter().enumerate() {
                let w = layout.col_widths[c];
                match cell {
                    Cell::Text(s) => {
                        let tx = x + (w - text_width(s, font, style.font_size)) / 2.0;
                        let ty = area_bottom + (area_height - CAP_HEIGHT * style.font_size) / 2.0;
                        ops.push(Operation::new("BT", vec![]));
                        ops.push(Operation::new(
                            "Tf",
                            vec![font_name(font).into(), real(style.font_size)],
                        ));
                        set_fill(&mut ops, text_color);
                        ops.push(Operation::new("Td", vec![real(tx), real(ty)]));
                        ops.push(Operation::new(
                            "Tj",
                            vec![Object::String(win_ansi(s), StringFormat::Literal)],
                        ));
                        ops.push(Operation::new("ET", vec![]));
                    }
                    Cell::Image(img) => {
                        image_count += 1;
                        let name = format!("Im{image_count}");
                        let image_id = doc.add_object(image_xobject(img));
                        xobjects.set(name.as_bytes().to_vec(), image_id);

                        let ix = x + (w - style.image_width) / 2.0;
                        let iy = area_bottom + (area_height - style.image_height) / 2.0;
                        ops.push(Operation::new("q", vec![]));
                        ops.push(Operation::new(
                            "cm",
                            vec![
                                real(style.image_width),
                                real(0.0),
                                real(0.0),
                                real(style.image_height),
                                real(ix),
                                real(iy),
                            ],
                        ));
                        ops.push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
                        ops.push(Operation::new("Q", vec![]));
                    }
                }
                x += w;
            }

            let c = style.grid_color;
            ops.push(Operation::new("w", vec![real(style.grid_width)]));
            ops.push(Operation::new("RG", vec![real(c.0), real(c.1), real(c.2)]));
            let mut x = x0;
            for &w in &layout.col_widths {
                rect(&mut ops, x, bottom, w, h, "S");
                x += w;
            }

            top = bottom;
        }

        let content = Content { operations: ops };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));
        let resources = dictionary! {
            "Font" => dictionary! { "F1" => regular_id, "F2" => bold_id },
            "XObject" => xobjects,
        };
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), real(page.width), real(page.height)],
            "Contents" => content_id,
            "Resources" => resources,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(page_count as i64),
        }),
    );
    let catalog_id: ObjectId = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    debug!(pages = page_count, images = image_count, "rendered PDF");

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barcode::RenderOptions;
    use crate::catalog::{ProductTable, Record};
    use crate::document::{build_table, render_rows};

    fn doc_for(records: &[Record]) -> DocumentTable {
        let table = ProductTable::new(records.to_vec());
        build_table(render_rows(&table.filter(None), &RenderOptions::default()).unwrap())
    }

    fn page_strings(doc: &Document, page_id: ObjectId) -> Vec<Vec<u8>> {
        let bytes = doc.get_page_content(page_id).unwrap();
        Content::decode(&bytes)
            .unwrap()
            .operations
            .into_iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.into_iter().next() {
                Some(Object::String(s, _)) => Some(s),
                _ => None,
            })
            .collect()
    }

    fn image_count(doc: &Document) -> usize {
        doc.objects
            .values()
            .filter(|o| match o {
                Object::Stream(s) => {
                    s.dict.get(b"Subtype").and_then(Object::as_name).ok() == Some(b"Image".as_slice())
                }
                _ => false,
            })
            .count()
    }

    #[test]
    fn test_paginate() {
        assert_eq!(paginate(&[], 100.0), Vec::<Range<usize>>::new());
        assert_eq!(paginate(&[40.0, 40.0, 40.0], 100.0), vec![0..2, 2..3]);
        assert_eq!(paginate(&[150.0, 10.0], 100.0), vec![0..1, 1..2]);
        assert_eq!(paginate(&[50.0, 50.0], 100.0), vec![0..2]);
    }

    #[test]
    fn test_row_heights() {
        let table = doc_for(&[Record::new("A1", "Widget", "1234567890128")]);
        let style = TableStyle::default();
        let layout = measure(&table, &style);
        // leading + top padding + header bottom padding
        assert_eq!(layout.row_heights[0], 12.0 + 3.0 + 12.0);
        // barcode height + vertical padding
        assert_eq!(layout.row_heights[1], 30.0 + 3.0 + 3.0);
        assert_eq!(layout.col_widths[2], text_width("Código de Barras", Font::HelveticaBold, 10.0).max(100.0) + 12.0);
    }

    #[test]
    fn test_single_row_document() {
        let table = doc_for(&[Record::new("A1", "Widget", "1234567890128")]);
        let bytes = render_pdf(&table, &TableStyle::default(), &PageSetup::letter()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        assert_eq!(image_count(&doc), 1);

        let strings = page_strings(&doc, pages[&1]);
        assert_eq!(
            strings,
            vec![
                b"Ref".to_vec(),
                b"Produto".to_vec(),
                b"C\xf3digo de Barras".to_vec(),
                b"A1".to_vec(),
                b"Widget".to_vec(),
            ]
        );
    }

    #[test]
    fn test_header_only_document() {
        let table = build_table(Vec::new());
        let bytes = render_pdf(&table, &TableStyle::default(), &PageSetup::letter()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        assert_eq!(image_count(&doc), 0);
    }

    #[test]
    fn test_long_table_flows_onto_pages() {
        let records: Vec<_> = (0..40)
            .map(|i| Record::new(format!("R{i}"), format!("Item {i}"), "4006381333931"))
            .collect();
        let table = doc_for(&records);
        let style = TableStyle::default();
        let page = PageSetup::letter();

        let layout = measure(&table, &style);
        let ranges = paginate(&layout.row_heights, 648.0);
        // 27pt header + 17 rows of 36pt fit the first 648pt frame
        assert_eq!(ranges, vec![0..18, 18..36, 36..41]);

        let bytes = render_pdf(&table, &style, &page).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 3);
        assert_eq!(image_count(&doc), 40);

        let last = page_strings(&doc, pages[&3]);
        assert_eq!(last.first(), Some(&b"R35".to_vec()));
        assert_eq!(last.len(), 10);
    }
}
