//! Export table model: rows to print, their rendered barcodes, and the style
//! applied when the table is laid out.

use crate::barcode::{self, BarcodeImage, RenderOptions};
use crate::catalog::Record;
use crate::error::Result;

pub const HEADER: [&str; 3] = ["Ref", "Produto", "Código de Barras"];

/// One product ready for the document.
#[derive(Debug, Clone)]
pub struct ExportRow {
    pub reference: String,
    pub description: String,
    pub barcode: BarcodeImage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Image(BarcodeImage),
}

#[cfg(test)]
impl Cell {
    pub fn text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            Cell::Image(_) => None,
        }
    }
}

/// Header row followed by one row per product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTable {
    pub rows: Vec<Vec<Cell>>,
}

#[cfg(test)]
impl DocumentTable {
    pub fn body(&self) -> &[Vec<Cell>] {
        &self.rows[1..]
    }
}

/// Render the barcode of every record. Fails on the first invalid code.
pub fn render_rows(records: &[&Record], opts: &RenderOptions) -> Result<Vec<ExportRow>> {
    records
        .iter()
        .map(|rec| {
            Ok(ExportRow {
                reference: rec.reference.clone(),
                description: rec.description.clone(),
                barcode: barcode::render_ean13(&rec.barcode_value, opts)?,
            })
        })
        .collect()
}

pub fn build_table(rows: Vec<ExportRow>) -> DocumentTable {
    let mut table = Vec::with_capacity(rows.len() + 1);
    table.push(HEADER.iter().map(|h| Cell::Text(h.to_string())).collect());
    for row in rows {
        table.push(vec![
            Cell::Text(row.reference),
            Cell::Text(row.description),
            Cell::Image(row.barcode),
        ]);
    }
    DocumentTable { rows: table }
}

/// RGB, components in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color(pub f32, pub f32, pub f32);

impl Color {
    pub const BLACK: Color = Color(0.0, 0.0, 0.0);
    pub const GREY: Color = Color(0.5019608, 0.5019608, 0.5019608);
    pub const WHITESMOKE: Color = Color(0.9607843, 0.9607843, 0.9607843);
    pub const BEIGE: Color = Color(0.9607843, 0.9607843, 0.8627451);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Helvetica,
    HelveticaBold,
}

impl Font {
    pub fn base_name(self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableStyle {
    pub header_font: Font,
    pub header_background: Color,
    pub header_text: Color,
    pub header_bottom_padding: f32,
    pub body_font: Font,
    pub body_background: Color,
    pub body_text: Color,
    pub font_size: f32,
    pub leading: f32,
    pub padding_x: f32,
    pub padding_y: f32,
    pub grid_width: f32,
    pub grid_color: Color,
    /// Size the barcode is drawn at, in points.
    pub image_width: f32,
    pub image_height: f32,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            header_font: Font::HelveticaBold,
            header_background: Color::GREY,
            header_text: Color::WHITESMOKE,
            header_bottom_padding: 12.0,
            body_font: Font::Helvetica,
            body_background: Color::BEIGE,
            body_text: Color::BLACK,
            font_size: 10.0,
            leading: 12.0,
            padding_x: 6.0,
            padding_y: 3.0,
            grid_width: 1.0,
            grid_color: Color::BLACK,
            image_width: 100.0,
            image_height: 30.0,
        }
    }
}
