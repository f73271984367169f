use crate::catalog::{ProductTable, Record, COLUMNS};
use crate::error::{Error, Result};
use std::path::Path;
use tracing::{debug, warn};
use umya_spreadsheet::structs::Worksheet;
use umya_spreadsheet::Spreadsheet;

pub fn open_workbook(path: &Path) -> Result<Spreadsheet> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    check_workbook_path(path)?;
    open_xlsx(path)
}

/// Accept only spreadsheet extensions the reader understands.
pub fn check_workbook_path(path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" | "xlsm" => Ok(()),
        _ => Err(Error::UnsupportedFormat(extension)),
    }
}

fn open_xlsx(path: &Path) -> Result<Spreadsheet> {
    umya_spreadsheet::reader::xlsx::read(path).map_err(|e| Error::InvalidExcel {
        path: path.to_path_buf(),
        details: e.to_string(),
    })
}

/// Load a product table, treating any failure as "no data".
pub fn load_table(path: Option<&Path>) -> ProductTable {
    let Some(path) = path else {
        return ProductTable::empty();
    };

    match read_table(path) {
        Ok(table) => {
            debug!(path = %path.display(), records = table.len(), "loaded product table");
            table
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "no product data loaded");
            ProductTable::empty()
        }
    }
}

/// Read the first sheet of `path` into a product table.
pub fn read_table(path: &Path) -> Result<ProductTable> {
    let workbook = open_workbook(path)?;
    let sheet = workbook
        .get_sheet(&0)
        .ok_or_else(|| Error::NoSheets(path.to_path_buf()))?;

    read_sheet(sheet, path)
}

fn read_sheet(sheet: &Worksheet, path: &Path) -> Result<ProductTable> {
    let (max_col, max_row) = sheet.get_highest_column_and_row();

    let headers: Vec<String> = (1..=max_col)
        .map(|col| cell_text(sheet, col, 1).trim().to_string())
        .collect();
    let mut positions = [0u32; 3];
    for (slot, name) in positions.iter_mut().zip(COLUMNS) {
        let idx = headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::MissingColumn {
                path: path.to_path_buf(),
                column: name.to_string(),
            })?;
        *slot = idx as u32 + 1;
    }
    let [ref_col, desc_col, code_col] = positions;

    let mut records = Vec::new();
    for row in 2..=max_row {
        let record = Record::new(
            cell_text(sheet, ref_col, row),
            cell_text(sheet, desc_col, row),
            cell_text(sheet, code_col, row),
        );
        if record.reference.trim().is_empty()
            && record.description.trim().is_empty()
            && record.barcode_value.trim().is_empty()
        {
            continue;
        }
        records.push(record);
    }

    Ok(ProductTable::new(records))
}

fn cell_text(sheet: &Worksheet, col: u32, row: u32) -> String {
    let Some(cell) = sheet.get_cell((col, row)) else {
        return String::new();
    };
    let value = cell.get_value();
    if cell.get_data_type() == "n" {
        normalize_number(&value)
    } else {
        value.into_owned()
    }
}

/// Render integral numeric cells without a fractional part or exponent.
fn normalize_number(raw: &str) -> String {
    if raw.contains(['.', 'e', 'E']) {
        if let Ok(n) = raw.parse::<f64>() {
            if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                return format!("{:.0}", n);
            }
        }
    }
    raw.to_string()
}
