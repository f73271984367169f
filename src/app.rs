//! Application state and the user-facing actions over it.

use crate::barcode::RenderOptions;
use crate::catalog::{ProductTable, Record};
use crate::document::{self, TableStyle};
use crate::error::Result;
use crate::pdf::{self, PageSetup};
use crate::reader;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const NO_DATA_NOTICE: &str = "No data loaded. Load a spreadsheet before generating the PDF.";

/// How an export action ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Nothing loaded; no document was built.
    NoData,
    /// The destination prompt was dismissed.
    Cancelled,
    Written(PathBuf),
}

impl ExportOutcome {
    /// Message to show the user, if any.
    pub fn notice(&self) -> Option<String> {
        match self {
            ExportOutcome::NoData => Some(NO_DATA_NOTICE.to_string()),
            ExportOutcome::Cancelled => None,
            ExportOutcome::Written(path) => {
                Some(format!("PDF generated successfully at {}", path.display()))
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExportSettings {
    pub page: PageSetup,
    pub style: TableStyle,
    pub barcode: RenderOptions,
}

/// Everything a session holds between actions.
#[derive(Debug, Default)]
pub struct AppState {
    table: ProductTable,
    source: Option<PathBuf>,
    selection: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session with `path` already loaded.
    pub fn with_file(path: Option<&Path>) -> Self {
        let mut state = Self::new();
        if let Some(path) = path {
            state.load_file(path);
        }
        state
    }

    pub fn table(&self) -> &ProductTable {
        &self.table
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    #[cfg(test)]
    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    /// Replace the loaded table. The selection is kept.
    pub fn load_file(&mut self, path: &Path) -> &ProductTable {
        self.table = reader::load_table(Some(path));
        self.source = Some(path.to_path_buf());
        info!(path = %path.display(), records = self.table.len(), "table loaded");
        &self.table
    }

    /// Choose a reference (`None` or empty clears it) and return the new view.
    pub fn set_selection(&mut self, reference: Option<&str>) -> Vec<&Record> {
        self.selection = reference.filter(|r| !r.is_empty()).map(str::to_string);
        self.view()
    }

    /// Records matching the current selection.
    pub fn view(&self) -> Vec<&Record> {
        self.table.filter(self.selection.as_deref())
    }

    /// Values for the reference chooser.
    pub fn references(&self) -> Vec<&str> {
        self.table.distinct_references()
    }

    /// Build the PDF for the current view, ask for a destination, and write it.
    ///
    /// `choose_destination` is only called once the document is built; `None`
    /// cancels without writing, an error aborts the export.
    pub fn export<F>(&self, settings: &ExportSettings, choose_destination: F) -> Result<ExportOutcome>
    where
        F: FnOnce() -> Result<Option<PathBuf>>,
    {
        if self.table.is_empty() {
            return Ok(ExportOutcome::NoData);
        }

        let view = self.view();
        info!(rows = view.len(), selection = ?self.selection, "exporting");
        let rows = document::render_rows(&view, &settings.barcode)?;
        let table = document::build_table(rows);
        let bytes = pdf::render_pdf(&table, &settings.style, &settings.page)?;

        let Some(dest) = choose_destination()? else {
            info!("export cancelled");
            return Ok(ExportOutcome::Cancelled);
        };
        let dest = with_default_extension(dest);
        fs::write(&dest, &bytes)?;
        info!(path = %dest.display(), bytes = bytes.len(), "PDF written");

        Ok(ExportOutcome::Written(dest))
    }
}

fn with_default_extension(path: PathBuf) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension("pdf")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    fn write_book(path: &Path, rows: &[[&str; 3]]) {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_mut(&0).unwrap();
        sheet.get_cell_mut("A1").set_value("ref");
        sheet.get_cell_mut("B1").set_value("produtoDesc");
        sheet.get_cell_mut("C1").set_value("codigoBarras");
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                sheet
                    .get_cell_mut((c as u32 + 1, r as u32 + 2))
                    .set_value(*value);
            }
        }
        umya_spreadsheet::writer::xlsx::write(&book, path).unwrap();
    }

    #[test]
    fn test_new_state_is_empty() {
        let state = AppState::new();
        assert!(state.table().is_empty());
        assert!(state.references().is_empty());
        assert!(state.view().is_empty());
        assert_eq!(state.source(), None);
    }

    #[test]
    fn test_export_without_data_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("out.pdf");
        let state = AppState::new();

        let mut asked = false;
        let outcome = state
            .export(&ExportSettings::default(), || {
                asked = true;
                Ok(Some(dest.clone()))
            })
            .unwrap();

        assert_eq!(outcome, ExportOutcome::NoData);
        assert_eq!(outcome.notice().as_deref(), Some(NO_DATA_NOTICE));
        assert!(!asked);
        assert!(!dest.exists());
    }

    #[test]
    fn test_load_select_export() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("products.xlsx");
        write_book(
            &input,
            &[
                ["A1", "Widget", "1234567890128"],
                ["A1", "Widget XL", "5901234123457"],
                ["B2", "Gadget", "4006381333931"],
            ],
        );

        let mut state = AppState::new();
        assert_eq!(state.load_file(&input).len(), 3);
        assert_eq!(state.references(), vec!["A1", "B2"]);

        let view = state.set_selection(Some("A1"));
        assert_eq!(view.len(), 2);
        assert_eq!(view[1].description, "Widget XL");

        let dest = temp.path().join("labels");
        let outcome = state
            .export(&ExportSettings::default(), || Ok(Some(dest.clone())))
            .unwrap();
        let written = temp.path().join("labels.pdf");
        assert_eq!(outcome, ExportOutcome::Written(written.clone()));
        assert!(outcome.notice().unwrap().contains("labels.pdf"));

        let doc = lopdf::Document::load(&written).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_cancelled_export() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("products.xlsx");
        write_book(&input, &[["A1", "Widget", "1234567890128"]]);

        let state = AppState::with_file(Some(&input));
        let outcome = state.export(&ExportSettings::default(), || Ok(None)).unwrap();
        assert_eq!(outcome, ExportOutcome::Cancelled);
        assert_eq!(outcome.notice(), None);
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_bad_barcode_fails_export() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("products.xlsx");
        write_book(&input, &[["A1", "Widget", "not-a-code"]]);
        let dest = temp.path().join("out.pdf");

        let state = AppState::with_file(Some(&input));
        let err = state
            .export(&ExportSettings::default(), || Ok(Some(dest.clone())))
            .unwrap_err();
        assert!(matches!(err, Error::Barcode { .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn test_export_recomputes_check_digit() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("products.xlsx");
        write_book(&input, &[["A1", "Widget", "1234567890123"]]);
        let dest = temp.path().join("labels.pdf");

        let state = AppState::with_file(Some(&input));
        let outcome = state
            .export(&ExportSettings::default(), || Ok(Some(dest.clone())))
            .unwrap();
        assert_eq!(outcome, ExportOutcome::Written(dest.clone()));

        let doc = lopdf::Document::load(&dest).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        let content = doc.get_page_content(pages[&1]).unwrap();
        let texts: Vec<Vec<u8>> = lopdf::content::Content::decode(&content)
            .unwrap()
            .operations
            .into_iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.into_iter().next() {
                Some(lopdf::Object::String(s, _)) => Some(s),
                _ => None,
            })
            .collect();
        // header cells, then the single body row
        assert_eq!(texts.len(), 5);
        assert_eq!(texts[3], b"A1");
        assert_eq!(texts[4], b"Widget");
    }

    #[test]
    fn test_selection_survives_reload() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("first.xlsx");
        let second = temp.path().join("second.xlsx");
        write_book(&first, &[["A1", "Widget", "1234567890128"]]);
        write_book(&second, &[["B2", "Gadget", "4006381333931"]]);

        let mut state = AppState::with_file(Some(&first));
        assert_eq!(state.set_selection(Some("A1")).len(), 1);

        state.load_file(&second);
        assert_eq!(state.selection(), Some("A1"));
        assert!(state.view().is_empty());
        assert_eq!(state.set_selection(None).len(), 1);
    }

    #[test]
    fn test_default_extension() {
        assert_eq!(with_default_extension("a/b".into()), PathBuf::from("a/b.pdf"));
        assert_eq!(with_default_extension("a/b.PDF".into()), PathBuf::from("a/b.PDF"));
    }
}
