//! In-memory product table and the reference filter over it.

/// Spreadsheet header names, in display order.
pub const COLUMNS: [&str; 3] = ["ref", "produtoDesc", "codigoBarras"];

/// One product row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub reference: String,
    pub description: String,
    pub barcode_value: String,
}

impl Record {
    pub fn new(
        reference: impl Into<String>,
        description: impl Into<String>,
        barcode_value: impl Into<String>,
    ) -> Self {
        Self {
            reference: reference.into(),
            description: description.into(),
            barcode_value: barcode_value.into(),
        }
    }
}

/// Products loaded from one spreadsheet, in file order.
///
/// References are not unique; duplicates stay independent rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductTable {
    records: Vec<Record>,
}

impl ProductTable {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn columns(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    #[cfg(test)]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records whose reference equals `reference` exactly, in table order.
    ///
    /// `None` or an empty string selects every record.
    pub fn filter(&self, reference: Option<&str>) -> Vec<&Record> {
        match reference {
            Some(r) if !r.is_empty() => self
                .records
                .iter()
                .filter(|rec| rec.reference == r)
                .collect(),
            _ => self.records.iter().collect(),
        }
    }

    /// Distinct references in order of first appearance.
    pub fn distinct_references(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for rec in &self.records {
            if !seen.contains(&rec.reference.as_str()) {
                seen.push(rec.reference.as_str());
            }
        }
        seen
    }
}
