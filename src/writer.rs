use crate::catalog::Record;
use crate::document::HEADER;
use crate::error::Result;
use crate::OutputFormat;
use csv::WriterBuilder;
use std::io::Write;

pub struct ListingConfig {
    pub format: OutputFormat,
}

/// Write the listing view: the header row, then one row per record.
pub fn write_listing<W: Write>(records: &[&Record], writer: W, config: &ListingConfig) -> Result<()> {
    let mut csv_writer = WriterBuilder::new()
        .delimiter(config.format.delimiter())
        .from_writer(writer);

    csv_writer.write_record(HEADER)?;
    for rec in records {
        csv_writer.write_record([
            rec.reference.as_str(),
            rec.description.as_str(),
            rec.barcode_value.as_str(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write one reference per line.
pub fn write_references<W: Write>(references: &[&str], mut writer: W) -> Result<()> {
    for r in references {
        writeln!(writer, "{}", r)?;
    }
    writer.flush()?;
    Ok(())
}
