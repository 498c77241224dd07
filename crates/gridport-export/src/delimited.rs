//! Delimited-text (CSV) output.
//!
//! Escaping follows RFC 4180: a field is quoted, with internal quotes
//! doubled, when it contains the delimiter, a quote, `\n` or `\r`;
//! otherwise it is written verbatim. There is no row limit. An
//! optional UTF-8 BOM goes out as the first three bytes for Excel
//! compatibility.

use std::io::Write;

use gridport_model::CellValue;

use crate::error::Result;

/// UTF-8 byte-order mark emitted in Excel-compatibility mode.
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Options for delimited output.
#[derive(Debug, Clone)]
pub struct DelimitedOptions {
    pub delimiter: u8,
    /// Emit the header line.
    pub write_header: bool,
    /// Emit a UTF-8 BOM before the header.
    pub include_bom: bool,
}

impl Default for DelimitedOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            write_header: true,
            include_bom: false,
        }
    }
}

/// Unbounded delimited-text writer over a caller-supplied sink.
pub struct DelimitedTextWriter<W: Write> {
    writer: csv::Writer<W>,
    write_header: bool,
}

impl<W: Write> DelimitedTextWriter<W> {
    pub fn new(mut sink: W, options: &DelimitedOptions) -> Result<Self> {
        if options.include_bom {
            sink.write_all(&UTF8_BOM)?;
        }
        Ok(Self {
            writer: csv::WriterBuilder::new()
                .delimiter(options.delimiter)
                .from_writer(sink),
            write_header: options.write_header,
        })
    }

    /// Write the header line, if configured.
    pub fn write_header<'a>(&mut self, headers: impl IntoIterator<Item = &'a str>) -> Result<()> {
        if self.write_header {
            self.writer.write_record(headers)?;
        }
        Ok(())
    }

    /// Write one data row.
    pub fn write_row<'a>(&mut self, cells: impl IntoIterator<Item = &'a CellValue>) -> Result<()> {
        self.writer
            .write_record(cells.into_iter().map(|cell| cell.render_text()))?;
        Ok(())
    }

    /// Flush buffered output without closing the sink.
    pub fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_rows(options: &DelimitedOptions, rows: &[Vec<CellValue>]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut writer = DelimitedTextWriter::new(&mut out, options).unwrap();
            writer.write_header(["a", "b"]).unwrap();
            for row in rows {
                writer.write_row(row).unwrap();
            }
            writer.finish().unwrap();
        }
        out
    }

    #[test]
    fn plain_fields_are_written_verbatim() {
        let out = write_rows(
            &DelimitedOptions::default(),
            &[vec![
                CellValue::Text("plain".to_string()),
                CellValue::Number {
                    value: 1234567.0,
                    format: "#,##0".to_string(),
                },
            ]],
        );
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "a,b\nplain,\"1,234,567\"\n");
    }

    #[test]
    fn special_characters_force_quoting() {
        let out = write_rows(
            &DelimitedOptions::default(),
            &[vec![
                CellValue::Text("has \"quote\", comma\nand newline".to_string()),
                CellValue::Blank,
            ]],
        );
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "a,b\n\"has \"\"quote\"\", comma\nand newline\",\n"
        );
    }

    #[test]
    fn bom_precedes_the_header() {
        let options = DelimitedOptions {
            include_bom: true,
            ..DelimitedOptions::default()
        };
        let out = write_rows(&options, &[]);
        assert_eq!(&out[..3], &UTF8_BOM);
        assert_eq!(&out[3..], b"a,b\n");
    }

    #[test]
    fn header_line_is_optional() {
        let options = DelimitedOptions {
            write_header: false,
            ..DelimitedOptions::default()
        };
        let out = write_rows(&options, &[vec![CellValue::Text("x".to_string())]]);
        assert_eq!(out, b"x\n");
    }
}
