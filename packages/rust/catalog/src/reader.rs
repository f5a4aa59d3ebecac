//! Input catalog reader.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use seoforge_shared::{ProductRecord, Result, SeoforgeError};

/// Minimum fields per row: code, name, price.
const REQUIRED_FIELDS: usize = 3;

/// Streams product records from a header-less CSV catalog, in file order.
///
/// Rows carry `(code, name, price, ...)`; trailing fields are ignored. A row
/// with fewer than three fields yields [`SeoforgeError::MalformedRow`].
pub struct CatalogReader<R: Read> {
    records: csv::StringRecordsIntoIter<R>,
}

impl CatalogReader<File> {
    /// Open the catalog at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| SeoforgeError::io(path, e))?;
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> CatalogReader<R> {
    pub fn from_reader(reader: R) -> Self {
        // Blank lines are skipped by the csv reader, not reported as short rows
        let records = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader)
            .into_records();
        Self { records }
    }
}

impl<R: Read> Iterator for CatalogReader<R> {
    type Item = Result<ProductRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e.into())),
        };

        let line = record.position().map_or(0, csv::Position::line);
        if record.len() < REQUIRED_FIELDS {
            return Some(Err(SeoforgeError::MalformedRow {
                line,
                fields: record.len(),
            }));
        }

        Some(Ok(ProductRecord {
            sku: record[0].to_string(),
            name: record[1].to_string(),
            price: record[2].to_string(),
            line,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(input: &str) -> Vec<Result<ProductRecord>> {
        CatalogReader::from_reader(input.as_bytes()).collect()
    }

    #[test]
    fn reads_rows_in_order() {
        let rows = read_all("SKU1,Widget,9.99\nSKU2,Gadget,19.50\n");
        let rows: Vec<ProductRecord> = rows.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sku, "SKU1");
        assert_eq!(rows[0].name, "Widget");
        assert_eq!(rows[0].price, "9.99");
        assert_eq!(rows[0].line, 1);
        assert_eq!(rows[1].sku, "SKU2");
        assert_eq!(rows[1].line, 2);
    }

    #[test]
    fn first_row_is_data_not_header() {
        let rows = read_all("SKU,Name,Price\n");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].as_ref().unwrap().name, "Name");
    }

    #[test]
    fn trailing_fields_are_ignored() {
        let rows = read_all("SKU1,Widget,9.99,blue,extra\n");
        let record = rows[0].as_ref().unwrap();
        assert_eq!(record.price, "9.99");
    }

    #[test]
    fn quoted_fields_are_verbatim() {
        let rows = read_all("SKU1,\"Widget, large\",\" 9.99\"\n");
        let record = rows[0].as_ref().unwrap();
        assert_eq!(record.name, "Widget, large");
        assert_eq!(record.price, " 9.99");
    }

    #[test]
    fn short_row_is_malformed() {
        let rows = read_all("SKU1,Widget,9.99\nSKU2,Gadget\nSKU3,Gizmo,1.00\n");
        assert!(rows[0].is_ok());
        match &rows[1] {
            Err(SeoforgeError::MalformedRow { line, fields }) => {
                assert_eq!(*line, 2);
                assert_eq!(*fields, 2);
            }
            other => panic!("expected MalformedRow, got {other:?}"),
        }
    }

    #[test]
    fn blank_lines_are_skipped() {
        let rows = read_all("SKU1,Widget,9.99\n\nSKU2,Gadget,19.50\n\n");
        assert_eq!(rows.len(), 2);
        let names: Vec<&str> = rows
            .iter()
            .map(|r| r.as_ref().unwrap().name.as_str())
            .collect();
        assert_eq!(names, ["Widget", "Gadget"]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = CatalogReader::open(Path::new("/nonexistent/seoforge/products.csv"));
        assert!(matches!(result, Err(SeoforgeError::Io { .. })));
    }
}
