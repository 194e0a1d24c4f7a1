//! CSV ticket datasets.
//!
//! Raw ticket files have loosely named headers; the description column is
//! sniffed from them. Processed files (written by the labeling step) carry
//! fixed `descripcion_limpia` and `categoria` columns.

use std::fs::File;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::domain::{Result, Ticket, TriageError};

/// Header of the normalized description column in processed datasets.
pub const NORMALIZED_COLUMN: &str = "descripcion_limpia";
/// Header of the category column in processed datasets.
pub const CATEGORY_COLUMN: &str = "categoria";
/// Header of the optional identifier column.
pub const ID_COLUMN: &str = "id";

const DESCRIPTION_HINT: &str = "descrip";

/// Trimmed, lowercased header name.
pub fn normalize_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Choose the description column among normalized `columns`.
///
/// The first header containing `descrip` wins. Otherwise the third column is
/// used when there are more than two, the second when there are exactly two.
pub fn resolve_description_column(columns: &[String]) -> Result<usize> {
    if let Some(idx) = columns.iter().position(|c| c.contains(DESCRIPTION_HINT)) {
        return Ok(idx);
    }
    match columns.len() {
        n if n > 2 => Ok(2),
        2 => Ok(1),
        _ => Err(TriageError::MissingDescriptionColumn {
            columns: columns.to_vec(),
        }),
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => TriageError::DatasetNotFound(path.to_path_buf()),
        _ => TriageError::Io(err),
    })
}

fn csv_reader<R: io::Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::None)
        .from_reader(reader)
}

fn cell(record: &csv::StringRecord, idx: usize) -> Option<String> {
    record
        .get(idx)
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

/// A raw ticket dataset with its resolved columns.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketTable {
    columns: Vec<String>,
    description_column: usize,
    id_column: Option<usize>,
    rows: Vec<Vec<Option<String>>>,
}

impl TicketTable {
    /// Read a raw ticket CSV from `path`.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let table = Self::from_reader(open(path)?)?;
        debug!(
            path = %path.display(),
            rows = table.len(),
            description_column = table.description_header(),
            "ticket dataset loaded"
        );
        Ok(table)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut rdr = csv_reader(reader);
        let columns: Vec<String> = rdr.headers()?.iter().map(normalize_header).collect();
        let description_column = resolve_description_column(&columns)?;
        let id_column = columns.iter().position(|c| c == ID_COLUMN);

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push((0..columns.len()).map(|i| cell(&record, i)).collect());
        }

        Ok(Self {
            columns,
            description_column,
            id_column,
            rows,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn description_header(&self) -> &str {
        &self.columns[self.description_column]
    }

    pub fn has_id_column(&self) -> bool {
        self.id_column.is_some()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as tickets, in file order. Missing ids fall back to the 1-based
    /// row position.
    pub fn tickets(&self) -> Vec<Ticket> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let id = self.id_column.and_then(|c| row[c].clone());
                Ticket::new(id, i + 1, row[self.description_column].clone())
            })
            .collect()
    }
}

/// One row of a processed dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedRow {
    pub normalized_text: Option<String>,
    pub category: Option<String>,
}

/// Read the `descripcion_limpia` / `categoria` columns of a processed CSV.
pub fn read_processed(path: impl AsRef<Path>) -> Result<Vec<ProcessedRow>> {
    let path = path.as_ref();
    let rows = read_processed_from(open(path)?)?;
    debug!(path = %path.display(), rows = rows.len(), "processed dataset loaded");
    Ok(rows)
}

pub fn read_processed_from<R: io::Read>(reader: R) -> Result<Vec<ProcessedRow>> {
    let mut rdr = csv_reader(reader);
    let columns: Vec<String> = rdr.headers()?.iter().map(normalize_header).collect();
    let find = |name: &str| {
        columns.iter().position(|c| c == name).ok_or_else(|| {
            TriageError::Dataset(format!("processed dataset has no `{name}` column"))
        })
    };
    let text_idx = find(NORMALIZED_COLUMN)?;
    let category_idx = find(CATEGORY_COLUMN)?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(ProcessedRow {
            normalized_text: cell(&record, text_idx),
            category: cell(&record, category_idx),
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn headers_are_trimmed_and_lowercased() {
        assert_eq!(normalize_header("  Descripción "), "descripción");
        assert_eq!(normalize_header("\u{feff}ID"), "id");
    }

    #[test]
    fn description_column_by_name() {
        let columns = cols(&["id", "fecha", "usuario", "descripcion_del_problema"]);
        assert_eq!(resolve_description_column(&columns).unwrap(), 3);
    }

    #[test]
    fn description_column_positional_fallback() {
        assert_eq!(resolve_description_column(&cols(&["id", "a", "b"])).unwrap(), 2);
        assert_eq!(resolve_description_column(&cols(&["id", "texto"])).unwrap(), 1);
        assert!(matches!(
            resolve_description_column(&cols(&["texto"])),
            Err(TriageError::MissingDescriptionColumn { .. })
        ));
    }

    #[test]
    fn reads_tickets_with_ids_and_missing_cells() {
        let csv = "ID , Descripcion\nT-1,No puedo acceder a mi VPN\nT-2,\n,Reembolso de viáticos\n";
        let table = TicketTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.columns(), &["id".to_string(), "descripcion".to_string()]);
        assert_eq!(table.description_header(), "descripcion");

        let tickets = table.tickets();
        assert_eq!(tickets.len(), 3);
        assert_eq!(tickets[0].id, "T-1");
        assert_eq!(tickets[0].text(), "No puedo acceder a mi VPN");
        assert_eq!(tickets[1].description, None);
        assert_eq!(tickets[2].id, "3");
    }

    #[test]
    fn short_rows_read_as_missing() {
        let csv = "id,fecha,descripcion\n1,2024-01-01\n";
        let table = TicketTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.tickets()[0].description, None);
    }

    #[test]
    fn missing_file_is_dataset_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = TicketTable::read(dir.path().join("tickets.csv")).unwrap_err();
        assert!(matches!(err, TriageError::DatasetNotFound(_)));
    }

    #[test]
    fn reads_processed_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id,descripcion,descripcion_limpia,categoria").unwrap();
        writeln!(file, "1,Falla VPN,falla vpn,TI").unwrap();
        writeln!(file, "2,De la,,Soporte General").unwrap();
        file.flush().unwrap();

        let rows = read_processed(file.path()).unwrap();
        assert_eq!(
            rows,
            vec![
                ProcessedRow {
                    normalized_text: Some("falla vpn".into()),
                    category: Some("TI".into()),
                },
                ProcessedRow {
                    normalized_text: None,
                    category: Some("Soporte General".into()),
                },
            ]
        );
    }

    #[test]
    fn processed_file_needs_its_columns() {
        let err = read_processed_from("descripcion\nhola\n".as_bytes()).unwrap_err();
        assert!(matches!(err, TriageError::Dataset(_)));
    }
}
