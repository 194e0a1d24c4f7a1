//! Rule labeling of raw tickets into a processed training dataset.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::info;

use crate::dataset::{TicketTable, CATEGORY_COLUMN, ID_COLUMN, NORMALIZED_COLUMN};
use crate::domain::{Category, Result, Ticket};
use crate::rules::assign_category;
use crate::text::normalize_field;

/// A raw ticket with its normalized text and rule category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledTicket {
    pub ticket: Ticket,
    pub normalized_text: String,
    pub category: Category,
}

/// Label every ticket. The category comes from the raw description.
pub fn label_tickets(tickets: &[Ticket]) -> Vec<LabeledTicket> {
    tickets
        .iter()
        .map(|ticket| LabeledTicket {
            ticket: ticket.clone(),
            normalized_text: normalize_field(ticket.description.as_deref()),
            category: assign_category(ticket.text()),
        })
        .collect()
}

/// Per-category totals, largest first. Equal counts keep canonical order.
pub fn category_counts(labeled: &[LabeledTicket]) -> Vec<(Category, usize)> {
    let mut tally: BTreeMap<Category, usize> = BTreeMap::new();
    for row in labeled {
        *tally.entry(row.category).or_insert(0) += 1;
    }
    let mut counts: Vec<(Category, usize)> = tally.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Write the processed dataset: `[id,] <description>, descripcion_limpia, categoria`.
pub fn write_processed_csv(
    path: &Path,
    description_header: &str,
    include_id: bool,
    labeled: &[LabeledTicket],
) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = Vec::with_capacity(4);
    if include_id {
        header.push(ID_COLUMN);
    }
    header.extend([description_header, NORMALIZED_COLUMN, CATEGORY_COLUMN]);
    wtr.write_record(&header)?;

    for row in labeled {
        let mut record = Vec::with_capacity(4);
        if include_id {
            record.push(row.ticket.id.as_str());
        }
        record.extend([
            row.ticket.text(),
            row.normalized_text.as_str(),
            row.category.label(),
        ]);
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read a raw dataset, label it, and write the processed dataset to `output`.
pub fn label_dataset(input: &Path, output: &Path) -> Result<Vec<LabeledTicket>> {
    let table = TicketTable::read(input)?;
    let labeled = label_tickets(&table.tickets());
    write_processed_csv(
        output,
        table.description_header(),
        table.has_id_column(),
        &labeled,
    )?;
    info!(
        input = %input.display(),
        output = %output.display(),
        rows = labeled.len(),
        "dataset labeled"
    );
    Ok(labeled)
}

/// Text block of per-category counts.
pub fn render_counts(counts: &[(Category, usize)]) -> String {
    let width = counts
        .iter()
        .map(|(c, _)| c.label().len())
        .max()
        .unwrap_or(0);
    counts
        .iter()
        .map(|(category, n)| format!("{:<width$}  {n}\n", category.label(), width = width))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::read_processed;
    use crate::training::clean_examples;

    fn tickets() -> Vec<Ticket> {
        vec![
            Ticket::new(Some("1".into()), 1, Some("No puedo acceder a mi VPN".into())),
            Ticket::new(Some("2".into()), 2, Some("Reembolso de viáticos".into())),
            Ticket::new(Some("3".into()), 3, Some("Mi teclado no funciona".into())),
            Ticket::new(Some("4".into()), 4, None),
        ]
    }

    #[test]
    fn labels_come_from_raw_text() {
        let labeled = label_tickets(&tickets());
        let categories: Vec<Category> = labeled.iter().map(|l| l.category).collect();
        assert_eq!(
            categories,
            vec![
                Category::Ti,
                Category::Finanzas,
                Category::Ti,
                Category::SoporteGeneral
            ]
        );
        assert_eq!(labeled[3].normalized_text, "");
    }

    #[test]
    fn counts_sorted_by_frequency() {
        let counts = category_counts(&label_tickets(&tickets()));
        assert_eq!(
            counts,
            vec![
                (Category::Ti, 2),
                (Category::Finanzas, 1),
                (Category::SoporteGeneral, 1)
            ]
        );
        let rendered = render_counts(&counts);
        assert!(rendered.starts_with("TI"));
        assert_eq!(rendered.lines().count(), 3);
    }

    #[test]
    fn processed_csv_feeds_training() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("tickets_procesados.csv");
        let labeled = label_tickets(&tickets());
        write_processed_csv(&path, "descripcion", true, &labeled).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("id,descripcion,descripcion_limpia,categoria\n"));

        let rows = read_processed(&path).unwrap();
        assert_eq!(rows.len(), 4);
        let (examples, dropped) = clean_examples(&rows);
        assert_eq!(examples.len(), 3);
        assert_eq!(dropped, 1);
        assert_eq!(examples[1].category, Category::Finanzas);
    }

    #[test]
    fn label_dataset_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tickets.csv");
        std::fs::write(&input, "descripcion\nMi sueldo llegó incompleto\nSilla rota\n").unwrap();
        let output = dir.path().join("out.csv");

        let labeled = label_dataset(&input, &output).unwrap();
        assert_eq!(labeled[0].category, Category::Rrhh);
        assert_eq!(labeled[1].category, Category::SoporteGeneral);
        assert_eq!(labeled[1].ticket.id, "2");

        let raw = std::fs::read_to_string(&output).unwrap();
        assert!(raw.starts_with("descripcion,descripcion_limpia,categoria\n"));
    }
}
