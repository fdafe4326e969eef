//! Plain-text rendering of a page: record table, status counts, notices.

use hops_core::{EmptyState, Notice, Resource, StatusCounts, StatusKind};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Column cap so one long diagnosis does not push the table off screen.
const MAX_CELL: usize = 32;

/// One row per record: id, every selector, then the searchable fields.
pub fn table<R: Resource>(records: &[R], empty: Option<EmptyState>) -> String {
    if let Some(empty) = empty {
        return format!("{}\n", empty.message());
    }

    let mut headers = vec!["ID".to_string()];
    headers.extend(R::SELECTORS.iter().map(|s| s.to_uppercase()));
    headers.push("DETAILS".into());

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            let mut row = vec![record.id().to_string()];
            row.extend(
                R::SELECTORS
                    .iter()
                    .map(|s| record.selector_value(s).unwrap_or("-").to_string()),
            );
            let details: Vec<&str> = record
                .search_fields()
                .into_iter()
                .filter(|f| !f.trim().is_empty())
                .collect();
            row.push(details.join(" / "));
            row.into_iter().map(|cell| clip(&cell)).collect()
        })
        .collect();

    let widths: Vec<usize> = (0..headers.len())
        .map(|col| {
            rows.iter()
                .map(|row| row[col].chars().count())
                .chain(std::iter::once(headers[col].len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_line(&mut out, &headers, &widths);
    for row in &rows {
        push_line(&mut out, row, &widths);
    }
    out
}

/// `Total` followed by one line per status, zero counts included.
pub fn stats<S: StatusKind>(counts: &StatusCounts<S>) -> String {
    let mut out = format!("{:<16} {}\n", "total", counts.total);
    for (status, n) in counts.iter() {
        let _ = writeln!(out, "{:<16} {}", status.as_str(), n);
    }
    out
}

pub fn tally(selector: &str, counts: &BTreeMap<String, usize>) -> String {
    let mut out = format!("by {selector}\n");
    for (value, n) in counts {
        let _ = writeln!(out, "{value:<16} {n}");
    }
    out
}

/// Print queued notices: successes to stdout, errors to stderr.
pub fn notices(notices: Vec<Notice>) {
    for notice in notices {
        if notice.is_error() {
            eprintln!("{notice}");
        } else {
            println!("{notice}");
        }
    }
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(padded.join("  ").trim_end());
    out.push('\n');
}

fn clip(cell: &str) -> String {
    if cell.chars().count() <= MAX_CELL {
        return cell.to_string();
    }
    let mut clipped: String = cell.chars().take(MAX_CELL - 1).collect();
    clipped.push('…');
    clipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use hops_core::stats::count_by_status;
    use hops_resources::{Training, TrainingStatus};
    use serde_json::json;

    fn training(id: &str, title: &str, category: &str, status: &str) -> Training {
        serde_json::from_value(json!({
            "id": id,
            "title": title,
            "category": category,
            "instructor": "Dr. Okafor",
            "status": status,
        }))
        .expect("decode training")
    }

    #[test]
    fn table_aligns_columns() {
        let records = vec![
            training("t1", "Fire safety", "safety", "upcoming"),
            training("t22", "Advanced cardiac life support", "clinical", "completed"),
        ];
        let text = table(&records, None);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID   CATEGORY  STATUS"));
        assert!(lines[1].starts_with("t1   safety    upcoming"));
        assert!(lines[2].contains("Advanced cardiac life support"));
        assert!(lines[2].ends_with('…'));
    }

    #[test]
    fn empty_page_shows_its_message() {
        let text = table::<Training>(&[], Some(EmptyState::NoMatches));
        assert_eq!(text, "No records match filters\n");
    }

    #[test]
    fn stats_list_every_status() {
        let records = vec![training("t1", "CPR", "clinical", "completed")];
        let text = stats(&count_by_status(&records));
        assert!(text.starts_with("total            1\n"));
        for status in TrainingStatus::ALL {
            assert!(text.contains(status.as_str()));
        }
    }

    #[test]
    fn long_cells_are_clipped() {
        let long = "x".repeat(40);
        assert_eq!(clip(&long).chars().count(), MAX_CELL);
    }
}
