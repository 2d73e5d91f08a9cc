//! Row classification shared by the view extractors.

use crate::dictionary::{FieldDictionary, FieldRole};
use crate::session::TableRow;
use crate::types::{Observation, ViewKind};

/// Turn scraped table rows into observations for `view`.
///
/// Rows without cells and rows whose first cell is not a recognized label
/// of `view` are skipped. A recognized row too short for its role yields a
/// [`Observation::Missing`].
pub fn scan_rows(rows: &[TableRow], dict: &FieldDictionary, view: ViewKind) -> Vec<Observation> {
    rows.iter()
        .filter_map(|cells| {
            let label = cells.first()?.trim();
            let role = dict.classify(label).filter(|r| r.view() == view)?;
            Some(read_row(label, role, cells))
        })
        .collect()
}

fn read_row(label: &str, role: FieldRole, cells: &[String]) -> Observation {
    match role {
        FieldRole::EsgMetric => match (cells.get(1), cells.get(2)) {
            (Some(qualifier), Some(value)) => {
                Observation::value(label, metric_value(value, qualifier))
            }
            _ => Observation::missing(label),
        },
        FieldRole::Overview | FieldRole::EsgRating | FieldRole::Characteristic => {
            match cells.get(1) {
                Some(value) => Observation::value(label, value.trim()),
                None => Observation::missing(label),
            }
        }
    }
}

/// The metric table splits a figure across two cells: third cell, then second.
fn metric_value(third: &str, second: &str) -> String {
    format!("{} {}", third.trim(), second.trim()).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> TableRow {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_metric_concatenates_third_then_second() {
        let label = "Carbon footprint (total GHG emissions / enterprise value)";
        let rows = vec![row(&[label, "12", "tCO2e"])];
        let obs = scan_rows(&rows, FieldDictionary::standard(), ViewKind::Esg);
        assert_eq!(obs, vec![Observation::value(label, "tCO2e 12")]);
    }

    #[test]
    fn test_metric_with_empty_cells_is_present_but_empty() {
        let rows = vec![row(&["Gender pay gap", "", " "])];
        let obs = scan_rows(&rows, FieldDictionary::standard(), ViewKind::Esg);
        assert_eq!(obs, vec![Observation::value("Gender pay gap", "")]);
    }

    #[test]
    fn test_short_metric_row_is_missing() {
        let rows = vec![row(&["Gender pay gap", "4%"])];
        let obs = scan_rows(&rows, FieldDictionary::standard(), ViewKind::Esg);
        assert_eq!(obs, vec![Observation::missing("Gender pay gap")]);
    }

    #[test]
    fn test_rating_takes_second_cell() {
        let rows = vec![row(&[" MSCI ESG Ratings ", "AA", "2023"])];
        let obs = scan_rows(&rows, FieldDictionary::standard(), ViewKind::Esg);
        assert_eq!(obs, vec![Observation::value("MSCI ESG Ratings", "AA")]);
    }

    #[test]
    fn test_skips_empty_and_unrecognized_rows() {
        let rows = vec![
            row(&[]),
            row(&["Last traded", "12.40"]),
            row(&["Currency", "EUR"]),
            row(&["Type", "Stock"]),
        ];
        let obs = scan_rows(&rows, FieldDictionary::standard(), ViewKind::Overview);
        assert_eq!(obs, vec![Observation::value("Currency", "EUR")]);
    }

    #[test]
    fn test_characteristics_only_match_their_view() {
        let rows = vec![
            row(&["CDP", "A-"]),
            row(&["ISIN Code", "NL0000000001"]),
            row(&["Sector"]),
        ];
        let obs = scan_rows(&rows, FieldDictionary::standard(), ViewKind::Characteristics);
        assert_eq!(
            obs,
            vec![
                Observation::value("ISIN Code", "NL0000000001"),
                Observation::missing("Sector"),
            ]
        );
    }
}
