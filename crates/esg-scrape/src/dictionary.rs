//! Field dictionary: which row labels count as recognized fields, per view.
//!
//! A single lookup table from label to [`FieldRole`], shared read-only by
//! all view extractors. The role also selects the extraction shape.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::types::ViewKind;

/// What a recognized label is and how its value is read from a table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRole {
    /// Instrument header and quote table: value is the second cell.
    Overview,
    /// ESG rating agency row: value is the second cell, verbatim.
    EsgRating,
    /// ESG metric row: value is third cell + " " + second cell.
    EsgMetric,
    /// Classification row on the characteristics tab: value is the second cell.
    Characteristic,
}

impl FieldRole {
    pub fn view(self) -> ViewKind {
        match self {
            FieldRole::Overview => ViewKind::Overview,
            FieldRole::EsgRating | FieldRole::EsgMetric => ViewKind::Esg,
            FieldRole::Characteristic => ViewKind::Characteristics,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldRole::Overview => "overview",
            FieldRole::EsgRating => "esg rating",
            FieldRole::EsgMetric => "esg metric",
            FieldRole::Characteristic => "characteristic",
        }
    }
}

/// Label of the instrument name, read from the page header rather than a table.
pub const NAME_FIELD: &str = "Name";

// Output column order of the standard schema.
const STANDARD_FIELDS: &[(&str, FieldRole)] = &[
    (NAME_FIELD, FieldRole::Overview),
    ("Currency", FieldRole::Overview),
    ("Market Cap", FieldRole::Overview),
    ("CDP", FieldRole::EsgRating),
    ("FTSE4Good", FieldRole::EsgRating),
    ("MSCI ESG Ratings", FieldRole::EsgRating),
    ("Moody's ESG Solution", FieldRole::EsgRating),
    ("Sustainalytics", FieldRole::EsgRating),
    (
        "Carbon footprint (total GHG emissions / enterprise value)",
        FieldRole::EsgMetric,
    ),
    ("Share of women in total workforce", FieldRole::EsgMetric),
    ("Rate of resignation", FieldRole::EsgMetric),
    ("Type", FieldRole::Characteristic),
    ("Sub type", FieldRole::Characteristic),
    ("Market", FieldRole::Characteristic),
    ("ISIN Code", FieldRole::Characteristic),
    ("Industry", FieldRole::Characteristic),
    ("SuperSector", FieldRole::Characteristic),
    ("Sector", FieldRole::Characteristic),
    ("Subsector", FieldRole::Characteristic),
    ("Share of women in management bodies", FieldRole::EsgMetric),
    ("Gender pay gap", FieldRole::EsgMetric),
    ("Professional equality index", FieldRole::EsgMetric),
    ("Rate of employees with disabilities", FieldRole::EsgMetric),
    ("Average training hours per employee", FieldRole::EsgMetric),
    (
        "Board gender diversity (female board members / total board members)",
        FieldRole::EsgMetric,
    ),
    ("Number of female board members", FieldRole::EsgMetric),
    ("Number of board members", FieldRole::EsgMetric),
    ("Total energy consumption", FieldRole::EsgMetric),
    ("Ratio of non-recycled waste", FieldRole::EsgMetric),
];

/// Label → role lookup table.
#[derive(Debug)]
pub struct FieldDictionary {
    ordered: Vec<(&'static str, FieldRole)>,
    roles: HashMap<&'static str, FieldRole>,
}

impl FieldDictionary {
    /// The dictionary for Euronext Live equity pages.
    pub fn standard() -> &'static FieldDictionary {
        static STANDARD: OnceLock<FieldDictionary> = OnceLock::new();
        STANDARD.get_or_init(|| FieldDictionary::from_entries(STANDARD_FIELDS))
    }

    fn from_entries(entries: &[(&'static str, FieldRole)]) -> Self {
        Self {
            ordered: entries.to_vec(),
            roles: entries.iter().copied().collect(),
        }
    }

    /// Role of a row label, if recognized. Surrounding whitespace is ignored.
    pub fn classify(&self, label: &str) -> Option<FieldRole> {
        self.roles.get(label.trim()).copied()
    }

    /// Whether `label` is a recognized field of `view`.
    pub fn recognizes(&self, view: ViewKind, label: &str) -> bool {
        self.classify(label).is_some_and(|role| role.view() == view)
    }

    /// Labels carrying `role`, in declaration order.
    pub fn labels(&self, role: FieldRole) -> Vec<&'static str> {
        self.ordered
            .iter()
            .filter(|(_, r)| *r == role)
            .map(|(l, _)| *l)
            .collect()
    }

    /// Every label in standard schema order.
    pub fn all_labels(&self) -> Vec<&'static str> {
        self.ordered.iter().map(|(l, _)| *l).collect()
    }

    /// `(label, role)` pairs in standard schema order.
    pub fn entries(&self) -> &[(&'static str, FieldRole)] {
        &self.ordered
    }
}
