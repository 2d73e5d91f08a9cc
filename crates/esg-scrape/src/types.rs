//! Core data types: entity keys, observations, schema, rows and the output table.

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

use crate::dictionary::FieldDictionary;

/// Composite identifier of one security: instrument code plus market code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKey {
    instrument: String,
    market: String,
}

impl EntityKey {
    /// Build a key from its two parts. Both are trimmed and must be non-empty.
    pub fn new(instrument: &str, market: &str) -> Result<Self, KeyError> {
        let instrument = instrument.trim();
        let market = market.trim();
        if instrument.is_empty() {
            return Err(KeyError::EmptyInstrument);
        }
        if market.is_empty() {
            return Err(KeyError::EmptyMarket);
        }
        Ok(Self {
            instrument: instrument.to_string(),
            market: market.to_string(),
        })
    }

    /// Parse a combined `INSTRUMENT-MARKET` string, splitting on the last `-`.
    pub fn parse(s: &str) -> Result<Self, KeyError> {
        let (instrument, market) = s
            .trim()
            .rsplit_once('-')
            .ok_or_else(|| KeyError::MissingSeparator(s.to_string()))?;
        Self::new(instrument, market)
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn market(&self) -> &str {
        &self.market
    }

    /// Navigation target for this entity: `base + instrument + "-" + market`.
    pub fn url(&self, base_url: &str) -> String {
        format!("{base_url}{self}")
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.instrument, self.market)
    }
}

impl Serialize for EntityKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One scraped key/value pair, or a label-only "no value found" marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    Value { label: String, text: String },
    Missing { label: String },
}

impl Observation {
    pub fn value(label: impl Into<String>, text: impl Into<String>) -> Self {
        Observation::Value {
            label: label.into(),
            text: text.into(),
        }
    }

    pub fn missing(label: impl Into<String>) -> Self {
        Observation::Missing {
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Observation::Value { label, .. } | Observation::Missing { label } => label,
        }
    }

    /// The observed text, `None` for a missing marker.
    pub fn text(&self) -> Option<&str> {
        match self {
            Observation::Value { text, .. } => Some(text),
            Observation::Missing { .. } => None,
        }
    }
}

/// Serialized as `["label","text"]` or `["label"]`.
impl Serialize for Observation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Observation::Value { label, text } => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(label)?;
                seq.serialize_element(text)?;
                seq.end()
            }
            Observation::Missing { label } => {
                let mut seq = serializer.serialize_seq(Some(1))?;
                seq.serialize_element(label)?;
                seq.end()
            }
        }
    }
}

/// The three content tabs of an entity page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Overview,
    Esg,
    Characteristics,
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewKind::Overview => write!(f, "overview"),
            ViewKind::Esg => write!(f, "esg"),
            ViewKind::Characteristics => write!(f, "characteristics"),
        }
    }
}

/// Ordered set of output field labels, fixed for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<String>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Build a schema. Labels are trimmed; blank or duplicate labels are rejected.
    pub fn new<I, S>(labels: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut fields = Vec::new();
        let mut index = HashMap::new();
        for label in labels {
            let label = label.as_ref().trim();
            if label.is_empty() {
                return Err(SchemaError::BlankLabel(fields.len()));
            }
            if index.insert(label.to_string(), fields.len()).is_some() {
                return Err(SchemaError::Duplicate(label.to_string()));
            }
            fields.push(label.to_string());
        }
        if fields.is_empty() {
            return Err(SchemaError::Empty);
        }
        Ok(Self { fields, index })
    }

    /// Every label of the field dictionary, in output column order.
    pub fn standard() -> Self {
        let labels = FieldDictionary::standard().all_labels();
        Self {
            index: labels
                .iter()
                .enumerate()
                .map(|(i, l)| (l.to_string(), i))
                .collect(),
            fields: labels.into_iter().map(String::from).collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }
}

/// One schema-shaped record for one entity. `None` marks an absent value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    key: EntityKey,
    cells: Vec<(String, Option<String>)>,
}

impl Row {
    /// A row with every schema field absent.
    pub(crate) fn absent(key: EntityKey, schema: &Schema) -> Self {
        Self {
            key,
            cells: schema.fields().iter().map(|f| (f.clone(), None)).collect(),
        }
    }

    pub(crate) fn set(&mut self, position: usize, value: Option<String>) {
        if let Some(cell) = self.cells.get_mut(position) {
            cell.1 = value;
        }
    }

    pub fn key(&self) -> &EntityKey {
        &self.key
    }

    /// Field labels in schema order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(label, _)| label.as_str())
    }

    /// Cell values in schema order.
    pub fn values(&self) -> impl Iterator<Item = Option<&str>> {
        self.cells.iter().map(|(_, value)| value.as_deref())
    }

    /// The extracted text for `label`; `None` when absent or not a schema field.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(l, _)| l == label)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn has_field(&self, label: &str) -> bool {
        self.cells.iter().any(|(l, _)| l == label)
    }

    /// Number of fields holding a value.
    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|(_, v)| v.is_some()).count()
    }
}

/// Append-only table of rows, one per entity in input order.
#[derive(Debug, Clone)]
pub struct OutputTable {
    schema: Schema,
    rows: Vec<Row>,
}

impl OutputTable {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Where in the per-entity pipeline a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", content = "view", rename_all = "snake_case")]
pub enum Stage {
    Navigation,
    View(ViewKind),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Navigation => write!(f, "navigation"),
            Stage::View(view) => write!(f, "{view} view"),
        }
    }
}

/// Error category reported to the diagnostics channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    /// A readiness condition was never satisfied within its timeout.
    ElementTimeout,
    /// The entity page did not load.
    Navigation,
    /// The browser session rejected an interaction (click, script, read).
    Session,
}

/// A contained per-entity failure. Never aborts the run.
#[derive(thiserror::Error, Debug, Clone, Serialize)]
#[error("{stage} failed for {key}: {reason}")]
pub struct ViewFailure {
    pub key: EntityKey,
    pub stage: Stage,
    pub category: FailureCategory,
    pub reason: String,
}

impl ViewFailure {
    pub fn new(
        key: &EntityKey,
        stage: Stage,
        category: FailureCategory,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            key: key.clone(),
            stage,
            category,
            reason: reason.into(),
        }
    }
}

/// Errors building an [`EntityKey`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("instrument code is empty")]
    EmptyInstrument,

    #[error("market code is empty")]
    EmptyMarket,

    #[error("entity key has no '-' separator: {0:?}")]
    MissingSeparator(String),
}

/// Errors building a [`Schema`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("schema has no fields")]
    Empty,

    #[error("schema field {0} is blank")]
    BlankLabel(usize),

    #[error("duplicate schema field: {0}")]
    Duplicate(String),
}
