//! Row assembly: reconcile raw observations against the schema.

use crate::types::{EntityKey, Observation, Row, Schema};

/// Build the row for `key` from its observations.
///
/// Every schema field starts absent. Observations apply in order, so the
/// last one for a label wins. Blank values and missing markers set the
/// field absent; labels outside the schema are ignored.
pub fn assemble(key: EntityKey, observations: Vec<Observation>, schema: &Schema) -> Row {
    let mut row = Row::absent(key, schema);
    for observation in observations {
        let Some(position) = schema.position(observation.label()) else {
            continue;
        };
        let value = match observation {
            Observation::Value { text, .. } if !text.trim().is_empty() => Some(text),
            _ => None,
        };
        row.set(position, value);
    }
    row
}
