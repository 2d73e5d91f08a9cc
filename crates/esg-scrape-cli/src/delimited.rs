//! Delimited text I/O: entity keys in, scraped table out.
//!
//! Quoting follows the usual conventions: a field is wrapped in double
//! quotes when it contains the delimiter, a quote or a line break, and
//! embedded quotes are doubled.

use std::io::{self, Write};
use std::mem::take;

use esg_scrape::{EntityKey, KeyError, OutputTable};

/// Default input delimiter.
pub const DEFAULT_INPUT_DELIMITER: char = ',';
/// Default output delimiter.
pub const DEFAULT_OUTPUT_DELIMITER: char = ';';

/// One parsed input record with the 1-based line it started on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub line: usize,
    pub cells: Vec<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum InputError {
    #[error("input has no header row")]
    Empty,

    #[error("input header has no {0:?} column")]
    MissingColumn(String),

    #[error("line {line}: no {column} cell")]
    MissingValue { line: usize, column: String },

    #[error("line {line}: {source}")]
    BadKey {
        line: usize,
        #[source]
        source: KeyError,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    #[error("',' cannot be used as the output delimiter")]
    CommaDelimiter,

    #[error("{0:?} cannot be used as a delimiter")]
    InvalidDelimiter(char),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Parse delimited text into records. Handles quoted fields, doubled
/// quotes and CRLF; blank lines are skipped.
pub fn parse_rows(text: &str, sep: char) -> Vec<Record> {
    let mut records = Vec::new();
    let mut field = String::new();
    let mut cells = Vec::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut start = 1;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes && matches!(chars.peek(), Some('"')) {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = !in_quotes;
                }
            }
            c if c == sep && !in_quotes => cells.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                cells.push(take(&mut field));
                flush(&mut records, &mut cells, start);
                line += 1;
                start = line;
            }
            c => {
                if c == '\n' {
                    line += 1;
                }
                field.push(c);
            }
        }
    }

    // Trailing record without a final newline, even if a quote is open.
    cells.push(field);
    flush(&mut records, &mut cells, start);
    records
}

fn flush(records: &mut Vec<Record>, cells: &mut Vec<String>, line: usize) {
    let blank = cells.iter().all(|c| c.trim().is_empty());
    let cells = take(cells);
    if !blank {
        records.push(Record { line, cells });
    }
}

/// Which columns of the input hold the key parts.
#[derive(Debug, Clone)]
pub struct InputFormat {
    pub delimiter: char,
    pub isin_column: String,
    pub mic_column: String,
}

impl Default for InputFormat {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_INPUT_DELIMITER,
            isin_column: "ISIN".to_string(),
            mic_column: "MIC".to_string(),
        }
    }
}

/// Read entity keys from delimited text with a header row. Column names
/// match case-insensitively.
pub fn read_entity_keys(text: &str, format: &InputFormat) -> Result<Vec<EntityKey>, InputError> {
    let mut records = parse_rows(text, format.delimiter).into_iter();
    let header = records.next().ok_or(InputError::Empty)?;
    let isin = column_index(&header.cells, &format.isin_column)?;
    let mic = column_index(&header.cells, &format.mic_column)?;

    records
        .map(|record| {
            let instrument = cell(&record, isin, &format.isin_column)?;
            let market = cell(&record, mic, &format.mic_column)?;
            EntityKey::new(instrument, market).map_err(|source| InputError::BadKey {
                line: record.line,
                source,
            })
        })
        .collect()
}

fn column_index(header: &[String], name: &str) -> Result<usize, InputError> {
    header
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| InputError::MissingColumn(name.to_string()))
}

/// Raw cell of `column`; blank values are left for [`EntityKey::new`] to reject.
fn cell<'a>(record: &'a Record, idx: usize, column: &str) -> Result<&'a str, InputError> {
    record
        .cells
        .get(idx)
        .map(String::as_str)
        .ok_or_else(|| InputError::MissingValue {
            line: record.line,
            column: column.to_string(),
        })
}

/// Reject delimiters the output format cannot use.
pub fn check_output_delimiter(sep: char) -> Result<(), OutputError> {
    match sep {
        ',' => Err(OutputError::CommaDelimiter),
        '"' | '\n' | '\r' => Err(OutputError::InvalidDelimiter(sep)),
        _ => Ok(()),
    }
}

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write one delimited row.
pub fn write_row<W, S>(mut w: W, row: &[S], sep: char) -> io::Result<()>
where
    W: Write,
    S: AsRef<str>,
{
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            write!(w, "{sep}")?;
        }
        let cell = cell.as_ref();
        if needs_quotes(cell, sep) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{cell}")?;
        }
    }
    writeln!(w)
}

/// Write the header row and one line per entity; absent cells are empty.
pub fn write_table<W: Write>(mut w: W, table: &OutputTable, sep: char) -> Result<(), OutputError> {
    check_output_delimiter(sep)?;
    write_row(&mut w, table.schema().fields(), sep)?;
    for row in table.rows() {
        let cells: Vec<&str> = row.values().map(|v| v.unwrap_or("")).collect();
        write_row(&mut w, &cells, sep)?;
    }
    w.flush()?;
    Ok(())
}
