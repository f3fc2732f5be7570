//! Vocabulary loading
//!
//!     Reads the commune column of the official postal-code table and the optional
//!     street-type list. The table is published in Latin-1; UTF-8 files are accepted too.
//!     Terms are NFC-normalized, trimmed and deduplicated in file order.

use adresse_config::VocabularyConfig;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("delimiter {0:?} is not a single ASCII character")]
    Delimiter(char),

    #[error("malformed table {}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("column `{column}` not found in {}", path.display())]
    MissingColumn { path: PathBuf, column: String },
}

/// How the commune table is laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub delimiter: u8,
    pub has_headers: bool,
    /// Header name, or a zero-based index when the table has no header row.
    pub commune_column: String,
}

impl TryFrom<&VocabularyConfig> for TableLayout {
    type Error = LoadError;

    fn try_from(config: &VocabularyConfig) -> Result<Self, LoadError> {
        if !config.delimiter.is_ascii() {
            return Err(LoadError::Delimiter(config.delimiter));
        }
        Ok(Self {
            delimiter: config.delimiter as u8,
            has_headers: config.has_headers,
            commune_column: config.commune_column.clone(),
        })
    }
}

/// Commune names from the reference table at `path`.
pub fn load_communes(path: &Path, layout: &TableLayout) -> Result<Vec<String>, LoadError> {
    let text = read_text(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(layout.delimiter)
        .has_headers(layout.has_headers)
        .flexible(true)
        .from_reader(text.as_bytes());

    let csv_error = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let missing = || LoadError::MissingColumn {
        path: path.to_path_buf(),
        column: layout.commune_column.clone(),
    };

    let column = if layout.has_headers {
        reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .position(|header| header.trim() == layout.commune_column)
            .ok_or_else(missing)?
    } else {
        layout.commune_column.parse().map_err(|_| missing())?
    };

    let mut communes = Terms::default();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(csv_error)?;
        match record.get(column) {
            Some(cell) => communes.push(cell),
            None => warn!(row = row + 1, "row has no commune cell"),
        }
    }
    debug!(path = %path.display(), communes = communes.len(), "loaded commune table");
    Ok(communes.into_vec())
}

/// Street types from a plain list, one per line. Blank lines and `#` comments are skipped.
pub fn load_street_types(path: &Path) -> Result<Vec<String>, LoadError> {
    let text = read_text(path)?;
    let mut terms = Terms::default();
    for line in text.lines() {
        if !line.trim_start().starts_with('#') {
            terms.push(line);
        }
    }
    debug!(path = %path.display(), street_types = terms.len(), "loaded street types");
    Ok(terms.into_vec())
}

/// Decode UTF-8, falling back to Latin-1. A leading byte-order mark is dropped.
pub fn decode(bytes: Vec<u8>) -> String {
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().iter().map(|&b| char::from(b)).collect(),
    };
    match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

fn read_text(path: &Path) -> Result<String, LoadError> {
    fs::read(path).map(decode).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Ordered set of normalized terms.
#[derive(Debug, Default)]
struct Terms {
    seen: HashSet<String>,
    terms: Vec<String>,
}

impl Terms {
    fn push(&mut self, raw: &str) {
        let term: String = raw.trim().nfc().collect();
        if !term.is_empty() && self.seen.insert(term.clone()) {
            self.terms.push(term);
        }
    }

    fn len(&self) -> usize {
        self.terms.len()
    }

    fn into_vec(self) -> Vec<String> {
        self.terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn layout() -> TableLayout {
        TableLayout {
            delimiter: b';',
            has_headers: true,
            commune_column: "Nom_de_la_commune".to_string(),
        }
    }

    fn table(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn reads_commune_column_and_dedupes() {
        let file = table(
            b"Code_commune_INSEE;Nom_de_la_commune;Code_postal\n\
              75102;PARIS 02;75002\n\
              25056;BESANCON;25000\n\
              25056;BESANCON;25010\n\
              01001;;01400\n",
        );
        let communes = load_communes(file.path(), &layout()).unwrap();
        assert_eq!(communes, vec!["PARIS 02", "BESANCON"]);
    }

    #[test]
    fn falls_back_to_latin1() {
        let file = table(b"Nom_de_la_commune\nSAINT-\xC9TIENNE\n");
        let communes = load_communes(file.path(), &layout()).unwrap();
        assert_eq!(communes, vec!["SAINT-ÉTIENNE"]);
    }

    #[test]
    fn normalizes_to_nfc() {
        let file = table("Nom_de_la_commune\nBesanc\u{327}on\n".as_bytes());
        let communes = load_communes(file.path(), &layout()).unwrap();
        assert_eq!(communes, vec!["Besançon"]);
    }

    #[test]
    fn missing_column_is_reported() {
        let file = table(b"Commune;CP\nParis;75002\n");
        let err = load_communes(file.path(), &layout()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { .. }));
    }

    #[test]
    fn headerless_table_uses_column_index() {
        let file = table(b"75002;Paris\n69001;Lyon\n");
        let layout = TableLayout {
            has_headers: false,
            commune_column: "1".to_string(),
            ..layout()
        };
        assert_eq!(
            load_communes(file.path(), &layout).unwrap(),
            vec!["Paris", "Lyon"]
        );
    }

    #[test]
    fn street_type_list_skips_comments() {
        let file = table("# types\nRue\n\n  Allée  \nRue\n".as_bytes());
        assert_eq!(
            load_street_types(file.path()).unwrap(),
            vec!["Rue", "Allée"]
        );
    }

    #[test]
    fn strips_byte_order_mark() {
        assert_eq!(decode("\u{feff}Paris".as_bytes().to_vec()), "Paris");
    }
}
