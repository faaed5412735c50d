//! # CSV export
//!
//! Appends annotation results to a two-column CSV file, one row per example:
//! the sentence and its entity list (`[[7, 13, 'GPE']]`). The file opens with
//! a UTF-8 byte order mark and a header row; both are written only when the
//! file is new or empty, so exporting twice appends rows under one header.
//! Repeated exports of the same results duplicate rows.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::{NerError, Result};
use crate::span::AnnotatedExample;

pub const HEADER: [&str; 2] = ["sentence", "entity type + position"];

const BOM: &str = "\u{feff}";

/// Appends `examples` to `path`. Returns the number of rows written.
pub fn export_csv(path: impl AsRef<Path>, examples: &[AnnotatedExample]) -> Result<usize> {
    let path = path.as_ref();
    let io_err = |source| NerError::Export {
        path: path.to_path_buf(),
        source,
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_err)?;
    let fresh = file.metadata().map_err(io_err)?.len() == 0;

    let mut out = BufWriter::new(file);
    if fresh {
        out.write_all(BOM.as_bytes()).map_err(io_err)?;
        write_row(&mut out, &HEADER).map_err(io_err)?;
    }
    for example in examples {
        let entities = example.entities_display();
        write_row(&mut out, &[example.sentence.as_str(), entities.as_str()]).map_err(io_err)?;
    }
    out.flush().map_err(io_err)?;

    info!(path = %path.display(), rows = examples.len(), "results exported");
    Ok(examples.len())
}

fn write_row(out: &mut impl Write, fields: &[&str]) -> std::io::Result<()> {
    let row: Vec<String> = fields.iter().map(|f| quote(f)).collect();
    writeln!(out, "{}", row.join(","))
}

/// Quotes a field only when it contains a comma, a quote or a line break.
fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::EntitySpan;
    use std::fs;

    fn example() -> AnnotatedExample {
        AnnotatedExample::new("I like London.", vec![EntitySpan::new(7, 13, "GPE")])
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("plain"), "plain");
        assert_eq!(quote("a, b"), "\"a, b\"");
        assert_eq!(quote("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_export_writes_bom_and_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");

        assert_eq!(export_csv(&path, &[example()]).unwrap(), 1);
        assert_eq!(export_csv(&path, &[example()]).unwrap(), 1);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with('\u{feff}'));
        let lines: Vec<&str> = content.trim_start_matches('\u{feff}').lines().collect();
        assert_eq!(
            lines,
            vec![
                "sentence,entity type + position",
                "I like London.,\"[[7, 13, 'GPE']]\"",
                "I like London.,\"[[7, 13, 'GPE']]\"",
            ]
        );
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("results.csv");
        let err = export_csv(&path, &[example()]).unwrap_err();
        assert!(matches!(err, NerError::Export { .. }));
    }
}
