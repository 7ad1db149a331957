use std::fs;
use std::io::{self, BufRead};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{CardError, Result};

// Field delimiter of the input file. No quoting or escaping is supported:
// a delimiter inside a field misaligns the remaining fields.
const FIELD_DELIMITER: char = ',';

/// One input triple, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub number: String,
    pub extra_info: String,
}

/// Loads records from a delimited text file.
///
/// The first line is discarded unconditionally (assumed header, no schema
/// validation). Every following line is split on `,` into at most three
/// fields in fixed order (name, number, extra_info); missing trailing
/// fields become empty strings. Fields are trimmed of surrounding
/// whitespace.
///
/// Blank lines are skipped rather than yielding empty records, and so are
/// comment rows whose first field starts with `#`. Duplicate numbers are
/// legal; each occurrence produces its own card.
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let file = fs::File::open(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => CardError::FileNotFound(path.to_path_buf()),
        _ => CardError::Io(err),
    })?;
    let reader = io::BufReader::new(file);

    let mut lines = reader.lines();
    // Skip the header line.
    if let Some(header) = lines.next() {
        let _ = header?;
    }

    let mut records = Vec::new();
    for line in lines {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with('#') {
            debug!(line = trimmed, "skipping comment row");
            continue;
        }

        let mut fields = trimmed.splitn(3, FIELD_DELIMITER);
        let name = fields.next().unwrap_or_default().trim().to_string();
        let number = fields.next().unwrap_or_default().trim().to_string();
        let extra_info = fields.next().unwrap_or_default().trim().to_string();
        records.push(Record {
            name,
            number,
            extra_info,
        });
    }

    info!(count = records.len(), path = %path.display(), "loaded records");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_input(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_records_in_file_order() {
        let file = write_input(
            "name,number,info\n\
             Alice,400638133393,x\n\
             Bob,599999999999,y\n\
             Carol,400638133393,z\n",
        );
        let records = load_records(file.path()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "Alice");
        assert_eq!(records[1].number, "599999999999");
        // Duplicate numbers are allowed.
        assert_eq!(records[2].number, records[0].number);
    }

    #[test]
    fn header_only_file_yields_no_records() {
        let file = write_input("name,number,info\n");
        assert!(load_records(file.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_path_fails_with_file_not_found() {
        let result = load_records(Path::new("no/such/file.csv"));
        assert!(matches!(result, Err(CardError::FileNotFound(_))));
    }

    #[test]
    fn missing_trailing_fields_become_empty() {
        let file = write_input("name,number,info\nDave,123456789012\nErin\n");
        let records = load_records(file.path()).unwrap();
        assert_eq!(records[0].extra_info, "");
        assert_eq!(records[1].number, "");
        assert_eq!(records[1].extra_info, "");
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        let file = write_input(
            "name,number,info\n\
             \n\
             # disabled,000000000000,skip\n\
             Frank,400638133393,a\n\
             \n",
        );
        let records = load_records(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Frank");
    }

    #[test]
    fn header_is_discarded_without_validation() {
        // Even a data-looking first line is treated as the header.
        let file = write_input("Alice,400638133393,x\nBob,599999999999,y\n");
        let records = load_records(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Bob");
    }

    #[test]
    fn fields_are_trimmed() {
        let file = write_input("name,number,info\n  Grace , 400638133393 ,  hi \n");
        let records = load_records(file.path()).unwrap();
        assert_eq!(records[0].name, "Grace");
        assert_eq!(records[0].number, "400638133393");
        assert_eq!(records[0].extra_info, "hi");
    }
}
