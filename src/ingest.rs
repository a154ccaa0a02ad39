use crate::db::models::TrackRecord;
use std::io::BufRead;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Line {line}: expected 20 comma-separated fields, found {found}")]
    FieldCount { line: usize, found: usize },
}

/// Read track records from a comma-delimited file.
///
/// Blank lines and lines starting with a comma are skipped. Any other line
/// must split into exactly 20 fields, otherwise the whole file is rejected.
pub fn read_records(path: &Path) -> Result<Vec<TrackRecord>, IngestError> {
    let file = std::fs::File::open(path)?;
    let records = parse_records(std::io::BufReader::new(file))?;
    log::debug!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Parse records from any line source. Line numbers in errors are 1-based.
pub fn parse_records<R: BufRead>(reader: R) -> Result<Vec<TrackRecord>, IngestError> {
    let mut records = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || line.starts_with(',') {
            continue;
        }

        let fields: Vec<&str> = trimmed.split(',').collect();
        let record = TrackRecord::from_fields(&fields).ok_or(IngestError::FieldCount {
            line: idx + 1,
            found: fields.len(),
        })?;
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn line(track_name: &str) -> String {
        format!(
            "Blood,Monocyte,Monocyte_CD14,Mono,Histone,H3K4me3,H3K4me3_track,K4m3,\
             C0010K,0h,signal,{track_name},bigWig,dense,Blueprint,ftp.ebi.ac.uk,\
             /pub/{track_name}.bw,tracks.example.org,/srv/{track_name}.bw,{track_name}.bw"
        )
    }

    #[test]
    fn test_parse_well_formed_lines() {
        let input = format!("{}\n{}\n", line("t1"), line("t2"));
        let records = parse_records(Cursor::new(input)).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].cell_type, "Monocyte");
        assert_eq!(records[0].assay, "H3K4me3");
        assert_eq!(records[0].track_name, "t1");
        assert_eq!(records[1].new_file_name, "t2.bw");
    }

    #[test]
    fn test_skips_blank_and_leading_comma_lines() {
        let input = format!(
            "\n   \n{}\n,,,,,,,,,,,,,,,,,,,\n,header row\n{}\n",
            line("t1"),
            line("t2")
        );
        let records = parse_records(Cursor::new(input)).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.track_name.as_str()).collect();
        assert_eq!(names, vec!["t1", "t2"]);
    }

    #[test]
    fn test_trims_surrounding_whitespace_and_crlf() {
        let input = format!("  {}\r\n", line("t1"));
        let records = parse_records(Cursor::new(input)).unwrap();
        assert_eq!(records[0].track_name, "t1");
        assert_eq!(records[0].new_file_name, "t1.bw");
    }

    #[test]
    fn test_wrong_field_count_rejects_file() {
        let input = format!("{}\n{},extra\n{}\n", line("t1"), line("t2"), line("t3"));
        let err = parse_records(Cursor::new(input)).unwrap_err();
        match err {
            IngestError::FieldCount { line, found } => {
                assert_eq!(line, 2);
                assert_eq!(found, 21);
            }
            other => panic!("expected field count error, got {other:?}"),
        }

        let err = parse_records(Cursor::new("a,b,c\n")).unwrap_err();
        assert!(matches!(err, IngestError::FieldCount { line: 1, found: 3 }));
    }

    #[test]
    fn test_empty_fields_are_kept() {
        let mut fields = vec![""; TrackRecord::FIELD_COUNT];
        fields[0] = "Blood";
        fields[11] = "t1";
        let records = parse_records(Cursor::new(fields.join(","))).unwrap();
        assert_eq!(records[0].cell_type, "");
        assert_eq!(records[0].track_name, "t1");
    }

    #[test]
    fn test_read_records_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("tracks.csv");
        std::fs::write(&path, format!("{}\n\n{}\n", line("t1"), line("t2"))).unwrap();

        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 2);

        let missing = read_records(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(missing, IngestError::Io(_)));
    }
}
