//! Line-oriented corpus source: `<external_id>\t<message>` per line.

use crate::error::{Error, Result};
use crate::index::IndexBuilder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusRecord {
    pub external_id: String,
    pub message: String,
}

/// Split a corpus line on TAB. Fields after the second are ignored.
pub fn parse_line(line: &str) -> Option<(&str, &str)> {
    let mut fields = line.split('\t');
    let id = fields.next()?;
    let message = fields.next()?;
    Some((id, message))
}

pub struct CorpusReader<R> {
    reader: R,
    buf: Vec<u8>,
    resource: String,
    line_no: usize,
    skip_malformed: bool,
}

impl CorpusReader<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        let f = File::open(path).map_err(|e| Error::io("open corpus", path, e))?;
        Ok(Self::new(BufReader::new(f), path.display().to_string()))
    }
}

impl<R: BufRead> CorpusReader<R> {
    pub fn new(reader: R, resource: impl Into<String>) -> Self {
        Self { reader, buf: Vec::new(), resource: resource.into(), line_no: 0, skip_malformed: false }
    }

    /// Next raw line without its `\n` or `\r\n`, decoded lossily. `None` at end of input.
    fn read_line(&mut self) -> Option<std::io::Result<String>> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                    if self.buf.last() == Some(&b'\r') {
                        self.buf.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }

    /// Log and skip lines without a TAB instead of failing.
    pub fn skip_malformed(mut self, skip: bool) -> Self {
        self.skip_malformed = skip;
        self
    }
}

impl<R: BufRead> Iterator for CorpusReader<R> {
    type Item = Result<CorpusRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.read_line()? {
                Ok(line) => line,
                Err(e) => return Some(Err(Error::io("read corpus", &self.resource, e))),
            };
            self.line_no += 1;
            match parse_line(&line) {
                Some((id, message)) => {
                    return Some(Ok(CorpusRecord { external_id: id.to_string(), message: message.to_string() }));
                }
                None if self.skip_malformed => {
                    tracing::warn!(resource = %self.resource, line = self.line_no, "skipping malformed corpus line");
                }
                None => {
                    return Some(Err(Error::IngestionFormat {
                        resource: self.resource.clone(),
                        line: self.line_no,
                        found: line,
                    }));
                }
            }
        }
    }
}

/// Corpus files under `path`: the file itself, or every `.txt`/`.tsv` file below a directory, sorted.
pub fn corpus_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(Error::io("open corpus", path, std::io::ErrorKind::NotFound.into()));
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
        let p = entry.path();
        if p.is_file() {
            if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                if matches!(ext, "txt" | "tsv") {
                    files.push(p.to_path_buf());
                }
            }
        }
    }
    Ok(files)
}

/// Feed every record from `reader` into `builder`. Returns the number of documents added.
pub fn ingest<R: BufRead>(builder: &mut IndexBuilder, reader: CorpusReader<R>) -> Result<usize> {
    let mut added = 0;
    for record in reader {
        let record = record?;
        builder.add_document(&record.external_id, &record.message);
        added += 1;
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn splits_on_first_tab() {
        assert_eq!(parse_line("123\thello world"), Some(("123", "hello world")));
        assert_eq!(parse_line("123\thello\textra"), Some(("123", "hello")));
        assert_eq!(parse_line("no tab here"), None);
        assert_eq!(parse_line(""), None);
    }

    #[test]
    fn malformed_line_aborts_with_location() {
        let input = Cursor::new("1\tok\nbroken\n3\tok\n");
        let records: Vec<_> = CorpusReader::new(input, "tweets.txt").collect();
        assert!(records[0].is_ok());
        match &records[1] {
            Err(Error::IngestionFormat { resource, line, .. }) => {
                assert_eq!(resource, "tweets.txt");
                assert_eq!(*line, 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn invalid_utf8_is_replaced_not_fatal() {
        let input = Cursor::new(&b"1\tcaf\xe9 ok\r\n2\tbbc news\n"[..]);
        let records: Vec<_> = CorpusReader::new(input, "tweets.txt").collect::<Result<_>>().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message, "caf\u{FFFD} ok");
        assert_eq!(records[1], CorpusRecord { external_id: "2".into(), message: "bbc news".into() });

        let mut builder = IndexBuilder::new();
        let input = Cursor::new(&b"1\tcaf\xe9 ok\n2\tbbc news\n"[..]);
        assert_eq!(ingest(&mut builder, CorpusReader::new(input, "tweets.txt")).unwrap(), 2);
        assert_eq!(builder.finish().doc_freq("bbc"), 1);
    }

    #[test]
    fn last_line_without_newline_is_read() {
        let records: Vec<_> = CorpusReader::new(Cursor::new("1\ta\n2\tb"), "mem").collect::<Result<_>>().unwrap();
        assert_eq!(records[1].message, "b");
    }

    #[test]
    fn malformed_lines_can_be_skipped() {
        let input = Cursor::new("1\tok\nbroken\n3\tok\n");
        let mut builder = IndexBuilder::new();
        let added = ingest(&mut builder, CorpusReader::new(input, "mem").skip_malformed(true)).unwrap();
        assert_eq!(added, 2);
    }

    #[test]
    fn ingest_stops_at_first_malformed_line() {
        let input = Cursor::new("1\tok\nbroken\n3\tok\n");
        let mut builder = IndexBuilder::new();
        let err = ingest(&mut builder, CorpusReader::new(input, "mem")).unwrap_err();
        assert!(matches!(err, Error::IngestionFormat { line: 2, .. }));
    }
}
