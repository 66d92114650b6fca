//! TREC-style run file output.

use crate::error::{Error, Result};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// One line of a run file: `<query_id> Q0 <external_id> <rank> <score> <run_tag>`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLine<'a> {
    pub query_id: &'a str,
    pub external_id: &'a str,
    pub rank: usize,
    pub normalized_score: f64,
    pub run_tag: &'a str,
}

impl fmt::Display for ReportLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Q0 {} {} {:.3} {}",
            self.query_id, self.external_id, self.rank, self.normalized_score, self.run_tag
        )
    }
}

/// Append-only line sink. Call [`ReportWriter::finish`] after the last line.
pub struct ReportWriter<W: Write> {
    out: BufWriter<W>,
    resource: PathBuf,
    lines: usize,
}

impl ReportWriter<File> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| Error::io("create directory", dir, e))?;
        }
        let f = File::create(path).map_err(|e| Error::io("create", path, e))?;
        Ok(Self::new(f, path))
    }
}

impl<W: Write> ReportWriter<W> {
    /// `resource` names the destination in error messages.
    pub fn new(inner: W, resource: impl AsRef<Path>) -> Self {
        Self { out: BufWriter::new(inner), resource: resource.as_ref().to_path_buf(), lines: 0 }
    }

    pub fn write_line(&mut self, line: impl fmt::Display) -> Result<()> {
        writeln!(self.out, "{line}").map_err(|e| Error::io("write", &self.resource, e))?;
        self.lines += 1;
        Ok(())
    }

    pub fn lines_written(&self) -> usize { self.lines }

    /// Flush and hand back the underlying writer.
    pub fn finish(self) -> Result<W> {
        let resource = self.resource;
        self.out.into_inner().map_err(|e| Error::io("flush", &resource, e.into_error()))
    }
}
