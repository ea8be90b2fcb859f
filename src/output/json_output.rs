//! JSON array export of package records

use crate::crawler::CrawlReport;
use crate::output::traits::{OutputHandler, OutputResult};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes the record set as a pretty-printed JSON array
pub struct JsonOutput {
    path: PathBuf,
}

impl JsonOutput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OutputHandler for JsonOutput {
    fn write_report(&mut self, report: &CrawlReport) -> OutputResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &report.records)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        info!(
            "Wrote {} records to {}",
            report.records.len(),
            self.path.display()
        );
        Ok(())
    }
}
