//! Per-family daily append log: `{output_dir}/{PREFIX}/{YYYY-MM-DD}.txt`.
//!
//! The day boundary is the configured timezone's midnight, computed from
//! each line's receive timestamp — not wall-clock "now" — so a batch that
//! straddles midnight splits across the right two files even if committed
//! late. File handles are cached per prefix and reopened on rollover.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{NaiveDate, TimeZone};
use chrono_tz::Tz;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::error::CoreError;

struct OpenHandle {
    date: NaiveDate,
    file: File,
}

pub struct Exporter {
    output_dir: PathBuf,
    timezone: Tz,
    handles: HashMap<String, OpenHandle>,
}

impl Exporter {
    pub fn new(output_dir: PathBuf, timezone: Tz) -> Self {
        Self { output_dir, timezone, handles: HashMap::new() }
    }

    fn receive_date(&self, received_at_ms: i64) -> NaiveDate {
        let utc = chrono::Utc.timestamp_millis_opt(received_at_ms).single().unwrap_or_else(chrono::Utc::now);
        utc.with_timezone(&self.timezone).date_naive()
    }

    /// Appends one line (without its trailing terminator) to the family
    /// file for `prefix`, opening or rolling over the file as needed.
    pub async fn append(&mut self, prefix: &str, received_at_ms: i64, line: &str) -> Result<(), CoreError> {
        let date = self.receive_date(received_at_ms);

        let needs_open = match self.handles.get(prefix) {
            Some(h) => h.date != date,
            None => true,
        };

        if needs_open {
            let dir = self.output_dir.join(prefix);
            fs::create_dir_all(&dir).await?;
            let path = dir.join(format!("{}.txt", date.format("%Y-%m-%d")));
            let file = OpenOptions::new().create(true).append(true).open(&path).await?;
            self.handles.insert(prefix.to_string(), OpenHandle { date, file });
        }

        let handle = self.handles.get_mut(prefix).expect("just inserted or already present");
        handle.file.write_all(line.as_bytes()).await?;
        handle.file.write_all(b"\n").await?;
        Ok(())
    }

    /// Flushes every open handle; called at shutdown and after each batch
    /// commit so a crash doesn't lose acknowledged writes.
    pub async fn flush_all(&mut self) -> Result<(), CoreError> {
        for handle in self.handles.values_mut() {
            handle.file.flush().await?;
        }
        Ok(())
    }
}
