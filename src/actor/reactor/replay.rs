use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use super::Event;

/// Records reactor events to a file, one JSON object per line, so a session
/// can be replayed later.
pub struct Record {
    file: Option<File>,
}

impl Record {
    pub fn new(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = path.map(File::create).transpose()?;
        Ok(Self { file })
    }

    pub fn on_event(&mut self, event: &Event) -> anyhow::Result<()> {
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };
        let line = serde_json::to_string(event)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

/// Reads a recorded trace and feeds each event to `on_event` in order.
pub fn replay(path: &Path, mut on_event: impl FnMut(Event)) -> anyhow::Result<()> {
    let file = BufReader::new(File::open(path)?);
    for line in file.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event: Event = serde_json::from_str(&line)?;
        on_event(event);
    }
    Ok(())
}
