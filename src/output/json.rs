//! JSON item sinks
//!
//! - `JsonArraySink` writes one UTF-8 JSON array file when the crawl ends
//! - `ConsoleSink` prints one compact JSON object per line as items arrive

use crate::item::Item;
use crate::output::traits::{ItemSink, OutputResult};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs::File;
use std::io::{self, BufWriter, Stdout, Write};
use std::path::{Path, PathBuf};

/// Collects items and writes them as a JSON array on `finish`
///
/// The file uses 4-space indentation and keeps non-ASCII text as is.
#[derive(Debug)]
pub struct JsonArraySink {
    path: PathBuf,
    items: Vec<Item>,
}

impl JsonArraySink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            items: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ItemSink for JsonArraySink {
    fn accept(&mut self, item: &Item) -> OutputResult<()> {
        self.items.push(item.clone());
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        write_pretty(&mut writer, &self.items)?;
        writer.flush()?;

        tracing::info!(
            "Saved {} items to {}",
            self.items.len(),
            self.path.display()
        );
        Ok(())
    }

    fn accepted(&self) -> usize {
        self.items.len()
    }
}

fn write_pretty<W: Write>(writer: W, items: &[Item]) -> OutputResult<()> {
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(writer, formatter);
    items.serialize(&mut serializer)?;
    Ok(())
}

/// Streams each item as a JSON line
#[derive(Debug)]
pub struct ConsoleSink<W: Write = Stdout> {
    writer: W,
    count: usize,
}

impl ConsoleSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, count: 0 }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ItemSink for ConsoleSink<W> {
    fn accept(&mut self, item: &Item) -> OutputResult<()> {
        serde_json::to_writer(&mut self.writer, item)?;
        self.writer.write_all(b"\n")?;
        self.count += 1;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn accepted(&self) -> usize {
        self.count
    }
}
