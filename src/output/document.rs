//! Ordered text document writer
//!
//! Layout of one chapter block:
//!
//! ```text
//! <chapter title>\r\n
//! <fragment>\r\n
//! ...
//! \r\n
//! ```
//!
//! The writer is flushed after every block, so an interrupted run leaves
//! every completed chapter on disk.

use crate::capture::ChapterContent;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const LINE_END: &str = "\r\n";

/// Characters that cannot appear in a file name on common platforms
const RESERVED: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Appends chapter blocks to a document, one at a time
pub struct DocumentWriter<W: Write> {
    sink: W,
    chapters_written: usize,
}

impl DocumentWriter<BufWriter<File>> {
    /// Creates (or truncates) the document at `path`
    pub fn create(path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> DocumentWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            chapters_written: 0,
        }
    }

    /// Writes one chapter block and flushes it
    pub fn write_chapter(&mut self, chapter: &ChapterContent) -> std::io::Result<()> {
        self.write_line(&chapter.title)?;
        for line in &chapter.lines {
            self.write_line(line)?;
        }
        self.finish_block()
    }

    /// Writes a block marking a chapter that could not be downloaded
    pub fn write_placeholder(&mut self, title: &str, url: &str) -> std::io::Result<()> {
        self.write_line(title)?;
        self.write_line(&format!("[chapter unavailable: {}]", url))?;
        self.finish_block()
    }

    /// Number of blocks written so far
    pub fn chapters_written(&self) -> usize {
        self.chapters_written
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        self.sink.write_all(line.as_bytes())?;
        self.sink.write_all(LINE_END.as_bytes())
    }

    fn finish_block(&mut self) -> std::io::Result<()> {
        self.sink.write_all(LINE_END.as_bytes())?;
        self.sink.flush()?;
        self.chapters_written += 1;
        Ok(())
    }
}

/// Derives the document path `<directory>/<title>.<extension>`
///
/// Reserved and control characters in the title become `_`.
pub fn document_path(directory: &Path, title: &str, extension: &str) -> PathBuf {
    let mut name: String = title
        .trim()
        .chars()
        .map(|c| {
            if RESERVED.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let trimmed = name.trim_matches(['.', ' ']);
    name = if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    };

    let extension = extension.trim_start_matches('.');
    if !extension.is_empty() {
        name.push('.');
        name.push_str(extension);
    }
    directory.join(name)
}
