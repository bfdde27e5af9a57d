//! @ai:module:intent Sinks that receive finalized annotated documents
//! @ai:module:layer infrastructure
//! @ai:module:public_api Emitter, MemoryEmitter, JsonlEmitter, TrainingRecord
//! @ai:module:depends_on document, error

use crate::document::AnnotatedDocument;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// @ai:intent Append-only sink for documents in finalization order
pub trait Emitter {
    /// @ai:intent Accept one finalized document
    /// @ai:effects depends on implementation
    fn emit(&mut self, doc: AnnotatedDocument) -> Result<()>;
}

/// @ai:intent Collects emitted documents in memory
#[derive(Debug, Default)]
pub struct MemoryEmitter {
    pub documents: Vec<AnnotatedDocument>,
}

impl MemoryEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_documents(self) -> Vec<AnnotatedDocument> {
        self.documents
    }
}

impl Emitter for MemoryEmitter {
    fn emit(&mut self, doc: AnnotatedDocument) -> Result<()> {
        self.documents.push(doc);
        Ok(())
    }
}

/// @ai:intent Serialized training example: text plus (start, end, label) character triples
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub chunk_index: usize,
    pub text: String,
    pub entities: Vec<(usize, usize, String)>,
}

impl From<&AnnotatedDocument> for TrainingRecord {
    fn from(doc: &AnnotatedDocument) -> Self {
        let entities = doc
            .spans
            .iter()
            .map(|span| {
                let (start, end) = span.char_range(&doc.text);
                (start, end, span.label.name.clone())
            })
            .collect();
        Self {
            chunk_index: doc.chunk_index,
            text: doc.text.clone(),
            entities,
        }
    }
}

/// @ai:intent Writes one JSON training record per line
pub struct JsonlEmitter<W: Write> {
    writer: W,
    skip_empty: bool,
    written: usize,
}

impl<W: Write> JsonlEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            skip_empty: false,
            written: 0,
        }
    }

    /// @ai:intent Drop documents that carry no spans instead of writing them
    pub fn skip_empty(mut self, skip: bool) -> Self {
        self.skip_empty = skip;
        self
    }

    /// @ai:intent Number of records actually written
    pub fn written(&self) -> usize {
        self.written
    }

    /// @ai:intent Flush and hand back the underlying writer
    /// @ai:effects io:write
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl JsonlEmitter<BufWriter<File>> {
    /// @ai:intent Create an emitter writing to a new file at path
    /// @ai:effects fs:write
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| Error::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> Emitter for JsonlEmitter<W> {
    fn emit(&mut self, doc: AnnotatedDocument) -> Result<()> {
        if self.skip_empty && doc.is_empty() {
            return Ok(());
        }
        let record = TrainingRecord::from(&doc);
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }
}
