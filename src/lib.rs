//! @ai:module:intent Library for turning syllabus text and annotation scripts into NER training data
//! @ai:module:layer infrastructure
//! @ai:module:public_api aligner, chunk, config, dataset, directive, document, emitter, error, interactive, label, locator, output
//! @ai:module:stateless true
//!
//! # sylner
//!
//! Annotation scripts list one entity mention per line as `<entity text>>><label digit>`,
//! in the order the mentions appear in the source text. The aligner walks the text chunks
//! and the script together, so authors never have to say which chunk a line belongs to.
//!
//! ## Example
//!
//! ```rust
//! use sylner_core::{chunk::chunks_from, Aligner, LabelSet};
//!
//! let labels = LabelSet::default();
//! let chunks = chunks_from(["hw 1 due friday", "", "midterm exam"]);
//! let script = vec!["hw 1>>1".to_string(), "midterm exam>>2".to_string()];
//!
//! let (docs, outcome) = Aligner::new(&labels).align(&chunks, &script).unwrap();
//! assert_eq!(docs.len(), 2);
//! assert!(outcome.rejected.is_empty());
//! ```

pub mod aligner;
pub mod chunk;
pub mod config;
pub mod dataset;
pub mod directive;
pub mod document;
pub mod emitter;
pub mod error;
pub mod interactive;
pub mod label;
pub mod locator;
pub mod output;

pub use aligner::{AlignmentOutcome, Aligner, Termination};
pub use chunk::{clean_text, split_chunks, Chunk};
pub use config::{ChunkingConfig, SylnerConfig};
pub use dataset::{build_directory, build_file, check_file, BatchReport, BuildReport, CheckResult};
pub use directive::{validate, Directive, RejectReason, ValidationError, DELIMITER};
pub use document::{AnnotatedDocument, EntitySpan};
pub use emitter::{Emitter, JsonlEmitter, MemoryEmitter};
pub use error::{Error, Result};
pub use interactive::InteractiveSession;
pub use label::{Label, LabelSet};
pub use locator::locate;
pub use output::{format_batch_report, format_build_report, format_check_result, OutputFormat};
