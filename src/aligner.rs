//! @ai:module:intent Walk chunks and directives in lockstep, turning an annotation script into labeled documents
//! @ai:module:layer application
//! @ai:module:public_api Aligner, AlignmentOutcome, Termination
//! @ai:module:depends_on chunk, directive, locator, document, emitter, label
//! @ai:module:stateless true

use crate::chunk::Chunk;
use crate::directive::{validate, Directive, ValidationError};
use crate::document::{AnnotatedDocument, EntitySpan};
use crate::emitter::{Emitter, MemoryEmitter};
use crate::error::Result;
use crate::label::{Label, LabelSet};
use crate::locator::locate;
use serde::{Deserialize, Serialize};
use std::mem;

/// @ai:intent Why an alignment run reached its terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Every chunk was consumed; remaining directives were never tried.
    ChunksExhausted,
    /// The directive source ended; the current chunk was finalized.
    DirectivesExhausted,
}

/// @ai:intent Mutable cursor state of one alignment run
/// @ai:invariant !accumulating => pending_spans.is_empty()
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct AlignmentState {
    chunk_cursor: usize,
    directive_cursor: usize,
    pending_spans: Vec<EntitySpan>,
    accumulating: bool,
}

impl AlignmentState {
    /// @ai:intent Record spans matched in the current chunk; the chunk stays open
    fn accept(&mut self, spans: impl IntoIterator<Item = EntitySpan>) {
        self.pending_spans.extend(spans);
        self.accumulating = true;
        self.directive_cursor += 1;
    }

    /// @ai:intent Close the current chunk, handing back its spans and resetting accumulation
    fn finalize(&mut self) -> Vec<EntitySpan> {
        debug_assert!(self.accumulating || self.pending_spans.is_empty());
        self.accumulating = false;
        mem::take(&mut self.pending_spans)
    }
}

/// @ai:intent Observable summary of a finished alignment run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentOutcome {
    pub termination: Termination,
    pub documents_emitted: usize,
    pub directives_applied: usize,
    /// Directive lines never reached because chunks ran out first.
    pub unconsumed_directives: usize,
    pub rejected: Vec<ValidationError>,
}

impl AlignmentOutcome {
    /// @ai:intent Check whether directives were silently left over
    pub fn dropped_directives(&self) -> bool {
        self.unconsumed_directives > 0
    }
}

/// @ai:intent Chunk–directive alignment engine bound to a label vocabulary
#[derive(Debug, Clone, Copy)]
pub struct Aligner<'a> {
    labels: &'a LabelSet,
}

impl<'a> Aligner<'a> {
    pub fn new(labels: &'a LabelSet) -> Self {
        Self { labels }
    }

    /// @ai:intent Run the state machine to completion, emitting documents as chunks are finalized
    /// @ai:pre chunks are in document order; directive_lines are trimmed raw lines
    /// @ai:post emitted chunk indices are strictly increasing and never blank
    /// @ai:post rejected lines never change chunk cursor or pending spans
    /// @ai:effects emitter
    /// @ai:idempotent true
    pub fn run<E: Emitter + ?Sized>(
        &self,
        chunks: &[Chunk],
        directive_lines: &[String],
        emitter: &mut E,
    ) -> Result<AlignmentOutcome> {
        let mut run = Run {
            labels: self.labels,
            chunks,
            lines: directive_lines,
            state: AlignmentState::default(),
            emitter,
            documents_emitted: 0,
            directives_applied: 0,
            rejected: Vec::new(),
        };

        let termination = loop {
            if let Some(termination) = run.step()? {
                break termination;
            }
        };

        let unconsumed_directives = match termination {
            Termination::ChunksExhausted => directive_lines.len() - run.state.directive_cursor,
            Termination::DirectivesExhausted => 0,
        };
        if unconsumed_directives > 0 {
            tracing::warn!(
                "Chunks exhausted with {} directive line(s) unconsumed, starting at line {}",
                unconsumed_directives,
                run.state.directive_cursor + 1
            );
        }

        Ok(AlignmentOutcome {
            termination,
            documents_emitted: run.documents_emitted,
            directives_applied: run.directives_applied,
            unconsumed_directives,
            rejected: run.rejected,
        })
    }

    /// @ai:intent Run alignment into memory and return the documents with the outcome
    /// @ai:effects pure
    pub fn align(
        &self,
        chunks: &[Chunk],
        directive_lines: &[String],
    ) -> Result<(Vec<AnnotatedDocument>, AlignmentOutcome)> {
        let mut emitter = MemoryEmitter::new();
        let outcome = self.run(chunks, directive_lines, &mut emitter)?;
        Ok((emitter.into_documents(), outcome))
    }

    /// @ai:intent Validate a line and resolve its label in one step
    /// @ai:effects pure
    pub fn parse(
        &self,
        line: &str,
        line_number: usize,
    ) -> std::result::Result<(Directive, Label), ValidationError> {
        let directive = validate(line, line_number, self.labels)?;
        let label = self
            .labels
            .get(directive.label_index)
            .ok_or(ValidationError::LabelOutOfRange {
                line_number,
                label: directive.label_index,
            })?;
        Ok((directive, label))
    }
}

struct Run<'r, E: ?Sized> {
    labels: &'r LabelSet,
    chunks: &'r [Chunk],
    lines: &'r [String],
    state: AlignmentState,
    emitter: &'r mut E,
    documents_emitted: usize,
    directives_applied: usize,
    rejected: Vec<ValidationError>,
}

impl<E: Emitter + ?Sized> Run<'_, E> {
    /// @ai:intent Perform one transition; Some(termination) means the run is done
    fn step(&mut self) -> Result<Option<Termination>> {
        let (chunks, lines) = (self.chunks, self.lines);
        let Some(chunk) = chunks.get(self.state.chunk_cursor) else {
            tracing::debug!("All {} chunks consumed", chunks.len());
            return Ok(Some(Termination::ChunksExhausted));
        };

        if chunk.is_blank() {
            self.state.chunk_cursor += 1;
            return Ok(None);
        }

        let Some(line) = lines.get(self.state.directive_cursor) else {
            self.finalize(chunk)?;
            tracing::debug!("Directive source ended at chunk {}", chunk.index);
            return Ok(Some(Termination::DirectivesExhausted));
        };

        let line_number = self.state.directive_cursor + 1;
        let (directive, label) = match Aligner::new(self.labels).parse(line, line_number) {
            Ok(parsed) => parsed,
            Err(rejection) => {
                tracing::warn!("{}", rejection);
                self.rejected.push(rejection);
                self.state.directive_cursor += 1;
                return Ok(None);
            }
        };

        let ranges = locate(&chunk.text, &directive.entity_text);
        if ranges.is_empty() {
            self.finalize(chunk)?;
            self.state.chunk_cursor += 1;
        } else {
            tracing::trace!(
                "Line {} matched {} time(s) in chunk {}",
                line_number,
                ranges.len(),
                chunk.index
            );
            self.state.accept(
                ranges
                    .into_iter()
                    .map(|(start, end)| EntitySpan::new(start, end, label.clone())),
            );
            self.directives_applied += 1;
        }
        Ok(None)
    }

    fn finalize(&mut self, chunk: &Chunk) -> Result<()> {
        let spans = self.state.finalize();
        tracing::debug!("Finalizing chunk {} with {} span(s)", chunk.index, spans.len());
        self.emitter
            .emit(AnnotatedDocument::new(chunk.index, chunk.text.clone(), spans))?;
        self.documents_emitted += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::chunks_from;
    use crate::directive::RejectReason;
    use crate::emitter::JsonlEmitter;
    use pretty_assertions::assert_eq;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn spans_of(doc: &AnnotatedDocument) -> Vec<(usize, usize, u32)> {
        doc.spans
            .iter()
            .map(|s| (s.start, s.end, s.label.index))
            .collect()
    }

    #[test]
    fn test_repeated_entity_in_one_chunk() {
        let labels = LabelSet::default();
        let chunks = chunks_from(["foo bar foo", ""]);
        let (docs, outcome) = Aligner::new(&labels)
            .align(&chunks, &lines(&["foo>>1"]))
            .unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].chunk_index, 0);
        assert_eq!(spans_of(&docs[0]), vec![(0, 3, 1), (8, 11, 1)]);
        assert_eq!(outcome.termination, Termination::DirectivesExhausted);
        assert_eq!(outcome.documents_emitted, 1);
        assert_eq!(outcome.unconsumed_directives, 0);
    }

    #[test]
    fn test_unmatched_directive_exhausts_chunks() {
        let labels = LabelSet::default();
        let chunks = chunks_from(["alpha", "beta"]);
        let (docs, outcome) = Aligner::new(&labels)
            .align(&chunks, &lines(&["zzz>>1", "beta>>2"]))
            .unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].chunk_index, 0);
        assert!(docs[0].is_empty());
        assert_eq!(docs[1].chunk_index, 1);
        assert!(docs[1].is_empty());
        assert_eq!(outcome.termination, Termination::ChunksExhausted);
        assert_eq!(outcome.unconsumed_directives, 2);
        assert_eq!(outcome.directives_applied, 0);
        assert!(outcome.dropped_directives());
    }

    #[test]
    fn test_multiple_directives_share_a_chunk() {
        let labels = LabelSet::default();
        let chunks = chunks_from(["x y"]);
        let (docs, outcome) = Aligner::new(&labels)
            .align(&chunks, &lines(&["y>>2", "x>>1"]))
            .unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(spans_of(&docs[0]), vec![(0, 1, 1), (2, 3, 2)]);
        assert_eq!(outcome.directives_applied, 2);
    }

    #[test]
    fn test_invalid_lines_are_inert() {
        let labels = LabelSet::default();
        let chunks = chunks_from(["quiz one", "", "exam"]);
        let directives = lines(&["# week 1", "quiz>>2", "exam>>7", "exam>>2"]);
        let (docs, outcome) = Aligner::new(&labels).align(&chunks, &directives).unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(spans_of(&docs[0]), vec![(0, 4, 2)]);
        assert_eq!(docs[1].chunk_index, 2);
        assert_eq!(spans_of(&docs[1]), vec![(0, 4, 2)]);
        assert_eq!(
            outcome
                .rejected
                .iter()
                .map(|r| (r.line_number(), r.reason()))
                .collect::<Vec<_>>(),
            vec![
                (1, RejectReason::MissingDelimiter),
                (3, RejectReason::LabelOutOfRange(7)),
            ]
        );
    }

    #[test]
    fn test_trailing_invalid_line_still_finalizes_chunk() {
        let labels = LabelSet::default();
        let chunks = chunks_from(["quiz", "exam"]);
        let (docs, outcome) = Aligner::new(&labels)
            .align(&chunks, &lines(&["quiz>>2", "oops"]))
            .unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(spans_of(&docs[0]), vec![(0, 4, 2)]);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.termination, Termination::DirectivesExhausted);
    }

    #[test]
    fn test_failed_directive_is_retried_on_next_chunk() {
        let labels = LabelSet::default();
        let chunks = chunks_from(["hw 1 due friday", "midterm review", "final exam"]);
        let (docs, outcome) = Aligner::new(&labels)
            .align(&chunks, &lines(&["hw 1>>1", "final exam>>2"]))
            .unwrap();

        assert_eq!(docs.len(), 3);
        assert_eq!(spans_of(&docs[0]), vec![(0, 4, 1)]);
        assert!(docs[1].is_empty());
        assert_eq!(spans_of(&docs[2]), vec![(0, 10, 2)]);
        assert_eq!(outcome.termination, Termination::DirectivesExhausted);
    }

    #[test]
    fn test_no_directives_finalizes_first_non_blank_chunk() {
        let labels = LabelSet::default();
        let chunks = chunks_from(["  ", "syllabus", "week 1"]);
        let (docs, outcome) = Aligner::new(&labels).align(&chunks, &[]).unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].chunk_index, 1);
        assert!(docs[0].is_empty());
        assert_eq!(outcome.termination, Termination::DirectivesExhausted);
    }

    #[test]
    fn test_all_blank_chunks() {
        let labels = LabelSet::default();
        let chunks = chunks_from(["", " ", "\t"]);
        let (docs, outcome) = Aligner::new(&labels)
            .align(&chunks, &lines(&["quiz>>2"]))
            .unwrap();

        assert!(docs.is_empty());
        assert_eq!(outcome.termination, Termination::ChunksExhausted);
        assert_eq!(outcome.unconsumed_directives, 1);
    }

    #[test]
    fn test_uses_configured_label_names() {
        let labels = LabelSet::new(["DATE", "TIME"]).unwrap();
        let chunks = chunks_from(["class at noon"]);
        let (docs, _) = Aligner::new(&labels)
            .align(&chunks, &lines(&["noon>>2"]))
            .unwrap();

        assert_eq!(docs[0].spans[0].label.name, "TIME");
    }

    #[test]
    fn test_runs_are_idempotent() {
        let labels = LabelSet::default();
        let chunks = chunks_from(["lecture 1: intro", "", "hw 1 due", "quiz 1, quiz 2"]);
        let directives = lines(&["lecture 1>>3", "bad", "hw 1>>1", "quiz>>2"]);

        let render = || {
            let mut emitter = JsonlEmitter::new(Vec::new());
            Aligner::new(&labels)
                .run(&chunks, &directives, &mut emitter)
                .unwrap();
            emitter.finish().unwrap()
        };

        let first = render();
        assert!(!first.is_empty());
        assert_eq!(first, render());
    }

    #[test]
    fn test_state_finalize_resets_accumulation() {
        let label = LabelSet::default().get(1).unwrap();
        let mut state = AlignmentState::default();
        state.accept([EntitySpan::new(0, 3, label)]);
        assert!(state.accumulating);
        assert_eq!(state.directive_cursor, 1);

        let spans = state.finalize();
        assert_eq!(spans.len(), 1);
        assert!(!state.accumulating);
        assert!(state.pending_spans.is_empty());
        assert_eq!(state.chunk_cursor, 0);
    }

    #[test]
    fn test_parse_resolves_label() {
        let labels = LabelSet::default();
        let (directive, label) = Aligner::new(&labels).parse("week 3>>4", 9).unwrap();
        assert_eq!(directive.line_number, 9);
        assert_eq!(label.name, "SECTION");
    }
}
