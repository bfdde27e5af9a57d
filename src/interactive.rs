//! @ai:module:intent Console adapter that asks a person for entity text and labels chunk by chunk
//! @ai:module:layer presentation
//! @ai:module:public_api InteractiveSession, SessionSummary
//! @ai:module:depends_on aligner, chunk, directive, emitter, label

use crate::aligner::Aligner;
use crate::chunk::Chunk;
use crate::directive::Directive;
use crate::emitter::Emitter;
use crate::error::Result;
use crate::label::LabelSet;
use crate::locator::locate;
use std::io::{BufRead, Write};

/// @ai:intent Counts gathered over one interactive session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub chunks_shown: usize,
    pub directives_entered: usize,
    pub documents_emitted: usize,
}

/// @ai:intent Prompts for directives and feeds them through the aligner one chunk at a time
/// @ai:invariant every synthesized directive matches its chunk at least once
pub struct InteractiveSession<'a, R, W> {
    labels: &'a LabelSet,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> InteractiveSession<'a, R, W> {
    pub fn new(labels: &'a LabelSet, input: R, output: W) -> Self {
        Self {
            labels,
            input,
            output,
        }
    }

    /// @ai:intent Annotate every non-blank chunk, emitting only chunks that received spans
    /// @ai:post end of input finishes the session after the current chunk
    /// @ai:effects io:read, io:write, emitter
    pub fn run<E: Emitter + ?Sized>(
        &mut self,
        chunks: &[Chunk],
        emitter: &mut E,
    ) -> Result<SessionSummary> {
        let aligner = Aligner::new(self.labels);
        let mut summary = SessionSummary::default();

        for chunk in chunks.iter().filter(|c| !c.is_blank()) {
            summary.chunks_shown += 1;
            writeln!(
                self.output,
                "Text:-----------------------------------\n{}\n----------------------------------------------",
                chunk.text
            )?;

            let (directives, finished) = self.collect_directives(chunk)?;
            summary.directives_entered += directives.len();

            if !directives.is_empty() {
                let lines: Vec<String> = directives.iter().map(ToString::to_string).collect();
                let (docs, _) = aligner.align(std::slice::from_ref(chunk), &lines)?;
                for doc in docs.into_iter().filter(|d| !d.is_empty()) {
                    emitter.emit(doc)?;
                    summary.documents_emitted += 1;
                }
            }

            if finished {
                break;
            }
        }

        Ok(summary)
    }

    /// @ai:intent Prompt until a blank entity line; the flag reports end of input
    fn collect_directives(&mut self, chunk: &Chunk) -> Result<(Vec<Directive>, bool)> {
        let mut directives = Vec::new();

        loop {
            let Some(entity_text) =
                self.prompt("What is the ent_text? (enter blank to move to next text piece)")?
            else {
                return Ok((directives, true));
            };
            if entity_text.is_empty() {
                return Ok((directives, false));
            }

            let count = locate(&chunk.text, &entity_text).len();
            if count == 0 {
                writeln!(self.output, "{} not found. Try something else.", entity_text)?;
                continue;
            }

            let question = format!(
                "What is the label index for {}? (one-based indexing) {}",
                entity_text, self.labels
            );
            let Some(answer) = self.prompt(&question)? else {
                return Ok((directives, true));
            };
            let label_index = match answer.trim().parse::<u32>() {
                Ok(index) if self.labels.contains_index(index) => index,
                _ => {
                    writeln!(self.output, "Invalid index. Prompting for ents again")?;
                    continue;
                }
            };

            writeln!(self.output, "found {} matches for {}", count, entity_text)?;
            directives.push(Directive::new(directives.len() + 1, entity_text, label_index));
        }
    }

    /// @ai:intent Print a question and read one answer; None at end of input
    fn prompt(&mut self, question: &str) -> Result<Option<String>> {
        writeln!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}
