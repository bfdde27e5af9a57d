//! @ai:module:intent Prepare extracted syllabus text and split it into annotatable chunks
//! @ai:module:layer domain
//! @ai:module:public_api Chunk, clean_text, split_chunks
//! @ai:module:stateless true

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https\S+").expect("valid url regex"));

// Escaped-byte residue such as `\xe2` left behind by PDF text extraction.
static ESCAPE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\.{3}").expect("valid escape regex"));

/// @ai:intent One unit of source text eligible for annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
}

impl Chunk {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// @ai:intent Check whether the chunk is empty or whitespace only
    /// @ai:effects pure
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// @ai:intent Normalize extracted text before it is chunked
/// @ai:post result is lowercase, has no parentheses and no https URLs
/// @ai:example ("See (HTTPS://x.org/a) Notes") -> "see  notes"
/// @ai:effects pure
pub fn clean_text(text: &str) -> String {
    let text = text
        .to_lowercase()
        .replace("\\n", " ")
        .replace(['(', ')'], "");
    let text = URL_RE.replace_all(&text, "");
    ESCAPE_RE.replace_all(&text, "").into_owned()
}

/// @ai:intent Split text on a separator, keeping blank pieces so indices match positions
/// @ai:pre separator is non-empty
/// @ai:effects pure
pub fn split_chunks(text: &str, separator: &str) -> Vec<Chunk> {
    text.split(separator)
        .enumerate()
        .map(|(index, piece)| Chunk::new(index, piece))
        .collect()
}

/// @ai:intent Wrap plain strings as chunks indexed by position
pub fn chunks_from<I, S>(pieces: I) -> Vec<Chunk>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    pieces
        .into_iter()
        .enumerate()
        .map(|(index, piece)| Chunk::new(index, piece))
        .collect()
}
