//! @ai:module:intent Locate non-overlapping occurrences of entity text within a chunk
//! @ai:module:layer domain
//! @ai:module:public_api locate, SpanRange
//! @ai:module:stateless true

/// Half-open byte range `[start, end)` into a chunk's text.
pub type SpanRange = (usize, usize);

/// @ai:intent Find all leftmost, greedy, non-overlapping occurrences of needle in text
/// @ai:post every range has length needle.len() and ranges are strictly increasing
/// @ai:post result is empty when needle is empty or absent
/// @ai:example ("foo bar foo", "foo") -> [(0, 3), (8, 11)]
/// @ai:example ("aaaa", "aa") -> [(0, 2), (2, 4)]
/// @ai:effects pure
/// @ai:complexity O(n * m)
pub fn locate(text: &str, needle: &str) -> Vec<SpanRange> {
    if needle.is_empty() {
        return Vec::new();
    }

    let mut ranges = Vec::new();
    let mut offset = 0;
    while let Some(found) = text[offset..].find(needle) {
        let start = offset + found;
        let end = start + needle.len();
        ranges.push((start, end));
        offset = end;
    }
    ranges
}
