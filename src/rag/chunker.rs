//! Greedy word-packing splitter for email bodies.
//!
//! Bodies are split on single spaces and packed into segments that stay
//! under a configured character budget. Nothing is normalized: casing,
//! newlines inside words, and runs of spaces all survive (consecutive
//! spaces arrive as empty words and re-emit their separators on packing).

/// Default segment budget, in Unicode scalar values.
pub const DEFAULT_MAX_CHARS: usize = 500;

#[derive(Debug, Clone)]
pub struct Chunker {
    max_chars: usize,
}

impl Chunker {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Split `text` into word-bounded segments of at most `max_chars`
    /// characters.
    ///
    /// A word is appended to the running segment when the running length
    /// plus one separator plus the word still fits; otherwise the segment
    /// is closed and the word starts the next one. The trailing partial
    /// segment is always emitted. A single word longer than the budget
    /// becomes its own oversized segment; empty segments are never
    /// produced.
    pub fn split(&self, text: &str) -> Vec<String> {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut current_chars = 0usize;

        for word in text.split(' ') {
            let word_chars = word.chars().count();

            if current.is_empty() {
                current.push_str(word);
                current_chars = word_chars;
            } else if current_chars + 1 + word_chars > self.max_chars {
                segments.push(std::mem::take(&mut current));
                current.push_str(word);
                current_chars = word_chars;
            } else {
                current.push(' ');
                current.push_str(word);
                current_chars += 1 + word_chars;
            }
        }

        if !current.is_empty() {
            segments.push(current);
        }

        segments
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHARS)
    }
}
