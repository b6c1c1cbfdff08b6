pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Splits text into consecutive, non-overlapping windows of `chunk_size`
/// whitespace tokens, each rejoined with single spaces. The last window may
/// be shorter. No sentence or paragraph boundaries are considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChunker {
    chunk_size: usize,
}

impl TextChunker {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();

        words
            .chunks(self.chunk_size)
            .map(|window| window.join(" "))
            .collect()
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}
