//! Fixed-window text chunking with overlap.

use recall_core::error::RecallError;

/// Split `text` into windows of `chunk_size` characters, each starting
/// `chunk_size - overlap` characters after the previous one.
///
/// The final window may be shorter. Empty text yields no chunks.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>, RecallError> {
    if chunk_size == 0 {
        return Err(RecallError::InvalidArgument(
            "chunk_size must be greater than zero".to_string(),
        ));
    }
    if overlap >= chunk_size {
        return Err(RecallError::InvalidArgument(format!(
            "overlap ({}) must be smaller than chunk_size ({})",
            overlap, chunk_size
        )));
    }

    let chars: Vec<char> = text.chars().collect();
    let step = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        start += step;
    }
    Ok(chunks)
}
