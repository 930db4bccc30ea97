//! Batching of raw shell output into message-sized text blocks.

use std::collections::VecDeque;

use shellbot_terminal::IncrementalDecoder;

/// Unsent shell output plus the decoder state that spans flushes.
///
/// Chunks are kept as raw bytes and only decoded when a block is emitted.
/// The decoder is never reset: it may be holding the first bytes of a
/// character whose remainder is still in the buffer or not yet read.
#[derive(Debug)]
pub struct OutputBuffer {
    chunks: VecDeque<Vec<u8>>,
    len: usize,
    threshold: usize,
    decoder: IncrementalDecoder,
}

impl OutputBuffer {
    /// `threshold` is the size above which output is emitted without
    /// waiting for the shell to go idle.
    pub fn new(threshold: usize) -> Self {
        Self {
            chunks: VecDeque::new(),
            len: 0,
            threshold: threshold.max(1),
            decoder: IncrementalDecoder::new(),
        }
    }

    pub fn push(&mut self, chunk: Vec<u8>) {
        if chunk.is_empty() {
            return;
        }
        self.len += chunk.len();
        self.chunks.push_back(chunk);
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Total buffered bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    #[cfg(test)]
    pub(crate) fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Decide what, if anything, is ready to send.
    ///
    /// With `flush` set, everything buffered is decoded into exactly one
    /// block (possibly empty) and the buffer is cleared. Otherwise blocks are
    /// emitted only while the buffer is over the threshold, each one cut at
    /// the last newline that fits.
    pub fn evaluate(&mut self, flush: bool) -> Vec<String> {
        if flush {
            let bytes: Vec<u8> = self.chunks.drain(..).flatten().collect();
            self.len = 0;
            return vec![self.decoder.decode(&bytes)];
        }

        let mut blocks = Vec::new();
        while self.len > self.threshold {
            blocks.push(self.split_front());
        }
        blocks
    }

    /// Flush everything, including a truncated trailing character.
    /// Used once the shell's output has ended.
    pub fn finish(&mut self) -> String {
        let mut text = self.evaluate(true).concat();
        text.push_str(&self.decoder.finish());
        text
    }

    /// Emit one block of at most `threshold` bytes from the front.
    fn split_front(&mut self) -> String {
        let mut span: Vec<u8> = Vec::with_capacity(self.threshold);
        while let Some(front) = self.chunks.front() {
            // The first chunk is always taken so an oversized chunk cannot stall us.
            if !span.is_empty() && span.len() + front.len() > self.threshold {
                break;
            }
            if let Some(chunk) = self.chunks.pop_front() {
                span.extend_from_slice(&chunk);
            }
        }
        self.len -= span.len();

        // Keep whatever follows the last newline for the next block. A span
        // with no newline at all is one huge line and goes out as-is.
        if let Some(pos) = span.iter().rposition(|&b| b == b'\n') {
            let rest = span.split_off(pos + 1);
            if !rest.is_empty() {
                self.len += rest.len();
                self.chunks.push_front(rest);
            }
        }

        self.decoder.decode(&span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: usize = 16 * 1024;

    fn fill(buffer: &mut OutputBuffer, bytes: &[u8], chunk: usize) {
        for c in bytes.chunks(chunk) {
            buffer.push(c.to_vec());
        }
    }

    #[test]
    fn below_threshold_emits_nothing() {
        let mut buffer = OutputBuffer::new(T);
        buffer.push(b"ls\n".to_vec());
        assert!(buffer.evaluate(false).is_empty());
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.chunk_count(), 1);
    }

    #[test]
    fn flush_drains_into_one_block() {
        let mut buffer = OutputBuffer::new(T);
        buffer.push(b"one\n".to_vec());
        buffer.push(b"two".to_vec());

        assert_eq!(buffer.evaluate(true), vec!["one\ntwo".to_string()]);
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);
    }

    #[test]
    fn flush_of_empty_buffer_is_one_empty_block() {
        let mut buffer = OutputBuffer::new(T);
        assert_eq!(buffer.evaluate(true), vec![String::new()]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn empty_chunks_are_ignored() {
        let mut buffer = OutputBuffer::new(T);
        buffer.push(Vec::new());
        assert!(buffer.is_empty());
    }

    #[test]
    fn oversized_output_splits_at_last_newline() {
        let mut buffer = OutputBuffer::new(T);
        // 10 000 bytes, newline, then enough to push past the threshold
        let mut bytes = vec![b'a'; 10_000];
        bytes.push(b'\n');
        bytes.extend(vec![b'b'; 8_000]);
        fill(&mut buffer, &bytes, 1024);
        assert!(buffer.len() > T);

        let blocks = buffer.evaluate(false);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].len(), 10_001);
        assert!(blocks[0].ends_with("a\n"));

        // the tail after the newline comes first in what is left, in order
        let rest = buffer.evaluate(true).concat();
        assert_eq!(rest, "b".repeat(8_000));
    }

    #[test]
    fn remainder_after_newline_is_retained_as_one_chunk() {
        let mut buffer = OutputBuffer::new(T);
        // sixteen chunks fill the span exactly; one more pushes us over
        for i in 0..16 {
            let mut chunk = vec![b'x'; 1024];
            if i == 14 {
                chunk[1000] = b'\n';
            }
            buffer.push(chunk);
        }
        buffer.push(vec![b'z'; 1]);

        let blocks = buffer.evaluate(false);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].len(), 14 * 1024 + 1001);
        assert!(blocks[0].ends_with('\n'));

        // after-newline part of chunk 14 plus chunk 15, as a single chunk, then "z"
        assert_eq!(buffer.chunk_count(), 2);
        assert_eq!(buffer.len(), 23 + 1024 + 1);
        let rest = buffer.evaluate(true).concat();
        assert_eq!(rest, format!("{}z", "x".repeat(23 + 1024)));
    }

    #[test]
    fn unbroken_line_is_emitted_whole_span() {
        let mut buffer = OutputBuffer::new(T);
        fill(&mut buffer, &vec![b'q'; 20 * 1024], 1024);

        let blocks = buffer.evaluate(false);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].len(), 16 * 1024);
        assert_eq!(buffer.len(), 4 * 1024);
        assert_eq!(buffer.evaluate(true)[0].len(), 4 * 1024);
    }

    #[test]
    fn span_respects_chunk_boundaries() {
        let mut buffer = OutputBuffer::new(T);
        // 1000-byte chunks: only 16 fit under 16 384
        fill(&mut buffer, &vec![b'k'; 17_000], 1000);

        let blocks = buffer.evaluate(false);
        assert_eq!(blocks[0].len(), 16_000);
        assert_eq!(buffer.len(), 1_000);
    }

    #[test]
    fn large_backlog_splits_repeatedly() {
        let mut buffer = OutputBuffer::new(T);
        let line = format!("{}\n", "l".repeat(99));
        fill(&mut buffer, line.repeat(500).as_bytes(), 1024);

        let blocks = buffer.evaluate(false);
        assert!(blocks.len() >= 2);
        assert!(buffer.len() <= T);
        for block in &blocks {
            assert!(block.len() <= T);
            assert!(block.ends_with('\n'));
            assert_eq!(block.len() % 100, 0, "blocks hold whole lines");
        }

        let mut all = blocks.concat();
        all.push_str(&buffer.evaluate(true).concat());
        assert_eq!(all, line.repeat(500));
    }

    #[test]
    fn multibyte_character_split_across_span_survives() {
        let mut buffer = OutputBuffer::new(T);
        // 16 383 ASCII bytes then a 3-byte character straddling the threshold
        let mut bytes = vec![b'a'; T - 1];
        bytes.extend_from_slice("☃".as_bytes());
        bytes.extend_from_slice(b"tail");
        fill(&mut buffer, &bytes, 1024);

        let first = buffer.evaluate(false).concat();
        let rest = buffer.evaluate(true).concat();
        assert!(!first.contains('\u{FFFD}'));
        assert!(!rest.contains('\u{FFFD}'));
        assert_eq!(format!("{first}{rest}"), String::from_utf8(bytes).unwrap());
    }

    #[test]
    fn finish_replaces_dangling_partial_character() {
        let mut buffer = OutputBuffer::new(T);
        buffer.push(b"bye \xe2\x98".to_vec());
        assert_eq!(buffer.finish(), "bye \u{FFFD}");
        assert!(buffer.is_empty());
    }
}
