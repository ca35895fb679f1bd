/// Incremental splitter for newline-delimited response bodies.
///
/// Bytes are buffered raw and only decoded once a full line is available, so
/// multi-byte UTF-8 sequences split across network chunks decode correctly.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: Vec<u8>,
    /// Prefix of `buffer` already known to hold no newline.
    scanned: usize,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of the response body.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Next complete, non-blank line with surrounding whitespace trimmed.
    pub fn next_line(&mut self) -> Option<String> {
        loop {
            let Some(offset) = self.buffer[self.scanned..].iter().position(|b| *b == b'\n') else {
                self.scanned = self.buffer.len();
                return None;
            };
            let raw: Vec<u8> = self.buffer.drain(..=self.scanned + offset).collect();
            self.scanned = 0;
            let line = String::from_utf8_lossy(&raw).trim().to_string();
            if !line.is_empty() {
                return Some(line);
            }
        }
    }

    /// Whatever is left after the body ended without a trailing newline.
    pub fn finish(&mut self) -> Option<String> {
        let raw = std::mem::take(&mut self.buffer);
        self.scanned = 0;
        let rest = String::from_utf8_lossy(&raw).trim().to_string();
        if rest.is_empty() { None } else { Some(rest) }
    }

    /// Number of bytes waiting for a newline.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_newlines_and_skips_blank_lines() {
        let mut decoder = LineDecoder::new();
        decoder.push(b"{\"token\":\"a\"}\n\n  \r\n{\"token\":\"b\"}\n");
        assert_eq!(decoder.next_line().as_deref(), Some("{\"token\":\"a\"}"));
        assert_eq!(decoder.next_line().as_deref(), Some("{\"token\":\"b\"}"));
        assert_eq!(decoder.next_line(), None);
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn holds_partial_lines_until_newline_arrives() {
        let mut decoder = LineDecoder::new();
        decoder.push(b"{\"tok");
        assert_eq!(decoder.next_line(), None);
        decoder.push(b"en\":\"x\"}\n{\"to");
        assert_eq!(decoder.next_line().as_deref(), Some("{\"token\":\"x\"}"));
        assert_eq!(decoder.next_line(), None);
        assert_eq!(decoder.finish().as_deref(), Some("{\"to"));
    }

    #[test]
    fn reassembles_utf8_split_across_chunks() {
        let text = "{\"token\":\"⚠️ fièvre\"}\n";
        let bytes = text.as_bytes();
        let mut decoder = LineDecoder::new();
        // Split inside the multi-byte warning sign.
        decoder.push(&bytes[..11]);
        decoder.push(&bytes[11..]);
        assert_eq!(decoder.next_line().as_deref(), Some(text.trim()));
    }

    #[test]
    fn long_line_in_small_chunks_resumes_scanning() {
        let mut decoder = LineDecoder::new();
        let line = format!("{{\"token\":\"{}\"}}", "a".repeat(4096));
        for chunk in line.as_bytes().chunks(7) {
            decoder.push(chunk);
            assert_eq!(decoder.next_line(), None);
            assert_eq!(decoder.scanned, decoder.pending());
        }
        decoder.push(b"\n{\"token\":\"b\"}\n");
        assert_eq!(decoder.next_line().as_deref(), Some(line.as_str()));
        assert_eq!(decoder.next_line().as_deref(), Some("{\"token\":\"b\"}"));
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn finish_ignores_trailing_whitespace() {
        let mut decoder = LineDecoder::new();
        decoder.push(b"   \n  ");
        assert_eq!(decoder.next_line(), None);
        assert_eq!(decoder.finish(), None);
    }
}
