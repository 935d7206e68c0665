// SSE-style frame decoding for the generation stream

use serde::Deserialize;

/// Prefix marking a data-bearing line on the wire.
const DATA_PREFIX: &str = "data: ";
/// Sentinel payload signalling the end of the stream.
const DONE_SENTINEL: &str = "[DONE]";

/// One decoded wire frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// One incremental fragment of generated text.
    Delta(String),
    /// The `[DONE]` sentinel; nothing further will be decoded.
    Done,
    /// A `data: ` line whose payload failed to parse. Skipped, never fatal.
    Malformed(String),
}

#[derive(Debug, Deserialize)]
struct FramePayload {
    content: String,
}

/// Incremental decoder for the newline-delimited frame stream.
///
/// Byte chunks arrive with no alignment to line boundaries, so the decoder
/// buffers the trailing partial line of every chunk and completes it with the
/// next one. Once the sentinel is seen the decoder goes inert and drops all
/// remaining input, including the rest of the chunk the sentinel arrived in.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    pending: Vec<u8>,
    done: bool,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of bytes, returning the frames it completed in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.done {
            return events;
        }

        self.pending.extend_from_slice(chunk);

        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            // Split off everything after the newline, then swap so `line`
            // holds the completed line and `pending` keeps the remainder.
            let mut line = self.pending.split_off(pos + 1);
            std::mem::swap(&mut self.pending, &mut line);

            if Self::decode_line(&line, &mut events) {
                self.done = true;
                self.pending.clear();
                break;
            }
        }

        events
    }

    /// Flush a trailing line that never received its newline. Call once, at
    /// end of stream.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.done || self.pending.is_empty() {
            return events;
        }

        let line = std::mem::take(&mut self.pending);
        if Self::decode_line(&line, &mut events) {
            self.done = true;
        }
        events
    }

    /// Decodes one line into `events`. Returns true when the line was the
    /// termination sentinel.
    fn decode_line(line: &[u8], events: &mut Vec<StreamEvent>) -> bool {
        let text = String::from_utf8_lossy(line);
        // Lines without the data prefix (blank separators, comments) carry
        // no event.
        let Some(payload) = text.strip_prefix(DATA_PREFIX) else {
            return false;
        };

        let payload = payload.trim();
        if payload == DONE_SENTINEL {
            events.push(StreamEvent::Done);
            return true;
        }

        match serde_json::from_str::<FramePayload>(payload) {
            Ok(frame) => events.push(StreamEvent::Delta(frame.content)),
            Err(_) => events.push(StreamEvent::Malformed(payload.to_string())),
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deltas(events: &[StreamEvent]) -> String {
        events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::Delta(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_single_frame() {
        let mut decoder = FrameDecoder::new();
        let events = decoder.feed(b"data: {\"content\":\"Hello\"}\n");
        assert_eq!(events, vec![StreamEvent::Delta("Hello".to_string())]);
    }

    #[test]
    fn test_multiple_frames_in_one_chunk() {
        let mut decoder = FrameDecoder::new();
        let events =
            decoder.feed(b"data: {\"content\":\"Hello\"}\ndata: {\"content\":\" World\"}\n");
        assert_eq!(deltas(&events), "Hello World");
    }

    #[test]
    fn test_done_sentinel_terminates() {
        let mut decoder = FrameDecoder::new();
        let events = decoder
            .feed(b"data: {\"content\":\"a\"}\ndata: [DONE]\ndata: {\"content\":\"late\"}\n");
        assert_eq!(
            events,
            vec![
                StreamEvent::Delta("a".to_string()),
                StreamEvent::Done,
            ]
        );
        // Inert after the sentinel, even across chunks.
        assert!(decoder.feed(b"data: {\"content\":\"more\"}\n").is_empty());
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn test_line_split_across_chunks() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"data: {\"cont").is_empty());
        let events = decoder.feed(b"ent\":\"Hello\"}\n");
        assert_eq!(events, vec![StreamEvent::Delta("Hello".to_string())]);
    }

    #[test]
    fn test_arbitrary_partition_preserves_concatenation() {
        let wire = "data: {\"content\":\"周报\"}\ndata: {\"content\":\"已生成\"}\ndata: [DONE]\n";
        let bytes = wire.as_bytes();
        // Split at every byte offset, including ones inside multi-byte
        // characters and mid-line.
        for split in 0..bytes.len() {
            let mut decoder = FrameDecoder::new();
            let mut events = decoder.feed(&bytes[..split]);
            events.extend(decoder.feed(&bytes[split..]));
            events.extend(decoder.finish());
            assert_eq!(deltas(&events), "周报已生成", "split at {split}");
            assert_eq!(events.last(), Some(&StreamEvent::Done));
        }
    }

    #[test]
    fn test_lines_without_prefix_ignored() {
        let mut decoder = FrameDecoder::new();
        let events = decoder.feed(b"\n: keepalive\nevent: ping\ndata: {\"content\":\"x\"}\n");
        assert_eq!(events, vec![StreamEvent::Delta("x".to_string())]);
    }

    #[test]
    fn test_malformed_payload_skipped() {
        let mut decoder = FrameDecoder::new();
        let events = decoder.feed(b"data: {broken\ndata: {\"content\":\"ok\"}\n");
        assert_eq!(
            events,
            vec![
                StreamEvent::Malformed("{broken".to_string()),
                StreamEvent::Delta("ok".to_string()),
            ]
        );
    }

    #[test]
    fn test_payload_missing_content_field_is_malformed() {
        let mut decoder = FrameDecoder::new();
        let events = decoder.feed(b"data: {\"other\":1}\n");
        assert_eq!(events, vec![StreamEvent::Malformed("{\"other\":1}".to_string())]);
    }

    #[test]
    fn test_finish_flushes_unterminated_line() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"data: {\"content\":\"tail\"}").is_empty());
        let events = decoder.finish();
        assert_eq!(events, vec![StreamEvent::Delta("tail".to_string())]);
    }

    #[test]
    fn test_finish_with_done_sentinel() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"data: [DONE]").is_empty());
        assert_eq!(decoder.finish(), vec![StreamEvent::Done]);
    }

    #[test]
    fn test_empty_chunk() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"").is_empty());
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut decoder = FrameDecoder::new();
        let events = decoder.feed(b"data: {\"content\":\"Hi\"}\r\n");
        assert_eq!(events, vec![StreamEvent::Delta("Hi".to_string())]);
    }
}
