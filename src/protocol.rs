// MIT License - Copyright (c) 2026 The dahua-cam Authors

use tracing::warn;

use crate::constants::{CRLF, EVENT_LINE_PREFIX, MAX_PENDING_LINE};
use crate::event::AlarmEvent;

/// CGI endpoints used by the client, rendered relative to `/cgi-bin/`.
///
/// # Event attach
///
/// `eventManager.cgi?action=attach&codes=[A,B,...]` is answered with a
/// `multipart/x-mixed-replace` body that never ends on its own. Each part
/// carries one or more CRLF-terminated lines of the form
///
/// ```text
/// Code=VideoMotion;action=Start;index=0
/// ```
///
/// interleaved with boundary and part-header lines, which are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `eventManager.cgi?action=attach&codes=[...]` — persistent event stream.
    AttachEvents { codes: Vec<String> },
    /// `magicBox.cgi?action=getMachineName` — answers `name=<value>`.
    MachineName,
    /// `snapshot.cgi?<channel>` — answers a JPEG. The channel text is used verbatim.
    Snapshot { channel: String },
}

impl Endpoint {
    /// Path and query relative to the CGI prefix.
    pub fn to_path(&self) -> String {
        match self {
            Self::AttachEvents { codes } => {
                format!("eventManager.cgi?action=attach&codes=[{}]", codes.join(","))
            }
            Self::MachineName => "magicBox.cgi?action=getMachineName".to_string(),
            Self::Snapshot { channel } => format!("snapshot.cgi?{}", channel),
        }
    }
}

/// Extract the value after the first `=` in a `key=value` body.
///
/// Trailing line terminators are stripped. Returns `None` when there is no `=`.
pub fn parse_value_after_eq(data: &str) -> Option<&str> {
    data.split_once('=')
        .map(|(_, value)| value.trim_end_matches(['\r', '\n']))
}

/// Parse one event line into an alarm record.
///
/// Lines that do not start with `Code=` yield `None`. Missing segments
/// become empty strings.
pub fn parse_event_line(line: &str) -> Option<AlarmEvent> {
    if !line.starts_with(EVENT_LINE_PREFIX) {
        return None;
    }
    let mut values = line
        .split(';')
        .map(|segment| segment.split_once('=').map(|(_, v)| v).unwrap_or_default());
    let code = values.next().unwrap_or_default();
    let action = values.next().unwrap_or_default();
    let index = values.next().unwrap_or_default();
    Some(AlarmEvent::new(code, action, index))
}

/// Parse a self-contained chunk of stream text into alarm records, in order.
///
/// Every CRLF-separated piece is considered, including an unterminated
/// trailing one. Use [`EventLineDecoder`] when records may straddle chunks.
pub fn parse_event_chunk(chunk: &str) -> Vec<AlarmEvent> {
    chunk.split(CRLF).filter_map(parse_event_line).collect()
}

/// Incremental decoder for the event stream.
///
/// Bytes are buffered until a CRLF completes a line, so records split across
/// network reads are reassembled before parsing.
#[derive(Debug, Default)]
pub struct EventLineDecoder {
    pending: Vec<u8>,
    /// Prefix of `pending` already known to hold no CRLF
    scanned: usize,
}

impl EventLineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every alarm completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<AlarmEvent> {
        self.pending.extend_from_slice(chunk);

        let mut events = Vec::new();
        let mut start = 0;
        // Step back one byte so a CR ending the previous chunk still pairs.
        let mut from = self.scanned.saturating_sub(1);
        while let Some(pos) = find_crlf(&self.pending[from..]) {
            let end = from + pos;
            let line = String::from_utf8_lossy(&self.pending[start..end]);
            if let Some(event) = parse_event_line(&line) {
                events.push(event);
            }
            start = end + CRLF.len();
            from = start;
        }
        self.pending.drain(..start);
        self.scanned = self.pending.len();

        if self.pending.len() > MAX_PENDING_LINE {
            warn!(
                "Discarding {} bytes of unterminated event stream data",
                self.pending.len()
            );
            self.pending.clear();
            self.scanned = 0;
        }

        events
    }

    /// Parse whatever is left once the stream has closed.
    pub fn finish(&mut self) -> Option<AlarmEvent> {
        let rest = std::mem::take(&mut self.pending);
        self.scanned = 0;
        parse_event_line(&String::from_utf8_lossy(&rest))
    }

    /// Bytes waiting for a line terminator.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

fn find_crlf(data: &[u8]) -> Option<usize> {
    data.windows(2).position(|w| w == b"\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_paths() {
        let codes = vec!["VideoMotion".to_string(), "VideoLoss".to_string()];
        assert_eq!(
            Endpoint::AttachEvents { codes }.to_path(),
            "eventManager.cgi?action=attach&codes=[VideoMotion,VideoLoss]"
        );
        assert_eq!(
            Endpoint::MachineName.to_path(),
            "magicBox.cgi?action=getMachineName"
        );
        assert_eq!(
            Endpoint::Snapshot { channel: "0".into() }.to_path(),
            "snapshot.cgi?0"
        );
        assert_eq!(
            Endpoint::Snapshot { channel: "channel=1".into() }.to_path(),
            "snapshot.cgi?channel=1"
        );
    }

    #[test]
    fn test_parse_value_after_eq() {
        assert_eq!(parse_value_after_eq("name=Garage Camera"), Some("Garage Camera"));
        assert_eq!(parse_value_after_eq("name=Garage Camera\r\n"), Some("Garage Camera"));
        assert_eq!(parse_value_after_eq("name=a=b"), Some("a=b"));
        assert_eq!(parse_value_after_eq("name="), Some(""));
        assert_eq!(parse_value_after_eq("noequals"), None);
    }

    #[test]
    fn test_single_event_chunk() {
        let events = parse_event_chunk("Code=VideoMotion;action=Start;index=0\r\n");
        assert_eq!(events, vec![AlarmEvent::new("VideoMotion", "Start", "0")]);
    }

    #[test]
    fn test_chunk_without_events() {
        let chunk = "--myboundary\r\nContent-Type: text/plain\r\nContent-Length: 36\r\n\r\n";
        assert!(parse_event_chunk(chunk).is_empty());
        assert!(parse_event_chunk("").is_empty());
        assert!(parse_event_chunk("code=VideoMotion;action=Start;index=0\r\n").is_empty());
        assert!(parse_event_chunk(" Code=VideoMotion;action=Start;index=0\r\n").is_empty());
    }

    #[test]
    fn test_multiple_events_in_order() {
        let chunk = "--myboundary\r\n\
                     Content-Type: text/plain\r\n\
                     \r\n\
                     Code=VideoMotion;action=Start;index=0\r\n\
                     Code=VideoLoss;action=Stop;index=3\r\n\
                     heartbeat\r\n\
                     Code=AlarmLocal;action=Pulse;index=1\r\n";
        let events = parse_event_chunk(chunk);
        assert_eq!(
            events,
            vec![
                AlarmEvent::new("VideoMotion", "Start", "0"),
                AlarmEvent::new("VideoLoss", "Stop", "3"),
                AlarmEvent::new("AlarmLocal", "Pulse", "1"),
            ]
        );
    }

    #[test]
    fn test_short_and_long_lines() {
        assert_eq!(
            parse_event_line("Code=VideoBlind"),
            Some(AlarmEvent::new("VideoBlind", "", ""))
        );
        assert_eq!(
            parse_event_line("Code=CrossLineDetection;action=Start;index=0;data={\"a\":1}"),
            Some(AlarmEvent::new("CrossLineDetection", "Start", "0"))
        );
        assert_eq!(
            parse_event_line("Code=X;action;index=2"),
            Some(AlarmEvent::new("X", "", "2"))
        );
    }

    #[test]
    fn test_decoder_reassembles_split_records() {
        let mut decoder = EventLineDecoder::new();
        assert!(decoder.push(b"--myboundary\r\nCode=VideoMo").is_empty());
        assert_eq!(decoder.pending_len(), 12);
        assert!(decoder.push(b"tion;action=Start;index=0\r").is_empty());
        let events = decoder.push(b"\nCode=VideoMotion;action=Stop;index=0\r\n");
        assert_eq!(
            events,
            vec![
                AlarmEvent::new("VideoMotion", "Start", "0"),
                AlarmEvent::new("VideoMotion", "Stop", "0"),
            ]
        );
        assert_eq!(decoder.pending_len(), 0);
        assert!(decoder.finish().is_none());
    }

    #[test]
    fn test_decoder_byte_at_a_time() {
        let stream = b"--myboundary\r\n\r\nCode=VideoMotion;action=Start;index=0\r\nCode=VideoLoss;action=Stop;index=2\r\n";
        let mut decoder = EventLineDecoder::new();
        let mut events = Vec::new();
        for byte in stream.iter() {
            events.extend(decoder.push(std::slice::from_ref(byte)));
            // Bytes already searched are not searched again on the next push.
            assert_eq!(decoder.scanned, decoder.pending_len());
        }
        assert_eq!(
            events,
            vec![
                AlarmEvent::new("VideoMotion", "Start", "0"),
                AlarmEvent::new("VideoLoss", "Stop", "2"),
            ]
        );
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn test_decoder_flushes_trailing_line() {
        let mut decoder = EventLineDecoder::new();
        assert!(decoder.push(b"Code=VideoLoss;action=Start;index=1").is_empty());
        assert_eq!(
            decoder.finish(),
            Some(AlarmEvent::new("VideoLoss", "Start", "1"))
        );
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn test_decoder_drops_oversized_partial_line() {
        let mut decoder = EventLineDecoder::new();
        decoder.push(&vec![b'x'; MAX_PENDING_LINE + 1]);
        assert_eq!(decoder.pending_len(), 0);
        let events = decoder.push(b"\r\nCode=VideoMotion;action=Start;index=0\r\n");
        assert_eq!(events.len(), 1);
    }
}
