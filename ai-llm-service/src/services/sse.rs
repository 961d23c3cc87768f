//! Incremental decoder for OpenAI-style server-sent events.
//!
//! The chat completions endpoint streams lines of the form
//! `data: {"choices":[{"delta":{"content":"..."}}]}` separated by blank lines
//! and terminated by `data: [DONE]`. Network chunks may cut a line (or a UTF-8
//! sequence) anywhere, so bytes are buffered until a full line is available.

use serde::Deserialize;
use serde_json::Value;

use crate::error_handler::{ProviderError, make_snippet};

/// One meaningful event extracted from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// A non-empty text fragment.
    Delta(String),
    /// The provider signalled the end of the completion.
    Done,
    /// The provider reported an error payload inside the stream.
    Error(String),
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
    saw_data: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` once at least one `data:` line has been decoded.
    pub fn saw_data(&self) -> bool {
        self.saw_data
    }

    /// Feeds raw bytes and returns every event completed by them, in order.
    ///
    /// # Errors
    /// [`ProviderError::Decode`] when a complete line is not valid UTF-8 or its
    /// `data:` payload is not the expected JSON.
    pub fn push(&mut self, bytes: &[u8]) -> Result<Vec<SseEvent>, ProviderError> {
        self.buf.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            self.saw_data |= line.starts_with(b"data:");
            if let Some(ev) = decode_line(&line[..pos])? {
                events.push(ev);
            }
        }
        Ok(events)
    }

    /// Flushes a trailing line that was not newline-terminated.
    pub fn finish(&mut self) -> Result<Vec<SseEvent>, ProviderError> {
        if self.buf.is_empty() {
            return Ok(Vec::new());
        }
        let line = std::mem::take(&mut self.buf);
        self.saw_data |= line.starts_with(b"data:");
        Ok(decode_line(&line)?.into_iter().collect())
    }
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Option<StreamDelta>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

fn decode_line(raw: &[u8]) -> Result<Option<SseEvent>, ProviderError> {
    let line = std::str::from_utf8(raw)
        .map_err(|e| ProviderError::Decode(format!("stream line is not UTF-8: {e}")))?;
    let line = line.strip_suffix('\r').unwrap_or(line);

    // Comments (`: keep-alive`), `event:`/`id:` fields, and blank separators.
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(None);
    };
    let data = data.strip_prefix(' ').unwrap_or(data);

    if data.trim() == "[DONE]" {
        return Ok(Some(SseEvent::Done));
    }
    if data.trim().is_empty() {
        return Ok(None);
    }

    let chunk: StreamChunk = serde_json::from_str(data).map_err(|e| {
        ProviderError::Decode(format!(
            "serde error: {e}; expected `choices[0].delta.content` in `{}`",
            make_snippet(data)
        ))
    })?;

    if let Some(err) = chunk.error {
        let message = err
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        return Ok(Some(SseEvent::Error(message)));
    }

    let content = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta)
        .and_then(|d| d.content)
        .filter(|c| !c.is_empty());

    Ok(content.map(SseEvent::Delta))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(s: &str) -> SseEvent {
        SseEvent::Delta(s.to_string())
    }

    #[test]
    fn decodes_deltas_and_done() {
        let mut dec = SseDecoder::new();
        let events = dec
            .push(
                b"data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n\
                  data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n\
                  data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n\
                  data: [DONE]\n\n",
            )
            .unwrap();
        assert_eq!(events, vec![delta("Hi"), SseEvent::Done]);
    }

    #[test]
    fn lines_split_across_chunks() {
        let mut dec = SseDecoder::new();
        assert!(dec.push(b"data: {\"choices\":[{\"del").unwrap().is_empty());
        assert!(dec.push(b"ta\":{\"content\":\"caf").unwrap().is_empty());
        // "é" is 0xC3 0xA9; cut it in half.
        assert!(dec.push(&[0xC3]).unwrap().is_empty());
        let events = dec.push(&[0xA9, b'"', b'}', b'}', b']', b'}', b'\r', b'\n']).unwrap();
        assert_eq!(events, vec![delta("café")]);
    }

    #[test]
    fn comments_and_other_fields_are_ignored() {
        let mut dec = SseDecoder::new();
        let events = dec
            .push(b": keep-alive\nevent: message\nid: 3\n\ndata: [DONE]\n")
            .unwrap();
        assert_eq!(events, vec![SseEvent::Done]);
    }

    #[test]
    fn error_payload_becomes_error_event() {
        let mut dec = SseDecoder::new();
        let events = dec
            .push(b"data: {\"error\":{\"message\":\"overloaded\",\"type\":\"server_error\"}}\n")
            .unwrap();
        assert_eq!(events, vec![SseEvent::Error("overloaded".into())]);
    }

    #[test]
    fn garbage_payload_is_a_decode_error() {
        let mut dec = SseDecoder::new();
        let err = dec.push(b"data: {not json}\n").unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }

    #[test]
    fn finish_flushes_unterminated_line() {
        let mut dec = SseDecoder::new();
        assert!(dec.push(b"data: {\"choices\":[{\"delta\":{\"content\":\"end\"}}]}").unwrap().is_empty());
        assert_eq!(dec.finish().unwrap(), vec![delta("end")]);
        assert!(dec.finish().unwrap().is_empty());
    }

    #[test]
    fn plain_json_body_has_no_data_lines() {
        let mut dec = SseDecoder::new();
        let events = dec
            .push(b"{\"choices\":[{\"message\":{\"content\":\"Hi\"}}]}\n")
            .unwrap();
        assert!(events.is_empty());
        assert!(dec.finish().unwrap().is_empty());
        assert!(!dec.saw_data());

        let mut dec = SseDecoder::new();
        dec.push(b"data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n")
            .unwrap();
        assert!(dec.saw_data());
    }
}
