//! Incremental re-framing of the upstream completion stream
//!
//! Upstream chunks are arbitrary byte slices with no alignment to
//! logical event boundaries. [`LineFramer`] owns the per-request buffer:
//! each chunk appends, complete lines split off in order, and the
//! trailing partial line stays buffered for the next chunk. Sentinel and
//! blank lines are dropped; every other line parses into one
//! [`CompletionEvent`].

use super::types::{CompletionEvent, EventChoice, EventDelta, UpstreamChunk};

/// Stream-termination sentinel
pub const DONE_SENTINEL: &str = "data: [DONE]";
/// Keep-alive comment line
pub const KEEP_ALIVE_SENTINEL: &str = ": keep-alive";

const DATA_PREFIX: &str = "data: ";
const THINK_MARKER: &str = "<think>";

/// Per-request line reassembly buffer
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: String,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one upstream chunk and drain every complete line from the
    /// buffer, in arrival order. The delimiter is not included.
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        self.buffer.push_str(chunk);

        let mut lines = Vec::new();
        while let Some(newline) = self.buffer.find('\n') {
            let line = self.buffer[..newline].to_string();
            self.buffer = self.buffer[newline + 1..].to_string();
            lines.push(line);
        }
        lines
    }

    /// Consume the framer at end-of-stream, yielding any non-blank
    /// unterminated remainder for a best-effort final parse.
    pub fn finish(self) -> Option<String> {
        if self.buffer.trim().is_empty() {
            None
        } else {
            Some(self.buffer)
        }
    }
}

/// Build the event for one extracted line.
///
/// Returns `None` for blank, termination, and keep-alive lines, and for
/// lines that fail to parse — those are logged and skipped without
/// touching the rest of the stream.
pub fn event_from_line(line: &str, reasoning: bool) -> Option<CompletionEvent> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed == DONE_SENTINEL || trimmed == KEEP_ALIVE_SENTINEL {
        return None;
    }

    let data = trimmed.strip_prefix(DATA_PREFIX).unwrap_or(trimmed);
    let chunk: UpstreamChunk = match serde_json::from_str(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            tracing::warn!(error = %e, line = trimmed, "skipping malformed stream line");
            return None;
        }
    };

    let content = chunk
        .choices
        .first()
        .and_then(|choice| choice.delta.content.clone())
        .unwrap_or_default();

    // Channel routing is decided per delta by its leading characters
    // alone; there is no sticky thinking mode.
    let delta = if reasoning {
        if content.starts_with(THINK_MARKER) {
            EventDelta {
                content: String::new(),
                reasoning_content: Some(content),
            }
        } else {
            EventDelta {
                content,
                reasoning_content: Some(String::new()),
            }
        }
    } else {
        EventDelta {
            content,
            reasoning_content: None,
        }
    };

    Some(CompletionEvent {
        id: chunk.id,
        choices: vec![EventChoice { delta }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta_line(id: &str, content: &str) -> String {
        format!(r#"data: {{"id":"{id}","choices":[{{"delta":{{"content":"{content}"}}}}]}}"#)
    }

    #[test]
    fn lines_are_identical_regardless_of_chunk_boundaries() {
        let input = "data: {\"a\":1}\ndata: {\"a\":2}\n";

        let mut whole = LineFramer::new();
        let whole_lines = whole.push(input);

        let mut split = LineFramer::new();
        let mut split_lines = Vec::new();
        for byte in input.bytes() {
            let chunk = (byte as char).to_string();
            split_lines.extend(split.push(&chunk));
        }

        assert_eq!(whole_lines, split_lines);
        assert_eq!(whole_lines, vec!["data: {\"a\":1}", "data: {\"a\":2}"]);
        assert!(whole.finish().is_none());
        assert!(split.finish().is_none());
    }

    #[test]
    fn partial_line_stays_buffered_until_terminated() {
        let mut framer = LineFramer::new();
        assert!(framer.push("data: {\"id\":").is_empty());
        assert!(framer.push("\"x\"}").is_empty());
        assert_eq!(framer.push("\ndata: "), vec!["data: {\"id\":\"x\"}"]);
    }

    #[test]
    fn finish_yields_unterminated_remainder() {
        let mut framer = LineFramer::new();
        framer.push("{\"id\":\"tail\"}");
        assert_eq!(framer.finish().as_deref(), Some("{\"id\":\"tail\"}"));

        let mut blank = LineFramer::new();
        blank.push("   ");
        assert!(blank.finish().is_none());
    }

    #[test]
    fn sentinels_and_blanks_produce_no_event() {
        for line in ["", "   ", "data: [DONE]", "  data: [DONE]  ", ": keep-alive"] {
            assert!(event_from_line(line, false).is_none());
            assert!(event_from_line(line, true).is_none());
        }
    }

    #[test]
    fn malformed_lines_are_skipped_without_stopping() {
        let lines = [
            delta_line("1", "one"),
            "data: {\"truncated\":".to_string(),
            delta_line("2", "two"),
        ];

        let events: Vec<_> = lines
            .iter()
            .filter_map(|line| event_from_line(line, false))
            .collect();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, "1");
        assert_eq!(events[1].id, "2");
    }

    #[test]
    fn emitted_count_matches_lines_minus_discards() {
        let lines = [
            delta_line("1", "a"),
            String::new(),
            DONE_SENTINEL.to_string(),
            KEEP_ALIVE_SENTINEL.to_string(),
            "not json".to_string(),
            delta_line("2", "b"),
        ];
        let emitted = lines
            .iter()
            .filter_map(|line| event_from_line(line, false))
            .count();
        // 6 lines - 1 blank - 2 sentinels - 1 malformed
        assert_eq!(emitted, 2);
    }

    #[test]
    fn reasoning_split_is_per_event() {
        let think = event_from_line(&delta_line("1", "<think>partial"), true).unwrap();
        let delta = &think.choices[0].delta;
        assert_eq!(delta.content, "");
        assert_eq!(delta.reasoning_content.as_deref(), Some("<think>partial"));

        let answer = event_from_line(&delta_line("2", "answer text"), true).unwrap();
        let delta = &answer.choices[0].delta;
        assert_eq!(delta.content, "answer text");
        assert_eq!(delta.reasoning_content.as_deref(), Some(""));

        // a later delta starting mid-thought is still content: routing
        // never latches
        let mid = event_from_line(&delta_line("3", "still thinking"), true).unwrap();
        assert_eq!(mid.choices[0].delta.content, "still thinking");
    }

    #[test]
    fn non_reasoning_models_never_emit_the_channel() {
        let event = event_from_line(&delta_line("1", "<think>looks like thought"), false).unwrap();
        let delta = &event.choices[0].delta;
        assert_eq!(delta.content, "<think>looks like thought");
        assert!(delta.reasoning_content.is_none());
    }

    #[test]
    fn prefix_is_optional() {
        let bare = r#"{"id":"raw","choices":[{"delta":{"content":"x"}}]}"#;
        let event = event_from_line(bare, false).unwrap();
        assert_eq!(event.id, "raw");
        assert_eq!(event.choices[0].delta.content, "x");
    }

    #[test]
    fn empty_delta_still_emits_an_event() {
        let event = event_from_line(r#"data: {"id":"keep"}"#, false).unwrap();
        assert_eq!(event.id, "keep");
        assert_eq!(event.choices[0].delta.content, "");
    }
}
