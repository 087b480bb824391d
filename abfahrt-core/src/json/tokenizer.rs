//! Byte-at-a-time streaming JSON tokenizer
//!
//! Feed one byte, collect zero or more structural/scalar events. The
//! tokenizer never buffers more than the current key or scalar text, so
//! memory use is independent of document size.
//!
//! Scalars are reported as verbatim text: the literal `null` arrives as the
//! string "null", which the stationboard decoder relies on. String escapes
//! (including `\uXXXX` and surrogate pairs) are decoded to UTF-8.

use heapless::{Deque, String, Vec};

/// Maximum length of an object key
pub const MAX_KEY_LEN: usize = 24;

/// Maximum length of a scalar value (longer text is truncated)
pub const MAX_SCALAR_LEN: usize = 96;

/// Maximum container nesting depth
pub const MAX_DEPTH: usize = 16;

/// Errors reported while tokenizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JsonError {
    /// Byte not valid in the current parse state
    UnexpectedByte,
    /// Container nesting exceeds MAX_DEPTH
    DepthExceeded,
    /// Malformed escape sequence in a string
    BadEscape,
    /// Non-whitespace input after the document ended
    TrailingData,
}

/// Structural and scalar events produced by the tokenizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonEvent {
    ObjectStart,
    ObjectEnd,
    ArrayStart,
    ArrayEnd,
    /// An object key (string before the colon)
    Key(String<MAX_KEY_LEN>),
    /// A scalar value as verbatim text (strings unescaped, literals as-is)
    Scalar(String<MAX_SCALAR_LEN>),
    /// The top-level value closed; nothing further is expected
    DocumentEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Expecting a value
    Value,
    /// Inside a string (key or scalar per `in_key`)
    InString,
    /// After a backslash inside a string
    Escape,
    /// Collecting the four hex digits of a \uXXXX escape
    Unicode,
    /// Inside a number
    InNumber,
    /// Inside true/false/null
    InLiteral,
    /// After a complete value, expecting `,` or a closing bracket
    AfterValue,
    /// Inside an object, expecting a key string or `}`
    ExpectKey,
    /// After a key string, expecting `:`
    AfterKey,
    /// Document complete
    Done,
}

/// Push-based JSON tokenizer
///
/// Stateful across calls; `reset()` begins a new document without
/// reconstructing the object.
#[derive(Debug)]
pub struct Tokenizer {
    state: ParseState,
    stack: Vec<Container, MAX_DEPTH>,
    events: Deque<JsonEvent, 4>,
    text: String<MAX_SCALAR_LEN>,
    in_key: bool,
    unicode_acc: u16,
    unicode_digits: u8,
    pending_high_surrogate: Option<u16>,
    utf8_partial: Vec<u8, 4>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    /// Create a new tokenizer
    pub fn new() -> Self {
        Self {
            state: ParseState::Value,
            stack: Vec::new(),
            events: Deque::new(),
            text: String::new(),
            in_key: false,
            unicode_acc: 0,
            unicode_digits: 0,
            pending_high_surrogate: None,
            utf8_partial: Vec::new(),
        }
    }

    /// Reset to the start of a new document
    pub fn reset(&mut self) {
        self.state = ParseState::Value;
        self.stack.clear();
        self.events.clear();
        self.text.clear();
        self.in_key = false;
        self.unicode_acc = 0;
        self.unicode_digits = 0;
        self.pending_high_surrogate = None;
        self.utf8_partial.clear();
    }

    /// Take the next queued event, if any
    ///
    /// A single byte can complete up to two events (a number terminated by a
    /// closing bracket), so callers drain this after every `feed`.
    pub fn next_event(&mut self) -> Option<JsonEvent> {
        self.events.pop_front()
    }

    /// Feed a single byte
    ///
    /// Queued events are retrieved with `next_event`. On error the caller is
    /// expected to stop feeding; the tokenizer makes no recovery attempt.
    pub fn feed(&mut self, byte: u8) -> Result<(), JsonError> {
        match self.state {
            ParseState::InString => self.feed_string(byte),
            ParseState::Escape => self.feed_escape(byte),
            ParseState::Unicode => self.feed_unicode(byte),
            ParseState::InNumber => self.feed_number(byte),
            ParseState::InLiteral => self.feed_literal(byte),
            ParseState::Value => self.feed_value(byte),
            ParseState::AfterValue => self.feed_after_value(byte),
            ParseState::ExpectKey => self.feed_expect_key(byte),
            ParseState::AfterKey => self.feed_after_key(byte),
            ParseState::Done => {
                if byte.is_ascii_whitespace() {
                    Ok(())
                } else {
                    Err(JsonError::TrailingData)
                }
            }
        }
    }

    fn push_event(&mut self, event: JsonEvent) {
        // Capacity 4 is never hit: one byte produces at most two events
        let _ = self.events.push_back(event);
    }

    fn push_char(&mut self, c: char) {
        // Overlong text is silently truncated
        let _ = self.text.push(c);
    }

    fn feed_value(&mut self, byte: u8) -> Result<(), JsonError> {
        match byte {
            b if b.is_ascii_whitespace() => Ok(()),
            b'{' => {
                self.stack
                    .push(Container::Object)
                    .map_err(|_| JsonError::DepthExceeded)?;
                self.push_event(JsonEvent::ObjectStart);
                self.state = ParseState::ExpectKey;
                Ok(())
            }
            b'[' => {
                self.stack
                    .push(Container::Array)
                    .map_err(|_| JsonError::DepthExceeded)?;
                self.push_event(JsonEvent::ArrayStart);
                self.state = ParseState::Value;
                Ok(())
            }
            // Empty array: `[` put us back in Value, `]` closes it directly
            b']' if self.stack.last() == Some(&Container::Array) => {
                self.close_container();
                Ok(())
            }
            b'"' => {
                self.text.clear();
                self.in_key = false;
                self.state = ParseState::InString;
                Ok(())
            }
            b'-' | b'0'..=b'9' => {
                self.text.clear();
                self.push_char(byte as char);
                self.state = ParseState::InNumber;
                Ok(())
            }
            b't' | b'f' | b'n' => {
                self.text.clear();
                self.push_char(byte as char);
                self.state = ParseState::InLiteral;
                Ok(())
            }
            _ => Err(JsonError::UnexpectedByte),
        }
    }

    fn feed_string(&mut self, byte: u8) -> Result<(), JsonError> {
        match byte {
            b'"' => {
                let text = core::mem::take(&mut self.text);
                if self.in_key {
                    let mut key = String::new();
                    for c in text.chars() {
                        if key.push(c).is_err() {
                            break;
                        }
                    }
                    self.push_event(JsonEvent::Key(key));
                    self.state = ParseState::AfterKey;
                } else {
                    self.push_event(JsonEvent::Scalar(text));
                    self.end_value();
                }
                Ok(())
            }
            b'\\' => {
                self.state = ParseState::Escape;
                Ok(())
            }
            _ => {
                if byte < 0x80 {
                    self.push_char(byte as char);
                } else {
                    self.push_raw(byte);
                }
                self.state = ParseState::InString;
                Ok(())
            }
        }
    }

    /// Accumulate one byte of a multi-byte UTF-8 sequence
    ///
    /// Unescaped non-ASCII text arrives byte by byte; complete sequences are
    /// appended, invalid ones dropped.
    fn push_raw(&mut self, byte: u8) {
        if self.utf8_partial.push(byte).is_err() {
            self.utf8_partial.clear();
            return;
        }
        match core::str::from_utf8(&self.utf8_partial) {
            Ok(s) => {
                if let Some(c) = s.chars().next() {
                    self.push_char(c);
                }
                self.utf8_partial.clear();
            }
            Err(e) if e.error_len().is_some() => {
                // Invalid sequence, not merely incomplete
                self.utf8_partial.clear();
            }
            Err(_) => {}
        }
    }

    fn feed_escape(&mut self, byte: u8) -> Result<(), JsonError> {
        let decoded = match byte {
            b'"' => Some('"'),
            b'\\' => Some('\\'),
            b'/' => Some('/'),
            b'b' => Some('\u{0008}'),
            b'f' => Some('\u{000C}'),
            b'n' => Some('\n'),
            b'r' => Some('\r'),
            b't' => Some('\t'),
            b'u' => None,
            _ => return Err(JsonError::BadEscape),
        };
        match decoded {
            Some(c) => {
                self.push_char(c);
                self.state = ParseState::InString;
            }
            None => {
                self.unicode_acc = 0;
                self.unicode_digits = 0;
                self.state = ParseState::Unicode;
            }
        }
        Ok(())
    }

    fn feed_unicode(&mut self, byte: u8) -> Result<(), JsonError> {
        let digit = match byte {
            b'0'..=b'9' => byte - b'0',
            b'a'..=b'f' => byte - b'a' + 10,
            b'A'..=b'F' => byte - b'A' + 10,
            _ => return Err(JsonError::BadEscape),
        };
        self.unicode_acc = (self.unicode_acc << 4) | digit as u16;
        self.unicode_digits += 1;
        if self.unicode_digits < 4 {
            return Ok(());
        }

        let unit = self.unicode_acc;
        match self.pending_high_surrogate.take() {
            Some(high) if (0xDC00..=0xDFFF).contains(&unit) => {
                let combined =
                    0x10000 + (((high as u32) - 0xD800) << 10) + ((unit as u32) - 0xDC00);
                if let Some(c) = char::from_u32(combined) {
                    self.push_char(c);
                }
            }
            _ => {
                if (0xD800..=0xDBFF).contains(&unit) {
                    self.pending_high_surrogate = Some(unit);
                } else if let Some(c) = char::from_u32(unit as u32) {
                    self.push_char(c);
                }
            }
        }
        self.state = ParseState::InString;
        Ok(())
    }

    fn feed_number(&mut self, byte: u8) -> Result<(), JsonError> {
        match byte {
            b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E' => {
                self.push_char(byte as char);
                Ok(())
            }
            _ => {
                // Number ends at the first non-number byte; that byte still
                // belongs to the enclosing structure.
                let text = core::mem::take(&mut self.text);
                self.push_event(JsonEvent::Scalar(text));
                self.end_value();
                self.feed(byte)
            }
        }
    }

    fn feed_literal(&mut self, byte: u8) -> Result<(), JsonError> {
        if byte.is_ascii_lowercase() {
            self.push_char(byte as char);
            return Ok(());
        }
        let text = core::mem::take(&mut self.text);
        if text != "true" && text != "false" && text != "null" {
            return Err(JsonError::UnexpectedByte);
        }
        self.push_event(JsonEvent::Scalar(text));
        self.end_value();
        self.feed(byte)
    }

    fn feed_after_value(&mut self, byte: u8) -> Result<(), JsonError> {
        match (byte, self.stack.last()) {
            (b, _) if b.is_ascii_whitespace() => Ok(()),
            (b',', Some(Container::Object)) => {
                self.state = ParseState::ExpectKey;
                Ok(())
            }
            (b',', Some(Container::Array)) => {
                self.state = ParseState::Value;
                Ok(())
            }
            (b'}', Some(Container::Object)) | (b']', Some(Container::Array)) => {
                self.close_container();
                Ok(())
            }
            _ => Err(JsonError::UnexpectedByte),
        }
    }

    fn feed_expect_key(&mut self, byte: u8) -> Result<(), JsonError> {
        match byte {
            b if b.is_ascii_whitespace() => Ok(()),
            b'"' => {
                self.text.clear();
                self.in_key = true;
                self.state = ParseState::InString;
                Ok(())
            }
            b'}' => {
                self.close_container();
                Ok(())
            }
            _ => Err(JsonError::UnexpectedByte),
        }
    }

    fn feed_after_key(&mut self, byte: u8) -> Result<(), JsonError> {
        match byte {
            b if b.is_ascii_whitespace() => Ok(()),
            b':' => {
                self.state = ParseState::Value;
                Ok(())
            }
            _ => Err(JsonError::UnexpectedByte),
        }
    }

    /// Transition after a complete scalar value
    fn end_value(&mut self) {
        self.state = if self.stack.is_empty() {
            self.push_event(JsonEvent::DocumentEnd);
            ParseState::Done
        } else {
            ParseState::AfterValue
        };
    }

    /// Pop the current container and emit its end event
    fn close_container(&mut self) {
        match self.stack.pop() {
            Some(Container::Object) => self.push_event(JsonEvent::ObjectEnd),
            Some(Container::Array) => self.push_event(JsonEvent::ArrayEnd),
            None => {}
        }
        if self.stack.is_empty() {
            self.push_event(JsonEvent::DocumentEnd);
            self.state = ParseState::Done;
        } else {
            self.state = ParseState::AfterValue;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn collect(input: &str) -> Vec<JsonEvent, 64> {
        let mut tok = Tokenizer::new();
        let mut events = Vec::new();
        for &b in input.as_bytes() {
            tok.feed(b).unwrap();
            while let Some(ev) = tok.next_event() {
                events.push(ev).unwrap();
            }
        }
        events
    }

    fn key(s: &str) -> JsonEvent {
        let mut k = String::new();
        k.push_str(s).unwrap();
        JsonEvent::Key(k)
    }

    fn scalar(s: &str) -> JsonEvent {
        let mut v = String::new();
        v.push_str(s).unwrap();
        JsonEvent::Scalar(v)
    }

    #[test]
    fn test_flat_object() {
        let events = collect(r#"{"name":"Luzern","limit":8}"#);
        assert_eq!(
            events.as_slice(),
            &[
                JsonEvent::ObjectStart,
                key("name"),
                scalar("Luzern"),
                key("limit"),
                scalar("8"),
                JsonEvent::ObjectEnd,
                JsonEvent::DocumentEnd,
            ]
        );
    }

    #[test]
    fn test_nested_array() {
        let events = collect(r#"{"stops":[{"delay":3},{"delay":null}]}"#);
        assert_eq!(
            events.as_slice(),
            &[
                JsonEvent::ObjectStart,
                key("stops"),
                JsonEvent::ArrayStart,
                JsonEvent::ObjectStart,
                key("delay"),
                scalar("3"),
                JsonEvent::ObjectEnd,
                JsonEvent::ObjectStart,
                key("delay"),
                scalar("null"),
                JsonEvent::ObjectEnd,
                JsonEvent::ArrayEnd,
                JsonEvent::ObjectEnd,
                JsonEvent::DocumentEnd,
            ]
        );
    }

    #[test]
    fn test_unicode_escape_decodes_to_utf8() {
        let events = collect(r#"{"to":"Zürich HB"}"#);
        assert_eq!(events[2], scalar("Zürich HB"));
    }

    #[test]
    fn test_surrogate_pair() {
        let events = collect(r#"{"e":"🚀"}"#);
        assert_eq!(events[2], scalar("\u{1F680}"));
    }

    #[test]
    fn test_plain_utf8_passthrough() {
        let events = collect("{\"to\":\"Genève\"}");
        assert_eq!(events[2], scalar("Genève"));
    }

    #[test]
    fn test_number_terminated_by_close() {
        // The `}` both ends the number and closes the object
        let events = collect(r#"{"n":42}"#);
        assert_eq!(events[2], scalar("42"));
        assert_eq!(events[3], JsonEvent::ObjectEnd);
    }

    #[test]
    fn test_empty_containers() {
        let events = collect(r#"{"a":[],"b":{}}"#);
        assert_eq!(
            events.as_slice(),
            &[
                JsonEvent::ObjectStart,
                key("a"),
                JsonEvent::ArrayStart,
                JsonEvent::ArrayEnd,
                key("b"),
                JsonEvent::ObjectStart,
                JsonEvent::ObjectEnd,
                JsonEvent::ObjectEnd,
                JsonEvent::DocumentEnd,
            ]
        );
    }

    #[test]
    fn test_garbage_is_error() {
        let mut tok = Tokenizer::new();
        assert_eq!(tok.feed(b'@'), Err(JsonError::UnexpectedByte));
    }

    #[test]
    fn test_trailing_data_is_error() {
        let mut tok = Tokenizer::new();
        for &b in b"{} " {
            tok.feed(b).unwrap();
        }
        assert_eq!(tok.feed(b'x'), Err(JsonError::TrailingData));
    }

    #[test]
    fn test_reset_clears_residual_state() {
        let mut tok = Tokenizer::new();
        for &b in br#"{"half":"open"#.iter() {
            tok.feed(b).unwrap();
        }
        tok.reset();
        let mut events = Vec::<JsonEvent, 8>::new();
        for &b in br#"{"a":1}"#.iter() {
            tok.feed(b).unwrap();
            while let Some(ev) = tok.next_event() {
                events.push(ev).unwrap();
            }
        }
        assert_eq!(events[1], key("a"));
        assert_eq!(events[2], scalar("1"));
    }

    proptest! {
        #[test]
        fn feed_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let mut tok = Tokenizer::new();
            for b in bytes {
                if tok.feed(b).is_err() {
                    break;
                }
                while tok.next_event().is_some() {}
            }
        }

        #[test]
        fn rerun_after_reset_is_identical(limit in 0u8..100, name in "[a-zA-Z ]{0,30}") {
            let mut doc = std::string::String::new();
            core::fmt::Write::write_fmt(
                &mut doc,
                format_args!(r#"{{"name":"{}","limit":{}}}"#, name, limit),
            ).unwrap();

            let mut tok = Tokenizer::new();
            let mut runs: [std::vec::Vec<JsonEvent>; 2] = [std::vec::Vec::new(), std::vec::Vec::new()];
            for run in runs.iter_mut() {
                tok.reset();
                for &b in doc.as_bytes() {
                    tok.feed(b).unwrap();
                    while let Some(ev) = tok.next_event() {
                        run.push(ev);
                    }
                }
            }
            prop_assert_eq!(&runs[0], &runs[1]);
        }
    }
}
