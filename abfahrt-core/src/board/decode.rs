//! Streaming stationboard decoder
//!
//! Consumes tokenizer events through a [`PathTracker`], recognizes a fixed
//! set of leaf suffixes, and accumulates one [`Departure`] at a time. The
//! destination value is always the last interesting leaf of an entry, so its
//! arrival emits the record and resets the accumulator.
//!
//! Syntactic JSON errors surface as `Err` from `feed`; the caller stops
//! feeding and keeps whatever records were already emitted.

use core::fmt::Write;

use heapless::String;

use super::types::{
    Departure, DEST_KEEP_CHARS, DEST_MAX_CHARS, ELLIPSIS, MAX_STATION_LEN, NUMBER_DISCARD_MIN,
};
use crate::json::{JsonError, JsonEvent, PathTracker, Tokenizer};

/// Output of the decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeEvent {
    /// The top-level station name; emitted once per document (first-write-wins)
    Station(String<MAX_STATION_LEN>),
    /// A completed departure record, in document order
    Departure(Departure),
}

/// Push-based stationboard decoder
///
/// Stateful across calls; `reset()` begins a new document without
/// reconstructing the object, and a rerun over identical input produces
/// identical output.
#[derive(Debug, Default)]
pub struct BoardDecoder {
    tokenizer: Tokenizer,
    path: PathTracker,
    current: Departure,
    station_seen: bool,
}

impl BoardDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for a new document; no prior state leaks into the next run
    pub fn reset(&mut self) {
        self.tokenizer.reset();
        self.path.reset();
        self.current = Departure::default();
        self.station_seen = false;
    }

    /// Feed one byte of the JSON document
    ///
    /// Returns a completed record or the station name when this byte
    /// finishes one, `None` otherwise.
    pub fn feed(&mut self, byte: u8) -> Result<Option<DecodeEvent>, JsonError> {
        self.tokenizer.feed(byte)?;
        let mut out = None;
        while let Some(event) = self.tokenizer.next_event() {
            if let JsonEvent::Scalar(value) = &event {
                if let Some(emitted) = self.on_scalar(value) {
                    out = Some(emitted);
                }
            }
            self.path.observe(&event);
        }
        Ok(out)
    }

    /// Handle one scalar leaf at the tracker's current path
    fn on_scalar(&mut self, value: &str) -> Option<DecodeEvent> {
        let mut out = None;

        if !self.station_seen && self.path.matches("/station/name") {
            self.station_seen = true;
            let mut station = String::new();
            push_clipped(&mut station, value);
            out = Some(DecodeEvent::Station(station));
        }

        // Suffix chain in original document-field order. Note "/station/name"
        // also matches the "/name" suffix, so the station name lands in the
        // accumulator's name field too; the first real entry overwrites it.
        if self.path.matches_suffix("/stop/departure") {
            self.current.departure.clear();
            let _ = self.current.departure.push_str(extract_time(value));
        } else if self.path.matches_suffix("/stop/delay") {
            self.current.delay.clear();
            push_clipped(&mut self.current.delay, value);
        } else if self.path.matches_suffix("/name") {
            self.current.name.clear();
            push_clipped(&mut self.current.name, value);
        } else if self.path.matches_suffix("/category") {
            self.current.category.clear();
            push_clipped(&mut self.current.category, value);
        } else if self.path.matches_suffix("/number") {
            if value != "null" {
                self.current.number.clear();
                // Unparsable or implausibly large codes stay empty
                if let Ok(n) = value.parse::<i64>() {
                    if n < NUMBER_DISCARD_MIN {
                        let _ = write!(self.current.number, "{}", n);
                    }
                }
            }
        } else if self.path.matches_suffix("/to") {
            self.current.destination = clip_destination(value);
            out = Some(DecodeEvent::Departure(core::mem::take(&mut self.current)));
        }

        out
    }
}

/// Extract "HH:MM" from an ISO-8601 timestamp, empty if too short
fn extract_time(iso: &str) -> &str {
    if iso.len() >= 16 {
        iso.get(11..16).unwrap_or("")
    } else {
        ""
    }
}

/// Cap a destination at DEST_MAX_CHARS chars, marking truncation
fn clip_destination<const N: usize>(value: &str) -> String<N> {
    let mut dest = String::new();
    if value.chars().count() > DEST_MAX_CHARS {
        for c in value.chars().take(DEST_KEEP_CHARS) {
            let _ = dest.push(c);
        }
        let _ = dest.push_str(ELLIPSIS);
    } else {
        push_clipped(&mut dest, value);
    }
    dest
}

/// Append as much of `value` as fits, never splitting a char
fn push_clipped<const N: usize>(buf: &mut String<N>, value: &str) {
    for c in value.chars() {
        if buf.push(c).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "station": {"id": "8505000", "name": "Luzern"},
        "stationboard": [
            {
                "stop": {
                    "departure": "2024-03-01T18:07:00+0100",
                    "delay": "2"
                },
                "name": "S1 18738",
                "category": "S",
                "number": "1",
                "to": "Sursee"
            },
            {
                "stop": {
                    "departure": "2024-03-01T18:10:00+0100",
                    "delay": "0"
                },
                "name": "IR 2475",
                "category": "IR",
                "number": "null",
                "to": "ThisIsAVeryLongDestinationName"
            }
        ]
    }"#;

    fn run(decoder: &mut BoardDecoder, doc: &str) -> std::vec::Vec<DecodeEvent> {
        let mut events = std::vec::Vec::new();
        for &b in doc.as_bytes() {
            if let Some(ev) = decoder.feed(b).unwrap() {
                events.push(ev);
            }
        }
        events
    }

    #[test]
    fn test_one_record_per_destination() {
        let mut decoder = BoardDecoder::new();
        let events = run(&mut decoder, SAMPLE);

        let departures: std::vec::Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                DecodeEvent::Departure(d) => Some(d),
                _ => None,
            })
            .collect();
        assert_eq!(departures.len(), 2);

        assert_eq!(departures[0].departure, "18:07");
        assert_eq!(departures[0].delay, "2");
        assert_eq!(departures[0].category, "S");
        assert_eq!(departures[0].number, "1");
        assert_eq!(departures[0].destination, "Sursee");
    }

    #[test]
    fn test_station_name_first_write_wins() {
        let mut decoder = BoardDecoder::new();
        let events = run(&mut decoder, SAMPLE);
        let stations: std::vec::Vec<_> = events
            .iter()
            .filter(|e| matches!(e, DecodeEvent::Station(_)))
            .collect();
        assert_eq!(stations.len(), 1);
        assert_eq!(*stations[0], DecodeEvent::Station("Luzern".try_into().unwrap()));
    }

    #[test]
    fn test_long_destination_truncated_to_25_chars() {
        let mut decoder = BoardDecoder::new();
        let events = run(&mut decoder, SAMPLE);
        let last = events.last().unwrap();
        let DecodeEvent::Departure(d) = last else {
            panic!("expected departure");
        };
        assert_eq!(d.destination, "ThisIsAVeryLongDestina...");
        assert_eq!(d.destination.chars().count(), 25);
    }

    #[test]
    fn test_number_heuristics() {
        let doc = |number: &str| {
            let mut s = std::string::String::new();
            core::fmt::Write::write_fmt(
                &mut s,
                format_args!(r#"{{"stationboard":[{{"number":{},"to":"X"}}]}}"#, number),
            )
            .unwrap();
            s
        };

        for (raw, expected) in [
            (r#""1200""#, ""),
            (r#""7""#, "7"),
            ("null", ""),
            (r#""007""#, "7"),
            (r#""S2""#, ""),
        ] {
            let mut decoder = BoardDecoder::new();
            let events = run(&mut decoder, &doc(raw));
            let DecodeEvent::Departure(d) = &events[0] else {
                panic!("expected departure");
            };
            assert_eq!(d.number, expected, "number {:?}", raw);
        }
    }

    #[test]
    fn test_short_departure_timestamp_yields_empty() {
        let doc = r#"{"stationboard":[{"stop":{"departure":"18:07"},"to":"X"}]}"#;
        let mut decoder = BoardDecoder::new();
        let events = run(&mut decoder, doc);
        let DecodeEvent::Departure(d) = &events[0] else {
            panic!("expected departure");
        };
        assert_eq!(d.departure, "");
    }

    #[test]
    fn test_fields_do_not_leak_across_reset_boundary() {
        // First record has a delay, second has none; the emitted second
        // record must not inherit it.
        let doc = r#"{"stationboard":[
            {"stop":{"departure":"2024-03-01T18:07:00+0100","delay":"5"},"to":"A"},
            {"stop":{"departure":"2024-03-01T18:10:00+0100"},"to":"B"}
        ]}"#;
        let mut decoder = BoardDecoder::new();
        let events = run(&mut decoder, doc);
        let DecodeEvent::Departure(second) = &events[1] else {
            panic!("expected departure");
        };
        assert_eq!(second.destination, "B");
        assert_eq!(second.delay, "");
    }

    #[test]
    fn test_rerun_after_reset_is_identical() {
        let mut decoder = BoardDecoder::new();
        let first = run(&mut decoder, SAMPLE);
        decoder.reset();
        let second = run(&mut decoder, SAMPLE);
        assert_eq!(first, second);
    }

    #[test]
    fn test_tokenizer_error_keeps_emitted_records() {
        let doc = r#"{"stationboard":[{"to":"Sursee"},{"to":@"#;
        let mut decoder = BoardDecoder::new();
        let mut departures = 0;
        let mut failed = false;
        for &b in doc.as_bytes() {
            match decoder.feed(b) {
                Ok(Some(DecodeEvent::Departure(_))) => departures += 1,
                Ok(_) => {}
                Err(_) => {
                    failed = true;
                    break;
                }
            }
        }
        assert!(failed);
        assert_eq!(departures, 1);
    }
}
