//! Price ticker decoding
//!
//! The price API returns `{ "data": { "amount": "<decimal string>" } }`;
//! only the integer portion is shown. Reuses the streaming tokenizer with an
//! exact path match instead of suffixes.

use heapless::String;

use crate::json::{JsonError, JsonEvent, PathTracker, Tokenizer};

/// Maximum extracted price length
pub const MAX_PRICE_LEN: usize = 16;

/// Push-based price decoder
///
/// The first scalar at `/data/amount` wins; everything else is ignored.
#[derive(Debug, Default)]
pub struct PriceDecoder {
    tokenizer: Tokenizer,
    path: PathTracker,
    amount: Option<String<MAX_PRICE_LEN>>,
}

impl PriceDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for a new document
    pub fn reset(&mut self) {
        self.tokenizer.reset();
        self.path.reset();
        self.amount = None;
    }

    /// Feed one byte of the JSON document
    pub fn feed(&mut self, byte: u8) -> Result<(), JsonError> {
        self.tokenizer.feed(byte)?;
        while let Some(event) = self.tokenizer.next_event() {
            if let JsonEvent::Scalar(value) = &event {
                if self.amount.is_none() && self.path.matches("/data/amount") {
                    let mut amount = String::new();
                    // Integer portion only
                    for c in value.chars().take_while(|c| c.is_ascii_digit()) {
                        if amount.push(c).is_err() {
                            break;
                        }
                    }
                    self.amount = Some(amount);
                }
            }
            self.path.observe(&event);
        }
        Ok(())
    }

    /// The extracted integer price, if the path was present
    pub fn amount(&self) -> Option<&str> {
        self.amount.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(doc: &str) -> PriceDecoder {
        let mut decoder = PriceDecoder::new();
        for &b in doc.as_bytes() {
            decoder.feed(b).unwrap();
        }
        decoder
    }

    #[test]
    fn test_integer_portion_extracted() {
        let decoder = run(r#"{"data":{"base":"BTC","amount":"65123.45"}}"#);
        assert_eq!(decoder.amount(), Some("65123"));
    }

    #[test]
    fn test_missing_path_yields_none() {
        let decoder = run(r#"{"data":{"base":"BTC"}}"#);
        assert_eq!(decoder.amount(), None);
    }

    #[test]
    fn test_amount_elsewhere_is_ignored() {
        let decoder = run(r#"{"other":{"amount":"1.00"},"data":{"amount":"42.5"}}"#);
        assert_eq!(decoder.amount(), Some("42"));
    }
}
