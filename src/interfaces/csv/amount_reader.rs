use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::io::Read;

/// One administrator entry: the net amount received for a team.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct RecordedAmountRow {
    pub team_id: String,
    #[serde(default, deserialize_with = "optional_decimal")]
    pub recorded_amount: Option<Decimal>,
}

/// Parses the amount from its text form so no value ever passes through a float.
fn optional_decimal<'de, D>(deserializer: D) -> std::result::Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => Decimal::from_str_exact(text)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Reads recorded amounts from a CSV source with a `team_id, recorded_amount` header.
///
/// Whitespace is trimmed and short rows are tolerated; an empty amount means
/// "nothing received yet".
pub struct RecordedAmountReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> RecordedAmountReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes rows, so large files are streamed.
    pub fn rows(self) -> impl Iterator<Item = Result<RecordedAmountRow>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(PaymentError::from))
    }
}
