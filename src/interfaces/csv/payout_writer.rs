use crate::domain::payout::PayoutComputation;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct PayoutRow<'a> {
    team_id: &'a str,
    recorded_amount: Decimal,
    before_processing: Decimal,
    processing_fee: Decimal,
    organizer_fee: Decimal,
    participant_take_home: Decimal,
}

/// Writes payout summaries as CSV, one row per team, rounded for presentation.
pub struct PayoutWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> PayoutWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write(&mut self, team_id: &str, payout: &PayoutComputation) -> Result<()> {
        let shown = payout.rounded();
        self.writer.serialize(PayoutRow {
            team_id,
            recorded_amount: shown.recorded_amount,
            before_processing: shown.before_processing,
            processing_fee: shown.processing_fee_amount,
            organizer_fee: shown.organizer_fee_amount,
            participant_take_home: shown.participant_take_home,
        })?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
