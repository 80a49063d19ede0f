pub mod amount_reader;
pub mod payout_writer;
