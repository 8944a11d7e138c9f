use crate::domain::transaction::{Transaction, TransactionRecord};
use crate::error::{Result, RuleError};
use std::io::Read;

/// Reads loyalty transactions from a CSV source with `date, amount, status` columns.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<Transaction>`.
/// Rows missing a date or amount are rejected here, before they can reach
/// classification.
pub struct TransactionReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> TransactionReader<R> {
    /// Creates a new `TransactionReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and validates transactions.
    pub fn transactions(self) -> impl Iterator<Item = Result<Transaction>> {
        self.reader.into_deserialize().map(|result| -> Result<Transaction> {
            let record: TransactionRecord = result.map_err(RuleError::from)?;
            Transaction::try_from(record)
        })
    }
}
