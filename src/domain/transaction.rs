use crate::error::RuleError;
use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome of a transaction as far as loyalty scoring is concerned.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[default]
    Success,
    Failed,
}

/// A single customer purchase considered by the loyalty rules.
///
/// `status` is the only mutable part: the classification pass may flip it to
/// `Failed`, and an operator may set it to `Failed` by hand beforehand.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Transaction {
    pub date: NaiveDate,
    pub amount: Decimal,
    #[serde(default)]
    pub status: TransactionStatus,
}

impl Transaction {
    pub fn new(date: NaiveDate, amount: Decimal) -> Self {
        Self {
            date,
            amount,
            status: TransactionStatus::Success,
        }
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_failed(&self) -> bool {
        self.status == TransactionStatus::Failed
    }

    /// Saturday or Sunday.
    pub fn is_weekend(&self) -> bool {
        matches!(self.date.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

/// Raw transaction row as it arrives from an ingestion source.
///
/// Date and amount are optional here so that a missing field can be rejected
/// with a domain error instead of a parse error.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct TransactionRecord {
    pub date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub status: Option<TransactionStatus>,
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = RuleError;

    fn try_from(record: TransactionRecord) -> Result<Self, Self::Error> {
        let date = record
            .date
            .ok_or_else(|| RuleError::InvalidTransaction("missing date".to_string()))?;
        let amount = record
            .amount
            .ok_or_else(|| RuleError::InvalidTransaction("missing amount".to_string()))?;

        Ok(Self {
            date,
            amount,
            status: record.status.unwrap_or_default(),
        })
    }
}
