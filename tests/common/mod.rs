#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use loyalship::domain::transaction::{Transaction, TransactionStatus};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::io::Error;
use std::path::Path;

/// Random transactions spread over January 2024, about one in ten failed by hand.
pub fn random_transactions(seed: u64, rows: usize) -> Vec<Transaction> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    (0..rows)
        .map(|_| {
            let date = start + Days::new(rng.gen_range(0..31));
            let amount = match rng.gen_range(0..4) {
                0 => Decimal::from(rng.gen_range(-1000..=0)),
                1 => Decimal::from(rng.gen_range(1..=500_000)),
                _ => Decimal::from(rng.gen_range(500_001..=2_000_000)),
            };
            let status = if rng.gen_bool(0.1) {
                TransactionStatus::Failed
            } else {
                TransactionStatus::Success
            };
            Transaction::new(date, amount).with_status(status)
        })
        .collect()
}

pub fn write_transactions_csv(path: &Path, transactions: &[Transaction]) -> Result<(), Error> {
    let mut wtr = csv::WriterBuilder::new().from_path(path)?;
    wtr.write_record(["date", "amount", "status"])?;

    for tx in transactions {
        let status = match tx.status {
            TransactionStatus::Success => "",
            TransactionStatus::Failed => "failed",
        };
        wtr.write_record([tx.date.to_string(), tx.amount.to_string(), status.to_string()])?;
    }

    wtr.flush()?;
    Ok(())
}

/// `n` high-value weekday transactions, worth 5 points each.
pub fn high_value_weekdays(n: usize) -> Vec<Transaction> {
    // 2024-01-01 is a Monday; stay on Monday..Friday by skipping weekends.
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (0..n as u64)
        .map(|i| {
            let week = i / 5;
            let day = i % 5;
            let date = start + Days::new(week * 7 + day);
            Transaction::new(date, Decimal::from(600_000))
        })
        .collect()
}
