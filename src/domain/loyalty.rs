use crate::domain::transaction::{Transaction, TransactionStatus};
use crate::error::{Result, RuleError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Discount level granted for an accumulated point total.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountTier {
    #[default]
    None,
    Regular,
    Premium,
    SuperVip,
}

impl DiscountTier {
    pub fn discount_percent(&self) -> u8 {
        match self {
            DiscountTier::None => 0,
            DiscountTier::Regular => 5,
            DiscountTier::Premium => 10,
            DiscountTier::SuperVip => 20,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            DiscountTier::None => "NONE",
            DiscountTier::Regular => "REGULAR",
            DiscountTier::Premium => "PREMIUM",
            DiscountTier::SuperVip => "SUPER_VIP",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DiscountTier::None => "None (0%)",
            DiscountTier::Regular => "Regular (5%)",
            DiscountTier::Premium => "Premium (10%)",
            DiscountTier::SuperVip => "Super VIP (20%)",
        }
    }
}

/// Thresholds and point values used by classification, scoring and tiering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoyaltyRules {
    /// Amounts strictly above this are high value.
    pub high_value_threshold: Decimal,
    pub high_value_points: u32,
    pub weekend_points: u32,
    pub regular_threshold: u32,
    pub premium_threshold: u32,
    pub super_vip_threshold: u32,
}

impl Default for LoyaltyRules {
    fn default() -> Self {
        Self {
            high_value_threshold: dec!(500000),
            high_value_points: 5,
            weekend_points: 3,
            regular_threshold: 10,
            premium_threshold: 20,
            super_vip_threshold: 50,
        }
    }
}

/// Result of the scoring pass.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
pub struct LoyaltyScore {
    pub total_points: u32,
    pub max_discount: DiscountTier,
    pub high_value_count: u32,
}

impl LoyaltyRules {
    /// Tier thresholds must be strictly increasing for the tier to be a step function.
    pub fn validate(&self) -> Result<()> {
        if self.regular_threshold < self.premium_threshold
            && self.premium_threshold < self.super_vip_threshold
        {
            Ok(())
        } else {
            Err(RuleError::Config(format!(
                "tier thresholds must increase: regular={} premium={} super_vip={}",
                self.regular_threshold, self.premium_threshold, self.super_vip_threshold
            )))
        }
    }

    pub fn is_high_value(&self, tx: &Transaction) -> bool {
        tx.amount > self.high_value_threshold
    }

    /// Marks ineligible transactions as failed, in order.
    ///
    /// Transactions already failed are left alone. A weekend transaction with a
    /// non-positive amount is failed outright; otherwise a transaction that is
    /// neither high value nor on a weekend is failed. Returns how many
    /// transactions were flipped by this pass.
    pub fn classify(&self, transactions: &mut [Transaction]) -> usize {
        let mut flipped = 0;
        for tx in transactions.iter_mut() {
            if tx.is_failed() {
                continue;
            }

            let is_high_value = self.is_high_value(tx);
            let is_weekend = tx.is_weekend();

            if is_weekend && tx.amount <= Decimal::ZERO {
                tx.status = TransactionStatus::Failed;
                flipped += 1;
                continue;
            }

            if !is_high_value && !is_weekend {
                tx.status = TransactionStatus::Failed;
                flipped += 1;
            }
        }
        flipped
    }

    /// Sums non-cumulative points over the transactions that are not failed.
    ///
    /// Each transaction is worth the larger of its high-value points and its
    /// weekend points, never both.
    pub fn score(&self, transactions: &[Transaction]) -> LoyaltyScore {
        let mut total_points = 0;
        let mut high_value_count = 0;

        for tx in transactions.iter().filter(|tx| !tx.is_failed()) {
            let value_points = if self.is_high_value(tx) {
                high_value_count += 1;
                self.high_value_points
            } else {
                0
            };
            let weekend_points = if tx.is_weekend() {
                self.weekend_points
            } else {
                0
            };

            total_points += value_points.max(weekend_points);
        }

        LoyaltyScore {
            total_points,
            max_discount: self.tier_for(total_points),
            high_value_count,
        }
    }

    pub fn tier_for(&self, total_points: u32) -> DiscountTier {
        if total_points >= self.super_vip_threshold {
            DiscountTier::SuperVip
        } else if total_points >= self.premium_threshold {
            DiscountTier::Premium
        } else if total_points >= self.regular_threshold {
            DiscountTier::Regular
        } else {
            DiscountTier::None
        }
    }

    /// Classification followed by scoring over the same transactions.
    pub fn analyze(&self, transactions: &mut [Transaction]) -> LoyaltyScore {
        self.classify(transactions);
        self.score(transactions)
    }
}

/// Classifies with the default rules.
pub fn classify(transactions: &mut [Transaction]) -> usize {
    LoyaltyRules::default().classify(transactions)
}

/// Scores with the default rules, without classifying first.
pub fn score(transactions: &[Transaction]) -> LoyaltyScore {
    LoyaltyRules::default().score(transactions)
}

/// Classifies then scores with the default rules.
pub fn analyze(transactions: &mut [Transaction]) -> LoyaltyScore {
    LoyaltyRules::default().analyze(transactions)
}

pub fn failed_count(transactions: &[Transaction]) -> usize {
    transactions.iter().filter(|tx| tx.is_failed()).count()
}

/// A customer's transaction history together with the last computed score.
///
/// The analysis owns its transactions; dropping or deleting it removes them.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct LoyaltyAnalysis {
    pub id: u64,
    pub name: String,
    pub transactions: Vec<Transaction>,
    pub total_points: u32,
    pub max_discount: DiscountTier,
    pub high_value_count: u32,
}

impl LoyaltyAnalysis {
    pub fn new(id: u64, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RuleError::InvalidAnalysis(
                "customer name is required".to_string(),
            ));
        }
        Ok(Self {
            id,
            name,
            transactions: Vec::new(),
            total_points: 0,
            max_discount: DiscountTier::None,
            high_value_count: 0,
        })
    }

    pub fn add_transaction(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }

    /// Marks the transaction at `index` as failed by hand.
    pub fn mark_failed(&mut self, index: usize) -> Result<()> {
        let tx = self.transactions.get_mut(index).ok_or_else(|| {
            RuleError::InvalidTransaction(format!(
                "analysis {} has no transaction at position {}",
                self.id, index
            ))
        })?;
        tx.status = TransactionStatus::Failed;
        Ok(())
    }

    /// Always derived from the current statuses, whether or not `run` happened.
    pub fn failed_count(&self) -> usize {
        failed_count(&self.transactions)
    }

    /// Classifies then scores, storing the computed fields.
    pub fn run(&mut self, rules: &LoyaltyRules) -> LoyaltyScore {
        let flipped = rules.classify(&mut self.transactions);
        tracing::debug!(analysis = self.id, flipped, "classification pass done");

        let score = rules.score(&self.transactions);
        self.total_points = score.total_points;
        self.max_discount = score.max_discount;
        self.high_value_count = score.high_value_count;
        score
    }

    pub fn score(&self) -> LoyaltyScore {
        LoyaltyScore {
            total_points: self.total_points,
            max_discount: self.max_discount,
            high_value_count: self.high_value_count,
        }
    }
}
