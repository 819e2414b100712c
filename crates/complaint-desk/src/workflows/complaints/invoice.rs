//! Invoice numbers: `prefix + YYYYMMDDHHmm + 3-digit counter`.
//!
//! Allocation is scan-then-increment against the most recent invoice in the same minute
//! bucket. Two callers racing in one bucket can compute the same number; the store's
//! uniqueness check turns the loser into a duplicate-invoice error.

use chrono::{DateTime, Utc};

use super::domain::InvoiceNumber;

const BUCKET_FORMAT: &str = "%Y%m%d%H%M";
const COUNTER_WIDTH: usize = 3;
const MAX_COUNTER: u16 = 999;

pub const DEFAULT_INVOICE_PREFIX: &str = "CMP";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvoiceError {
    #[error("invoice bucket {bucket} exhausted (999 invoices per minute)")]
    BucketExhausted { bucket: String },
    #[error("stored invoice {invoice} does not end in a 3-digit counter")]
    CorruptCounter { invoice: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceSequencer {
    prefix: String,
}

impl Default for InvoiceSequencer {
    fn default() -> Self {
        Self::new(DEFAULT_INVOICE_PREFIX)
    }
}

impl InvoiceSequencer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Prefix plus minute bucket; every invoice allocated at `at` starts with this.
    pub fn bucket_key(&self, at: DateTime<Utc>) -> String {
        format!("{}{}", self.prefix, at.format(BUCKET_FORMAT))
    }

    /// Next invoice in `at`'s bucket given the highest one already issued there.
    pub fn next(
        &self,
        at: DateTime<Utc>,
        latest_in_bucket: Option<&InvoiceNumber>,
    ) -> Result<InvoiceNumber, InvoiceError> {
        let bucket = self.bucket_key(at);
        let counter = match latest_in_bucket {
            None => 1,
            Some(latest) => {
                let previous = trailing_counter(latest)?;
                if previous >= MAX_COUNTER {
                    return Err(InvoiceError::BucketExhausted { bucket });
                }
                previous + 1
            }
        };

        Ok(InvoiceNumber(format!(
            "{bucket}{counter:0width$}",
            width = COUNTER_WIDTH
        )))
    }
}

fn trailing_counter(invoice: &InvoiceNumber) -> Result<u16, InvoiceError> {
    let raw = invoice.as_str();
    let corrupt = || InvoiceError::CorruptCounter {
        invoice: raw.to_string(),
    };

    let split = raw.len().checked_sub(COUNTER_WIDTH).ok_or_else(corrupt)?;
    let digits = raw.get(split..).ok_or_else(corrupt)?;
    if !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(corrupt());
    }
    digits.parse().map_err(|_| corrupt())
}
