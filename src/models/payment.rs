//! Payment model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{InvoiceId, PaymentId};
use super::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Credit,
    Debit,
    Cash,
    Check,
    Bank,
    Other,
}

impl PaymentMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "credit" | "credit_card" | "card" => Some(Self::Credit),
            "debit" => Some(Self::Debit),
            "cash" => Some(Self::Cash),
            "check" | "cheque" => Some(Self::Check),
            "bank" | "transfer" | "bank_transfer" => Some(Self::Bank),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Credit => write!(f, "Credit Card"),
            Self::Debit => write!(f, "Debit Card"),
            Self::Cash => write!(f, "Cash"),
            Self::Check => write!(f, "Check"),
            Self::Bank => write!(f, "Bank Transfer"),
            Self::Other => write!(f, "Other"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Completed,
    Pending,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "completed" | "complete" => Some(Self::Completed),
            "pending" => Some(Self::Pending),
            "failed" => Some(Self::Failed),
            "refunded" => Some(Self::Refunded),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "Completed"),
            Self::Pending => write!(f, "Pending"),
            Self::Failed => write!(f, "Failed"),
            Self::Refunded => write!(f, "Refunded"),
        }
    }
}

/// A payment made against an invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,

    /// Human-facing number, e.g. "PMT-2023-001"
    pub payment_number: String,

    pub invoice_id: InvoiceId,
    pub invoice_number: String,
    pub child_name: String,

    #[serde(default)]
    pub parent_name: String,

    pub amount: Money,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,

    #[serde(default)]
    pub status: PaymentStatus,

    #[serde(default)]
    pub notes: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn set_status(&mut self, status: PaymentStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    /// Whether this payment counts toward its invoice
    pub fn counts_toward_invoice(&self) -> bool {
        self.status == PaymentStatus::Completed
    }

    /// Validate the payment
    pub fn validate(&self) -> Result<(), PaymentValidationError> {
        if self.payment_number.trim().is_empty() {
            return Err(PaymentValidationError::MissingNumber);
        }
        if !self.amount.is_positive() {
            return Err(PaymentValidationError::NonPositiveAmount(self.amount));
        }
        Ok(())
    }
}

impl fmt::Display for Payment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} for {}", self.payment_number, self.amount, self.invoice_number)
    }
}

/// Validation errors for payments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentValidationError {
    MissingNumber,
    NonPositiveAmount(Money),
}

impl fmt::Display for PaymentValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingNumber => write!(f, "Payment number is required"),
            Self::NonPositiveAmount(amount) => {
                write!(f, "Amount must be greater than 0 (got {})", amount)
            }
        }
    }
}

impl std::error::Error for PaymentValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(amount: Money) -> Payment {
        let now = Utc::now();
        Payment {
            id: PaymentId::new(),
            payment_number: "PMT-2023-001".into(),
            invoice_id: InvoiceId::new(),
            invoice_number: "INV-2023-001".into(),
            child_name: "Emma Johnson".into(),
            parent_name: "Sarah Johnson".into(),
            amount,
            payment_date: NaiveDate::from_ymd_opt(2023, 5, 10).unwrap(),
            method: PaymentMethod::Credit,
            status: PaymentStatus::Completed,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_validation() {
        assert!(payment(Money::from_units(450, 0)).validate().is_ok());
        assert!(matches!(
            payment(Money::zero()).validate(),
            Err(PaymentValidationError::NonPositiveAmount(_))
        ));
    }

    #[test]
    fn test_counts_toward_invoice() {
        let mut p = payment(Money::from_units(10, 0));
        assert!(p.counts_toward_invoice());
        p.set_status(PaymentStatus::Refunded);
        assert!(!p.counts_toward_invoice());
    }

    #[test]
    fn test_method_parse() {
        assert_eq!(PaymentMethod::parse("cheque"), Some(PaymentMethod::Check));
        assert_eq!(PaymentMethod::parse("BANK"), Some(PaymentMethod::Bank));
        assert_eq!(PaymentMethod::parse("bitcoin"), None);
    }
}
