//! Invoice model
//!
//! Invoices bill a child's family for tuition and fees. Child and parent
//! names are copied onto the invoice so that it still reads correctly if the
//! child record later changes or is removed.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{ChildId, InvoiceId};
use super::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Paid,
    #[default]
    Pending,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "paid" => Some(Self::Paid),
            "pending" => Some(Self::Pending),
            "overdue" => Some(Self::Overdue),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether money is still owed on the invoice
    pub fn is_outstanding(&self) -> bool {
        matches!(self, Self::Pending | Self::Overdue)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paid => write!(f, "Paid"),
            Self::Pending => write!(f, "Pending"),
            Self::Overdue => write!(f, "Overdue"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// A single billed line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub description: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl InvoiceItem {
    pub fn new(description: impl Into<String>, quantity: u32, unit_price: Money) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
        }
    }

    pub fn total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }

    /// Line total, or `None` if it does not fit in a `Money`
    pub fn checked_total(&self) -> Option<Money> {
        self.unit_price.checked_times(self.quantity)
    }

    /// Parse `description:quantity:unit_price`, or `description:unit_price`
    /// for a quantity of one
    pub fn parse(s: &str) -> Result<Self, InvoiceValidationError> {
        let invalid = || InvoiceValidationError::InvalidItem(s.to_string());
        let parts: Vec<&str> = s.rsplitn(3, ':').collect();
        let (description, quantity, price) = match parts.as_slice() {
            [price, quantity, description] => match quantity.trim().parse::<u32>() {
                Ok(q) => (description.to_string(), q, *price),
                // A colon inside the description, no quantity given
                Err(_) => (format!("{}:{}", description, quantity), 1, *price),
            },
            [price, description] => (description.to_string(), 1, *price),
            _ => return Err(invalid()),
        };
        let unit_price = Money::parse(price).map_err(|_| invalid())?;
        let item = Self::new(description.trim(), quantity, unit_price);
        if item.checked_total().is_none() {
            return Err(InvoiceValidationError::AmountTooLarge(item.description));
        }
        Ok(item)
    }
}

/// An invoice for a child's family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,

    /// Human-facing number, e.g. "INV-2023-001"
    pub invoice_number: String,

    pub child_id: ChildId,
    pub child_name: String,

    #[serde(default)]
    pub parent_name: String,

    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,

    #[serde(default)]
    pub status: InvoiceStatus,

    pub items: Vec<InvoiceItem>,

    #[serde(default)]
    pub notes: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    pub fn new(
        invoice_number: impl Into<String>,
        child_id: ChildId,
        child_name: impl Into<String>,
        parent_name: impl Into<String>,
        issue_date: NaiveDate,
        due_date: NaiveDate,
        items: Vec<InvoiceItem>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: InvoiceId::new(),
            invoice_number: invoice_number.into(),
            child_id,
            child_name: child_name.into(),
            parent_name: parent_name.into(),
            issue_date,
            due_date,
            status: InvoiceStatus::Pending,
            items,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sum of all line items
    pub fn total(&self) -> Money {
        self.items.iter().map(InvoiceItem::total).sum()
    }

    /// Sum of all line items, or `None` on overflow
    pub fn checked_total(&self) -> Option<Money> {
        self.items
            .iter()
            .try_fold(Money::zero(), |acc, item| acc.checked_add(item.checked_total()?))
    }

    /// Whether a pending invoice is past due on `today`
    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        self.status == InvoiceStatus::Pending && today > self.due_date
    }

    pub fn set_status(&mut self, status: InvoiceStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    /// Validate the invoice
    pub fn validate(&self) -> Result<(), InvoiceValidationError> {
        if self.invoice_number.trim().is_empty() {
            return Err(InvoiceValidationError::MissingNumber);
        }
        if self.items.is_empty() {
            return Err(InvoiceValidationError::NoItems);
        }
        for item in &self.items {
            if item.description.trim().is_empty() {
                return Err(InvoiceValidationError::MissingDescription);
            }
            if item.quantity == 0 {
                return Err(InvoiceValidationError::ZeroQuantity(item.description.clone()));
            }
            if item.unit_price.is_negative() {
                return Err(InvoiceValidationError::NegativePrice(item.description.clone()));
            }
            if item.checked_total().is_none() {
                return Err(InvoiceValidationError::AmountTooLarge(item.description.clone()));
            }
        }
        if self.checked_total().is_none() {
            return Err(InvoiceValidationError::TotalTooLarge);
        }
        if self.due_date < self.issue_date {
            return Err(InvoiceValidationError::DueBeforeIssue);
        }
        Ok(())
    }
}

impl fmt::Display for Invoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.invoice_number, self.child_name)
    }
}

/// Validation errors for invoices
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvoiceValidationError {
    MissingNumber,
    NoItems,
    MissingDescription,
    ZeroQuantity(String),
    NegativePrice(String),
    DueBeforeIssue,
    InvalidItem(String),
    AmountTooLarge(String),
    TotalTooLarge,
}

impl fmt::Display for InvoiceValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingNumber => write!(f, "Invoice number is required"),
            Self::NoItems => write!(f, "At least one item is required"),
            Self::MissingDescription => write!(f, "Item description is required"),
            Self::ZeroQuantity(d) => write!(f, "Quantity for '{}' must be at least 1", d),
            Self::NegativePrice(d) => write!(f, "Unit price for '{}' must be at least 0", d),
            Self::DueBeforeIssue => write!(f, "Due date cannot be before the issue date"),
            Self::InvalidItem(s) => write!(
                f,
                "Invalid item '{}': expected description:quantity:price",
                s
            ),
            Self::AmountTooLarge(d) => write!(f, "Amount for '{}' is too large", d),
            Self::TotalTooLarge => write!(f, "Invoice total is too large"),
        }
    }
}

impl std::error::Error for InvoiceValidationError {}
