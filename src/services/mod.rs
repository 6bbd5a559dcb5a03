//! Service layer
//!
//! Business rules on top of the storage layer: validation, cross-record
//! updates between invoices and payments, and audit logging.

pub mod billing;
pub mod child;
pub mod invoice;
pub mod payment;

pub use billing::{BillingService, BillingSummary};
pub use child::{ChildFilter, ChildService, ChildStats, ClassroomFilter};
pub use invoice::{InvoiceFilter, InvoiceService, NewInvoice};
pub use payment::{NewPayment, PaymentFilter, PaymentService};

use crate::error::{CareError, CareResult};

/// Next `PREFIX-YEAR-NNN` number given the numbers already issued
pub(crate) fn next_document_number<'a>(
    prefix: &str,
    year: i32,
    existing: impl Iterator<Item = &'a str>,
) -> CareResult<String> {
    let stem = format!("{}-{}-", prefix, year);
    let last = existing
        .filter_map(|n| n.strip_prefix(&stem))
        .filter_map(|seq| seq.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    let next = last.checked_add(1).ok_or_else(|| {
        CareError::Billing(format!(
            "No {} numbers left for {}; give one explicitly",
            prefix, year
        ))
    })?;
    Ok(format!("{}{:03}", stem, next))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDate;

    use crate::models::document::standard_requirements;
    use crate::models::{
        Address, DocumentChecklist, EmergencyContact, EmergencyContacts, Guardian,
        ParentInformation, PersonalDetails,
    };
    use crate::wizard::Registration;

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// A complete, valid registration with guardian "Sarah <last>"
    pub fn registration(first: &str, last: &str) -> Registration {
        let mut guardian = Guardian::new("Sarah", last, "Mother");
        guardian.email = "sarah@example.com".into();
        guardian.phone = "(555) 987-6543".into();
        guardian.address = Address::new("123 Main Street", "Anytown", "CA", "12345");

        let mut documents = DocumentChecklist::from_requirements(&standard_requirements());
        for req in standard_requirements().iter().filter(|r| r.required) {
            documents.attach(&req.name, "scan.pdf");
        }

        Registration {
            personal: PersonalDetails::new(first, last, date(2020, 4, 2), date(2023, 9, 1)),
            parents: ParentInformation::new(guardian),
            emergency: EmergencyContacts::new(vec![EmergencyContact::new(
                "Robert Smith",
                "Grandfather",
                "(555) 234-5678",
            )]),
            documents,
        }
    }
}
