use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One booking line from a bank export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Free-text payer/beneficiary field ("Beguenstigter/Zahlungspflichtiger")
    pub payer_name: String,

    /// Signed amount in EUR; credits are positive
    pub amount: f64,

    pub booking_date: NaiveDate,

    /// Purpose line ("Verwendungszweck")
    #[serde(default)]
    pub reference_text: String,
}

impl Transaction {
    pub fn new(payer_name: impl Into<String>, amount: f64, booking_date: NaiveDate) -> Self {
        Self {
            payer_name: payer_name.into(),
            amount,
            booking_date,
            reference_text: String::new(),
        }
    }

    #[must_use]
    pub fn with_reference(mut self, reference_text: impl Into<String>) -> Self {
        self.reference_text = reference_text.into();
        self
    }

    /// Only incoming payments can be donations
    pub fn is_donation(&self) -> bool {
        self.amount > 0.0
    }
}
