//! Evaluation criteria
//!
//! A criterion is a single named, checkable rule (e.g. "proper greeting")
//! evaluated as PASS/PARTIAL/FAIL/N/A within an audit. The default set below
//! covers the ids referenced by the scoring policy table; deployments can
//! substitute their own list when constructing the auditor.

use serde::{Deserialize, Serialize};

use crate::outcome::Dimension;

/// A single checkable audit rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Criterion {
    /// Stable identifier, referenced by scoring policies (e.g. "GREETING")
    pub id: String,
    pub name: String,
    pub dimension: Dimension,
    pub description: String,
}

impl Criterion {
    pub fn new(
        id: &str,
        name: &str,
        dimension: Dimension,
        description: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            dimension,
            description: description.to_string(),
        }
    }
}

/// The standard criteria set used when no custom template is configured.
pub fn default_criteria() -> Vec<Criterion> {
    use Dimension::*;
    vec![
        Criterion::new("GREETING", "Professional Greeting", Communication,
            "Proper introduction and identity verification"),
        Criterion::new("COMPLIANCE_DISCLOSURE", "Compliance Disclosure", Compliance,
            "Required disclosures and regulations followed"),
        Criterion::new("MINI_MIRANDA", "Mini-Miranda", Compliance,
            "Debt collection disclosure stated where required"),
        Criterion::new("PROFESSIONAL_TONE", "Professional Tone", Tone,
            "Professional and respectful tone maintained throughout"),
        Criterion::new("EMPATHY_SHOWN", "Empathy", Empathy,
            "Understanding and empathy shown toward the customer"),
        Criterion::new("ACCURATE_INFO", "Accurate Information", Accuracy,
            "Information given to the customer was accurate"),
        Criterion::new("ACCURATE_AMOUNTS", "Accurate Amounts", Accuracy,
            "Balances and payment amounts quoted correctly"),
        Criterion::new("PAYMENT_VERIFICATION", "Payment Verification", Compliance,
            "Payment details verified before processing"),
        Criterion::new("PAYMENT_ARRANGEMENT", "Payment Arrangement", Resolution,
            "A concrete payment arrangement was pursued"),
        Criterion::new("PAYMENT_DISCUSSION", "Payment Discussion", Resolution,
            "Payment options discussed with the customer"),
        Criterion::new("FULL_RESOLUTION", "Issue Resolution", Resolution,
            "Customer concerns effectively addressed"),
        Criterion::new("RESOLUTION_ATTEMPT", "Resolution Attempt", Resolution,
            "A genuine attempt at resolving the customer's issue"),
        Criterion::new("INQUIRY_HANDLING", "Inquiry Handling", Communication,
            "Customer questions answered helpfully"),
        Criterion::new("TRANSFER_EXPLANATION", "Transfer Explanation", Communication,
            "Reason for transfer explained before handing off"),
        Criterion::new("CALLBACK_CONFIRMATION", "Callback Confirmation", Communication,
            "Callback time confirmed with the customer"),
        Criterion::new("CONTACT_INFO_VERIFICATION", "Contact Info Verification", Accuracy,
            "Contact details verified for the callback"),
        Criterion::new("RETENTION_OFFER", "Retention Offer", Resolution,
            "Appropriate retention solution offered"),
        Criterion::new("CUSTOMER_CONCERNS", "Customer Concerns", Empathy,
            "Reason for cancellation identified and acknowledged"),
        Criterion::new("CLOSING", "Proper Closing", Communication,
            "Professional call closing"),
    ]
}
