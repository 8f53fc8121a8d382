use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::multipart::FileSource;

// Session Types

#[derive(Default, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
    pub is_authenticated: bool,
}

impl Session {
    pub fn authenticated(token: String, user: Option<User>) -> Self {
        Self {
            user,
            token: Some(token),
            is_authenticated: true,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Default, Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Partner sign-up, submitted as multipart because of the optional photo.
#[derive(Default, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerRegistration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pan_number: Option<String>,
    #[serde(skip)]
    pub profile_image: Option<FileSource>,
}

// Offer Types

#[derive(Default, Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Eligibility {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_income: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_credit_score: Option<u32>,
}

#[derive(Default, Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BankOffer {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub bank_name: String,
    /// URL of the bank logo
    #[serde(default)]
    pub bank_image: Option<String>,
    #[serde(default)]
    pub offer_headline: String,
    #[serde(default)]
    pub offer_validity: Option<DateTime<Utc>>,
    #[serde(default)]
    pub loan_type: Option<String>,
    #[serde(default)]
    pub interest_rate: Option<f64>,
    #[serde(default)]
    pub processing_fee: Option<f64>,
    #[serde(default)]
    pub processing_fee_type: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub key_features: Vec<String>,
    #[serde(default)]
    pub eligibility: Eligibility,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial offer used for create and update. Only set fields are sent.
#[derive(Default, Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OfferDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(skip)]
    pub bank_image: Option<FileSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_headline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_validity: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_fee_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub key_features: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligibility: Option<Eligibility>,
}

// Commission Types

#[derive(Default, Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommissionEntry {
    pub lender_name: String,
    #[serde(default)]
    pub remark: Option<String>,
    #[serde(default)]
    pub term_loan: Option<String>,
    #[serde(default)]
    pub overdraft: Option<String>,
}

#[derive(Default, Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommissionSheet {
    pub sheet_type: String,
    #[serde(default)]
    pub entries: Vec<CommissionEntry>,
}

#[derive(Default, Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommissionPlan {
    #[serde(default)]
    pub commission_type: Option<String>,
    #[serde(default)]
    pub sheets: Vec<CommissionSheet>,
}

/// Payout statuses as the backend reports them. Values this crate does not
/// know are kept verbatim in `Other` so they survive a round trip.
macro_rules! status_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal, $label:literal),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)*
            Other(String),
        }

        impl $name {
            /// The wire value
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $wire,)*
                    Self::Other(raw) => raw,
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::Pending
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                match value.trim().to_ascii_lowercase().as_str() {
                    $($wire => Self::$variant,)*
                    _ => Self::Other(value),
                }
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Other(raw) => raw,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($label),)*
                    Self::Other(raw) => f.write_str(&humanize(raw)),
                }
            }
        }
    };
}

/// `on_hold` → `On hold`
fn humanize(raw: &str) -> String {
    let spaced = raw.trim().replace(['_', '-'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

status_enum!(PaymentStatus {
    Pending => "pending", "Pending",
    Processing => "processing", "Processing",
    Paid => "paid", "Paid",
    Failed => "failed", "Failed",
});

status_enum!(GstStatus {
    Pending => "pending", "Pending",
    Processing => "processing", "Processing",
    Paid => "paid", "Paid",
    Failed => "failed", "Failed",
    Received => "received", "Received",
    NotApplicable => "not_applicable", "Not applicable",
});

/// The money part shared by per-lead and per-month payout summaries.
#[derive(Default, Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PayoutFigures {
    #[serde(default)]
    pub disbursed_amount: f64,
    /// Commission in percent of the disbursed amount
    #[serde(default, alias = "commission")]
    pub commission_percent: f64,
    #[serde(default)]
    pub gross_payout: f64,
    #[serde(default)]
    pub tds: f64,
    #[serde(default)]
    pub net_payout: f64,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub gst_status: GstStatus,
    #[serde(default)]
    pub remark: Option<String>,
}

#[derive(Default, Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PayoutDetail {
    pub lead_id: String,
    #[serde(flatten)]
    pub figures: PayoutFigures,
}

#[derive(Default, Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBreakdown {
    /// `YYYY-MM`
    pub month: String,
    #[serde(flatten)]
    pub figures: PayoutFigures,
}

/// Responses may come wrapped as `{ "data": ..., "message": ... }` or bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped {
        data: T,
        #[serde(default)]
        message: Option<String>,
    },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data, .. } => data,
            Envelope::Bare(data) => data,
        }
    }
}
