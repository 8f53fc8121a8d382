use itertools::Itertools;

use crate::environment::types::{
    BankOffer, GstStatus, MonthlyBreakdown, PaymentStatus, PayoutDetail, PayoutFigures,
};
use crate::helper::{format_currency, format_date, format_month_key, status_color};

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Offer list filter. Empty search and `None` fields match everything.
#[derive(Default, Clone, Debug, Eq, PartialEq)]
pub struct OfferFilter {
    pub search: String,
    pub loan_type: Option<String>,
    pub featured_only: bool,
}

impl OfferFilter {
    pub fn matches(&self, offer: &BankOffer) -> bool {
        let needle = self.search.trim().to_lowercase();
        let loan_type = offer.loan_type.as_deref().unwrap_or_default();
        let found = needle.is_empty()
            || contains_ignore_case(&offer.bank_name, &needle)
            || contains_ignore_case(&offer.offer_headline, &needle)
            || contains_ignore_case(loan_type, &needle);
        let same_type = self
            .loan_type
            .as_deref()
            .map(|wanted| wanted.eq_ignore_ascii_case(loan_type))
            .unwrap_or(true);
        found && same_type && (!self.featured_only || offer.is_featured)
    }

    pub fn apply<'a>(&self, offers: impl IntoIterator<Item = &'a BankOffer>) -> Vec<&'a BankOffer> {
        offers.into_iter().filter(|o| self.matches(o)).collect()
    }
}

/// The distinct loan types in a list, for the filter picker.
pub fn loan_types<'a>(offers: impl IntoIterator<Item = &'a BankOffer>) -> Vec<String> {
    offers
        .into_iter()
        .filter_map(|o| o.loan_type.clone())
        .unique_by(|t| t.to_lowercase())
        .sorted()
        .collect()
}

/// Anything that shows up in the payout list: a single lead or a month.
pub trait PayoutRow {
    fn lead_id(&self) -> Option<&str>;
    fn month(&self) -> Option<&str>;
    fn figures(&self) -> &PayoutFigures;
}

impl PayoutRow for PayoutDetail {
    fn lead_id(&self) -> Option<&str> {
        Some(&self.lead_id)
    }

    fn month(&self) -> Option<&str> {
        None
    }

    fn figures(&self) -> &PayoutFigures {
        &self.figures
    }
}

impl PayoutRow for MonthlyBreakdown {
    fn lead_id(&self) -> Option<&str> {
        None
    }

    fn month(&self) -> Option<&str> {
        Some(&self.month)
    }

    fn figures(&self) -> &PayoutFigures {
        &self.figures
    }
}

#[derive(Default, Clone, Debug, Eq, PartialEq)]
pub struct PayoutFilter {
    pub search: String,
    /// `YYYY-MM`
    pub month: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub gst_status: Option<GstStatus>,
}

impl PayoutFilter {
    pub fn matches<P: PayoutRow>(&self, row: &P) -> bool {
        let needle = self.search.trim().to_lowercase();
        let figures = row.figures();
        let found = needle.is_empty()
            || [
                row.lead_id(),
                row.month(),
                figures.remark.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| contains_ignore_case(field, &needle));
        let same_month = match (&self.month, row.month()) {
            (Some(wanted), Some(month)) => wanted == month,
            (Some(_), None) => false,
            (None, _) => true,
        };
        let same_payment = self
            .payment_status
            .as_ref()
            .map(|s| *s == figures.payment_status)
            .unwrap_or(true);
        let same_gst = self
            .gst_status
            .as_ref()
            .map(|s| *s == figures.gst_status)
            .unwrap_or(true);
        found && same_month && same_payment && same_gst
    }

    pub fn apply<'a, P: PayoutRow>(&self, rows: impl IntoIterator<Item = &'a P>) -> Vec<&'a P>
    where
        P: 'a,
    {
        rows.into_iter().filter(|r| self.matches(*r)).collect()
    }
}

#[derive(Default, Clone, Debug, PartialEq)]
pub struct OfferViewModel {
    pub id: String,
    pub bank_name: String,
    pub image: Option<String>,
    pub headline: String,
    pub loan_type: String,
    pub interest_rate: String,
    pub processing_fee: String,
    pub valid_until: Option<String>,
    pub is_featured: bool,
    pub key_features: Vec<String>,
    pub age_range: Option<String>,
    pub min_income: Option<String>,
    pub employment_type: Option<String>,
}

impl OfferViewModel {
    pub fn new(offer: &BankOffer) -> Self {
        let interest_rate = offer
            .interest_rate
            .map(|rate| format!("{rate}% p.a."))
            .unwrap_or_else(|| "-".to_string());

        let processing_fee = match (offer.processing_fee, offer.processing_fee_type.as_deref()) {
            (Some(fee), Some(kind)) if kind.eq_ignore_ascii_case("percentage") => format!("{fee}%"),
            (Some(fee), _) => format_currency(fee),
            (None, _) => "-".to_string(),
        };

        let eligibility = &offer.eligibility;
        let age_range = match (eligibility.min_age, eligibility.max_age) {
            (Some(min), Some(max)) => Some(format!("{min}-{max} yrs")),
            (Some(min), None) => Some(format!("{min}+ yrs")),
            (None, Some(max)) => Some(format!("up to {max} yrs")),
            (None, None) => None,
        };

        Self {
            id: offer.id.clone(),
            bank_name: offer.bank_name.clone(),
            image: offer.bank_image.clone(),
            headline: offer.offer_headline.clone(),
            loan_type: offer.loan_type.clone().unwrap_or_default(),
            interest_rate,
            processing_fee,
            valid_until: offer.offer_validity.as_ref().map(format_date),
            is_featured: offer.is_featured,
            key_features: offer.key_features.clone(),
            age_range,
            min_income: eligibility.min_income.map(format_currency),
            employment_type: eligibility.employment_type.clone(),
        }
    }
}

#[derive(Default, Clone, Debug, PartialEq)]
pub struct PayoutViewModel {
    /// Lead id, or the month label for monthly rows
    pub title: String,
    pub disbursed: String,
    pub commission: String,
    pub gross: String,
    pub tds: String,
    pub net: String,
    pub payment_status: String,
    pub payment_color: &'static str,
    pub gst_status: String,
    pub gst_color: &'static str,
    pub remark: Option<String>,
}

impl PayoutViewModel {
    pub fn new<P: PayoutRow>(row: &P) -> Self {
        let title = match (row.lead_id(), row.month()) {
            (Some(lead), _) => lead.to_string(),
            (None, Some(month)) => format_month_key(month),
            (None, None) => String::new(),
        };
        let figures = row.figures();
        let payment_status = figures.payment_status.to_string();
        let gst_status = figures.gst_status.to_string();
        Self {
            title,
            disbursed: format_currency(figures.disbursed_amount),
            commission: format!("{}%", figures.commission_percent),
            gross: format_currency(figures.gross_payout),
            tds: format_currency(figures.tds),
            net: format_currency(figures.net_payout),
            payment_color: status_color(&payment_status),
            payment_status,
            gst_color: status_color(&gst_status),
            gst_status,
            remark: figures.remark.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn offer(id: &str, bank: &str, loan_type: &str, featured: bool) -> BankOffer {
        BankOffer {
            id: id.to_string(),
            bank_name: bank.to_string(),
            offer_headline: format!("{bank} {loan_type} offer"),
            loan_type: Some(loan_type.to_string()),
            is_featured: featured,
            ..Default::default()
        }
    }

    fn month(key: &str, status: PaymentStatus, remark: Option<&str>) -> MonthlyBreakdown {
        MonthlyBreakdown {
            month: key.to_string(),
            figures: PayoutFigures {
                payment_status: status,
                remark: remark.map(str::to_string),
                ..Default::default()
            },
        }
    }

    #[test]
    fn offer_search_is_case_insensitive() {
        let offers = vec![
            offer("a", "HDFC Bank", "Personal", true),
            offer("b", "State Bank", "Home", false),
            offer("c", "Axis", "personal", false),
        ];
        let filter = OfferFilter {
            search: "hdfc".into(),
            ..Default::default()
        };
        let ids: Vec<_> = filter.apply(&offers).iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);

        let filter = OfferFilter {
            loan_type: Some("Personal".into()),
            ..Default::default()
        };
        assert_eq!(filter.apply(&offers).len(), 2);

        let filter = OfferFilter {
            featured_only: true,
            ..Default::default()
        };
        assert_eq!(filter.apply(&offers).len(), 1);

        assert_eq!(OfferFilter::default().apply(&offers).len(), 3);
        assert_eq!(offers.len(), 3);
    }

    #[test]
    fn distinct_loan_types() {
        let offers = vec![
            offer("a", "A", "Personal", false),
            offer("b", "B", "Home", false),
            offer("c", "C", "personal", false),
        ];
        assert_eq!(loan_types(&offers), vec!["Home", "Personal"]);
    }

    #[test]
    fn payout_filters_combine() {
        let rows = vec![
            month("2024-12", PaymentStatus::Paid, None),
            month("2024-11", PaymentStatus::Pending, Some("Awaiting invoice")),
            month("2024-10", PaymentStatus::Paid, Some("invoice cleared")),
        ];
        let filter = PayoutFilter {
            search: "INVOICE".into(),
            ..Default::default()
        };
        assert_eq!(filter.apply(&rows).len(), 2);

        let filter = PayoutFilter {
            search: "invoice".into(),
            payment_status: Some(PaymentStatus::Paid),
            ..Default::default()
        };
        let months: Vec<_> = filter.apply(&rows).iter().map(|r| r.month.as_str()).collect();
        assert_eq!(months, vec!["2024-10"]);

        let filter = PayoutFilter {
            month: Some("2024-11".into()),
            ..Default::default()
        };
        assert_eq!(filter.apply(&rows).len(), 1);
    }

    #[test]
    fn lead_rows_match_on_lead_id() {
        let detail = PayoutDetail {
            lead_id: "LR-2041".into(),
            ..Default::default()
        };
        let by_lead = PayoutFilter {
            search: "lr-20".into(),
            ..Default::default()
        };
        assert!(by_lead.matches(&detail));
        let by_month = PayoutFilter {
            month: Some("2024-11".into()),
            ..Default::default()
        };
        assert!(!by_month.matches(&detail));
    }

    #[test]
    fn offer_view_model_formats_figures() {
        let mut source = offer("a", "HDFC", "Personal", true);
        source.interest_rate = Some(10.5);
        source.processing_fee = Some(1.5);
        source.processing_fee_type = Some("percentage".into());
        source.offer_validity = Some(Utc.with_ymd_and_hms(2025, 3, 31, 0, 0, 0).unwrap());
        source.eligibility.min_age = Some(21);
        source.eligibility.max_age = Some(60);
        source.eligibility.min_income = Some(300_000.0);

        let model = OfferViewModel::new(&source);
        assert_eq!(model.interest_rate, "10.5% p.a.");
        assert_eq!(model.processing_fee, "1.5%");
        assert_eq!(model.valid_until.as_deref(), Some("31 Mar 2025"));
        assert_eq!(model.age_range.as_deref(), Some("21-60 yrs"));
        assert_eq!(model.min_income.as_deref(), Some("₹3.0L"));

        source.processing_fee = Some(2_500.0);
        source.processing_fee_type = Some("flat".into());
        assert_eq!(OfferViewModel::new(&source).processing_fee, "₹2,500");
    }

    #[test]
    fn payout_view_model_uses_month_labels_and_colors() {
        let mut row = month("2024-12", PaymentStatus::Paid, None);
        row.figures.net_payout = 1_500_000.0;
        row.figures.commission_percent = 1.25;
        row.figures.gst_status = GstStatus::NotApplicable;

        let model = PayoutViewModel::new(&row);
        assert_eq!(model.title, "Dec 2024");
        assert_eq!(model.net, "₹15.0L");
        assert_eq!(model.commission, "1.25%");
        assert_eq!(model.payment_status, "Paid");
        assert_eq!(model.payment_color, status_color("paid"));
        assert_eq!(model.gst_status, "Not applicable");

        row.figures.payment_status = PaymentStatus::Other("on_hold".into());
        let model = PayoutViewModel::new(&row);
        assert_eq!(model.payment_status, "On hold");
        assert_eq!(model.payment_color, status_color("on hold"));
        assert_eq!(model.payment_color, "#7C3AED");
    }
}
