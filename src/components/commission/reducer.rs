use crate::environment::types::{CommissionPlan, MonthlyBreakdown, PayoutDetail};
use crate::environment::{ApiError, Environment};
use crate::helper::sort_month_keys_desc;
use crate::store::{Effect, Lifecycle, Ticket};

use super::categories::{categorize_plan, CategorizedPlan, DEFAULT_TABLE};

pub struct CommissionReducer;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum CommissionRequest {
    Plan,
    Payout,
    History,
}

type Reply<T> = (Ticket<CommissionRequest>, Result<T, ApiError>);

#[derive(Debug)]
pub enum CommissionAction {
    FetchPlan,
    FetchedPlan(Reply<CommissionPlan>),
    /// The payout modal for a lead was opened
    OpenPayout(String),
    FetchedPayout(Reply<PayoutDetail>),
    ClosePayout,
    FetchHistory,
    FetchedHistory(Reply<Vec<MonthlyBreakdown>>),
    ClearMessages,
}

#[derive(Default, Debug, Clone, PartialEq)]
pub struct CommissionState {
    pub plan: Option<CommissionPlan>,
    pub payout_lead: Option<String>,
    pub payout: Option<PayoutDetail>,
    /// Newest month first
    pub history: Vec<MonthlyBreakdown>,
    pub status: Lifecycle<CommissionRequest>,
}

impl CommissionState {
    pub fn categorized(&self) -> CategorizedPlan {
        self.plan
            .as_ref()
            .map(|plan| categorize_plan(plan, &DEFAULT_TABLE))
            .unwrap_or_default()
    }

    /// The payout modal shows a spinner while its detail is loading.
    pub fn is_loading_payout(&self) -> bool {
        self.status.is_pending(&CommissionRequest::Payout)
    }

    pub fn months(&self) -> Vec<&str> {
        self.history.iter().map(|h| h.month.as_str()).collect()
    }
}

fn sort_history(history: &mut [MonthlyBreakdown]) {
    let months: Vec<&str> = history.iter().map(|h| h.month.as_str()).collect();
    let order = sort_month_keys_desc(&months);
    history.sort_by_key(|h| order.iter().position(|m| *m == h.month));
}

pub fn reduce(
    action: CommissionAction,
    state: &mut CommissionState,
    environment: &Environment,
) -> Effect<CommissionAction> {
    log::trace!("{action:?}");
    let model = environment.model.clone();
    match action {
        CommissionAction::FetchPlan => {
            let ticket = state.status.pending(CommissionRequest::Plan);
            Effect::future(async move { model.commission_plan().await }, move |result| {
                CommissionAction::FetchedPlan((ticket, result))
            })
        }
        CommissionAction::FetchedPlan((ticket, result)) => {
            if !state.status.settle(&ticket) {
                return Effect::NONE;
            }
            match result {
                Ok(plan) => state.plan = Some(plan),
                Err(e) => state.status.reject(e),
            }
            Effect::NONE
        }
        CommissionAction::OpenPayout(lead_id) => {
            state.payout = None;
            state.payout_lead = Some(lead_id.clone());
            let ticket = state.status.pending(CommissionRequest::Payout);
            Effect::future(
                async move { model.payout_detail(lead_id).await },
                move |result| CommissionAction::FetchedPayout((ticket, result)),
            )
        }
        CommissionAction::FetchedPayout((ticket, result)) => {
            if !state.status.settle(&ticket) {
                return Effect::NONE;
            }
            match result {
                Ok(detail) => state.payout = Some(detail),
                Err(e) => state.status.reject(e),
            }
            Effect::NONE
        }
        CommissionAction::ClosePayout => {
            state.status.abandon(&CommissionRequest::Payout);
            state.payout = None;
            state.payout_lead = None;
            Effect::NONE
        }
        CommissionAction::FetchHistory => {
            let ticket = state.status.pending(CommissionRequest::History);
            Effect::future(async move { model.payout_history().await }, move |result| {
                CommissionAction::FetchedHistory((ticket, result))
            })
        }
        CommissionAction::FetchedHistory((ticket, result)) => {
            if !state.status.settle(&ticket) {
                return Effect::NONE;
            }
            match result {
                Ok(mut history) => {
                    sort_history(&mut history);
                    state.history = history;
                }
                Err(e) => state.status.reject(e),
            }
            Effect::NONE
        }
        CommissionAction::ClearMessages => {
            state.status.clear_messages();
            Effect::NONE
        }
    }
}
