use im::Vector;

use crate::environment::types::{BankOffer, OfferDraft};
use crate::environment::{ApiError, Environment};
use crate::store::{Effect, Lifecycle, Ticket};

pub struct OffersReducer;

/// Creates are dispatched with a unique ticket; everything else supersedes
/// an earlier request of the same kind. Mutations are keyed by offer id so
/// that editing two different offers does not drop either result.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum OffersRequest {
    FetchAll,
    FetchOne,
    Update(String),
    Delete(String),
}

type Reply<T> = (Ticket<OffersRequest>, Result<T, ApiError>);

#[derive(Debug)]
pub enum OffersAction {
    FetchAll,
    FetchedAll(Reply<Vec<BankOffer>>),
    FetchOne(String),
    FetchedOne(Reply<BankOffer>),
    Create(OfferDraft),
    Created(Reply<BankOffer>),
    Update(String, OfferDraft),
    Updated(Reply<BankOffer>),
    Delete(String),
    Deleted(Reply<String>),
    Select(Option<String>),
    ClearMessages,
}

#[derive(Default, Debug, Clone, PartialEq)]
pub struct OffersState {
    pub offers: Vector<BankOffer>,
    pub selected: Option<BankOffer>,
    pub status: Lifecycle<OffersRequest>,
}

impl OffersState {
    pub fn offer(&self, id: &str) -> Option<&BankOffer> {
        self.offers.iter().find(|o| o.id == id)
    }

    /// Whether a delete for this offer is still in flight, for disabling its
    /// button.
    pub fn is_deleting(&self, id: &str) -> bool {
        self.status.is_pending(&OffersRequest::Delete(id.to_string()))
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.offers.iter().position(|o| o.id == id)
    }

    fn replace(&mut self, offer: BankOffer) {
        if let Some(index) = self.position(&offer.id) {
            self.offers.set(index, offer.clone());
        }
        if self.selected.as_ref().map(|s| s.id == offer.id).unwrap_or_default() {
            self.selected = Some(offer);
        }
    }

    fn remove(&mut self, id: &str) {
        self.offers.retain(|o| o.id != id);
        if self.selected.as_ref().map(|s| s.id == id).unwrap_or_default() {
            self.selected = None;
        }
    }
}

pub fn reduce(
    action: OffersAction,
    state: &mut OffersState,
    environment: &Environment,
) -> Effect<OffersAction> {
    log::trace!("{action:?}");
    let model = environment.model.clone();
    match action {
        OffersAction::FetchAll => {
            let ticket = state.status.pending(OffersRequest::FetchAll);
            Effect::future(async move { model.offers().await }, move |result| {
                OffersAction::FetchedAll((ticket, result))
            })
        }
        OffersAction::FetchedAll((ticket, result)) => {
            if !state.status.settle(&ticket) {
                return Effect::NONE;
            }
            match result {
                Ok(offers) => state.offers = offers.into_iter().collect(),
                Err(e) => state.status.reject(e),
            }
            Effect::NONE
        }
        OffersAction::FetchOne(id) => {
            let ticket = state.status.pending(OffersRequest::FetchOne);
            Effect::future(async move { model.offer(id).await }, move |result| {
                OffersAction::FetchedOne((ticket, result))
            })
        }
        OffersAction::FetchedOne((ticket, result)) => {
            if !state.status.settle(&ticket) {
                return Effect::NONE;
            }
            match result {
                Ok(offer) => {
                    state.selected = Some(offer.clone());
                    state.replace(offer);
                }
                Err(e) => state.status.reject(e),
            }
            Effect::NONE
        }
        OffersAction::Create(draft) => {
            let ticket = state.status.pending_unique();
            Effect::future(async move { model.create_offer(draft).await }, move |result| {
                OffersAction::Created((ticket, result))
            })
        }
        OffersAction::Created((ticket, result)) => {
            if !state.status.settle(&ticket) {
                return Effect::NONE;
            }
            match result {
                Ok(offer) => {
                    state.offers.push_front(offer);
                    state.status.succeed("Offer created");
                }
                Err(e) => state.status.reject(e),
            }
            Effect::NONE
        }
        OffersAction::Update(id, draft) => {
            let ticket = state.status.pending(OffersRequest::Update(id.clone()));
            Effect::future(
                async move { model.update_offer(id, draft).await },
                move |result| OffersAction::Updated((ticket, result)),
            )
        }
        OffersAction::Updated((ticket, result)) => {
            if !state.status.settle(&ticket) {
                return Effect::NONE;
            }
            match result {
                Ok(offer) => {
                    state.replace(offer);
                    state.status.succeed("Offer updated");
                }
                Err(e) => state.status.reject(e),
            }
            Effect::NONE
        }
        OffersAction::Delete(id) => {
            let ticket = state.status.pending(OffersRequest::Delete(id.clone()));
            Effect::future(async move { model.delete_offer(id).await }, move |result| {
                OffersAction::Deleted((ticket, result))
            })
        }
        OffersAction::Deleted((ticket, result)) => {
            if !state.status.settle(&ticket) {
                return Effect::NONE;
            }
            match result {
                Ok(id) => {
                    state.remove(&id);
                    state.status.succeed("Offer deleted");
                }
                Err(e) => state.status.reject(e),
            }
            Effect::NONE
        }
        OffersAction::Select(id) => {
            state.selected = id.and_then(|id| state.offer(&id).cloned());
            Effect::NONE
        }
        OffersAction::ClearMessages => {
            state.status.clear_messages();
            Effect::NONE
        }
    }
}
