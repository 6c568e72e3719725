//! Query/Filter Service
//!
//! Read-only projections over events and bookings. Nothing here mutates
//! state; soft-deleted events and cancelled bookings never appear.

use std::sync::Arc;

use crate::aggregate::{Booking, Event};
use crate::domain::{DomainError, OperationContext};
use crate::error::AppResult;
use crate::store::{BookingScope, BookingView, Store};

use super::{BookingFilter, SearchTerm};

#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn Store>,
}

impl QueryService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Active events by date, time, then creation
    pub async fn list_active_events(&self) -> AppResult<Vec<Event>> {
        self.store.list_active_events().await
    }

    pub async fn search_events(&self, term: &str) -> AppResult<Vec<Event>> {
        let term = SearchTerm::new(term);
        let events = self.store.list_active_events().await?;
        Ok(events
            .into_iter()
            .filter(|event| term.matches_event(event))
            .collect())
    }

    /// Active bookings, oldest first.
    ///
    /// Non-admin callers only ever see their own bookings: a missing
    /// `user_id` is narrowed to the caller, someone else's is refused.
    pub async fn list_active_bookings(
        &self,
        context: &OperationContext,
        filter: BookingFilter,
    ) -> AppResult<Vec<Booking>> {
        let caller = context.require_caller()?;

        let mut scope = BookingScope::from(filter);
        if !caller.is_admin() {
            match scope.user_id {
                None => scope.user_id = Some(caller.user_id),
                Some(owner) if owner != caller.user_id => {
                    return Err(DomainError::Forbidden(
                        "cannot list another user's bookings".to_string(),
                    )
                    .into());
                }
                Some(_) => {}
            }
        }

        let views = self.store.list_bookings(scope).await?;
        Ok(views.into_iter().map(|view| view.booking).collect())
    }

    /// Administrator search across all active bookings
    pub async fn search_bookings(
        &self,
        context: &OperationContext,
        term: &str,
    ) -> AppResult<Vec<BookingView>> {
        context.require_admin()?;

        let term = SearchTerm::new(term);
        let views = self.store.list_bookings(BookingScope::all()).await?;
        Ok(views
            .into_iter()
            .filter(|view| term.matches_booking(view))
            .collect())
    }
}
