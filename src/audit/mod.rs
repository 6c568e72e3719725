//! Audit Trail
//!
//! Every committed lifecycle change is recorded next to the state it
//! produced, tagged with the caller context that caused it. Entries are
//! append-only and read back per aggregate.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::{Aggregate, Booking, Event, User};
use crate::domain::{BookingLifecycle, EventLifecycle, OperationContext};
use crate::error::AppResult;
use crate::store::Store;

/// One recorded lifecycle change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Monotonic position in the log (assigned by the store)
    pub sequence: i64,
    pub aggregate_type: String,
    pub aggregate_id: Uuid,
    pub change_type: String,
    pub payload: serde_json::Value,
    pub context: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

/// Entry not yet written to a store
#[derive(Debug, Clone)]
pub struct PendingEntry {
    pub aggregate_type: &'static str,
    pub aggregate_id: Uuid,
    pub change_type: &'static str,
    pub payload: serde_json::Value,
    pub context: serde_json::Value,
}

impl PendingEntry {
    /// Entry for an event lifecycle change
    pub fn event(change: &EventLifecycle, context: &OperationContext) -> AppResult<Self> {
        Ok(Self {
            aggregate_type: Event::aggregate_type(),
            aggregate_id: change.event_id(),
            change_type: change.change_type(),
            payload: serde_json::to_value(change)?,
            context: serde_json::to_value(context)?,
        })
    }

    /// Entry for a booking lifecycle change
    pub fn booking(change: &BookingLifecycle, context: &OperationContext) -> AppResult<Self> {
        Ok(Self {
            aggregate_type: Booking::aggregate_type(),
            aggregate_id: change.booking_id(),
            change_type: change.change_type(),
            payload: serde_json::to_value(change)?,
            context: serde_json::to_value(context)?,
        })
    }

    /// Entry for a user registration
    pub fn user_registered(user: &User, context: &OperationContext) -> AppResult<Self> {
        Ok(Self {
            aggregate_type: "User",
            aggregate_id: user.id(),
            change_type: "UserRegistered",
            payload: serde_json::to_value(user)?,
            context: serde_json::to_value(context)?,
        })
    }

    /// Finalize with a store-assigned sequence number
    pub fn into_entry(self, sequence: i64, recorded_at: DateTime<Utc>) -> AuditEntry {
        AuditEntry {
            sequence,
            aggregate_type: self.aggregate_type.to_string(),
            aggregate_id: self.aggregate_id,
            change_type: self.change_type.to_string(),
            payload: self.payload,
            context: self.context,
            recorded_at,
        }
    }
}

/// Administrator read access to the trail
#[derive(Clone)]
pub struct AuditService {
    store: Arc<dyn Store>,
}

impl AuditService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Recorded changes for one aggregate, oldest first
    pub async fn trail(
        &self,
        context: &OperationContext,
        aggregate_id: Uuid,
    ) -> AppResult<Vec<AuditEntry>> {
        context.require_admin()?;
        self.store.audit_trail(aggregate_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Caller, EventDetails};
    use rust_decimal_macros::dec;

    #[test]
    fn test_event_entry_carries_change_and_context() {
        let details =
            EventDetails::parse("Expo", "Trade fair", "2026-05-01", "09:00", 100, dec!(5)).unwrap();
        let (event, change) = Event::create(Uuid::new_v4(), details);
        let admin = Uuid::new_v4();
        let context = OperationContext::new().with_caller(Caller::admin(admin));

        let entry = PendingEntry::event(&change, &context)
            .unwrap()
            .into_entry(1, Utc::now());

        assert_eq!(entry.aggregate_type, "Event");
        assert_eq!(entry.aggregate_id, event.id());
        assert_eq!(entry.change_type, "EventCreated");
        assert_eq!(entry.payload["type"], "EventCreated");
        assert_eq!(entry.context["caller"]["user_id"], admin.to_string());
    }
}
