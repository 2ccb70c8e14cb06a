//! Per-session coordinator registry
//!
//! Every session gets its own coordinator, created on first use:
//! - Own configuration (default or set explicitly per session)
//! - Own record history
//! - Own cancellation scope
//!
//! Only the decision source handle is shared.

use crate::action::ResolutionAction;
use crate::config::CoordinatorConfig;
use crate::coordinator::InterventionCoordinator;
use crate::decision::DecisionSource;
use crate::error::InterventionError;
use crate::ledger::StatisticsLedger;
use crate::types::{InterventionContext, SessionId};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

/// Map from session id to its coordinator
pub struct SessionRegistry {
    /// Configuration for sessions created on demand
    defaults: CoordinatorConfig,
    source: Arc<dyn DecisionSource>,
    sessions: DashMap<SessionId, Arc<InterventionCoordinator>>,
}

impl fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("defaults", &self.defaults)
            .field("sessions", &self.sessions.len())
            .finish_non_exhaustive()
    }
}

impl SessionRegistry {
    /// Create empty registry
    #[must_use]
    pub fn new(defaults: CoordinatorConfig, source: Arc<dyn DecisionSource>) -> Self {
        Self {
            defaults,
            source,
            sessions: DashMap::new(),
        }
    }

    /// Coordinator for a session, created with the defaults on first use
    #[must_use]
    pub fn coordinator(&self, session_id: &SessionId) -> Arc<InterventionCoordinator> {
        if let Some(existing) = self.sessions.get(session_id) {
            return Arc::clone(existing.value());
        }
        let entry = self.sessions.entry(session_id.clone()).or_insert_with(|| {
            tracing::debug!(session_id = %session_id, "creating session coordinator");
            Arc::new(InterventionCoordinator::new(
                self.defaults.clone(),
                Arc::clone(&self.source),
            ))
        });
        Arc::clone(entry.value())
    }

    /// Register a session with its own configuration
    ///
    /// Returns `None` when the session already has a coordinator; its
    /// configuration and history are left untouched.
    pub fn configure(
        &self,
        session_id: SessionId,
        config: CoordinatorConfig,
    ) -> Option<Arc<InterventionCoordinator>> {
        match self.sessions.entry(session_id) {
            Entry::Occupied(existing) => {
                tracing::warn!(
                    session_id = %existing.key(),
                    "session already registered, keeping its coordinator"
                );
                None
            }
            Entry::Vacant(slot) => {
                let coordinator = Arc::new(InterventionCoordinator::new(
                    config,
                    Arc::clone(&self.source),
                ));
                slot.insert(Arc::clone(&coordinator));
                Some(coordinator)
            }
        }
    }

    /// Route an intervention to its session's coordinator
    ///
    /// # Errors
    /// See [`InterventionCoordinator::submit`].
    pub async fn submit(
        &self,
        context: InterventionContext,
    ) -> Result<ResolutionAction, InterventionError> {
        let coordinator = self.coordinator(&context.session_id);
        coordinator.submit(context).await
    }

    /// Statistics for a session, `None` if it never submitted
    #[must_use]
    pub fn summary(&self, session_id: &SessionId) -> Option<StatisticsLedger> {
        self.sessions
            .get(session_id)
            .map(|coordinator| coordinator.summary(session_id))
    }

    /// Drop a finished session, cancelling anything still pending
    pub fn end_session(&self, session_id: &SessionId) -> Option<Arc<InterventionCoordinator>> {
        let (_, coordinator) = self.sessions.remove(session_id)?;
        coordinator.cancel_pending();
        Some(coordinator)
    }

    /// Known session ids
    #[must_use]
    pub fn session_ids(&self) -> Vec<SessionId> {
        self.sessions.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Number of sessions
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Check if no session is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
