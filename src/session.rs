use crate::engine::{CriteriaField, CriteriaValue, SearchCriteria, ValidationError};
use std::collections::HashMap;

/// Per-user chat state: the user's criteria and the field their next text
/// message will set, if any.
#[derive(Debug, Clone)]
pub struct Session {
    pub criteria: SearchCriteria,
    pub pending_field: Option<CriteriaField>,
}

/// Sessions keyed by chat user id, created on first contact from the
/// configured defaults. Lives in memory only.
#[derive(Debug)]
pub struct SessionStore {
    defaults: SearchCriteria,
    sessions: HashMap<i64, Session>,
}

impl SessionStore {
    pub fn new(defaults: SearchCriteria) -> Self {
        Self {
            defaults,
            sessions: HashMap::new(),
        }
    }

    /// Session for `user_id`, created from the defaults if missing.
    pub fn get_or_create(&mut self, user_id: i64) -> &mut Session {
        let defaults = &self.defaults;
        self.sessions.entry(user_id).or_insert_with(|| Session {
            criteria: defaults.clone(),
            pending_field: None,
        })
    }

    pub fn get(&self, user_id: i64) -> Option<&Session> {
        self.sessions.get(&user_id)
    }

    /// Current criteria for `user_id`. Unknown users see the defaults
    /// without a session being created.
    pub fn criteria(&self, user_id: i64) -> &SearchCriteria {
        self.sessions
            .get(&user_id)
            .map_or(&self.defaults, |s| &s.criteria)
    }

    pub fn begin_edit(&mut self, user_id: i64, field: CriteriaField) {
        self.get_or_create(user_id).pending_field = Some(field);
    }

    /// Consume the pending field and apply `raw` to it. Returns `None` when no
    /// edit was pending, including for users without a session. The pending
    /// marker is cleared even if validation fails.
    pub fn complete_edit(
        &mut self,
        user_id: i64,
        raw: &str,
    ) -> Option<(CriteriaField, Result<CriteriaValue, ValidationError>)> {
        let session = self.sessions.get_mut(&user_id)?;
        let field = session.pending_field.take()?;
        let result = session.criteria.set_field(field, raw);
        match &result {
            Ok(value) => tracing::info!(user_id, %field, %value, "criteria updated"),
            Err(e) => tracing::debug!(user_id, %field, error = %e, "criteria edit rejected"),
        }
        Some((field, result))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
