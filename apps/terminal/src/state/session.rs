//! # Session
//!
//! The authentication fact the store consumes: is someone signed in, and who.
//!
//! Credential checks happen elsewhere. Whatever verified the operator calls
//! [`Session::sign_in`]; store commands then read the operator back out.

use std::sync::{PoisonError, RwLock};

use hearth_core::Operator;

use crate::error::{StoreError, StoreResult};

#[derive(Debug, Default)]
pub struct Session {
    operator: RwLock<Option<Operator>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces whoever was signed in.
    pub fn sign_in(&self, operator: Operator) {
        tracing::info!(operator = %operator.display_name, "Operator signed in");
        *self.operator.write().unwrap_or_else(PoisonError::into_inner) = Some(operator);
    }

    /// Signs out and returns the previous operator, if any.
    pub fn sign_out(&self) -> Option<Operator> {
        let previous = self
            .operator
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(op) = &previous {
            tracing::info!(operator = %op.display_name, "Operator signed out");
        }
        previous
    }

    pub fn current(&self) -> Option<Operator> {
        self.operator
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authorized(&self) -> bool {
        self.current().is_some()
    }

    /// The signed-in operator, or `Unauthorized` naming the refused action.
    pub fn require(&self, action: &'static str) -> StoreResult<Operator> {
        self.current().ok_or(StoreError::Unauthorized(action))
    }
}
