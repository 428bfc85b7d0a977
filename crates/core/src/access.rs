//! Request principals and bearer-token lookup.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Error;

/// What a configured token grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub user_id: String,
    #[serde(default)]
    pub admin: bool,
}

/// The identity a request acts as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub admin: bool,
}

impl Principal {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), admin: false }
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), admin: true }
    }

    /// # Errors
    ///
    /// Returns `Error::Forbidden` unless the principal is an admin.
    pub fn require_admin(&self) -> Result<(), Error> {
        if self.admin {
            Ok(())
        } else {
            Err(Error::Forbidden(format!("user `{}` is not an admin", self.user_id)))
        }
    }
}

/// Token table loaded from configuration.
#[derive(Debug, Clone, Default)]
pub struct AccessTokens {
    grants: BTreeMap<String, TokenGrant>,
}

impl AccessTokens {
    pub fn new(grants: BTreeMap<String, TokenGrant>) -> Self {
        Self { grants }
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Resolve an `Authorization` header value of the form `Bearer <token>`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unauthorized` if the header is missing, malformed, or
    /// names an unknown token.
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<Principal, Error> {
        let header = authorization.ok_or_else(|| Error::Unauthorized("missing bearer token".into()))?;
        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Unauthorized("malformed authorization header".into()))?;

        self.grants
            .get(token)
            .map(|grant| Principal { user_id: grant.user_id.clone(), admin: grant.admin })
            .ok_or_else(|| Error::Unauthorized("unknown token".into()))
    }
}
