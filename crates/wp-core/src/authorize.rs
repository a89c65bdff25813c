//! # Role Authorizer
//!
//! Decides whether verified claims grant a capability. Admin status is read
//! from the stored user, never from the token, so a promotion or demotion
//! takes effect on the next request.

use crate::error::{AppError, AppResult};
use crate::store::{SharedStore, UserRepository};
use crate::token::Claims;
use crate::user::User;
use tracing::{debug, warn};

/// Capabilities a route can require
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    /// Caller's stored role is `admin`
    Admin,
    /// Caller acts on their own records only
    SelfOnly { email: String },
}

#[derive(Clone)]
pub struct Authorizer {
    store: SharedStore,
}

impl Authorizer {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Allow iff the requester's account exists and has the admin role
    pub async fn require_admin(&self, claims: &Claims) -> AppResult<User> {
        let requester = self.store.find_user(&claims.email).await?;
        match requester {
            Some(user) if user.is_admin() => {
                debug!(email = %claims.email, "admin capability granted");
                Ok(user)
            }
            Some(_) => {
                warn!(email = %claims.email, "admin capability denied");
                Err(AppError::Forbidden("admin role required".to_string()))
            }
            None => {
                warn!(email = %claims.email, "admin capability denied: no such account");
                Err(AppError::Forbidden("admin role required".to_string()))
            }
        }
    }

    /// Single entry point for the route gates
    pub async fn authorize(&self, claims: &Claims, capability: &Capability) -> AppResult<()> {
        match capability {
            Capability::Admin => self.require_admin(claims).await.map(|_| ()),
            Capability::SelfOnly { email } => require_self(claims, email),
        }
    }
}

/// Allow iff the caller is acting on `target_email`
fn require_self(claims: &Claims, target_email: &str) -> AppResult<()> {
    if claims.email == target_email {
        Ok(())
    } else {
        warn!(email = %claims.email, target = %target_email, "self capability denied");
        Err(AppError::Forbidden(
            "cannot access another user's records".to_string(),
        ))
    }
}
