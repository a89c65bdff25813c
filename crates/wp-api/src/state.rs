//! # Application State
//!
//! Shared state for the Axum application.
//! Holds the store, the payment gateway, the token verifier and the role
//! authorizer. Everything here is built once at startup.

use std::net::SocketAddr;
use wp_core::{
    AppError, AppResult, Authorizer, BoxedPaymentGateway, OrderLifecycle, SharedStore,
    TokenService,
};

const DEFAULT_DATABASE_NAME: &str = "woodpecker-data";

/// Application configuration
#[derive(Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, production)
    pub environment: String,
    /// Allowed browser origin; `None` allows any
    pub cors_origin: Option<String>,
    /// Store connection string; `None` selects the in-memory store
    pub mongodb_uri: Option<String>,
    pub database_name: String,
    /// HMAC secret for bearer tokens
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("environment", &self.environment)
            .field("cors_origin", &self.cors_origin)
            .field("database_name", &self.database_name)
            .field("token_ttl_hours", &self.token_ttl_hours)
            .finish()
    }
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup (environment, test fixtures)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| AppError::Configuration(format!("PORT is not a port: {raw}")))?,
            None => 5000,
        };

        let token_ttl_hours = match lookup("TOKEN_TTL_HOURS") {
            Some(raw) => raw.parse().map_err(|_| {
                AppError::Configuration(format!("TOKEN_TTL_HOURS is not a number: {raw}"))
            })?,
            None => wp_core::token::DEFAULT_TOKEN_TTL_HOURS,
        };
        if token_ttl_hours <= 0 {
            return Err(AppError::Configuration(format!(
                "TOKEN_TTL_HOURS must be positive, got {token_ttl_hours}"
            )));
        }

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| AppError::Configuration("JWT_SECRET not set".to_string()))?;

        let mongodb_uri = lookup("MONGODB_URI").filter(|uri| !uri.is_empty());
        if mongodb_uri.is_none() && environment == "production" {
            return Err(AppError::Configuration(
                "MONGODB_URI is required in production".to_string(),
            ));
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            environment,
            cors_origin: lookup("CORS_ORIGIN").filter(|origin| !origin.is_empty()),
            mongodb_uri,
            database_name: lookup("DATABASE_NAME")
                .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string()),
            jwt_secret,
            token_ttl_hours,
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> AppResult<SocketAddr> {
        format!("{}:{}", self.host, self.port).parse().map_err(|_| {
            AppError::Configuration(format!("invalid bind address {}:{}", self.host, self.port))
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn token_service(&self) -> AppResult<TokenService> {
        TokenService::with_ttl(
            &self.jwt_secret,
            chrono::Duration::hours(self.token_ttl_hours),
        )
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Document store backend
    pub store: SharedStore,
    /// Payment processor
    pub gateway: BoxedPaymentGateway,
    /// Token verifier
    pub tokens: TokenService,
    /// Role authorizer
    pub authorizer: Authorizer,
    /// Order lifecycle manager
    pub orders: OrderLifecycle,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Wire the state around an already connected store and gateway
    pub fn new(
        config: AppConfig,
        store: SharedStore,
        gateway: BoxedPaymentGateway,
    ) -> AppResult<Self> {
        let tokens = config.token_service()?;
        Ok(Self {
            authorizer: Authorizer::new(store.clone()),
            orders: OrderLifecycle::new(store.clone()),
            store,
            gateway,
            tokens,
            config,
        })
    }
}
