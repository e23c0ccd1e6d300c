//! Application state, router and background tasks.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use chrono::Utc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};
use urlshort_auth::{AuthConfig, AuthError, AuthService};
use urlshort_core::error::CoreError;
use urlshort_core::models::user::{CreateUser, Role};
use urlshort_core::repository::{SessionRepository, UserRepository};
use urlshort_db::{MemorySessionRepository, MemoryUserRepository};

use crate::routes;

pub type Auth = AuthService<MemoryUserRepository, MemorySessionRepository>;
pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub auth: Auth,
}

impl AppState {
    pub fn new(config: AuthConfig) -> Result<Self, AuthError> {
        config.validate()?;
        let auth = AuthService::new(
            MemoryUserRepository::new(),
            MemorySessionRepository::new(),
            config,
        )?;
        Ok(Self { auth })
    }

    /// Create the admin account unless the username is already taken.
    /// Returns whether an account was created.
    pub async fn bootstrap_admin(&self, username: &str, password: &str) -> Result<bool, AuthError> {
        match self.auth.user_repo().get_by_username(username).await {
            Ok(_) => {
                info!(username, "admin account already present");
                return Ok(false);
            }
            Err(CoreError::NotFound { .. }) => {}
            Err(e) => return Err(e.into()),
        }

        let password_hash = self.auth.verifier().hash(password)?;
        let user = self
            .auth
            .user_repo()
            .create(CreateUser {
                username: username.to_owned(),
                nickname: username.to_owned(),
                password_hash,
                role: Role::Admin,
            })
            .await?;
        info!(user_id = %user.id, username, "admin account created");
        Ok(true)
    }
}

pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/login", post(routes::login))
        .route("/register", post(routes::register))
        .route("/refresh-token", post(routes::refresh_token))
        .route("/logout", post(routes::logout))
        .route("/me", get(routes::me))
        .with_state(state)
}

/// Periodically drop session records whose refresh token has lapsed.
pub fn spawn_session_sweeper(state: SharedState, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match state.auth.session_repo().cleanup_expired(Utc::now()).await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "expired sessions removed"),
                Err(e) => error!(error = %e, "session sweep failed"),
            }
        }
    })
}

pub async fn serve(state: SharedState, addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
