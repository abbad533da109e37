use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::flow::AuthFlow;
use crate::config::Config;
use crate::email::SystemMailer;
use crate::rate_limit::LoginRateLimiter;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub flow: AuthFlow,
    pub mailer: Option<Arc<SystemMailer>>,
    pub login_limiter: LoginRateLimiter,
}
