use crate::client::ApiClient;
use crate::config::Config;
use crate::domain::models::MessageThread;
use crate::services::idp::IdentityProvider;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct AppState {
    pub config: Config,
    pub api: ApiClient,
    pub idp: Arc<dyn IdentityProvider>,
    /// Latest inbox snapshot maintained by the background poller.
    pub inbox: Arc<RwLock<Vec<MessageThread>>>,
}

pub type SharedState = Arc<AppState>;
