use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::api::{ResourceApi, StoreDirectory};
use crate::app::AppMessage;
use crate::config::{AppConfig, KeyResolver};
use crate::modal::ModalVisibility;
use crate::model::Color;

/// Shared handles passed to every service.
///
/// Cheap to clone. Tests build one around in-memory backends.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub resolver: Arc<KeyResolver>,
    pub stores: Arc<dyn StoreDirectory>,
    pub colors: Arc<dyn ResourceApi<Color>>,
    /// Visibility of the global "Create Store" modal.
    pub store_modal: ModalVisibility,
    pub app_tx: UnboundedSender<AppMessage>,
}
