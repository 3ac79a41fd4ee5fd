//! Async commands for side effects.
//!
//! Services return commands, and the App spawns them. Results flow back to
//! the issuing service through its own message channel; the App is told when
//! a command finishes so it can let the service process them.

mod clipboard;

use async_trait::async_trait;
use color_eyre::Result;
use tokio::sync::mpsc::UnboundedSender;

use crate::app::AppMessage;

pub use clipboard::CopyToClipboardCmd;

#[async_trait]
pub trait Command: Send + 'static {
    /// Human-readable name for logs and error dialogs.
    fn name(&self) -> String;

    async fn execute(self: Box<Self>, app_tx: UnboundedSender<AppMessage>) -> Result<()>;
}
