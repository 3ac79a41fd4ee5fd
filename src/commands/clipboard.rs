use arboard::Clipboard;
use async_trait::async_trait;
use color_eyre::Result;
use tokio::sync::mpsc::UnboundedSender;

use crate::app::AppMessage;
use crate::commands::Command;
use crate::ui::ToastType;

/// Copies text to the system clipboard and confirms with a toast.
pub struct CopyToClipboardCmd {
    text: String,
    toast_message: String,
}

impl CopyToClipboardCmd {
    pub fn new(text: impl Into<String>, toast_message: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            toast_message: toast_message.into(),
        }
    }
}

#[async_trait]
impl Command for CopyToClipboardCmd {
    fn name(&self) -> String {
        "Copying to clipboard".to_string()
    }

    async fn execute(self: Box<Self>, app_tx: UnboundedSender<AppMessage>) -> Result<()> {
        // arboard blocks on some platforms
        let text = self.text;
        tokio::task::spawn_blocking(move || -> Result<()> {
            Clipboard::new()?.set_text(text)?;
            Ok(())
        })
        .await??;

        app_tx.send(AppMessage::ShowToast {
            message: self.toast_message,
            toast_type: ToastType::Success,
        })?;
        Ok(())
    }
}
