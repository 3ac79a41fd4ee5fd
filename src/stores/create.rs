use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Margin, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info};

use crate::Theme;
use crate::api::{ApiError, StoreDirectory};
use crate::app::AppMessage;
use crate::commands::Command;
use crate::config::{GlobalAction, KeyResolver};
use crate::form::{FieldSpec, FormEffect, Rule};
use crate::modal::ModalVisibility;
use crate::model::{Store, StoreInput};
use crate::navigation::{Navigation, Route};
use crate::ui::{Component, EventResult, TextInput, TextInputEvent, ToastType};

const TITLE: &str = "Create Store";
const DESCRIPTION: &str = "Add a new store to manage products and categories";
const CREATED: &str = "Store created";
const FAILED: &str = "Something went wrong";

const NAME: FieldSpec =
    FieldSpec::new("name", "Name", &[Rule::Trim, Rule::Required]).with_placeholder("E-commerce");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreModalEvent {
    /// Validated input; send it with [`CreateStoreCmd`] and report back via
    /// [`StoreModal::complete`].
    Submit(StoreInput),
}

/// Single-field store creation dialog.
///
/// Shown while its [`ModalVisibility`] is open. Cancelling or a successful
/// creation closes the flag.
pub struct StoreModal {
    visibility: ModalVisibility,
    input: TextInput,
    submitted: bool,
    busy: bool,
    resolver: Arc<KeyResolver>,
}

impl StoreModal {
    pub fn new(visibility: ModalVisibility, resolver: Arc<KeyResolver>) -> Self {
        Self {
            visibility,
            input: TextInput::new(NAME.label).with_placeholder(NAME.placeholder),
            submitted: false,
            busy: false,
            resolver,
        }
    }

    pub const fn is_busy(&self) -> bool {
        self.busy
    }

    fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
        self.input.set_disabled(busy);
    }

    fn submit(&mut self, raw: &str) -> EventResult<StoreModalEvent> {
        if self.busy {
            return EventResult::Consumed;
        }
        self.submitted = true;
        match NAME.validate(raw) {
            Ok(name) => {
                self.input.set_error(None::<String>);
                self.set_busy(true);
                StoreModalEvent::Submit(StoreInput { name }).into()
            }
            Err(message) => {
                self.input.set_error(Some(message));
                EventResult::Consumed
            }
        }
    }

    fn revalidate(&mut self, value: &str) {
        if self.submitted {
            self.input.set_error(NAME.validate(value).err());
        }
    }

    fn cancel(&mut self) {
        if !self.busy {
            self.visibility.close();
        }
    }

    /// Apply the result of the create request.
    pub fn complete(&mut self, result: Result<Store, ApiError>) -> Vec<FormEffect> {
        self.set_busy(false);
        match result {
            Ok(store) => {
                info!("Created store {} ({})", store.name, store.id);
                self.visibility.close();
                vec![
                    FormEffect::Notify(ToastType::Success, CREATED.to_string()),
                    FormEffect::Navigate(Navigation::Hard(Route::Store(store.id))),
                ]
            }
            Err(err) => {
                error!("Failed to create store: {err}");
                vec![FormEffect::Notify(ToastType::Error, FAILED.to_string())]
            }
        }
    }
}

impl Component for StoreModal {
    type Output = StoreModalEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        // Modal: nothing behind it sees keys while open
        if self.busy {
            return Ok(EventResult::Consumed);
        }

        Ok(match self.input.handle_key(key)? {
            EventResult::Event(TextInputEvent::Submitted(value)) => self.submit(&value),
            EventResult::Event(TextInputEvent::Cancelled) => {
                self.cancel();
                EventResult::Consumed
            }
            EventResult::Event(TextInputEvent::Changed(value)) => {
                self.revalidate(&value);
                EventResult::Consumed
            }
            EventResult::Consumed => EventResult::Consumed,
            EventResult::Ignored => {
                if self.resolver.matches_global(&key, GlobalAction::Back) {
                    self.cancel();
                }
                EventResult::Consumed
            }
        })
    }

    fn handle_paste(&mut self, text: &str) -> Result<EventResult<Self::Output>> {
        if !self.busy
            && let EventResult::Event(TextInputEvent::Changed(value)) =
                self.input.handle_paste(text)?
        {
            self.revalidate(&value);
        }
        Ok(EventResult::Consumed)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let popup = area.centered(Constraint::Max(64), Constraint::Length(11));
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(format!(" {TITLE} "))
            .title_style(Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.lavender()))
            .style(Style::default().bg(theme.base()));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let [description_area, _, input_area, actions_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(TextInput::height()),
            Constraint::Length(1),
        ])
        .areas(inner.inner(Margin::new(1, 0)));

        frame.render_widget(
            Paragraph::new(DESCRIPTION).style(Style::default().fg(theme.subtext0())),
            description_area,
        );
        self.input.render(frame, input_area, theme);

        let key_style = Style::default().fg(theme.peach()).add_modifier(Modifier::BOLD);
        let actions = if self.busy {
            Line::from(Span::styled("Creating...", Style::default().fg(theme.overlay0())))
        } else {
            Line::from(vec![
                Span::styled("[Enter]", key_style),
                Span::styled(" Continue    ", Style::default().fg(theme.text())),
                Span::styled("[Esc]", key_style),
                Span::styled(" Cancel", Style::default().fg(theme.overlay1())),
            ])
        };
        frame.render_widget(Paragraph::new(actions).right_aligned(), actions_area);
    }
}

// === Commands ===

pub struct CreateStoreCmd {
    stores: Arc<dyn StoreDirectory>,
    input: StoreInput,
}

impl CreateStoreCmd {
    pub fn new(stores: Arc<dyn StoreDirectory>, input: StoreInput) -> Self {
        Self { stores, input }
    }
}

#[async_trait]
impl Command for CreateStoreCmd {
    fn name(&self) -> String {
        format!("Creating store '{}'", self.input.name)
    }

    async fn execute(self: Box<Self>, app_tx: UnboundedSender<AppMessage>) -> Result<()> {
        let result = self.stores.create_store(&self.input).await;
        app_tx.send(AppMessage::StoreCreated(result))?;
        Ok(())
    }
}
