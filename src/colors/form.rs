use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Margin, Rect};
use ratatui::style::{Color as TermColor, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use super::{ColorManager, ColorMsg};
use crate::Theme;
use crate::api::{ApiError, ResourceApi};
use crate::app::AppMessage;
use crate::commands::Command;
use crate::config::{FormAction, GlobalAction, KeyResolver};
use crate::form::{
    DeletePhase, FormEffect, FormOutcome, FormRequest, Resource, ResourceForm, SubmitPhase,
};
use crate::model::{Color, StoreId, parse_hex};
use crate::navigation::{Navigation, Route};
use crate::service::ServiceMsg;
use crate::ui::{
    Component, ConfirmDialog, ConfirmEvent, EventResult, Keybinding, Screen, TextInput,
    TextInputEvent,
};

const VALUE_FIELD: usize = 1;

// === Messages ===

#[derive(Debug)]
pub(super) enum FormMsg {
    Submit,
    Settled(Result<FormOutcome, ApiError>),
    RequestDelete,
    ConfirmDelete,
    CancelDelete,
    Back,
}

impl From<FormMsg> for ColorMsg {
    fn from(msg: FormMsg) -> Self {
        Self::Form(msg)
    }
}

impl From<FormMsg> for EventResult<ColorMsg> {
    fn from(msg: FormMsg) -> Self {
        Self::Event(ColorMsg::Form(msg))
    }
}

// === Screens ===

/// Create/edit form for a single color.
///
/// Inputs mirror the values held by the [`ResourceForm`]; after every state
/// change [`ColorFormScreen::sync`] pushes errors and the disabled state back
/// into them.
pub(super) struct ColorFormScreen {
    form: ResourceForm<Color>,
    inputs: Vec<TextInput>,
    focus: usize,
    confirm: Option<ConfirmDialog>,
    /// Name of the color being edited, for breadcrumbs.
    original_name: Option<String>,
    resolver: Arc<KeyResolver>,
}

impl ColorFormScreen {
    pub(super) fn new(store: StoreId, initial: Option<&Color>, resolver: Arc<KeyResolver>) -> Self {
        let form = ResourceForm::new(store, initial);
        let inputs = form
            .fields()
            .iter()
            .enumerate()
            .map(|(index, field)| {
                let mut input = TextInput::new(field.label)
                    .with_placeholder(field.placeholder)
                    .with_value(form.value(index));
                input.set_focused(index == 0);
                input
            })
            .collect();

        Self {
            form,
            inputs,
            focus: 0,
            confirm: None,
            original_name: initial.map(|color| color.name.clone()),
            resolver,
        }
    }

    pub(super) const fn form(&self) -> &ResourceForm<Color> {
        &self.form
    }

    pub(super) const fn phase(&self) -> SubmitPhase {
        self.form.phase()
    }

    pub(super) const fn has_prompt(&self) -> bool {
        self.confirm.is_some()
    }

    pub(super) fn refresh_settled(&mut self) -> Option<FormEffect> {
        self.form.refresh_settled()
    }

    /// Inputs are locked while a request is in flight or the form is leaving.
    fn is_locked(&self) -> bool {
        self.form.is_busy() || self.form.phase() != SubmitPhase::Idle
    }

    fn sync(&mut self) {
        let locked = self.is_locked();
        for (index, input) in self.inputs.iter_mut().enumerate() {
            input.set_disabled(locked);
            input.set_error(self.form.error(index));
        }

        match self.form.delete_phase() {
            DeletePhase::Idle => self.confirm = None,
            DeletePhase::ConfirmPrompted => {
                if self.confirm.is_none() {
                    self.confirm = Some(
                        ConfirmDialog::new("This action cannot be undone.", self.resolver.clone())
                            .with_confirm_text("Delete")
                            .danger(),
                    );
                }
            }
            DeletePhase::Deleting => {
                if let Some(confirm) = &mut self.confirm {
                    confirm.set_loading(true);
                }
            }
        }
    }

    fn move_focus(&mut self, forward: bool) {
        let count = self.inputs.len();
        self.focus = if forward {
            (self.focus + 1) % count
        } else {
            (self.focus + count - 1) % count
        };
        for (index, input) in self.inputs.iter_mut().enumerate() {
            input.set_focused(index == self.focus);
        }
    }

    fn render_swatch(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let line = match parse_hex(self.form.value(VALUE_FIELD)) {
            Some((r, g, b)) => Line::from(vec![
                Span::styled("    ", Style::default().bg(TermColor::Rgb(r, g, b))),
                Span::styled(" preview", Style::default().fg(theme.subtext0())),
            ]),
            None => Line::from(Span::styled(
                "no preview",
                Style::default().fg(theme.overlay0()),
            )),
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_actions(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let key_style = Style::default().fg(theme.peach()).add_modifier(Modifier::BOLD);
        let text_style = Style::default().fg(theme.text());

        let line = if self.form.is_busy() {
            Line::from(Span::styled("Saving...", Style::default().fg(theme.overlay0())))
        } else {
            let mut spans = vec![
                Span::styled(
                    format!("[{}]", self.resolver.display_form(FormAction::Submit)),
                    key_style,
                ),
                Span::styled(format!(" {}", self.form.mode().action_label()), text_style),
            ];
            if self.form.mode().is_edit() {
                spans.extend([
                    Span::raw("    "),
                    Span::styled(
                        format!("[{}]", self.resolver.display_form(FormAction::Delete)),
                        key_style,
                    ),
                    Span::styled(" Delete", Style::default().fg(theme.red())),
                ]);
            }
            Line::from(spans)
        };
        frame.render_widget(Paragraph::new(line), area);
    }
}

impl Screen for ColorFormScreen {
    type Output = ColorMsg;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if let Some(confirm) = &mut self.confirm {
            return Ok(match confirm.handle_key(key)? {
                EventResult::Event(ConfirmEvent::Confirmed) => FormMsg::ConfirmDelete.into(),
                EventResult::Event(ConfirmEvent::Cancelled) => FormMsg::CancelDelete.into(),
                _ => EventResult::Consumed,
            });
        }

        // Nothing is editable until the request settles or the form leaves
        if self.is_locked() {
            return Ok(EventResult::Consumed);
        }

        let Some(input) = self.inputs.get_mut(self.focus) else {
            return Ok(EventResult::Ignored);
        };
        match input.handle_key(key)? {
            EventResult::Event(TextInputEvent::Changed(value)) => {
                self.form.set_value(self.focus, value);
                self.sync();
                return Ok(EventResult::Consumed);
            }
            EventResult::Event(TextInputEvent::Submitted(_)) => return Ok(FormMsg::Submit.into()),
            EventResult::Event(TextInputEvent::Cancelled) => return Ok(FormMsg::Back.into()),
            EventResult::Consumed => return Ok(EventResult::Consumed),
            EventResult::Ignored => {}
        }

        if self.resolver.matches_form(&key, FormAction::NextField) {
            self.move_focus(true);
            return Ok(EventResult::Consumed);
        }
        if self.resolver.matches_form(&key, FormAction::PrevField) {
            self.move_focus(false);
            return Ok(EventResult::Consumed);
        }
        if self.resolver.matches_form(&key, FormAction::Submit) {
            return Ok(FormMsg::Submit.into());
        }
        if self.resolver.matches_form(&key, FormAction::Delete) && self.form.mode().is_edit() {
            return Ok(FormMsg::RequestDelete.into());
        }
        if self.resolver.matches_global(&key, GlobalAction::Back) {
            return Ok(FormMsg::Back.into());
        }
        Ok(EventResult::Ignored)
    }

    fn handle_paste(&mut self, text: &str) -> Result<EventResult<Self::Output>> {
        if self.confirm.is_some() || self.is_locked() {
            return Ok(EventResult::Consumed);
        }
        let Some(input) = self.inputs.get_mut(self.focus) else {
            return Ok(EventResult::Ignored);
        };
        if let EventResult::Event(TextInputEvent::Changed(value)) = input.handle_paste(text)? {
            self.form.set_value(self.focus, value);
            self.sync();
        }
        Ok(EventResult::Consumed)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let mode = self.form.mode();
        let block = Block::default()
            .title(format!(" {} ", mode.title(Color::NOUN)))
            .title_style(Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border()));
        let inner = block.inner(area).inner(Margin::new(2, 1));
        let description = mode.description(Color::NOUN);
        frame.render_widget(block, area);

        let mut constraints = vec![Constraint::Length(2)];
        constraints.extend(self.inputs.iter().map(|_| Constraint::Length(TextInput::height())));
        constraints.extend([Constraint::Length(1), Constraint::Min(0)]);
        let rows = Layout::vertical(constraints).split(inner);

        frame.render_widget(
            Paragraph::new(description).style(Style::default().fg(theme.subtext0())),
            rows[0],
        );

        let mut swatch_row = None;
        for (index, input) in self.inputs.iter_mut().enumerate() {
            let row = rows[index + 1];
            if index == VALUE_FIELD {
                let [field_area, swatch_area] =
                    Layout::horizontal([Constraint::Min(0), Constraint::Length(14)]).areas(row);
                input.render(frame, field_area, theme);
                let [_, swatch_area, _] = Layout::vertical([
                    Constraint::Length(1),
                    Constraint::Length(1),
                    Constraint::Min(0),
                ])
                .areas(swatch_area);
                swatch_row = Some(swatch_area);
            } else {
                input.render(frame, row, theme);
            }
        }
        if let Some(area) = swatch_row {
            self.render_swatch(frame, area, theme);
        }

        self.render_actions(frame, rows[self.inputs.len() + 1], theme);

        if let Some(confirm) = &mut self.confirm {
            confirm.render(frame, area, theme);
        }
    }

    fn breadcrumbs(&self) -> Vec<String> {
        vec![
            self.original_name
                .clone()
                .unwrap_or_else(|| format!("New {}", Color::NOUN.to_lowercase())),
        ]
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        let mut keybindings = vec![
            Keybinding::new(
                self.resolver.display_form(FormAction::Submit),
                self.form.mode().action_label(),
            ),
            Keybinding::new(self.resolver.display_form(FormAction::NextField), "Next field"),
        ];
        if self.form.mode().is_edit() {
            keybindings.push(Keybinding::new(
                self.resolver.display_form(FormAction::Delete),
                "Delete",
            ));
        }
        keybindings
    }
}

// === Update Logic ===

pub(super) fn update(state: &mut ColorManager, msg: FormMsg) -> Result<ServiceMsg> {
    let tx = state.get_msg_sender();
    let api = state.ctx.colors.clone();

    if let FormMsg::Back = msg {
        let can_leave = state
            .form_screen_mut()
            .is_some_and(|screen| !screen.is_locked());
        if !can_leave {
            return Ok(ServiceMsg::Idle);
        }
        let store = state.store.clone();
        return state.navigate(Navigation::Push(Route::Colors(store)));
    }

    let Some(screen) = state.form_screen_mut() else {
        debug!("Dropping {msg:?}: no form open");
        return Ok(ServiceMsg::Idle);
    };

    match msg {
        FormMsg::Submit => {
            let request = screen.form.submit();
            screen.sync();
            Ok(request.map_or(ServiceMsg::Idle, |request| {
                SubmitFormCmd { api, request, tx }.into()
            }))
        }

        FormMsg::RequestDelete => {
            screen.form.request_delete();
            screen.sync();
            Ok(ServiceMsg::Idle)
        }

        FormMsg::CancelDelete => {
            screen.form.cancel_delete();
            screen.sync();
            Ok(ServiceMsg::Idle)
        }

        FormMsg::ConfirmDelete => {
            let request = screen.form.confirm_delete();
            screen.sync();
            Ok(request.map_or(ServiceMsg::Idle, |request| {
                SubmitFormCmd { api, request, tx }.into()
            }))
        }

        FormMsg::Settled(result) => {
            let effects = screen.form.settle(result);
            screen.sync();
            state.apply_effects(effects)
        }

        FormMsg::Back => Ok(ServiceMsg::Idle),
    }
}

// === Commands ===

/// Sends the single request produced by a submit or a confirmed delete.
struct SubmitFormCmd {
    api: Arc<dyn ResourceApi<Color>>,
    request: FormRequest<Color>,
    tx: UnboundedSender<ColorMsg>,
}

#[async_trait]
impl Command for SubmitFormCmd {
    fn name(&self) -> String {
        self.request.describe()
    }

    async fn execute(self: Box<Self>, _app_tx: UnboundedSender<AppMessage>) -> Result<()> {
        let result = self.request.send(self.api.as_ref()).await;
        self.tx.send(FormMsg::Settled(result).into())?;
        Ok(())
    }
}
