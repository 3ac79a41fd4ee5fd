use tracing::{error, info};

use crate::api::{ApiError, ResourceApi};
use crate::form::{FieldSpec, FormMode, GENERIC_FAILURE, Resource};
use crate::model::StoreId;
use crate::navigation::Navigation;
use crate::ui::ToastType;

/// Submission state machine.
///
/// `Refreshing` and `Navigating` are also entered after a successful delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitPhase {
    Idle,
    Submitting,
    /// Mutation succeeded; waiting for the listing data to reload.
    Refreshing,
    /// Navigation to the listing has been issued. Terminal.
    Navigating,
}

/// Delete state machine, only reachable in edit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePhase {
    Idle,
    ConfirmPrompted,
    Deleting,
}

/// A single backend call produced by the form.
pub enum FormRequest<R: Resource> {
    Create {
        store: StoreId,
        input: R::Input,
    },
    Update {
        store: StoreId,
        id: R::Id,
        input: R::Input,
    },
    Delete {
        store: StoreId,
        id: R::Id,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOutcome {
    Saved,
    Deleted,
}

impl<R: Resource> FormRequest<R> {
    pub async fn send(self, api: &dyn ResourceApi<R>) -> Result<FormOutcome, ApiError> {
        match self {
            Self::Create { store, input } => {
                api.create(&store, &input).await?;
                Ok(FormOutcome::Saved)
            }
            Self::Update { store, id, input } => {
                api.update(&store, &id, &input).await?;
                Ok(FormOutcome::Saved)
            }
            Self::Delete { store, id } => {
                api.delete(&store, &id).await?;
                Ok(FormOutcome::Deleted)
            }
        }
    }

    /// Short label for status display.
    pub fn describe(&self) -> String {
        let noun = R::NOUN.to_lowercase();
        match self {
            Self::Create { .. } => format!("Creating {noun}"),
            Self::Update { id, .. } => format!("Updating {noun} {id}"),
            Self::Delete { id, .. } => format!("Deleting {noun} {id}"),
        }
    }
}

/// Side effects requested by the form, in the order they should be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEffect {
    Notify(ToastType, String),
    /// Reload the server data the surrounding page depends on, then call
    /// [`ResourceForm::refresh_settled`].
    Refresh,
    Navigate(Navigation),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Save,
    Delete,
}

/// Create/edit form for one resource.
pub struct ResourceForm<R: Resource> {
    store: StoreId,
    mode: FormMode<R::Id>,
    values: Vec<String>,
    errors: Vec<Option<String>>,
    /// Fields are re-validated on change once a submit has been attempted.
    submitted: bool,
    busy: bool,
    phase: SubmitPhase,
    delete: DeletePhase,
    in_flight: Option<Operation>,
}

impl<R: Resource> ResourceForm<R> {
    pub fn new(store: StoreId, initial: Option<&R>) -> Self {
        let fields = R::fields();
        let values = initial.map_or_else(|| vec![String::new(); fields.len()], R::values);
        Self {
            store,
            mode: FormMode::from_initial(initial, |record| record.id().clone()),
            values,
            errors: vec![None; fields.len()],
            submitted: false,
            busy: false,
            phase: SubmitPhase::Idle,
            delete: DeletePhase::Idle,
            in_flight: None,
        }
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        R::fields()
    }

    pub const fn mode(&self) -> &FormMode<R::Id> {
        &self.mode
    }

    pub const fn is_busy(&self) -> bool {
        self.busy
    }

    pub const fn phase(&self) -> SubmitPhase {
        self.phase
    }

    pub const fn delete_phase(&self) -> DeletePhase {
        self.delete
    }

    pub fn value(&self, index: usize) -> &str {
        self.values.get(index).map_or("", String::as_str)
    }

    pub fn error(&self, index: usize) -> Option<&str> {
        self.errors.get(index).and_then(Option::as_deref)
    }

    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(Option::is_some)
    }

    pub fn set_value(&mut self, index: usize, value: impl Into<String>) {
        if self.busy || index >= self.values.len() {
            return;
        }
        self.values[index] = value.into();
        if self.submitted {
            self.errors[index] = self.fields()[index].validate(&self.values[index]).err();
        }
    }

    /// Validate and, if everything passes, start a create or update request.
    ///
    /// Returns `None` when the form is busy, already past submission, or has
    /// validation errors; no request may be issued in those cases.
    pub fn submit(&mut self) -> Option<FormRequest<R>> {
        if self.busy || self.phase != SubmitPhase::Idle || self.delete != DeletePhase::Idle {
            return None;
        }
        self.submitted = true;

        let mut validated = Vec::with_capacity(self.values.len());
        for (index, field) in self.fields().iter().enumerate() {
            match field.validate(&self.values[index]) {
                Ok(value) => {
                    self.errors[index] = None;
                    validated.push(value);
                }
                Err(message) => {
                    self.errors[index] = Some(message);
                }
            }
        }
        if self.has_errors() {
            return None;
        }

        let input = R::input(&validated);
        self.busy = true;
        self.phase = SubmitPhase::Submitting;
        self.in_flight = Some(Operation::Save);

        Some(match &self.mode {
            FormMode::Create => FormRequest::Create {
                store: self.store.clone(),
                input,
            },
            FormMode::Edit(id) => FormRequest::Update {
                store: self.store.clone(),
                id: id.clone(),
                input,
            },
        })
    }

    /// Open the delete confirmation. Only possible in edit mode while idle.
    pub fn request_delete(&mut self) -> bool {
        if !self.mode.is_edit()
            || self.busy
            || self.phase != SubmitPhase::Idle
            || self.delete != DeletePhase::Idle
        {
            return false;
        }
        self.delete = DeletePhase::ConfirmPrompted;
        true
    }

    pub fn cancel_delete(&mut self) {
        if self.delete == DeletePhase::ConfirmPrompted {
            self.delete = DeletePhase::Idle;
        }
    }

    pub fn confirm_delete(&mut self) -> Option<FormRequest<R>> {
        if self.delete != DeletePhase::ConfirmPrompted || self.busy {
            return None;
        }
        let id = self.mode.id()?.clone();
        self.busy = true;
        self.delete = DeletePhase::Deleting;
        self.in_flight = Some(Operation::Delete);
        Some(FormRequest::Delete {
            store: self.store.clone(),
            id,
        })
    }

    /// Apply the result of the request returned by `submit` or `confirm_delete`.
    ///
    /// The busy flag is cleared and the confirmation prompt closed on every path.
    pub fn settle(&mut self, result: Result<FormOutcome, ApiError>) -> Vec<FormEffect> {
        let operation = self.in_flight.take();
        self.busy = false;
        self.delete = DeletePhase::Idle;

        let Some(operation) = operation else {
            return Vec::new();
        };

        match result {
            Ok(outcome) => {
                info!("{} {:?} in store {}", R::NOUN, outcome, self.store);
                self.phase = SubmitPhase::Refreshing;
                let message = match outcome {
                    FormOutcome::Saved => self.mode.success_message(R::NOUN),
                    FormOutcome::Deleted => format!("{} deleted.", R::NOUN),
                };
                vec![
                    FormEffect::Refresh,
                    FormEffect::Notify(ToastType::Success, message),
                ]
            }
            Err(err) => {
                error!("{} {:?} failed in store {}: {err}", R::NOUN, operation, self.store);
                self.phase = SubmitPhase::Idle;
                let message = match operation {
                    Operation::Save => GENERIC_FAILURE,
                    Operation::Delete => R::DELETE_BLOCKED,
                };
                vec![FormEffect::Notify(ToastType::Error, message.to_string())]
            }
        }
    }

    /// The refresh requested by [`FormEffect::Refresh`] has completed.
    pub fn refresh_settled(&mut self) -> Option<FormEffect> {
        if self.phase != SubmitPhase::Refreshing {
            return None;
        }
        self.phase = SubmitPhase::Navigating;
        Some(FormEffect::Navigate(Navigation::Push(R::listing(&self.store))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Color, ColorId};
    use crate::navigation::Route;

    fn red() -> Color {
        Color {
            id: ColorId::new("c1"),
            store_id: None,
            name: "Red".to_string(),
            value: "#FF0000".to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    fn filled_create_form() -> ResourceForm<Color> {
        let mut form = ResourceForm::<Color>::new(StoreId::new("s1"), None);
        form.set_value(0, "Red");
        form.set_value(1, "#FF0000");
        form
    }

    fn failure() -> ApiError {
        ApiError::Status {
            status: 500,
            body: String::new(),
        }
    }

    #[test]
    fn test_invalid_submit_yields_nothing() {
        let mut form = ResourceForm::<Color>::new(StoreId::new("s1"), None);
        form.set_value(1, "FF0000");

        assert!(form.submit().is_none());
        assert!(!form.is_busy());
        assert_eq!(form.phase(), SubmitPhase::Idle);
        assert!(form.error(0).is_some());
        assert_eq!(form.error(1), Some("String must be a valid hex code"));

        // Errors follow edits once a submit was attempted
        form.set_value(0, "Red");
        assert_eq!(form.error(0), None);
    }

    #[test]
    fn test_submit_is_single_shot_while_busy() {
        let mut form = filled_create_form();

        let Some(FormRequest::Create { store, input }) = form.submit() else {
            panic!("expected a create request");
        };
        assert_eq!(store, StoreId::new("s1"));
        assert_eq!(input.name, "Red");
        assert!(form.is_busy());
        assert_eq!(form.phase(), SubmitPhase::Submitting);

        assert!(form.submit().is_none());
        form.set_value(0, "Blue");
        assert_eq!(form.value(0), "Red");
    }

    #[test]
    fn test_edit_mode_submits_update() {
        let mut form = ResourceForm::new(StoreId::new("s1"), Some(&red()));
        assert!(form.mode().is_edit());
        assert!(matches!(
            form.submit(),
            Some(FormRequest::Update { id, .. }) if id == ColorId::new("c1")
        ));
    }

    #[test]
    fn test_failed_save_returns_to_idle() {
        let mut form = filled_create_form();
        form.submit();

        let effects = form.settle(Err(failure()));

        assert_eq!(
            effects,
            vec![FormEffect::Notify(ToastType::Error, GENERIC_FAILURE.to_string())]
        );
        assert!(!form.is_busy());
        assert_eq!(form.phase(), SubmitPhase::Idle);
        assert!(form.refresh_settled().is_none());
        assert!(form.submit().is_some());
    }

    #[test]
    fn test_successful_save_refreshes_then_navigates() {
        let mut form = filled_create_form();
        form.submit();

        let effects = form.settle(Ok(FormOutcome::Saved));

        assert_eq!(
            effects,
            vec![
                FormEffect::Refresh,
                FormEffect::Notify(ToastType::Success, "Color created.".to_string()),
            ]
        );
        assert!(!form.is_busy());
        assert_eq!(form.phase(), SubmitPhase::Refreshing);
        assert_eq!(
            form.refresh_settled(),
            Some(FormEffect::Navigate(Navigation::Push(Route::Colors(
                StoreId::new("s1")
            ))))
        );
        assert_eq!(form.phase(), SubmitPhase::Navigating);
        assert!(form.refresh_settled().is_none());
        assert!(form.submit().is_none());
    }

    #[test]
    fn test_delete_requires_edit_mode() {
        let mut form = filled_create_form();
        assert!(!form.request_delete());
        assert_eq!(form.delete_phase(), DeletePhase::Idle);
    }

    #[test]
    fn test_cancel_delete_returns_to_idle() {
        let mut form = ResourceForm::new(StoreId::new("s1"), Some(&red()));
        assert!(form.confirm_delete().is_none());

        assert!(form.request_delete());
        assert_eq!(form.delete_phase(), DeletePhase::ConfirmPrompted);
        assert!(form.submit().is_none());

        form.cancel_delete();
        assert_eq!(form.delete_phase(), DeletePhase::Idle);
        assert!(!form.is_busy());
        assert!(form.confirm_delete().is_none());
    }

    #[test]
    fn test_failed_delete_closes_prompt() {
        let mut form = ResourceForm::new(StoreId::new("s1"), Some(&red()));
        form.request_delete();
        assert!(matches!(
            form.confirm_delete(),
            Some(FormRequest::Delete { id, .. }) if id == ColorId::new("c1")
        ));
        assert_eq!(form.delete_phase(), DeletePhase::Deleting);
        assert!(form.is_busy());

        let effects = form.settle(Err(failure()));

        assert_eq!(
            effects,
            vec![FormEffect::Notify(
                ToastType::Error,
                Color::DELETE_BLOCKED.to_string()
            )]
        );
        assert_eq!(form.delete_phase(), DeletePhase::Idle);
        assert_eq!(form.phase(), SubmitPhase::Idle);
        assert!(!form.is_busy());
    }

    #[test]
    fn test_settle_without_request_is_ignored() {
        let mut form = filled_create_form();
        assert!(form.settle(Ok(FormOutcome::Saved)).is_empty());
        assert_eq!(form.phase(), SubmitPhase::Idle);
    }
}
