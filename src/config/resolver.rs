use std::sync::Arc;

use crossterm::event::KeyEvent;

use crate::config::actions::{
    DialogAction, FormAction, GlobalAction, ListAction, NavAction, SearchAction,
};
use crate::config::keybindings::KeybindingsConfig;

/// Maps key events to actions using the configured keybindings.
pub struct KeyResolver {
    keybindings: Arc<KeybindingsConfig>,
}

impl KeyResolver {
    pub const fn new(keybindings: Arc<KeybindingsConfig>) -> Self {
        Self { keybindings }
    }

    // Global actions
    pub fn matches_global(&self, event: &KeyEvent, action: GlobalAction) -> bool {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => kb.quit.matches(event),
            GlobalAction::Back => kb.back.matches(event),
            GlobalAction::NewStore => kb.new_store.matches(event),
        }
    }

    pub fn display_global(&self, action: GlobalAction) -> String {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => kb.quit.display_short(),
            GlobalAction::Back => kb.back.display_short(),
            GlobalAction::NewStore => kb.new_store.display_short(),
        }
    }

    // Navigation actions
    pub fn matches_nav(&self, event: &KeyEvent, action: NavAction) -> bool {
        let kb = &self.keybindings.navigation;
        match action {
            NavAction::Up => kb.up.matches(event),
            NavAction::Down => kb.down.matches(event),
            NavAction::PageUp => kb.page_up.matches(event),
            NavAction::PageDown => kb.page_down.matches(event),
            NavAction::Home => kb.home.matches(event),
            NavAction::End => kb.end.matches(event),
            NavAction::Select => kb.select.matches(event),
        }
    }

    pub fn display_nav(&self, action: NavAction) -> String {
        let kb = &self.keybindings.navigation;
        match action {
            NavAction::Up => kb.up.display_short(),
            NavAction::Down => kb.down.display_short(),
            NavAction::PageUp => kb.page_up.display_short(),
            NavAction::PageDown => kb.page_down.display_short(),
            NavAction::Home => kb.home.display_short(),
            NavAction::End => kb.end.display_short(),
            NavAction::Select => kb.select.display_short(),
        }
    }

    // Search actions
    pub fn matches_search(&self, event: &KeyEvent, action: SearchAction) -> bool {
        let kb = &self.keybindings.search;
        match action {
            SearchAction::Toggle => kb.toggle.matches(event),
            SearchAction::Exit => kb.exit.matches(event),
        }
    }

    pub fn display_search(&self, action: SearchAction) -> String {
        let kb = &self.keybindings.search;
        match action {
            SearchAction::Toggle => kb.toggle.display_short(),
            SearchAction::Exit => kb.exit.display_short(),
        }
    }

    // Listing actions
    pub fn matches_list(&self, event: &KeyEvent, action: ListAction) -> bool {
        let kb = &self.keybindings.list;
        match action {
            ListAction::New => kb.new.matches(event),
            ListAction::Copy => kb.copy.matches(event),
            ListAction::Reload => kb.reload.matches(event),
        }
    }

    pub fn display_list(&self, action: ListAction) -> String {
        let kb = &self.keybindings.list;
        match action {
            ListAction::New => kb.new.display_short(),
            ListAction::Copy => kb.copy.display_short(),
            ListAction::Reload => kb.reload.display_short(),
        }
    }

    // Form actions
    pub fn matches_form(&self, event: &KeyEvent, action: FormAction) -> bool {
        let kb = &self.keybindings.form;
        match action {
            FormAction::Submit => kb.submit.matches(event),
            FormAction::NextField => kb.next_field.matches(event),
            FormAction::PrevField => kb.prev_field.matches(event),
            FormAction::Delete => kb.delete.matches(event),
        }
    }

    pub fn display_form(&self, action: FormAction) -> String {
        let kb = &self.keybindings.form;
        match action {
            FormAction::Submit => kb.submit.display_short(),
            FormAction::NextField => kb.next_field.display_short(),
            FormAction::PrevField => kb.prev_field.display_short(),
            FormAction::Delete => kb.delete.display_short(),
        }
    }

    // Dialog actions
    pub fn matches_dialog(&self, event: &KeyEvent, action: DialogAction) -> bool {
        let kb = &self.keybindings.dialog;
        match action {
            DialogAction::Confirm => kb.confirm.matches(event),
            DialogAction::Cancel => kb.cancel.matches(event),
            DialogAction::Dismiss => kb.dismiss.matches(event),
        }
    }

    pub fn display_dialog(&self, action: DialogAction) -> String {
        let kb = &self.keybindings.dialog;
        match action {
            DialogAction::Confirm => kb.confirm.display_short(),
            DialogAction::Cancel => kb.cancel.display_short(),
            DialogAction::Dismiss => kb.dismiss.display_short(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;

    fn resolver() -> KeyResolver {
        KeyResolver::new(Arc::new(KeybindingsConfig::default()))
    }

    #[test]
    fn test_default_form_bindings() {
        let resolver = resolver();
        let ctrl_d = KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL);
        let shift_tab = KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT);
        assert!(resolver.matches_form(&ctrl_d, FormAction::Delete));
        assert!(resolver.matches_form(&shift_tab, FormAction::PrevField));
        assert!(!resolver.matches_form(
            &KeyEvent::new(KeyCode::Char('d'), KeyModifiers::NONE),
            FormAction::Delete
        ));
        assert_eq!(resolver.display_form(FormAction::Delete), "ctrl+d");
    }

    #[test]
    fn test_display_uses_first_alternative() {
        let resolver = resolver();
        assert_eq!(resolver.display_nav(NavAction::Down), "j");
        assert_eq!(resolver.display_dialog(DialogAction::Confirm), "y");
        assert_eq!(resolver.display_dialog(DialogAction::Cancel), "n");
    }
}
