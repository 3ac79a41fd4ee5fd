/// Whether a form creates a new record or edits an existing one.
///
/// Decided once when the form is constructed and never re-derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode<Id> {
    Create,
    Edit(Id),
}

impl<Id> FormMode<Id> {
    pub fn from_initial<T>(initial: Option<&T>, id: impl FnOnce(&T) -> Id) -> Self {
        initial.map_or(Self::Create, |record| Self::Edit(id(record)))
    }

    pub const fn is_edit(&self) -> bool {
        matches!(self, Self::Edit(_))
    }

    pub const fn id(&self) -> Option<&Id> {
        match self {
            Self::Create => None,
            Self::Edit(id) => Some(id),
        }
    }

    pub fn title(&self, noun: &str) -> String {
        match self {
            Self::Create => format!("Create {}", noun.to_lowercase()),
            Self::Edit(_) => format!("Edit {}", noun.to_lowercase()),
        }
    }

    pub fn description(&self, noun: &str) -> String {
        match self {
            Self::Create => format!("Add a new {}", noun.to_lowercase()),
            Self::Edit(_) => format!("Edit a {}.", noun.to_lowercase()),
        }
    }

    pub const fn action_label(&self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Edit(_) => "Save changes",
        }
    }

    pub fn success_message(&self, noun: &str) -> String {
        match self {
            Self::Create => format!("{noun} created."),
            Self::Edit(_) => format!("{noun} updated."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_initial() {
        let record = ("c1", "Red");
        assert_eq!(FormMode::from_initial(Some(&record), |r| r.0), FormMode::Edit("c1"));
        assert_eq!(
            FormMode::from_initial(None::<&(&str, &str)>, |r| r.0),
            FormMode::<&str>::Create
        );
    }

    #[test]
    fn test_mode_copy() {
        let create = FormMode::<u8>::Create;
        let edit = FormMode::Edit(1u8);
        assert_eq!(create.title("Color"), "Create color");
        assert_eq!(edit.title("Color"), "Edit color");
        assert_eq!(create.description("Color"), "Add a new color");
        assert_eq!(edit.description("Color"), "Edit a color.");
        assert_eq!(create.action_label(), "Create");
        assert_eq!(edit.action_label(), "Save changes");
        assert_eq!(create.success_message("Color"), "Color created.");
        assert_eq!(edit.success_message("Color"), "Color updated.");
    }
}
