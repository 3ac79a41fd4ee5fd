use std::fmt::{Debug, Display};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::form::FieldSpec;
use crate::model::StoreId;
use crate::navigation::Route;

/// A store-scoped entity that can be created, edited and deleted through a form.
///
/// The backend exposes each resource as a collection under
/// `/api/{store}/{SEGMENT}`.
pub trait Resource: Clone + Debug + Send + Sync + DeserializeOwned + 'static {
    type Id: Clone + Debug + Display + PartialEq + Send + Sync + 'static;

    /// Request body for create and update, without the identifier.
    type Input: Serialize + Clone + Debug + Send + Sync + 'static;

    /// Collection path segment, e.g. `colors`.
    const SEGMENT: &'static str;

    /// Capitalized singular noun used in titles and toasts, e.g. `Color`.
    const NOUN: &'static str;

    /// Toast shown when deleting fails, typically because other records still
    /// reference this one.
    const DELETE_BLOCKED: &'static str;

    /// Fields in display order.
    fn fields() -> &'static [FieldSpec];

    fn id(&self) -> &Self::Id;

    /// Current field values, in the order of [`Resource::fields`].
    fn values(&self) -> Vec<String>;

    /// Build the request body from validated values, in field order.
    fn input(values: &[String]) -> Self::Input;

    /// The listing page the form returns to.
    fn listing(store: &StoreId) -> Route;
}
