//! Store selection and the global "Create Store" modal.

mod create;
mod selector;

pub use create::{CreateStoreCmd, StoreModal, StoreModalEvent};
pub use selector::StoreSelector;
