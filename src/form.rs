//! Create/edit form lifecycle shared by every store entity.
//!
//! A form is built from a statically declared field list ([`FieldSpec`]),
//! runs in exactly one [`FormMode`] for its whole lifetime, and is driven by
//! [`ResourceForm`]:
//!
//! 1. `submit()` validates synchronously and yields at most one request
//! 2. the caller sends the request and hands the result to `settle()`
//! 3. on success the caller refreshes the listing and reports back through
//!    `refresh_settled()`, which yields the navigation to the listing

mod field;
mod lifecycle;
mod mode;
mod resource;

pub use field::{FieldSpec, Rule};
pub use lifecycle::{DeletePhase, FormEffect, FormRequest, FormOutcome, ResourceForm, SubmitPhase};
pub use mode::FormMode;
pub use resource::Resource;

/// Generic toast for failed submissions.
pub const GENERIC_FAILURE: &str = "Something went wrong.";
