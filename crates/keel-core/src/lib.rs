//! Protocol-agnostic error taxonomy for Keel
//!
//! Business and technical code raise [`BusinessError`] or [`TechnicalError`]
//! values classified by a [`Reason`]. Nothing in this crate knows about HTTP;
//! the server crate owns the single mapping from a reason to a wire status.

mod catalog;
mod correlation;
mod error;
mod reason;
mod sub_error;

pub use catalog::{BusinessErrorMessage, CatalogEntry, TechnicalErrorMessage};
pub use correlation::CorrelationId;
pub use error::{BusinessError, DomainError, TechnicalError};
pub use reason::Reason;
pub use sub_error::ErrorMessage;
