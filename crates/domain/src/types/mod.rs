//! Domain types and models

pub mod alert;
pub mod event;
pub mod presenter;

pub use alert::Alert;
pub use event::{EventRecord, Fingerprint};
pub use presenter::PresenterKind;
