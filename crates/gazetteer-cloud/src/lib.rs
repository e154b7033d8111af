//! Best-effort cloud side effects: storing the exported file and announcing failures.
//!
//! Both operations report a [`Delivery`] instead of returning an error.

mod delivery;
mod error;
mod notify;
mod storage;

pub use delivery::Delivery;
pub use error::{Error, Result};
pub use notify::{PubSubPublisher, TopicPublisher, notify};
pub use storage::{GcsStore, ObjectStore, upload_file};
