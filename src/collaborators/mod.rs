//! Collaborators the controller calls into.
//!
//! # Data Flow
//! ```text
//! ResetController
//!     → notify.rs   (Notice { category, title, message })
//!     → navigate.rs (email_confirmed, back_to_login)
//!     → store.rs    (last attempted email)
//! ```
//!
//! # Design Decisions
//! - Traits are synchronous; implementations must not block
//! - Store failures are logged and never change the flow

pub mod navigate;
pub mod notify;
pub mod store;

pub use navigate::{Destination, Navigator, RecordingNavigator};
pub use notify::{Notice, NoticeCategory, Notifier, RecordingNotifier};
pub use store::{EmailStore, FileEmailStore, MemoryEmailStore};
