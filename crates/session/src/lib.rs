// crates/session/src/lib.rs
//! Session view layer: hydrates a timeline from persisted logs, folds live
//! push payloads into it, and rebuilds idempotently on the polling
//! fallback. Owns nothing across views — one `SessionView` per open
//! session view, discarded with it.

pub mod backend;
pub mod error;
pub mod view;

pub use backend::{PushChannel, SessionBackend};
pub use error::BackendError;
pub use view::{watch, SessionView};
