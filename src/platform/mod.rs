//! Browser platform bridges
//!
//! - `storage`: LocalStorage-backed key-value store
//! - `host`: chat-client host integration (haptics, readiness) plus audio
//! - `phrases`: remote motivational phrase supplier
//!
//! Everything here is best-effort: a missing host object, blocked storage
//! or a failed request degrades to a no-op or a fallback.

#[cfg(target_arch = "wasm32")]
pub mod host;
#[cfg(target_arch = "wasm32")]
pub mod phrases;
#[cfg(target_arch = "wasm32")]
pub mod storage;

#[cfg(target_arch = "wasm32")]
pub use host::{HostFeedback, prepare_host};
#[cfg(target_arch = "wasm32")]
pub use phrases::RemotePhrases;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStore;
