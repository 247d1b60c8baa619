//! # Event Contracts
//!
//! The single source of truth for inter-service events: the closed subject
//! registry, the payload shape registered for each subject, and the typed
//! publisher that binds the two together.
//!
//! ## Design
//!
//! Every event kind is a fixed `(subject string, payload type)` pair. Both the
//! publisher and the listeners consult the same [`EventData`] binding, so a
//! subject-string typo is a compile error rather than silent delivery loss.
//! There is no runtime subject registration.
//!
//! Payloads serialize as UTF-8 JSON with the field names the services agreed
//! on (camelCase on the wire). Created events carry the full field set plus
//! `id` and `version`; Updated events carry only the changed fields as options
//! plus `id` and the *new* `version`; Deleted events carry `id` alone.

mod publisher;
mod subjects;

pub mod cart;
pub mod coupon;
pub mod order;
pub mod product;
pub mod user;

pub use publisher::{PublishError, Publisher};
pub use subjects::{Subject, UnknownSubject};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Binds a payload type to its fixed subject.
///
/// Implemented once per event kind in the per-aggregate modules; this is the
/// registry both ends consult. Listener dispatch decodes into `Self`, the
/// publisher emits under `Self::SUBJECT`.
pub trait EventData: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The subject this payload is published and consumed under.
    const SUBJECT: Subject;
}
