use tallybook_core::RecordId;

/// A command targets a specific record (command abstraction).
///
/// Commands represent **intent**: a request to perform an action on one
/// record. They are transient and are transformed into events (which are
/// facts). A command is rejected if invalid; events represent accepted
/// changes.
///
/// Commands must be `Clone + Send + Sync + 'static` so they can be retried,
/// logged, and moved across async boundaries.
pub trait Command: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// The record this command operates on (routing + transaction boundary).
    fn target_id(&self) -> RecordId;
}
