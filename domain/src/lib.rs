//! Domain library for the Todo List demo.
//!
//! Holds the domain types, the key-value store port, and error definitions.
//! Keep adapters and IO concerns out of this crate; the only external
//! dependencies are serde/serde_json for the stored JSON layout.

use std::error::Error;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Fixed key under which the whole list is stored.
pub const TODOS_KEY: &str = "todos";

/// One user-submitted line of text.
///
/// The text is always trimmed and non-empty. Stored items go through the
/// same check on decode, so a malformed stored value surfaces as
/// `CoreError::CorruptData` instead of being rendered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTodoItem")]
pub struct TodoItem {
    text: String,
}

impl TodoItem {
    pub fn new<S: AsRef<str>>(text: S) -> Result<Self, CoreError> {
        let trimmed = validate::validate_todo_text(text.as_ref())?;
        Ok(Self {
            text: trimmed.to_string(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

// Wire shape of a stored item before validation.
#[derive(Deserialize)]
struct RawTodoItem {
    text: String,
}

impl TryFrom<RawTodoItem> for TodoItem {
    type Error = CoreError;

    fn try_from(raw: RawTodoItem) -> Result<Self, Self::Error> {
        TodoItem::new(raw.text)
    }
}

/// Acknowledgment returned after a successful append.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddAck {
    /// Consumed by the rendering layer to reset the submission form.
    pub success: bool,
    pub item: TodoItem,
}

/// Key-value store port: a handle exposing get/put over one namespace.
///
/// Values are opaque strings (JSON here). Implementations map every backend
/// failure to `CoreError::StoreUnavailable`.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;
    fn put(&self, key: &str, value: String) -> Result<(), CoreError>;
}

impl<T: KvStore + ?Sized> KvStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: String) -> Result<(), CoreError> {
        (**self).put(key, value)
    }
}

impl<T: KvStore + ?Sized> KvStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: String) -> Result<(), CoreError> {
        (**self).put(key, value)
    }
}

/// Core domain errors (no external error crates to keep the domain lean).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Submitted input was rejected; shown inline to the user.
    Validation(String),
    /// The key-value store could not be reached or refused the operation.
    StoreUnavailable(String),
    /// A stored value exists but cannot be decoded as a todo list.
    CorruptData(String),
}

impl CoreError {
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::Validation(_))
    }
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CoreError::Validation(msg) => write!(f, "invalid input: {}", msg),
            CoreError::StoreUnavailable(msg) => write!(f, "store unavailable: {}", msg),
            CoreError::CorruptData(msg) => write!(f, "corrupt stored data: {}", msg),
        }
    }
}

impl Error for CoreError {}

/// Return a short about/version line for the binary to print.
pub fn about() -> String {
    let pkg = env!("CARGO_PKG_NAME");
    let ver = env!("CARGO_PKG_VERSION");
    format!("{} v{} - todo list domain loaded", pkg, ver)
}

pub mod adapters;
pub mod service;
pub mod validate;
