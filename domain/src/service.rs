use crate::{AddAck, CoreError, KvStore, TodoItem, TODOS_KEY};

/// Application service loading and appending to the stored todo list.
///
/// Generic over the key-value store so hosting layers inject whichever
/// binding they have (memory, SQLite, DynamoDB). Holds no list state between
/// calls; every operation goes to the store.
///
/// `add_item` is an unguarded read-modify-write: two concurrent appends can
/// both read the same prior list, and the later `put` drops the earlier item.
/// Last writer wins.
pub struct TodoListService<S: KvStore> {
    store: S,
    key: String,
}

impl<S: KvStore> TodoListService<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, TODOS_KEY)
    }

    pub fn with_key<K: Into<String>>(store: S, key: K) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the current list. An absent key reads as an empty list; a
    /// present value that fails to decode is an error, never an empty list.
    pub fn load_list(&self) -> Result<Vec<TodoItem>, CoreError> {
        match self.store.get(&self.key)? {
            Some(raw) => decode_list(&raw),
            None => Ok(Vec::new()),
        }
    }

    /// Validate, append one item at the end, and write the whole list back.
    ///
    /// Validation happens before any store access.
    pub fn add_item(&self, text: &str) -> Result<AddAck, CoreError> {
        let item = TodoItem::new(text)?;

        let mut list = self.load_list()?;
        list.push(item.clone());
        let encoded = serde_json::to_string(&list)
            .map_err(|e| CoreError::CorruptData(format!("encode list: {e}")))?;
        self.store.put(&self.key, encoded)?;

        Ok(AddAck {
            success: true,
            item,
        })
    }
}

fn decode_list(raw: &str) -> Result<Vec<TodoItem>, CoreError> {
    // A stored JSON null is read the same as an absent key.
    let parsed: Option<Vec<TodoItem>> =
        serde_json::from_str(raw).map_err(|e| CoreError::CorruptData(format!("decode list: {e}")))?;
    Ok(parsed.unwrap_or_default())
}
