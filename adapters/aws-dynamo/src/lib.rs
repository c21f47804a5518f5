//! DynamoDB adapter implementing the `KvStore` port.
//!
//! - One table acts as the key-value namespace binding; each item is
//!   `{ key: S, value: S }` with `key` as the partition key.
//! - `put` is an unconditional `PutItem`, so a read-modify-write in higher
//!   layers is last-writer-wins.
//! - Provides `from_env()` wiring for Lambda/apps using `DYNAMO_TABLE_KV`.
//!
//! Notes:
//! - The domain `KvStore` trait is synchronous. We bridge to the async AWS
//!   SDK using an internal `tokio::runtime::Runtime` and `block_on`.

use std::collections::HashMap;

use aws_sdk_dynamodb::{types::AttributeValue, Client};
use aws_smithy_types::error::metadata::ProvideErrorMetadata;
use domain::{CoreError, KvStore};

const KEY_ATTR: &str = "key";
const VALUE_ATTR: &str = "value";

/// Repository backed by AWS DynamoDB.
///
/// Supports both standalone mode (creates its own Tokio runtime) and Lambda mode
/// (reuses the existing runtime via `Handle::current()`).
#[derive(Clone)]
pub struct DynamoKv {
    table: String,
    client: Client,
    // Optional runtime - None when running inside Lambda (reuses existing runtime)
    rt: Option<std::sync::Arc<tokio::runtime::Runtime>>,
}

impl DynamoKv {
    /// Create a new store from an explicit table name and an AWS SDK client.
    pub fn with_client(table: impl Into<String>, client: Client) -> Result<Self, CoreError> {
        let rt = Self::maybe_create_runtime()?;
        Ok(Self {
            table: table.into(),
            client,
            rt,
        })
    }

    /// Construct with a table name but create a default AWS SDK client using env/IMDS.
    pub fn new(table: impl Into<String>) -> Result<Self, CoreError> {
        let rt = Self::maybe_create_runtime()?;
        let conf = Self::block_on_with_rt(&rt, aws_config::load_from_env());
        let client = Client::new(&conf);
        Ok(Self {
            table: table.into(),
            client,
            rt,
        })
    }

    /// Construct from the `DYNAMO_TABLE_KV` environment variable.
    pub fn from_env() -> Result<Self, CoreError> {
        let table = table_from_env()?;
        Self::new(table)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Check if we're inside a Tokio runtime. If yes, return None (reuse existing).
    /// If no, create a new runtime.
    fn maybe_create_runtime() -> Result<Option<std::sync::Arc<tokio::runtime::Runtime>>, CoreError> {
        if tokio::runtime::Handle::try_current().is_ok() {
            Ok(None)
        } else {
            let rt = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .map_err(|e| CoreError::StoreUnavailable(format!("tokio runtime init: {e}")))?;
            Ok(Some(std::sync::Arc::new(rt)))
        }
    }

    fn block_on<F: std::future::Future>(&self, fut: F) -> F::Output {
        Self::block_on_with_rt(&self.rt, fut)
    }

    fn block_on_with_rt<F: std::future::Future>(
        rt: &Option<std::sync::Arc<tokio::runtime::Runtime>>,
        fut: F,
    ) -> F::Output {
        match rt {
            Some(rt) => rt.block_on(fut),
            None => {
                // Inside an existing runtime: needs the multi-threaded flavour.
                tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(fut))
            }
        }
    }
}

/// Read the table name from `DYNAMO_TABLE_KV`.
pub fn table_from_env() -> Result<String, CoreError> {
    std::env::var("DYNAMO_TABLE_KV")
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CoreError::StoreUnavailable("missing DYNAMO_TABLE_KV".into()))
}

impl KvStore for DynamoKv {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let table = self.table.clone();
        let key = key.to_string();
        let fut = async {
            self.client
                .get_item()
                .table_name(table)
                .key(KEY_ATTR, AttributeValue::S(key))
                .consistent_read(true)
                .send()
                .await
        };
        let out = self.block_on(fut).map_err(map_sdk_err)?;
        match out.item() {
            Some(item) => item_to_value(item).map(Some),
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: String) -> Result<(), CoreError> {
        let table = self.table.clone();
        let item = value_to_item(key, value);
        let fut = async {
            self.client
                .put_item()
                .table_name(table)
                .set_item(Some(item))
                .send()
                .await
        };
        self.block_on(fut).map_err(map_sdk_err)?;
        Ok(())
    }
}

fn map_sdk_err<E: ProvideErrorMetadata + std::fmt::Display>(e: E) -> CoreError {
    if let Some(code) = e.code() {
        if code == "ResourceNotFoundException" {
            return CoreError::StoreUnavailable("missing table".into());
        }
    }
    CoreError::StoreUnavailable(format!("dynamo error: {e}"))
}

fn value_to_item(key: &str, value: String) -> HashMap<String, AttributeValue> {
    let mut m = HashMap::new();
    m.insert(KEY_ATTR.into(), AttributeValue::S(key.to_string()));
    m.insert(VALUE_ATTR.into(), AttributeValue::S(value));
    m
}

fn item_to_value(item: &HashMap<String, AttributeValue>) -> Result<String, CoreError> {
    item.get(VALUE_ATTR)
        .and_then(|av| av.as_s().ok())
        .cloned()
        .ok_or_else(|| CoreError::CorruptData("item missing string `value` attribute".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_mapping_roundtrip() {
        let item = value_to_item("todos", r#"[{"text":"A"}]"#.into());
        assert_eq!(item.get(KEY_ATTR), Some(&AttributeValue::S("todos".into())));
        assert_eq!(item_to_value(&item).unwrap(), r#"[{"text":"A"}]"#);
    }

    #[test]
    fn item_without_value_is_corrupt() {
        let mut item = HashMap::new();
        item.insert(KEY_ATTR.to_string(), AttributeValue::S("todos".into()));
        assert!(matches!(item_to_value(&item), Err(CoreError::CorruptData(_))));

        item.insert(VALUE_ATTR.to_string(), AttributeValue::N("1".into()));
        assert!(matches!(item_to_value(&item), Err(CoreError::CorruptData(_))));
    }

    #[test]
    fn table_from_env_requires_value() {
        std::env::remove_var("DYNAMO_TABLE_KV");
        assert!(table_from_env().is_err());
        std::env::set_var("DYNAMO_TABLE_KV", "todolist-kv");
        assert_eq!(table_from_env().unwrap(), "todolist-kv");
        std::env::remove_var("DYNAMO_TABLE_KV");
    }
}
