//! Schema registry for decoding incoming messages by type.
//!
//! The registry maps message types to the decode function generated for
//! each member of a [`MessageSet`]. Type 0 is reserved and never registered.
//!
//! # Example
//!
//! ```
//! use bawire::dispatch::SchemaRegistry;
//! use bawire::messages::application::Notification;
//!
//! let registry = SchemaRegistry::<Notification>::new();
//! assert_eq!(registry.name(1), Some("DetectBegin"));
//! assert!(registry.get(0).is_none());
//! ```

use std::collections::HashMap;

use crate::error::{BawireError, Result};
use crate::messages::{MessageSchema, MessageSet};
use crate::protocol::RESERVED_MESSAGE_TYPE;

/// Registry mapping message types to their schemas.
pub struct SchemaRegistry<N> {
    schemas: HashMap<u32, MessageSchema<N>>,
}

impl<N: MessageSet> SchemaRegistry<N> {
    /// Create a registry holding every member of `N`.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for schema in N::schemas() {
            registry.register(schema);
        }
        registry
    }

    /// Create a registry with nothing in it.
    pub fn empty() -> Self {
        Self {
            schemas: HashMap::new(),
        }
    }

    /// Register (or replace) a schema.
    pub fn register(&mut self, schema: MessageSchema<N>) {
        if schema.message_type == RESERVED_MESSAGE_TYPE {
            tracing::warn!(name = schema.name, "refusing to register reserved type 0");
            return;
        }
        self.schemas.insert(schema.message_type, schema);
    }

    /// Drop a schema; later messages of that type are treated as unknown.
    pub fn unregister(&mut self, message_type: u32) -> Option<MessageSchema<N>> {
        self.schemas.remove(&message_type)
    }

    /// Get a schema by message type.
    pub fn get(&self, message_type: u32) -> Option<&MessageSchema<N>> {
        self.schemas.get(&message_type)
    }

    /// Get a message name by type.
    pub fn name(&self, message_type: u32) -> Option<&'static str> {
        self.schemas.get(&message_type).map(|s| s.name)
    }

    /// Check if a type is registered.
    pub fn contains(&self, message_type: u32) -> bool {
        self.schemas.contains_key(&message_type)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Decode `(args, results)` for `message_type`.
    pub fn decode(&self, message_type: u32, args: &[u8], results: &[u8]) -> Result<N> {
        let schema = self
            .get(message_type)
            .ok_or(BawireError::NotImplemented)?;
        (schema.decode)(args, results)
    }
}

impl<N: MessageSet> Default for SchemaRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}
