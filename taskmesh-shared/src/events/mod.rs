/// Account lifecycle event schema and stream serialization
///
/// Every successful account mutation in the authentication service publishes
/// one event to the `account` Redis stream. The task-tracking service
/// consumes these events to maintain its local account mirror.
///
/// # Wire format
///
/// Each stream entry carries two fields:
///
/// ```text
/// op:      "create" | "update" | "delete"
/// payload: JSON object
/// ```
///
/// For `create`/`update` the payload is
/// `{username, first_name, last_name, email, role, user_public_id}` with all
/// keys present (update values may be null). For `delete` it is
/// `{user_id: "<uuid>"}`.
///
/// The op set is closed: routing happens over the [`AccountEvent`] enum so a
/// consumer cannot forget a variant.
///
/// # Example
///
/// ```
/// use taskmesh_shared::events::{deserialize_event, serialize_event, AccountEvent};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let event = AccountEvent::Deleted { user_id: Uuid::new_v4() };
///
/// let fields = serialize_event(&event)?;
/// assert_eq!(fields.get("op").map(String::as_str), Some("delete"));
///
/// let roundtrip = deserialize_event(&fields)?;
/// assert_eq!(event, roundtrip);
/// # Ok(())
/// # }
/// ```

use crate::models::role::Role;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Name of the Redis stream carrying account lifecycle events
pub const ACCOUNT_STREAM: &str = "account";

/// Event serialization errors
#[derive(Error, Debug)]
pub enum EventError {
    /// Missing required stream field
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Operation tag outside the closed create/update/delete set
    #[error("Unknown event operation: {0}")]
    UnknownOp(String),

    /// JSON payload error
    #[error("Payload error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Full account field set carried by create and update events
///
/// Create events always populate every field. Update events carry exactly
/// what the caller supplied, so any field other than the identity may be
/// null; the mirror consumer decides what null means (taskmesh merges,
/// preserving unset fields).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPayload {
    /// Unique login name
    pub username: Option<String>,

    /// Optional given name
    pub first_name: Option<String>,

    /// Optional family name
    pub last_name: Option<String>,

    /// Optional contact email
    pub email: Option<String>,

    /// Numeric role (admin=1, manager=2, client=3)
    pub role: Option<Role>,

    /// Stable external identity, the cross-service join key
    pub user_public_id: Uuid,
}

/// Delete events carry only the external identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct DeletePayload {
    user_id: Uuid,
}

/// Account lifecycle event
///
/// Closed variant set over the stream's op tags; consumers match
/// exhaustively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountEvent {
    /// A new account was committed
    Created(AccountPayload),

    /// An existing account was mutated
    Updated(AccountPayload),

    /// An account was removed
    Deleted {
        /// The removed account's public identity
        user_id: Uuid,
    },
}

impl AccountEvent {
    /// The wire op tag for this event
    pub fn op(&self) -> &'static str {
        match self {
            AccountEvent::Created(_) => "create",
            AccountEvent::Updated(_) => "update",
            AccountEvent::Deleted { .. } => "delete",
        }
    }

    /// The public identity the event is about, for logging
    pub fn public_id(&self) -> Uuid {
        match self {
            AccountEvent::Created(payload) | AccountEvent::Updated(payload) => {
                payload.user_public_id
            }
            AccountEvent::Deleted { user_id } => *user_id,
        }
    }
}

/// Serializes an event to Redis stream field-value pairs
///
/// # Errors
///
/// Returns `EventError::Json` if payload serialization fails.
pub fn serialize_event(event: &AccountEvent) -> Result<HashMap<String, String>, EventError> {
    let payload = match event {
        AccountEvent::Created(payload) | AccountEvent::Updated(payload) => {
            serde_json::to_string(payload)?
        }
        AccountEvent::Deleted { user_id } => {
            serde_json::to_string(&DeletePayload { user_id: *user_id })?
        }
    };

    let mut fields = HashMap::new();
    fields.insert("op".to_string(), event.op().to_string());
    fields.insert("payload".to_string(), payload);

    Ok(fields)
}

/// Deserializes an event from Redis stream field-value pairs
///
/// # Errors
///
/// Returns an error if the `op` or `payload` field is missing, the op tag is
/// outside the closed set, or the payload JSON is malformed. The consumer
/// logs such entries and moves on; one bad message never stops the loop.
pub fn deserialize_event(fields: &HashMap<String, String>) -> Result<AccountEvent, EventError> {
    let op = fields.get("op").ok_or(EventError::MissingField("op"))?;
    let payload = fields
        .get("payload")
        .ok_or(EventError::MissingField("payload"))?;

    match op.as_str() {
        "create" => Ok(AccountEvent::Created(serde_json::from_str(payload)?)),
        "update" => Ok(AccountEvent::Updated(serde_json::from_str(payload)?)),
        "delete" => {
            let delete: DeletePayload = serde_json::from_str(payload)?;
            Ok(AccountEvent::Deleted {
                user_id: delete.user_id,
            })
        }
        other => Err(EventError::UnknownOp(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_payload() -> AccountPayload {
        AccountPayload {
            username: Some("alice".to_string()),
            first_name: Some("Alice".to_string()),
            last_name: Some("Liddell".to_string()),
            email: Some("alice@example.com".to_string()),
            role: Some(Role::Client),
            user_public_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_create_event_roundtrip() {
        let event = AccountEvent::Created(full_payload());

        let fields = serialize_event(&event).unwrap();
        assert_eq!(fields.get("op").map(String::as_str), Some("create"));

        let roundtrip = deserialize_event(&fields).unwrap();
        assert_eq!(event, roundtrip);
    }

    #[test]
    fn test_update_payload_keeps_null_fields() {
        // An update that touches only the role must still carry every key,
        // with the untouched ones null.
        let payload = AccountPayload {
            username: None,
            first_name: None,
            last_name: None,
            email: None,
            role: Some(Role::Manager),
            user_public_id: Uuid::new_v4(),
        };
        let fields = serialize_event(&AccountEvent::Updated(payload.clone())).unwrap();

        let json: serde_json::Value = serde_json::from_str(&fields["payload"]).unwrap();
        assert!(json["username"].is_null());
        assert!(json["email"].is_null());
        assert_eq!(json["role"], 2);

        let roundtrip = deserialize_event(&fields).unwrap();
        assert_eq!(AccountEvent::Updated(payload), roundtrip);
    }

    #[test]
    fn test_delete_event_wire_shape() {
        let user_id = Uuid::new_v4();
        let fields = serialize_event(&AccountEvent::Deleted { user_id }).unwrap();

        assert_eq!(fields.get("op").map(String::as_str), Some("delete"));
        let json: serde_json::Value = serde_json::from_str(&fields["payload"]).unwrap();
        assert_eq!(json["user_id"], user_id.to_string());
    }

    #[test]
    fn test_unknown_op_rejected() {
        let mut fields = HashMap::new();
        fields.insert("op".to_string(), "upsert".to_string());
        fields.insert("payload".to_string(), "{}".to_string());

        assert!(matches!(
            deserialize_event(&fields),
            Err(EventError::UnknownOp(_))
        ));
    }

    #[test]
    fn test_missing_fields_rejected() {
        let mut fields = HashMap::new();
        fields.insert("op".to_string(), "create".to_string());

        assert!(matches!(
            deserialize_event(&fields),
            Err(EventError::MissingField("payload"))
        ));
    }
}
