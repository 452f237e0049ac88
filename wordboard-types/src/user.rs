use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// `oauth_id` is the identity provider's subject claim; it is how the auth
/// layer maps a validated token back to a stored user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub display_name: String,
    pub oauth_id: String,
}
