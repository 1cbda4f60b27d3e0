use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A locally generated, client-persisted identity. This is NOT an
/// authenticated principal: the id is minted by the client and only
/// promises stability across sessions on the same device. Components
/// taking a `UserIdentity` must not treat it as proof of who the user
/// is, only as the key the one-attempt guard is enforced under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub user_id: Uuid,
    pub display_name: String,
}

impl UserIdentity {
    pub fn new(user_id: Uuid, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
        }
    }
}
