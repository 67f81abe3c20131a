use serde::{Deserialize, Serialize};

/// The signed-in user as returned by `GET /auth/user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}
