use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    #[serde(rename = "userId")]
    pub id: String,
    #[serde(rename = "userName")]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "profilePictureUrl", default)]
    pub avatar_url: Option<String>,
}
