use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ----------------- User Request -----------------
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CreateUserRequest {
    pub username: String,
    #[serde(default)]
    pub is_staff: bool,
}

// ----------------- Post Request -----------------
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CreatePostRequest {
    pub title: String,
    pub text: String,
    /// Derived from the title when absent.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    pub published_at: DateTime<Utc>,
}

// ----------------- Comment Request -----------------
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CommentRequest {
    pub text: String,
    pub published_at: DateTime<Utc>,
}
