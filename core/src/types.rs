//! Response DTOs for the example routes.
//!
//! Field names follow the randomuser.me payload; unknown fields are ignored
//! so the full upstream document decodes into these trimmed shapes.

use serde::{Deserialize, Serialize};

/// Response of `UserRoute::GetUser`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RandomUser {
    pub results: Vec<UserProfile>,
}

impl RandomUser {
    pub fn first(&self) -> Option<&UserProfile> {
        self.results.first()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub name: Name,
    pub picture: Picture,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Name {
    pub title: String,
    pub first: String,
    pub last: String,
}

impl Name {
    /// `"{first} {last}"`, the form shown to users.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first, self.last)
    }
}

/// Photo URLs in three sizes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Picture {
    pub large: String,
    pub medium: String,
    pub thumbnail: String,
}
