//! # Review Comments
//!
//! At most one comment per email is kept; a later submission replaces the
//! earlier one.

use crate::error::AppResult;
use crate::id::DocumentId;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: DocumentId,

    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub review: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewComment {
    #[validate(email)]
    pub email: String,

    #[serde(default)]
    pub name: Option<String>,

    #[validate(length(min = 1, message = "review must not be empty"))]
    pub review: String,

    #[serde(default)]
    #[validate(range(min = 1, max = 5))]
    pub rating: Option<u8>,
}

impl NewComment {
    pub fn into_comment(self) -> AppResult<Comment> {
        self.validate()?;
        Ok(Comment {
            id: DocumentId::generate(),
            email: self.email,
            name: self.name,
            review: self.review,
            rating: self.rating,
        })
    }
}
