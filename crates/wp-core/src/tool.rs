//! # Tool Catalog Records

use crate::error::AppResult;
use crate::id::DocumentId;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A tool listed in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    #[serde(rename = "_id")]
    pub id: DocumentId,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Unit price in major currency units
    pub price: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_quantity: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_quantity: Option<u32>,
}

/// Body of an admin tool submission
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewTool {
    #[validate(length(min = 1, message = "tool name must not be empty"))]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    #[validate(url)]
    pub image: Option<String>,

    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,

    #[serde(default)]
    #[validate(range(min = 1))]
    pub minimum_quantity: Option<u32>,

    #[serde(default)]
    pub available_quantity: Option<u32>,
}

impl NewTool {
    /// Validate the submission and assign it a fresh id
    pub fn into_tool(self) -> AppResult<Tool> {
        self.validate()?;
        Ok(Tool {
            id: DocumentId::generate(),
            name: self.name,
            description: self.description,
            image: self.image,
            price: self.price,
            minimum_quantity: self.minimum_quantity,
            available_quantity: self.available_quantity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde_json::json;

    #[test]
    fn test_new_tool_accepted() {
        let new: NewTool = serde_json::from_value(json!({
            "name": "Claw Hammer",
            "price": 12.5,
            "minimumQuantity": 10,
            "availableQuantity": 500
        }))
        .unwrap();
        let tool = new.into_tool().unwrap();
        assert_eq!(tool.name, "Claw Hammer");
        assert_eq!(tool.minimum_quantity, Some(10));
    }

    #[test]
    fn test_new_tool_rejected() {
        let new: NewTool = serde_json::from_value(json!({"name": "", "price": -1.0})).unwrap();
        assert!(matches!(new.into_tool(), Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn test_tool_wire_shape() {
        let new: NewTool = serde_json::from_value(json!({"name": "Saw", "price": 8.0})).unwrap();
        let value = serde_json::to_value(new.into_tool().unwrap()).unwrap();
        assert!(value.get("_id").is_some());
        assert!(value.get("minimumQuantity").is_none());
    }
}
