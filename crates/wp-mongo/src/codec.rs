//! Conversions between typed records and BSON documents.
//!
//! Records carry their id as a 24-hex string; in the database `_id` is a
//! native ObjectId so documents written by other clients stay readable.
//! Timestamps are stored as BSON datetimes and may be missing on older
//! documents.

use chrono::{DateTime, Utc};
use mongodb::bson::{self, oid::ObjectId, Bson, Document};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wp_core::{AppError, AppResult, DocumentId, InsertResult, UpdateResult};

const SERVICE: &str = "mongodb";

/// Record fields holding a point in time
const TIMESTAMP_FIELDS: &[&str] = &["createdAt"];

pub(crate) fn db_error(err: mongodb::error::Error) -> AppError {
    AppError::upstream(SERVICE, err)
}

pub(crate) fn object_id(id: &DocumentId) -> AppResult<ObjectId> {
    ObjectId::parse_str(id.as_str())
        .map_err(|_| AppError::InvalidArgument(format!("malformed identifier: {id}")))
}

fn document_id(value: &Bson) -> AppResult<DocumentId> {
    match value {
        Bson::ObjectId(oid) => DocumentId::parse(&oid.to_hex()),
        Bson::String(raw) => DocumentId::parse(raw),
        other => Err(AppError::Internal(format!("unexpected _id type: {other}"))),
    }
}

/// Serialize a record, storing `_id` as an ObjectId
pub(crate) fn to_document<T: Serialize>(record: &T) -> AppResult<Document> {
    let mut doc = bson::to_document(record)
        .map_err(|e| AppError::Internal(format!("failed to encode record: {e}")))?;
    if let Some(Bson::String(raw)) = doc.get("_id") {
        let oid = ObjectId::parse_str(raw)
            .map_err(|_| AppError::InvalidArgument(format!("malformed identifier: {raw}")))?;
        doc.insert("_id", oid);
    }
    for field in TIMESTAMP_FIELDS {
        if let Some(Bson::String(raw)) = doc.get(*field) {
            let at = DateTime::parse_from_rfc3339(raw)
                .map_err(|e| AppError::Internal(format!("bad {field} timestamp: {e}")))?;
            doc.insert(*field, bson::DateTime::from_chrono(at.with_timezone(&Utc)));
        }
    }
    Ok(doc)
}

/// Deserialize a stored document, rendering `_id` back as hex
pub(crate) fn from_document<T: DeserializeOwned>(mut doc: Document) -> AppResult<T> {
    if let Some(Bson::ObjectId(oid)) = doc.get("_id") {
        let hex = oid.to_hex();
        doc.insert("_id", hex);
    }
    for field in TIMESTAMP_FIELDS {
        if let Some(Bson::DateTime(at)) = doc.get(*field) {
            let rendered = at.to_chrono().to_rfc3339();
            doc.insert(*field, rendered);
        }
    }
    bson::from_document(doc)
        .map_err(|e| AppError::upstream(SERVICE, format!("failed to decode document: {e}")))
}

pub(crate) fn insert_result(inserted_id: &Bson) -> AppResult<InsertResult> {
    Ok(InsertResult::new(document_id(inserted_id)?))
}

pub(crate) fn update_result(
    matched_count: u64,
    modified_count: u64,
    upserted_id: Option<&Bson>,
) -> AppResult<UpdateResult> {
    Ok(UpdateResult {
        acknowledged: true,
        matched_count,
        modified_count,
        upserted_id: upserted_id.map(document_id).transpose()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;
    use wp_core::{NewOrder, Order, Tool};

    fn tool() -> Tool {
        Tool {
            id: DocumentId::generate(),
            name: "Claw Hammer".to_string(),
            description: None,
            image: None,
            price: 12.5,
            minimum_quantity: Some(10),
            available_quantity: Some(400),
        }
    }

    #[test]
    fn test_id_stored_as_object_id() {
        let tool = tool();
        let doc = to_document(&tool).unwrap();
        let oid = doc.get_object_id("_id").unwrap();
        assert_eq!(oid.to_hex(), tool.id.as_str());
        assert_eq!(doc.get_str("name").unwrap(), "Claw Hammer");
    }

    #[test]
    fn test_round_trip_through_stored_shape() {
        let tool = tool();
        let back: Tool = from_document(to_document(&tool).unwrap()).unwrap();
        assert_eq!(back, tool);
    }

    #[test]
    fn test_reads_documents_from_other_clients() {
        let oid = ObjectId::new();
        let stored = doc! {
            "_id": oid,
            "userEmail": "ada@example.com",
            "toolName": "Saw",
        };
        let order: Order = from_document(stored).unwrap();
        assert_eq!(order.id.as_str(), oid.to_hex());
        assert!(order.created_at.is_none());
        assert!(!order.paid);

        // string timestamps written by hand stay readable
        let stored = doc! {
            "_id": ObjectId::new(),
            "userEmail": "ada@example.com",
            "createdAt": "2022-06-01T10:00:00Z",
        };
        let order: Order = from_document(stored).unwrap();
        assert_eq!(order.created_at.unwrap().to_rfc3339(), "2022-06-01T10:00:00+00:00");
    }

    #[test]
    fn test_timestamps_stored_as_datetime() {
        let new: NewOrder =
            serde_json::from_value(serde_json::json!({"userEmail": "ada@example.com"})).unwrap();
        let order = new.into_order().unwrap();

        let doc = to_document(&order).unwrap();
        let stored = doc.get_datetime("createdAt").unwrap();
        assert_eq!(
            stored.timestamp_millis(),
            order.created_at.unwrap().timestamp_millis()
        );

        let back: Order = from_document(doc).unwrap();
        assert_eq!(
            back.created_at.map(|at| at.timestamp_millis()),
            order.created_at.map(|at| at.timestamp_millis())
        );
    }

    #[test]
    fn test_update_result_maps_upserted_id() {
        let oid = ObjectId::new();
        let result = update_result(0, 0, Some(&Bson::ObjectId(oid))).unwrap();
        assert_eq!(result.upserted_id.unwrap().as_str(), oid.to_hex());

        let inserted = insert_result(&Bson::ObjectId(oid)).unwrap();
        assert_eq!(inserted.inserted_id.as_str(), oid.to_hex());
    }
}
