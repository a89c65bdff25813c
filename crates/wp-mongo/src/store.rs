//! # MongoDB Store
//!
//! One long-lived client per process, shared by every request. Collections
//! live in a single database: `tools`, `users`, `orders`, `payment`,
//! `comments`.

use crate::codec::{db_error, from_document, insert_result, object_id, to_document, update_result};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{IndexOptions, ReplaceOptions, UpdateOptions},
    Client as MongoClient, Collection, Database, IndexModel,
};
use serde::de::DeserializeOwned;
use tracing::{error, info, instrument, warn};
use wp_core::{
    AppResult, Comment, CommentRepository, DeleteResult, DocumentId, InsertResult, Order,
    OrderRepository, Payment, Role, Store, Tool, ToolRepository, UpdateResult, User,
    UserProfile, UserRepository,
};

#[derive(Clone)]
pub struct MongoStore {
    client: MongoClient,
    db: Database,
}

impl MongoStore {
    /// Connect and verify the deployment answers
    pub async fn connect(uri: &str, database: &str) -> AppResult<Self> {
        info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            error!("Failed to connect to MongoDB: {}", e);
            db_error(e)
        })?;
        let store = Self {
            db: client.database(database),
            client,
        };
        store.ping().await?;
        info!(database = %database, "Successfully connected to MongoDB database");
        Ok(store)
    }

    pub async fn initialize_indexes(&self) -> AppResult<()> {
        info!("Creating MongoDB indexes");

        let unique_email = |name: &str| {
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(
                    IndexOptions::builder()
                        .name(name.to_string())
                        .unique(true)
                        .build(),
                )
                .build()
        };

        self.users()
            .create_index(unique_email("user_email_unique"), None)
            .await
            .map_err(db_error)?;
        self.comments()
            .create_index(unique_email("comment_email_unique"), None)
            .await
            .map_err(db_error)?;

        let order_owner = IndexModel::builder()
            .keys(doc! { "userEmail": 1 })
            .options(IndexOptions::builder().name("order_owner_lookup".to_string()).build())
            .build();
        self.orders()
            .create_index(order_owner, None)
            .await
            .map_err(db_error)?;

        let payment_order = IndexModel::builder()
            .keys(doc! { "orderId": 1 })
            .options(IndexOptions::builder().name("payment_order_lookup".to_string()).build())
            .build();
        self.payments()
            .create_index(payment_order, None)
            .await
            .map_err(db_error)?;

        info!("MongoDB indexes ready");
        Ok(())
    }

    /// Flush pending work and close the connection pool
    pub async fn shutdown(self) {
        info!("Shutting down MongoDB client");
        self.client.shutdown().await;
    }

    fn tools(&self) -> Collection<Document> {
        self.db.collection("tools")
    }

    fn users(&self) -> Collection<Document> {
        self.db.collection("users")
    }

    fn orders(&self) -> Collection<Document> {
        self.db.collection("orders")
    }

    fn payments(&self) -> Collection<Document> {
        self.db.collection("payment")
    }

    fn comments(&self) -> Collection<Document> {
        self.db.collection("comments")
    }

    async fn find_all<T: DeserializeOwned>(
        collection: Collection<Document>,
        filter: Option<Document>,
    ) -> AppResult<Vec<T>> {
        let cursor = collection.find(filter, None).await.map_err(db_error)?;
        let docs: Vec<Document> = cursor.try_collect().await.map_err(db_error)?;
        docs.into_iter().map(from_document).collect()
    }

    async fn find_first<T: DeserializeOwned>(
        collection: Collection<Document>,
        filter: Document,
    ) -> AppResult<Option<T>> {
        collection
            .find_one(filter, None)
            .await
            .map_err(db_error)?
            .map(from_document)
            .transpose()
    }
}

#[async_trait]
impl ToolRepository for MongoStore {
    #[instrument(skip(self, tool), fields(tool_id = %tool.id))]
    async fn insert_tool(&self, tool: Tool) -> AppResult<InsertResult> {
        let result = self
            .tools()
            .insert_one(to_document(&tool)?, None)
            .await
            .map_err(db_error)?;
        insert_result(&result.inserted_id)
    }

    async fn find_tool(&self, id: &DocumentId) -> AppResult<Option<Tool>> {
        Self::find_first(self.tools(), doc! { "_id": object_id(id)? }).await
    }

    async fn list_tools(&self) -> AppResult<Vec<Tool>> {
        Self::find_all(self.tools(), None).await
    }
}

#[async_trait]
impl UserRepository for MongoStore {
    #[instrument(skip(self, profile))]
    async fn upsert_user(&self, email: &str, profile: UserProfile) -> AppResult<UpdateResult> {
        let profile = to_document(&profile)?;
        let options = UpdateOptions::builder().upsert(true).build();
        let result = self
            .users()
            .update_one(
                doc! { "email": email },
                doc! { "$set": { "profile": profile } },
                options,
            )
            .await
            .map_err(db_error)?;
        update_result(
            result.matched_count,
            result.modified_count,
            result.upserted_id.as_ref(),
        )
    }

    async fn find_user(&self, email: &str) -> AppResult<Option<User>> {
        Self::find_first(self.users(), doc! { "email": email }).await
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        Self::find_all(self.users(), None).await
    }

    #[instrument(skip(self))]
    async fn set_role(&self, email: &str, role: Role) -> AppResult<UpdateResult> {
        let role = match role {
            Role::Admin => "admin",
            Role::Member => "member",
        };
        let result = self
            .users()
            .update_one(doc! { "email": email }, doc! { "$set": { "role": role } }, None)
            .await
            .map_err(db_error)?;
        update_result(
            result.matched_count,
            result.modified_count,
            result.upserted_id.as_ref(),
        )
    }
}

#[async_trait]
impl OrderRepository for MongoStore {
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    async fn insert_order(&self, order: Order) -> AppResult<InsertResult> {
        let result = self
            .orders()
            .insert_one(to_document(&order)?, None)
            .await
            .map_err(db_error)?;
        insert_result(&result.inserted_id)
    }

    async fn find_order(&self, id: &DocumentId) -> AppResult<Option<Order>> {
        Self::find_first(self.orders(), doc! { "_id": object_id(id)? }).await
    }

    async fn list_orders_by_email(&self, email: &str) -> AppResult<Vec<Order>> {
        Self::find_all(self.orders(), Some(doc! { "userEmail": email })).await
    }

    #[instrument(skip(self))]
    async fn delete_order(&self, id: &DocumentId) -> AppResult<DeleteResult> {
        let result = self
            .orders()
            .delete_one(doc! { "_id": object_id(id)? }, None)
            .await
            .map_err(db_error)?;
        Ok(DeleteResult::new(result.deleted_count))
    }

    #[instrument(skip(self, payment), fields(payment_id = %payment.id))]
    async fn record_payment(
        &self,
        order_id: &DocumentId,
        payment: Payment,
    ) -> AppResult<Option<UpdateResult>> {
        let filter = doc! { "_id": object_id(order_id)? };
        let update = doc! {
            "$set": { "paid": true, "transactionId": payment.transaction_id.as_str() }
        };
        let payment = to_document(&payment)?;

        let mut session = self.client.start_session(None).await.map_err(db_error)?;
        session.start_transaction(None).await.map_err(db_error)?;

        let updated = match self
            .orders()
            .update_one_with_session(filter, update, None, &mut session)
            .await
        {
            Ok(updated) => updated,
            Err(e) => {
                session.abort_transaction().await.ok();
                return Err(db_error(e));
            }
        };

        if updated.matched_count == 0 {
            warn!(order_id = %order_id, "payment for unknown order, aborting");
            session.abort_transaction().await.map_err(db_error)?;
            return Ok(None);
        }

        if let Err(e) = self
            .payments()
            .insert_one_with_session(payment, None, &mut session)
            .await
        {
            session.abort_transaction().await.ok();
            return Err(db_error(e));
        }

        session.commit_transaction().await.map_err(db_error)?;

        update_result(updated.matched_count, updated.modified_count, None).map(Some)
    }

    async fn list_payments_for_order(&self, order_id: &DocumentId) -> AppResult<Vec<Payment>> {
        Self::find_all(self.payments(), Some(doc! { "orderId": order_id.as_str() })).await
    }
}

#[async_trait]
impl CommentRepository for MongoStore {
    #[instrument(skip(self, comment), fields(email = %comment.email))]
    async fn upsert_comment(&self, comment: Comment) -> AppResult<UpdateResult> {
        let mut replacement = to_document(&comment)?;
        replacement.remove("_id");
        let options = ReplaceOptions::builder().upsert(true).build();
        let result = self
            .comments()
            .replace_one(doc! { "email": comment.email.as_str() }, replacement, options)
            .await
            .map_err(db_error)?;
        update_result(
            result.matched_count,
            result.modified_count,
            result.upserted_id.as_ref(),
        )
    }

    async fn list_comments(&self) -> AppResult<Vec<Comment>> {
        Self::find_all(self.comments(), None).await
    }
}

#[async_trait]
impl Store for MongoStore {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    async fn ping(&self) -> AppResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                error!("MongoDB health check failed: {}", e);
                db_error(e)
            })?;
        Ok(())
    }
}
