//! MongoDB delivery backend.
//!
//! # Responsibilities
//! - Lazily connect on first use and keep the handle for the process
//! - Insert one document per accepted submission
//! - Provision the collection validator and indexes (`init-db`)
//!
//! # Design Decisions
//! - A failed connect leaves the handle empty, so the next request retries
//!   the connect; the failed request itself is not retried
//! - The connection string is never logged (it carries credentials)

use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::{doc, Bson, DateTime as BsonDateTime, Document};
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use tokio::sync::OnceCell;

use crate::config::MongoConfig;
use crate::contact::{ContactSubmission, MESSAGE_MAX_CHARS, MESSAGE_MIN_CHARS, NAME_MAX_CHARS};
use crate::delivery::{ContactSink, DeliveryError, Receipt, SinkKind};

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]{2,}$";
const PHONE_PATTERN: &str = r"^[0-9+()\s-]{7,20}$";
const APP_NAME: &str = "contact-relay";

const NAME_MAX_LEN: i64 = NAME_MAX_CHARS as i64;
const MESSAGE_MIN_LEN: i64 = MESSAGE_MIN_CHARS as i64;
const MESSAGE_MAX_LEN: i64 = MESSAGE_MAX_CHARS as i64;

/// Stores submissions in a MongoDB collection.
pub struct MongoSink {
    config: MongoConfig,
    database: OnceCell<Database>,
}

impl MongoSink {
    pub fn new(config: MongoConfig) -> Self {
        Self {
            config,
            database: OnceCell::new(),
        }
    }

    async fn database(&self) -> Result<&Database, DeliveryError> {
        let uri = self
            .config
            .uri
            .as_deref()
            .ok_or(DeliveryError::NotConfigured { sink: SinkKind::Mongo })?;

        self.database.get_or_try_init(|| self.connect(uri)).await
    }

    async fn connect(&self, uri: &str) -> Result<Database, DeliveryError> {
        tracing::info!(database = %self.config.database, "Connecting to MongoDB");

        let mut options = ClientOptions::parse(uri).await.map_err(unavailable)?;
        options.server_selection_timeout =
            Some(Duration::from_secs(self.config.server_selection_timeout_secs));
        options.app_name.get_or_insert_with(|| APP_NAME.to_string());

        let client = Client::with_options(options).map_err(unavailable)?;
        let database = client.database(&self.config.database);
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(unavailable)?;

        tracing::info!(
            database = %self.config.database,
            collection = %self.config.collection,
            "Connected to MongoDB"
        );
        Ok(database)
    }

    /// Create the collection with its validator, or update the validator of
    /// an existing one, then ensure the `email` and `createdAt` indexes.
    pub async fn ensure_collection(&self) -> Result<(), DeliveryError> {
        let database = self.database().await?;
        let name = self.config.collection.as_str();

        let existing = database.list_collection_names().await.map_err(transport)?;
        let mut command = if existing.iter().any(|c| c == name) {
            doc! { "collMod": name }
        } else {
            doc! { "create": name }
        };
        command.insert("validator", doc! { "$jsonSchema": collection_schema() });
        command.insert("validationLevel", "strict");
        command.insert("validationAction", "error");

        database.run_command(command).await.map_err(transport)?;
        tracing::info!(collection = %name, "Collection validator applied");

        let collection: Collection<Document> = database.collection(name);
        for keys in [doc! { "email": 1 }, doc! { "createdAt": -1 }] {
            collection
                .create_index(IndexModel::builder().keys(keys).build())
                .await
                .map_err(transport)?;
        }
        tracing::info!(collection = %name, "Indexes created: email, createdAt");

        Ok(())
    }
}

#[async_trait]
impl ContactSink for MongoSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Mongo
    }

    fn is_configured(&self) -> bool {
        self.config.uri.is_some()
    }

    async fn deliver(&self, submission: &ContactSubmission) -> Result<Receipt, DeliveryError> {
        let database = self.database().await?;
        let collection: Collection<Document> = database.collection(&self.config.collection);

        let result = collection
            .insert_one(contact_document(submission))
            .await
            .map_err(classify_insert_error)?;

        let id = match result.inserted_id {
            Bson::ObjectId(oid) => oid.to_hex(),
            other => other.to_string(),
        };
        Ok(Receipt::with_id(id))
    }
}

/// The stored shape of a submission.
pub fn contact_document(submission: &ContactSubmission) -> Document {
    let mut document = doc! {
        "name": submission.name.clone(),
        "email": submission.email.clone(),
        "message": submission.message.clone(),
        "createdAt": BsonDateTime::from_millis(submission.created_at.timestamp_millis()),
    };
    if let Some(phone) = &submission.phone {
        document.insert("phone", phone.clone());
    }
    document
}

/// `$jsonSchema` enforced by the collection validator.
pub fn collection_schema() -> Document {
    doc! {
        "bsonType": "object",
        "required": ["name", "email", "message", "createdAt"],
        "additionalProperties": false,
        "properties": {
            "_id": { "bsonType": "objectId" },
            "name": {
                "bsonType": "string",
                "description": "Name is required",
                "minLength": 1,
                "maxLength": NAME_MAX_LEN,
            },
            "email": {
                "bsonType": "string",
                "description": "Valid email required",
                "pattern": EMAIL_PATTERN,
            },
            "phone": {
                "bsonType": ["string", "null"],
                "description": "Optional phone",
                "pattern": PHONE_PATTERN,
            },
            "message": {
                "bsonType": "string",
                "minLength": MESSAGE_MIN_LEN,
                "maxLength": MESSAGE_MAX_LEN,
            },
            "createdAt": { "bsonType": "date" },
        },
    }
}

fn unavailable(err: MongoError) -> DeliveryError {
    DeliveryError::Unavailable {
        sink: SinkKind::Mongo,
        detail: err.to_string(),
    }
}

fn transport(err: MongoError) -> DeliveryError {
    DeliveryError::Transport {
        sink: SinkKind::Mongo,
        detail: err.to_string(),
    }
}

fn classify_insert_error(err: MongoError) -> DeliveryError {
    if matches!(err.kind.as_ref(), ErrorKind::Write(_)) {
        DeliveryError::Rejected {
            sink: SinkKind::Mongo,
            detail: err.to_string(),
        }
    } else {
        transport(err)
    }
}
