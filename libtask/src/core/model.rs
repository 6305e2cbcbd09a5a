//! Binding between document types and the collections that store them
use crate::{
    Database, Error, Result,
    core::{
        query::{DynFilterPart, LimitSpec, MAX_BATCH},
        schema::{Document, Schema},
    },
};
use async_trait::async_trait;
use sqlx::SqliteConnection;
use std::{collections::BTreeSet, marker::PhantomData};
use time::OffsetDateTime;
use tracing::debug;

/// A document type that is stored in its own collection in the database
#[async_trait]
pub trait Model: Document + Sized + Send + Sync + Unpin {
    /// The declared shape of this document and the name of its collection
    const SCHEMA: Schema;

    fn id(&self) -> i64;

    fn set_id(&mut self, id: i64);

    /// Set the system-managed timestamps after the document was stored
    fn set_timestamps(&mut self, at: OffsetDateTime);

    /// The id given to documents that have not been stored yet
    fn invalid_id() -> i64 {
        -1
    }

    /// A filter that matches documents with any of the given ids
    fn id_filter(ids: &[i64]) -> DynFilterPart;

    /// Load all matching documents in natural (insertion) order
    async fn fetch(
        filter: Option<DynFilterPart>,
        limit: Option<LimitSpec>,
        db: &Database,
    ) -> Result<Vec<Self>>;

    /// Write this document to the database and return the id that was assigned to it
    async fn insert_row(&self, at: OffsetDateTime, conn: &mut SqliteConnection) -> Result<i64>;
}

/// A handle for a single collection of documents. Obtain one with
/// [Database::collection()].
pub struct Collection<'db, M> {
    db: &'db Database,
    model: PhantomData<M>,
}

impl<'db, M: Model> Collection<'db, M> {
    pub(crate) fn new(db: &'db Database) -> Self {
        Self {
            db,
            model: PhantomData,
        }
    }

    /// The name of the underlying collection
    pub fn name(&self) -> &'static str {
        M::SCHEMA.collection
    }

    pub(crate) fn database(&self) -> &'db Database {
        self.db
    }

    /// Validate and store a single document. On success the document's id
    /// is updated to the id assigned by the database.
    pub async fn insert(&self, doc: &mut M) -> Result<i64> {
        self.insert_many(std::slice::from_mut(doc)).await?;
        Ok(doc.id())
    }

    /// Validate and store all of the given documents in a single transaction.
    /// If any document fails validation nothing is written. Ids are only
    /// assigned once the whole batch has been committed.
    pub async fn insert_many(&self, docs: &mut [M]) -> Result<()> {
        for doc in docs.iter() {
            if doc.id() != M::invalid_id() {
                return Err(Error::InvalidInsertObjectAlreadyExists(doc.id()));
            }
            M::SCHEMA.check(doc)?;
        }

        let now = OffsetDateTime::now_utc();
        let mut tx = self.db.pool().begin().await?;
        let mut ids = Vec::with_capacity(docs.len());
        for doc in docs.iter() {
            ids.push(doc.insert_row(now, &mut *tx).await?);
        }
        tx.commit().await?;

        for (doc, id) in docs.iter_mut().zip(ids) {
            doc.set_id(id);
            doc.set_timestamps(now);
        }
        debug!(collection = self.name(), count = docs.len(), "inserted documents");
        Ok(())
    }

    /// Load all matching documents
    pub async fn find_all(&self, filter: Option<DynFilterPart>) -> Result<Vec<M>> {
        M::fetch(filter, None, self.db).await
    }

    /// Load a page of matching documents
    pub async fn find_page(
        &self,
        filter: Option<DynFilterPart>,
        limit: LimitSpec,
    ) -> Result<Vec<M>> {
        if limit.count < 0 || limit.offset.is_some_and(|o| o < 0) {
            return Err(Error::InvalidOperation(format!(
                "invalid page for '{}': {limit:?}",
                self.name()
            )));
        }
        M::fetch(filter, Some(limit), self.db).await
    }

    /// Load the first matching document in natural order, if any
    pub async fn find_one(&self, filter: Option<DynFilterPart>) -> Result<Option<M>> {
        M::fetch(filter, Some(LimitSpec::from(1)), self.db)
            .await
            .map(|docs| docs.into_iter().next())
    }

    /// Load the document with the given id, if it exists
    pub async fn find_by_id(&self, id: i64) -> Result<Option<M>> {
        self.find_one(Some(M::id_filter(&[id]))).await
    }

    /// Load all documents whose ids are in `ids`, in natural order and without
    /// duplicates. Ids that don't exist in the collection are skipped. Long
    /// lists of ids are looked up in several queries.
    pub async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<M>> {
        let unique: Vec<i64> = ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let mut docs = Vec::with_capacity(unique.len());
        for batch in unique.chunks(MAX_BATCH) {
            docs.extend(M::fetch(Some(M::id_filter(batch)), None, self.db).await?);
        }
        Ok(docs)
    }
}
