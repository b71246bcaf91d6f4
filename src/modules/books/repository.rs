//! Store access for the book collection.

use anyhow::Context;
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{options::ReturnDocument, Collection, Database};
use serde::{Deserialize, Serialize};

use super::models::{AuthorCount, Book, BookId, NewBook};
use super::query::{BookFilter, BookQuery};

pub const COLLECTION: &str = "books";

/// Persistence operations the HTTP handlers need.
///
/// Implementations are shared across requests and must not assume any
/// ordering between concurrent calls.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// One page of books matching `query.filter`, in `query.sort` order.
    async fn find_page(&self, query: &BookQuery) -> anyhow::Result<Vec<Book>>;

    async fn count(&self, filter: &BookFilter) -> anyhow::Result<u64>;

    async fn find_by_id(&self, id: &BookId) -> anyhow::Result<Option<Book>>;

    /// A book whose title and author both equal the given ones, ignoring case.
    async fn find_duplicate(&self, title: &str, author: &str) -> anyhow::Result<Option<Book>>;

    /// Persist with a fresh id; `createdAt` and `updatedAt` are both set to now.
    async fn insert(&self, book: NewBook) -> anyhow::Result<Book>;

    /// Overwrite the mutable fields and refresh `updatedAt`. `None` if absent.
    async fn replace(&self, id: &BookId, book: NewBook) -> anyhow::Result<Option<Book>>;

    /// Remove and return the book. `None` if absent.
    async fn delete(&self, id: &BookId) -> anyhow::Result<Option<Book>>;

    /// Remove every listed book that exists; returns how many were removed.
    async fn delete_many(&self, ids: &[BookId]) -> anyhow::Result<u64>;

    /// Authors with the most books, count descending then name ascending.
    async fn top_authors(&self, limit: u64) -> anyhow::Result<Vec<AuthorCount>>;
}

/// Stored form of a book.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    author: String,
    #[serde(default)]
    published_year: Option<i32>,
    image: String,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl From<BookDocument> for Book {
    fn from(doc: BookDocument) -> Self {
        Book {
            id: doc.id.into(),
            title: doc.title,
            author: doc.author,
            published_year: doc.published_year,
            image: doc.image,
            created_at: doc.created_at.to_chrono(),
            updated_at: doc.updated_at.to_chrono(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AuthorCountDocument {
    #[serde(rename = "_id")]
    author: String,
    count: i64,
}

/// `BookRepository` over a MongoDB collection.
#[derive(Debug, Clone)]
pub struct MongoBookRepository {
    collection: Collection<BookDocument>,
}

impl MongoBookRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(COLLECTION),
        }
    }
}

#[async_trait]
impl BookRepository for MongoBookRepository {
    async fn find_page(&self, query: &BookQuery) -> anyhow::Result<Vec<Book>> {
        let documents: Vec<BookDocument> = self
            .collection
            .find(filter_document(&query.filter))
            .sort(sort_document(query))
            .skip(query.skip)
            .limit(i64::try_from(query.limit).unwrap_or(i64::MAX))
            .await
            .context("failed to query books")?
            .try_collect()
            .await
            .context("failed to read book cursor")?;

        Ok(documents.into_iter().map(Book::from).collect())
    }

    async fn count(&self, filter: &BookFilter) -> anyhow::Result<u64> {
        self.collection
            .count_documents(filter_document(filter))
            .await
            .context("failed to count books")
    }

    async fn find_by_id(&self, id: &BookId) -> anyhow::Result<Option<Book>> {
        let document = self
            .collection
            .find_one(doc! { "_id": id.as_object_id() })
            .await
            .with_context(|| format!("failed to load book {id}"))?;

        Ok(document.map(Book::from))
    }

    async fn find_duplicate(&self, title: &str, author: &str) -> anyhow::Result<Option<Book>> {
        let document = self
            .collection
            .find_one(doc! {
                "title": { "$regex": exact_pattern(title), "$options": "i" },
                "author": { "$regex": exact_pattern(author), "$options": "i" },
            })
            .await
            .context("failed to look up duplicate book")?;

        Ok(document.map(Book::from))
    }

    async fn insert(&self, book: NewBook) -> anyhow::Result<Book> {
        let now = bson::DateTime::now();
        let document = BookDocument {
            id: ObjectId::new(),
            title: book.title,
            author: book.author,
            published_year: book.published_year,
            image: book.image,
            created_at: now,
            updated_at: now,
        };

        self.collection
            .insert_one(&document)
            .await
            .context("failed to insert book")?;

        Ok(document.into())
    }

    async fn replace(&self, id: &BookId, book: NewBook) -> anyhow::Result<Option<Book>> {
        let document = self
            .collection
            .find_one_and_update(
                doc! { "_id": id.as_object_id() },
                doc! {
                    "$set": {
                        "title": book.title,
                        "author": book.author,
                        "publishedYear": book.published_year,
                        "image": book.image,
                        "updatedAt": bson::DateTime::now(),
                    }
                },
            )
            .return_document(ReturnDocument::After)
            .await
            .with_context(|| format!("failed to update book {id}"))?;

        Ok(document.map(Book::from))
    }

    async fn delete(&self, id: &BookId) -> anyhow::Result<Option<Book>> {
        let document = self
            .collection
            .find_one_and_delete(doc! { "_id": id.as_object_id() })
            .await
            .with_context(|| format!("failed to delete book {id}"))?;

        Ok(document.map(Book::from))
    }

    async fn delete_many(&self, ids: &[BookId]) -> anyhow::Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let ids: Vec<ObjectId> = ids.iter().map(BookId::as_object_id).collect();
        let result = self
            .collection
            .delete_many(doc! { "_id": { "$in": ids } })
            .await
            .context("failed to bulk delete books")?;

        Ok(result.deleted_count)
    }

    async fn top_authors(&self, limit: u64) -> anyhow::Result<Vec<AuthorCount>> {
        let rows: Vec<AuthorCountDocument> = self
            .collection
            .aggregate(top_authors_pipeline(limit))
            .with_type::<AuthorCountDocument>()
            .await
            .context("failed to aggregate authors")?
            .try_collect()
            .await
            .context("failed to read author aggregation")?;

        Ok(rows
            .into_iter()
            .map(|row| AuthorCount {
                author: row.author,
                count: u64::try_from(row.count).unwrap_or_default(),
            })
            .collect())
    }
}

/// Translate a filter into a MongoDB query document.
fn filter_document(filter: &BookFilter) -> Document {
    let mut query = Document::new();

    if let Some(text) = &filter.search {
        let pattern = regex::escape(text);
        query.insert(
            "$or",
            vec![
                doc! { "title": { "$regex": pattern.as_str(), "$options": "i" } },
                doc! { "author": { "$regex": pattern.as_str(), "$options": "i" } },
            ],
        );
    }
    if let Some(year) = filter.published_year {
        query.insert("publishedYear", year);
    }
    if let Some(since) = filter.created_since {
        query.insert("createdAt", doc! { "$gte": to_bson_datetime(since) });
    }

    query
}

fn sort_document(query: &BookQuery) -> Document {
    let mut sort = Document::new();
    sort.insert(query.sort.field.field_name(), query.sort.order.as_i32());
    sort
}

fn exact_pattern(value: &str) -> String {
    format!("^{}$", regex::escape(value))
}

fn top_authors_pipeline(limit: u64) -> Vec<Document> {
    vec![
        doc! { "$group": { "_id": "$author", "count": { "$sum": 1 } } },
        doc! { "$sort": { "count": -1, "_id": 1 } },
        doc! { "$limit": i64::try_from(limit).unwrap_or(i64::MAX) },
    ]
}

fn to_bson_datetime(at: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_chrono(at)
}
