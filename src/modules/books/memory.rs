//! Process-local `BookRepository` for development runs and tests.

use std::{cmp::Ordering, collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::models::{AuthorCount, Book, BookId, NewBook};
use super::query::{BookFilter, BookQuery};
use super::repository::BookRepository;

/// Books kept in insertion order behind an async read-write lock.
///
/// Clones share the same underlying data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBookRepository {
    books: Arc<RwLock<Vec<Book>>>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store, records kept as given.
    pub fn with_books(books: Vec<Book>) -> Self {
        Self {
            books: Arc::new(RwLock::new(books)),
        }
    }
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn find_page(&self, query: &BookQuery) -> anyhow::Result<Vec<Book>> {
        let books = self.books.read().await;

        let mut matching: Vec<&Book> = books.iter().filter(|b| query.filter.matches(b)).collect();
        // Stable, so ties keep insertion order
        matching.sort_by(|a, b| query.sort.compare(a, b));

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);

        Ok(matching
            .into_iter()
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &BookFilter) -> anyhow::Result<u64> {
        let books = self.books.read().await;
        Ok(books.iter().filter(|b| filter.matches(b)).count() as u64)
    }

    async fn find_by_id(&self, id: &BookId) -> anyhow::Result<Option<Book>> {
        let books = self.books.read().await;
        Ok(books.iter().find(|b| b.id == *id).cloned())
    }

    async fn find_duplicate(&self, title: &str, author: &str) -> anyhow::Result<Option<Book>> {
        let title = title.to_lowercase();
        let author = author.to_lowercase();

        let books = self.books.read().await;
        Ok(books
            .iter()
            .find(|b| b.title.to_lowercase() == title && b.author.to_lowercase() == author)
            .cloned())
    }

    async fn insert(&self, book: NewBook) -> anyhow::Result<Book> {
        let now = Utc::now();
        let book = Book {
            id: BookId::generate(),
            title: book.title,
            author: book.author,
            published_year: book.published_year,
            image: book.image,
            created_at: now,
            updated_at: now,
        };

        self.books.write().await.push(book.clone());
        Ok(book)
    }

    async fn replace(&self, id: &BookId, book: NewBook) -> anyhow::Result<Option<Book>> {
        let mut books = self.books.write().await;
        let Some(existing) = books.iter_mut().find(|b| b.id == *id) else {
            return Ok(None);
        };

        existing.title = book.title;
        existing.author = book.author;
        existing.published_year = book.published_year;
        existing.image = book.image;
        existing.updated_at = Utc::now().max(existing.created_at);

        Ok(Some(existing.clone()))
    }

    async fn delete(&self, id: &BookId) -> anyhow::Result<Option<Book>> {
        let mut books = self.books.write().await;
        let position = books.iter().position(|b| b.id == *id);
        Ok(position.map(|index| books.remove(index)))
    }

    async fn delete_many(&self, ids: &[BookId]) -> anyhow::Result<u64> {
        let mut books = self.books.write().await;
        let before = books.len();
        books.retain(|b| !ids.contains(&b.id));
        Ok((before - books.len()) as u64)
    }

    async fn top_authors(&self, limit: u64) -> anyhow::Result<Vec<AuthorCount>> {
        let books = self.books.read().await;

        let mut counts: HashMap<&str, u64> = HashMap::new();
        for book in books.iter() {
            *counts.entry(book.author.as_str()).or_default() += 1;
        }

        let mut ranked: Vec<AuthorCount> = counts
            .into_iter()
            .map(|(author, count)| AuthorCount {
                author: author.to_string(),
                count,
            })
            .collect();
        ranked.sort_by(|a, b| match b.count.cmp(&a.count) {
            Ordering::Equal => a.author.cmp(&b.author),
            other => other,
        });
        ranked.truncate(usize::try_from(limit).unwrap_or(usize::MAX));

        Ok(ranked)
    }
}
