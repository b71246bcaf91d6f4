use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use libris_http::{AppError, Envelope};
use libris_kernel::{InitCtx, Module};
use serde_json::json;

use super::books::models::BookStats;
use super::books::query::BookFilter;
use super::books::repository::BookRepository;
use crate::utils;

const TOP_AUTHORS: u64 = 5;

/// Aggregate counts over the book catalog, mounted at `/api/stats`.
pub struct StatsModule {
    repo: Arc<dyn BookRepository>,
}

impl StatsModule {
    pub fn new(repo: Arc<dyn BookRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl Module for StatsModule {
    fn name(&self) -> &'static str {
        "stats"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "stats module initialized");
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(get_stats))
            .with_state(self.repo.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "Catalog statistics",
                        "tags": ["Stats"],
                        "responses": {
                            "200": {
                                "description": "Totals and top authors",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "success": { "type": "boolean" },
                                                "data": { "$ref": "#/components/schemas/BookStats" }
                                            }
                                        }
                                    }
                                }
                            },
                            "500": {
                                "description": "Internal server error",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "BookStats": {
                        "type": "object",
                        "properties": {
                            "totalBooks": { "type": "integer" },
                            "booksThisYear": { "type": "integer" },
                            "booksThisMonth": { "type": "integer" },
                            "topAuthors": {
                                "type": "array",
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "author": { "type": "string" },
                                        "count": { "type": "integer" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }))
    }
}

async fn get_stats(
    State(repo): State<Arc<dyn BookRepository>>,
) -> Result<Json<Envelope<BookStats>>, AppError> {
    let stats = collect_stats(repo.as_ref(), Utc::now())
        .await
        .map_err(|e| AppError::internal("Failed to fetch statistics", e))?;

    Ok(Json(Envelope::data(stats)))
}

/// Counts relative to `now`: publication year and creation month are both UTC.
pub async fn collect_stats(
    repo: &dyn BookRepository,
    now: DateTime<Utc>,
) -> anyhow::Result<BookStats> {
    let total_books = repo.count(&BookFilter::default()).await?;
    let books_this_year = repo
        .count(&BookFilter {
            published_year: Some(utils::current_year(now)),
            ..BookFilter::default()
        })
        .await?;
    let books_this_month = repo
        .count(&BookFilter {
            created_since: Some(utils::start_of_month(now)),
            ..BookFilter::default()
        })
        .await?;
    let top_authors = repo.top_authors(TOP_AUTHORS).await?;

    Ok(BookStats {
        total_books,
        books_this_year,
        books_this_month,
        top_authors,
    })
}

/// Create the stats module over the given store client
pub fn create_module(repo: Arc<dyn BookRepository>) -> Arc<dyn Module> {
    Arc::new(StatsModule::new(repo))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::memory::InMemoryBookRepository;
    use crate::modules::books::models::{Book, BookId};
    use axum::{body::Body, http::Request, http::StatusCode};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    fn book(author: &str, year: Option<i32>, created_at: DateTime<Utc>) -> Book {
        Book {
            id: BookId::generate(),
            title: format!("{author} {year:?}"),
            author: author.to_string(),
            published_year: year,
            image: "assets/libro.jpg".to_string(),
            created_at,
            updated_at: created_at,
        }
    }

    #[tokio::test]
    async fn counts_year_month_and_authors() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        let last_month = Utc.with_ymd_and_hms(2026, 9, 30, 23, 59, 59).unwrap();
        let this_month = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();

        let repo = InMemoryBookRepository::with_books(vec![
            book("Ann Leckie", Some(2026), this_month),
            book("Ann Leckie", Some(2013), last_month),
            book("Becky Chambers", Some(2026), last_month),
            book("N. K. Jemisin", None, now),
        ]);

        let stats = collect_stats(&repo, now).await.unwrap();
        assert_eq!(stats.total_books, 4);
        assert_eq!(stats.books_this_year, 2);
        assert_eq!(stats.books_this_month, 2);
        assert_eq!(stats.top_authors[0].author, "Ann Leckie");
        assert_eq!(stats.top_authors[0].count, 2);
        assert_eq!(stats.top_authors.len(), 3);
    }

    #[tokio::test]
    async fn top_authors_are_capped_at_five() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let repo = InMemoryBookRepository::with_books(
            ["A", "B", "C", "D", "E", "F", "G"]
                .iter()
                .map(|author| book(author, None, at))
                .collect(),
        );

        let stats = collect_stats(&repo, at).await.unwrap();
        let authors: Vec<&str> = stats.top_authors.iter().map(|a| a.author.as_str()).collect();
        assert_eq!(authors, vec!["A", "B", "C", "D", "E"]);
    }

    #[tokio::test]
    async fn route_wraps_stats_in_envelope() {
        let module = StatsModule::new(Arc::new(InMemoryBookRepository::new()));
        let response = module
            .routes()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            json!({
                "success": true,
                "data": {
                    "totalBooks": 0,
                    "booksThisYear": 0,
                    "booksThisMonth": 0,
                    "topAuthors": []
                }
            })
        );
    }
}
