//! Request handlers for `/api/books`.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::Utc;
use libris_http::{AppError, Envelope, JsonOrForm};

use super::models::{
    Book, BookId, BookPayload, BulkDeleteResponse, BulkRequest, ListResponse, SearchResponse,
};
use super::query::{ListParams, Pagination, SearchParams};
use super::repository::BookRepository;
use crate::utils;

const NOT_FOUND_MESSAGE: &str = "Book not found";

/// Shared handler state: the injected store client.
#[derive(Clone)]
pub struct BooksState {
    pub repo: Arc<dyn BookRepository>,
}

impl BooksState {
    pub fn new(repo: Arc<dyn BookRepository>) -> Self {
        Self { repo }
    }
}

type ApiResult<T> = Result<T, AppError>;

pub async fn list_books(
    State(state): State<BooksState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<ListResponse>> {
    let Query(params) = params?;
    let query = params.to_query();

    let books = state
        .repo
        .find_page(&query)
        .await
        .map_err(|e| AppError::internal("Failed to fetch books", e))?;
    let total = state
        .repo
        .count(&query.filter)
        .await
        .map_err(|e| AppError::internal("Failed to fetch books", e))?;

    Ok(Json(ListResponse {
        envelope: Envelope::data(books),
        pagination: Pagination::new(params.page(), params.limit(), total),
    }))
}

pub async fn get_book(
    State(state): State<BooksState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<Book>>> {
    let Some(id) = BookId::parse(&id) else {
        return Err(AppError::not_found(NOT_FOUND_MESSAGE));
    };

    let book = state
        .repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::internal("Failed to fetch book", e))?
        .ok_or_else(|| AppError::not_found(NOT_FOUND_MESSAGE))?;

    Ok(Json(Envelope::data(book)))
}

pub async fn create_book(
    State(state): State<BooksState>,
    JsonOrForm(payload): JsonOrForm<BookPayload>,
) -> ApiResult<(StatusCode, Json<Envelope<Book>>)> {
    let draft = payload.require()?;

    if let Some((title, author)) = draft.identity() {
        let duplicate = state
            .repo
            .find_duplicate(title, author)
            .await
            .map_err(|e| AppError::internal("Failed to create book", e))?;
        if duplicate.is_some() {
            return Err(AppError::conflict(
                "A book with this title and author already exists",
            ));
        }
    }

    let new_book = draft.validate(utils::current_year(Utc::now()))?;
    let book = state
        .repo
        .insert(new_book)
        .await
        .map_err(|e| AppError::internal("Failed to create book", e))?;

    tracing::info!(book_id = %book.id, title = %book.title, "book created");

    Ok((
        StatusCode::CREATED,
        Json(Envelope::data(book).with_message("Book created successfully")),
    ))
}

pub async fn update_book(
    State(state): State<BooksState>,
    Path(id): Path<String>,
    JsonOrForm(payload): JsonOrForm<BookPayload>,
) -> ApiResult<Json<Envelope<Book>>> {
    let new_book = payload
        .require()?
        .validate(utils::current_year(Utc::now()))?;

    let Some(id) = BookId::parse(&id) else {
        return Err(AppError::not_found(NOT_FOUND_MESSAGE));
    };

    let book = state
        .repo
        .replace(&id, new_book)
        .await
        .map_err(|e| AppError::internal("Failed to update book", e))?
        .ok_or_else(|| AppError::not_found(NOT_FOUND_MESSAGE))?;

    tracing::info!(book_id = %book.id, "book updated");

    Ok(Json(
        Envelope::data(book).with_message("Book updated successfully"),
    ))
}

pub async fn delete_book(
    State(state): State<BooksState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<Book>>> {
    let Some(id) = BookId::parse(&id) else {
        return Err(AppError::not_found(NOT_FOUND_MESSAGE));
    };

    let book = state
        .repo
        .delete(&id)
        .await
        .map_err(|e| AppError::internal("Failed to delete book", e))?
        .ok_or_else(|| AppError::not_found(NOT_FOUND_MESSAGE))?;

    tracing::info!(book_id = %book.id, "book deleted");

    Ok(Json(
        Envelope::data(book).with_message("Book deleted successfully"),
    ))
}

pub async fn bulk_operation(
    State(state): State<BooksState>,
    payload: Result<Json<BulkRequest>, JsonRejection>,
) -> ApiResult<Json<BulkDeleteResponse>> {
    let Json(request) = payload?;

    let (Some(operation), Some(serde_json::Value::Array(raw_ids))) =
        (request.operation, request.book_ids)
    else {
        return Err(AppError::bad_request(
            "Operation and bookIds array are required",
        ));
    };

    match operation.as_str() {
        "delete" => {
            // Entries that are not valid ids cannot match a record
            let ids: Vec<BookId> = raw_ids
                .iter()
                .filter_map(serde_json::Value::as_str)
                .filter_map(BookId::parse)
                .collect();

            let deleted_count = state
                .repo
                .delete_many(&ids)
                .await
                .map_err(|e| AppError::internal("Failed to perform bulk operation", e))?;

            tracing::info!(
                requested = raw_ids.len(),
                deleted = deleted_count,
                "bulk delete completed"
            );

            Ok(Json(BulkDeleteResponse {
                success: true,
                message: format!("{deleted_count} books deleted successfully"),
                deleted_count,
            }))
        }
        _ => Err(AppError::bad_request("Invalid operation")),
    }
}

pub async fn search_books(
    State(state): State<BooksState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<SearchResponse>> {
    let Query(params) = params?;
    let Some(query) = params.to_query() else {
        return Err(AppError::bad_request("Search query is required"));
    };

    let books = state
        .repo
        .find_page(&query)
        .await
        .map_err(|e| AppError::internal("Failed to search books", e))?;

    Ok(Json(SearchResponse {
        total: books.len(),
        envelope: Envelope::data(books),
    }))
}
