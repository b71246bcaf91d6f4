pub mod handlers;
pub mod memory;
pub mod models;
pub mod query;
pub mod repository;
pub mod routes;
pub mod seed;
pub mod validation;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use libris_kernel::{IndexDefinition, InitCtx, Module, SortKey};
use serde_json::json;

use handlers::BooksState;
use repository::{BookRepository, COLLECTION};

/// Book catalog CRUD, search and bulk operations.
pub struct BooksModule {
    repo: Arc<dyn BookRepository>,
}

impl BooksModule {
    pub fn new(repo: Arc<dyn BookRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            backend = ?ctx.settings.database.backend,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(BooksState::new(self.repo.clone()))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    fn indexes(&self) -> Vec<IndexDefinition> {
        vec![
            IndexDefinition {
                collection: COLLECTION,
                name: "title_author",
                keys: &[("title", SortKey::Ascending), ("author", SortKey::Ascending)],
                unique: false,
            },
            IndexDefinition {
                collection: COLLECTION,
                name: "created_at_desc",
                keys: &[("createdAt", SortKey::Descending)],
                unique: false,
            },
        ]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn error_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn book_envelope(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": {
                    "type": "object",
                    "properties": {
                        "success": { "type": "boolean" },
                        "message": { "type": "string" },
                        "data": { "$ref": "#/components/schemas/Book" }
                    },
                    "required": ["success"]
                }
            }
        }
    })
}

fn id_parameter() -> serde_json::Value {
    json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "string" },
        "description": "24-character hexadecimal book id"
    })
}

fn book_body() -> serde_json::Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/BookInput" }
            },
            "application/x-www-form-urlencoded": {
                "schema": { "$ref": "#/components/schemas/BookInput" }
            }
        }
    })
}

fn collection_path() -> serde_json::Value {
    json!({
        "get": {
            "summary": "List books",
            "tags": ["Books"],
            "parameters": [
                { "name": "page", "in": "query", "schema": { "type": "integer", "default": 1 } },
                { "name": "limit", "in": "query", "schema": { "type": "integer", "default": 50 } },
                { "name": "search", "in": "query", "schema": { "type": "string" } },
                {
                    "name": "sortBy",
                    "in": "query",
                    "schema": {
                        "type": "string",
                        "enum": ["title", "author", "publishedYear", "createdAt", "updatedAt"],
                        "default": "createdAt"
                    }
                },
                {
                    "name": "sortOrder",
                    "in": "query",
                    "schema": { "type": "string", "enum": ["asc", "desc"], "default": "desc" }
                }
            ],
            "responses": {
                "200": {
                    "description": "One page of books",
                    "content": {
                        "application/json": {
                            "schema": { "$ref": "#/components/schemas/BookPage" }
                        }
                    }
                },
                "400": error_response("Invalid query string"),
                "500": error_response("Internal server error")
            }
        },
        "post": {
            "summary": "Create a book",
            "tags": ["Books"],
            "requestBody": book_body(),
            "responses": {
                "201": book_envelope("Book created"),
                "400": error_response("Missing fields or validation error"),
                "409": error_response("Duplicate title and author"),
                "500": error_response("Internal server error")
            }
        }
    })
}

fn item_path() -> serde_json::Value {
    json!({
        "get": {
            "summary": "Fetch one book",
            "tags": ["Books"],
            "parameters": [id_parameter()],
            "responses": {
                "200": book_envelope("The book"),
                "404": error_response("Book not found"),
                "500": error_response("Internal server error")
            }
        },
        "put": {
            "summary": "Replace a book's fields",
            "tags": ["Books"],
            "parameters": [id_parameter()],
            "requestBody": book_body(),
            "responses": {
                "200": book_envelope("Book updated"),
                "400": error_response("Missing fields or validation error"),
                "404": error_response("Book not found"),
                "500": error_response("Internal server error")
            }
        },
        "delete": {
            "summary": "Delete a book",
            "tags": ["Books"],
            "parameters": [id_parameter()],
            "responses": {
                "200": book_envelope("Book deleted"),
                "404": error_response("Book not found"),
                "500": error_response("Internal server error")
            }
        }
    })
}

fn bulk_path() -> serde_json::Value {
    json!({
        "post": {
            "summary": "Apply one operation to many books",
            "tags": ["Books"],
            "requestBody": {
                "required": true,
                "content": {
                    "application/json": {
                        "schema": {
                            "type": "object",
                            "properties": {
                                "operation": { "type": "string", "enum": ["delete"] },
                                "bookIds": { "type": "array", "items": { "type": "string" } }
                            },
                            "required": ["operation", "bookIds"]
                        }
                    }
                }
            },
            "responses": {
                "200": {
                    "description": "Bulk operation result",
                    "content": {
                        "application/json": {
                            "schema": {
                                "type": "object",
                                "properties": {
                                    "success": { "type": "boolean" },
                                    "message": { "type": "string" },
                                    "deletedCount": { "type": "integer" }
                                }
                            }
                        }
                    }
                },
                "400": error_response("Malformed request or unknown operation"),
                "500": error_response("Internal server error")
            }
        }
    })
}

fn search_path() -> serde_json::Value {
    json!({
        "get": {
            "summary": "Search titles and authors",
            "tags": ["Books"],
            "parameters": [
                { "name": "q", "in": "query", "required": true, "schema": { "type": "string" } },
                { "name": "limit", "in": "query", "schema": { "type": "integer", "default": 10 } }
            ],
            "responses": {
                "200": {
                    "description": "Matching books, newest first",
                    "content": {
                        "application/json": {
                            "schema": {
                                "type": "object",
                                "properties": {
                                    "success": { "type": "boolean" },
                                    "data": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/Book" }
                                    },
                                    "total": { "type": "integer" }
                                }
                            }
                        }
                    }
                },
                "400": error_response("Search query is required"),
                "500": error_response("Internal server error")
            }
        }
    })
}

fn schemas() -> serde_json::Value {
    json!({
        "Book": {
            "type": "object",
            "properties": {
                "id": { "type": "string" },
                "title": { "type": "string", "maxLength": 200 },
                "author": { "type": "string", "maxLength": 100 },
                "publishedYear": { "type": ["integer", "null"], "minimum": 1000 },
                "image": { "type": "string" },
                "createdAt": { "type": "string", "format": "date-time" },
                "updatedAt": { "type": "string", "format": "date-time" }
            },
            "required": ["id", "title", "author", "image", "createdAt", "updatedAt"]
        },
        "BookInput": {
            "type": "object",
            "properties": {
                "title": { "type": "string" },
                "author": { "type": "string" },
                "publishedYear": { "type": ["integer", "string", "null"] },
                "image": { "type": "string" }
            },
            "required": ["title", "author"]
        },
        "BookPage": {
            "type": "object",
            "properties": {
                "success": { "type": "boolean" },
                "data": {
                    "type": "array",
                    "items": { "$ref": "#/components/schemas/Book" }
                },
                "pagination": {
                    "type": "object",
                    "properties": {
                        "currentPage": { "type": "integer" },
                        "totalPages": { "type": "integer" },
                        "totalBooks": { "type": "integer" },
                        "hasNextPage": { "type": "boolean" },
                        "hasPrevPage": { "type": "boolean" }
                    }
                }
            }
        }
    })
}

fn openapi_fragment() -> serde_json::Value {
    json!({
        "paths": {
            "/": collection_path(),
            "/{id}": item_path(),
            "/bulk": bulk_path(),
            "/search": search_path()
        },
        "components": { "schemas": schemas() }
    })
}

/// Create the books module over the given store client
pub fn create_module(repo: Arc<dyn BookRepository>) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(repo))
}
