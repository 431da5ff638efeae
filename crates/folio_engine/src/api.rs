//! REST surface of the catalogue.
//!
//! A single unified [`HttpService`] handles every endpoint, routing
//! internally on the request path:
//!
//! - `GET  /author/`: list all authors (entries carry `author_id`)
//! - `POST /author/`: create an author, returns the new id
//! - `GET  /author/{id}`: fetch one author
//! - `PUT  /author/{id}`: replace an author
//! - `DELETE /author/{id}`: delete an author
//! - the same tree under `/book/`
//!
//! Every failure body is `{"detail": "<message>"}`. A missing target is
//! reported as 400. A dangling book reference on the author side is 409
//! while a dangling author reference on the book side is 400; the
//! asymmetry is part of the served contract and is kept as-is.

use serde::Serialize;
use tracing::debug;

use folio_base::err;
use folio_base::http::{HttpMethod, HttpRequest, HttpResponse, HttpService, HttpStatusCode};
use folio_base::FolioResult;

use crate::catalogue::{Catalogue, CatalogueError, ErrorClass};
use crate::model::{Author, AuthorId, Book, BookId};

/// Author list entry: the record plus its id.
#[derive(Serialize)]
struct AuthorListEntry<'a> {
    author_id: &'a AuthorId,
    #[serde(flatten)]
    author: &'a Author,
}

/// Book list entry: the record plus its id.
///
/// The id field is spelled `BookId` on the wire while the author side
/// uses `author_id`; inherited contract, kept for compatibility.
#[derive(Serialize)]
struct BookListEntry<'a> {
    #[serde(rename = "BookId")]
    book_id: &'a BookId,
    #[serde(flatten)]
    book: &'a Book,
}

/// HTTP service exposing the catalogue as a REST interface.
#[derive(Clone)]
pub struct CatalogueService {
    catalogue: Catalogue,
}

impl std::fmt::Debug for CatalogueService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogueService").finish()
    }
}

impl CatalogueService {
    /// Create a new service over the given catalogue handle.
    pub fn new(catalogue: Catalogue) -> Self {
        Self { catalogue }
    }

    // ========== Author endpoints ==========

    fn author_collection(&self, request: &HttpRequest) -> FolioResult<HttpResponse> {
        match request.method() {
            HttpMethod::Get => self.list_authors(),
            HttpMethod::Post => self.create_author(request),
            method => Ok(method_not_allowed(method, "/author/")),
        }
    }

    fn author_item(&self, request: &HttpRequest, id: &AuthorId) -> FolioResult<HttpResponse> {
        match request.method() {
            HttpMethod::Get => match self.catalogue.author(id) {
                Ok(author) => json_response(&author),
                Err(error) => Ok(rejection_response(&error)),
            },
            HttpMethod::Put => {
                let author: Author = match parse_body(request) {
                    Ok(author) => author,
                    Err(response) => return Ok(response),
                };
                match self.catalogue.update_author(id, author) {
                    Ok(id) => json_response(&id),
                    Err(error) => Ok(rejection_response(&error)),
                }
            }
            HttpMethod::Delete => match self.catalogue.delete_author(id) {
                Ok(id) => json_response(&id),
                Err(error) => Ok(rejection_response(&error)),
            },
            method => Ok(method_not_allowed(method, "/author/{id}")),
        }
    }

    fn list_authors(&self) -> FolioResult<HttpResponse> {
        let authors = self.catalogue.authors();
        let entries: Vec<AuthorListEntry<'_>> = authors
            .iter()
            .map(|(id, author)| AuthorListEntry {
                author_id: id,
                author,
            })
            .collect();
        json_response(&entries)
    }

    fn create_author(&self, request: &HttpRequest) -> FolioResult<HttpResponse> {
        let author: Author = match parse_body(request) {
            Ok(author) => author,
            Err(response) => return Ok(response),
        };
        match self.catalogue.create_author(author) {
            Ok(id) => json_response(&id),
            Err(error) => Ok(rejection_response(&error)),
        }
    }

    // ========== Book endpoints ==========

    fn book_collection(&self, request: &HttpRequest) -> FolioResult<HttpResponse> {
        match request.method() {
            HttpMethod::Get => self.list_books(),
            HttpMethod::Post => self.create_book(request),
            method => Ok(method_not_allowed(method, "/book/")),
        }
    }

    fn book_item(&self, request: &HttpRequest, id: &BookId) -> FolioResult<HttpResponse> {
        match request.method() {
            HttpMethod::Get => match self.catalogue.book(id) {
                Ok(book) => json_response(&book),
                Err(error) => Ok(rejection_response(&error)),
            },
            HttpMethod::Put => {
                let book: Book = match parse_body(request) {
                    Ok(book) => book,
                    Err(response) => return Ok(response),
                };
                match self.catalogue.update_book(id, book) {
                    Ok(id) => json_response(&id),
                    Err(error) => Ok(rejection_response(&error)),
                }
            }
            HttpMethod::Delete => match self.catalogue.delete_book(id) {
                Ok(id) => json_response(&id),
                Err(error) => Ok(rejection_response(&error)),
            },
            method => Ok(method_not_allowed(method, "/book/{id}")),
        }
    }

    fn list_books(&self) -> FolioResult<HttpResponse> {
        let books = self.catalogue.books();
        let entries: Vec<BookListEntry<'_>> = books
            .iter()
            .map(|(id, book)| BookListEntry { book_id: id, book })
            .collect();
        json_response(&entries)
    }

    fn create_book(&self, request: &HttpRequest) -> FolioResult<HttpResponse> {
        let book: Book = match parse_body(request) {
            Ok(book) => book,
            Err(response) => return Ok(response),
        };
        match self.catalogue.create_book(book) {
            Ok(id) => json_response(&id),
            Err(error) => Ok(rejection_response(&error)),
        }
    }
}

impl HttpService for CatalogueService {
    fn handle_request(&self, request: HttpRequest) -> FolioResult<HttpResponse> {
        // Remove query parameters from the path before routing
        let path = request.path().split('?').next().unwrap_or(request.path());
        debug!(method = %request.method(), path = %path, "routing request");

        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        match segments.as_slice() {
            ["author"] | ["author", ""] => self.author_collection(&request),
            ["author", id] => self.author_item(&request, &AuthorId::from_string(*id)),
            ["book"] | ["book", ""] => self.book_collection(&request),
            ["book", id] => self.book_item(&request, &BookId::from_string(*id)),
            _ => Ok(detail_response(
                HttpStatusCode::NotFound,
                &format!("No route for {}", path),
            )),
        }
    }
}

/// Serialize data to JSON and wrap it in an HTTP 200 response.
///
/// A serialization failure is an internal error, not a request failure, so
/// it propagates and the server renders it as 500.
fn json_response<T: Serialize>(data: &T) -> FolioResult<HttpResponse> {
    serde_json::to_string(data)
        .map(HttpResponse::json)
        .map_err(|e| err!("JSON serialization error: {}", e))
}

/// Deserialize a request body, or produce the 400 response describing why
/// it could not be parsed.
fn parse_body<T: serde::de::DeserializeOwned>(request: &HttpRequest) -> Result<T, HttpResponse> {
    serde_json::from_slice(request.body().as_bytes()).map_err(|e| {
        detail_response(
            HttpStatusCode::BadRequest,
            &format!("Invalid request body: {}", e),
        )
    })
}

/// Map a catalogue rejection to its wire status and `{"detail": …}` body.
fn rejection_response(error: &CatalogueError) -> HttpResponse {
    let status = match error.class() {
        ErrorClass::Conflict => HttpStatusCode::Conflict,
        // A missing target is reported as 400 in this interface, not 404.
        ErrorClass::NotFound | ErrorClass::BadRequest => HttpStatusCode::BadRequest,
    };
    detail_response(status, &error.to_string())
}

fn method_not_allowed(method: HttpMethod, route: &str) -> HttpResponse {
    detail_response(
        HttpStatusCode::MethodNotAllowed,
        &format!("Method {} not allowed for {}", method, route),
    )
}

/// Build an error response with the standard `{"detail": …}` body.
fn detail_response(status: HttpStatusCode, detail: &str) -> HttpResponse {
    let body = serde_json::json!({ "detail": detail }).to_string();
    HttpResponse::new(status)
        .with_content_type("application/json")
        .with_body(body)
}
