//! End-to-end flows through the REST service: create, link, update, and
//! delete authors and books, checking the cross-reference lists stay
//! consistent from the client's point of view.

use serde_json::{Value, json};

use folio_base::http::{HttpMethod, HttpRequest, HttpResponse, HttpService};
use folio_engine::{Catalogue, CatalogueService};

fn service() -> CatalogueService {
    CatalogueService::new(Catalogue::new())
}

fn request(
    service: &CatalogueService,
    method: HttpMethod,
    path: &str,
    body: Option<Value>,
) -> HttpResponse {
    let mut req = HttpRequest::new(method, path);
    if let Some(body) = body {
        req = req.with_body(body.to_string());
    }
    service.handle_request(req).unwrap()
}

fn body_json(response: &HttpResponse) -> Value {
    serde_json::from_str(&response.body().as_string().unwrap()).unwrap()
}

fn create(service: &CatalogueService, path: &str, payload: Value) -> String {
    let response = request(service, HttpMethod::Post, path, Some(payload));
    assert_eq!(response.status().as_u16(), 200, "create on {} failed", path);
    body_json(&response).as_str().unwrap().to_string()
}

#[test]
fn scenario_author_then_book_then_link() {
    let service = service();

    // Create author {John, Doe, 1970} with no books
    let author_id = create(
        &service,
        "/author/",
        json!({"name": "John", "surname": "Doe", "birthyear": 1970, "book_ids": []}),
    );

    // Create a book with no authors
    let book_id = create(
        &service,
        "/book/",
        json!({
            "title": "T",
            "author_ids": [],
            "publisher": "P",
            "edition": 1,
            "published_date": "2025-06-27"
        }),
    );

    // Update the book to credit the author
    let response = request(
        &service,
        HttpMethod::Put,
        &format!("/book/{}", book_id),
        Some(json!({
            "title": "T",
            "author_ids": [author_id.clone()],
            "publisher": "P",
            "edition": 1,
            "published_date": "2025-06-27"
        })),
    );
    assert_eq!(response.status().as_u16(), 200);

    // The author now lists exactly that book
    let author = body_json(&request(
        &service,
        HttpMethod::Get,
        &format!("/author/{}", author_id),
        None,
    ));
    assert_eq!(author["book_ids"], json!([book_id]));
}

#[test]
fn duplicate_author_references_collapse_end_to_end() {
    let service = service();

    let author_id = create(
        &service,
        "/author/",
        json!({"name": "Frank", "surname": "Herbert", "birthyear": 1920, "book_ids": []}),
    );

    // authorIds = [x, x, x]
    let book_id = create(
        &service,
        "/book/",
        json!({
            "title": "Dune",
            "author_ids": [author_id.clone(), author_id.clone(), author_id.clone()],
            "publisher": "Chilton",
            "edition": 1,
            "published_date": "1965-08-01"
        }),
    );

    let book = body_json(&request(
        &service,
        HttpMethod::Get,
        &format!("/book/{}", book_id),
        None,
    ));
    assert_eq!(book["author_ids"], json!([author_id]));

    let author = body_json(&request(
        &service,
        HttpMethod::Get,
        &format!("/author/{}", author_id),
        None,
    ));
    assert_eq!(author["book_ids"], json!([book_id]));
}

#[test]
fn failed_book_creation_leaves_valid_authors_untouched() {
    let service = service();

    let author_id = create(
        &service,
        "/author/",
        json!({"name": "Frank", "surname": "Herbert", "birthyear": 1920, "book_ids": []}),
    );

    // The valid author comes first in the list; the request must still
    // leave it untouched.
    let response = request(
        &service,
        HttpMethod::Post,
        "/book/",
        Some(json!({
            "title": "Dune",
            "author_ids": [author_id.clone(), "no-such-author"],
            "publisher": "Chilton",
            "edition": 1,
            "published_date": "1965-08-01"
        })),
    );
    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(
        body_json(&response)["detail"],
        "Author with ID no-such-author not found"
    );

    let author = body_json(&request(
        &service,
        HttpMethod::Get,
        &format!("/author/{}", author_id),
        None,
    ));
    assert_eq!(author["book_ids"], json!([]));

    let books = body_json(&request(&service, HttpMethod::Get, "/book/", None));
    assert_eq!(books, json!([]));
}

#[test]
fn author_lifecycle_blocked_then_released_by_book_deletion() {
    let service = service();

    let author_id = create(
        &service,
        "/author/",
        json!({"name": "Frank", "surname": "Herbert", "birthyear": 1920, "book_ids": []}),
    );
    let book_id = create(
        &service,
        "/book/",
        json!({
            "title": "Dune",
            "author_ids": [author_id.clone()],
            "publisher": "Chilton",
            "edition": 1,
            "published_date": "1965-08-01"
        }),
    );

    // Deleting the credited author conflicts
    let blocked = request(
        &service,
        HttpMethod::Delete,
        &format!("/author/{}", author_id),
        None,
    );
    assert_eq!(blocked.status().as_u16(), 409);

    // Deleting the book cascades and unblocks the author
    let deleted = request(
        &service,
        HttpMethod::Delete,
        &format!("/book/{}", book_id),
        None,
    );
    assert_eq!(deleted.status().as_u16(), 200);

    let author = body_json(&request(
        &service,
        HttpMethod::Get,
        &format!("/author/{}", author_id),
        None,
    ));
    assert_eq!(author["book_ids"], json!([]));

    let released = request(
        &service,
        HttpMethod::Delete,
        &format!("/author/{}", author_id),
        None,
    );
    assert_eq!(released.status().as_u16(), 200);
    assert_eq!(
        body_json(&request(&service, HttpMethod::Get, "/author/", None)),
        json!([])
    );
}

#[test]
fn moving_an_author_between_books_updates_both_sides() {
    let service = service();

    let b1 = create(
        &service,
        "/book/",
        json!({
            "title": "First",
            "author_ids": [],
            "publisher": "P",
            "edition": 1,
            "published_date": "2020-01-01"
        }),
    );
    let b2 = create(
        &service,
        "/book/",
        json!({
            "title": "Second",
            "author_ids": [],
            "publisher": "P",
            "edition": 1,
            "published_date": "2021-01-01"
        }),
    );

    // Author created referencing b1; the book gains the credit too
    let author_id = create(
        &service,
        "/author/",
        json!({"name": "Ada", "surname": "Lovelace", "birthyear": 1815, "book_ids": [b1.clone()]}),
    );
    let first = body_json(&request(
        &service,
        HttpMethod::Get,
        &format!("/book/{}", b1),
        None,
    ));
    assert_eq!(first["author_ids"], json!([author_id]));

    // Update the author's list from [b1] to [b2]
    let response = request(
        &service,
        HttpMethod::Put,
        &format!("/author/{}", author_id),
        Some(json!({
            "name": "Ada",
            "surname": "Lovelace",
            "birthyear": 1815,
            "book_ids": [b2.clone()]
        })),
    );
    assert_eq!(response.status().as_u16(), 200);

    let first = body_json(&request(
        &service,
        HttpMethod::Get,
        &format!("/book/{}", b1),
        None,
    ));
    assert_eq!(first["author_ids"], json!([]));

    let second = body_json(&request(
        &service,
        HttpMethod::Get,
        &format!("/book/{}", b2),
        None,
    ));
    assert_eq!(second["author_ids"], json!([author_id]));
}
