//! Stateless HTTP request builder and response readers for the bookstore API.
//!
//! # Design
//! `BookstoreClient` holds only a `base_url`. Each endpoint has a `build_*`
//! method producing an `HttpRequest` without credentials; the scenario runner
//! attaches (or withholds) the API key per call. `parse_*` methods read the
//! leniently-decoded body of an `HttpResponse`.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Book, NewBook, NewShelf, Shelf};

/// Synchronous, stateless request builder for the bookstore API.
#[derive(Debug, Clone)]
pub struct BookstoreClient {
    base_url: String,
}

impl BookstoreClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_list_shelves(&self) -> HttpRequest {
        self.request("/shelves", None, None)
    }

    pub fn build_create_shelf(&self, input: &NewShelf) -> Result<HttpRequest, ClientError> {
        let body = serde_json::to_string(input)?;
        Ok(self.request("/shelves", Some(body), None))
    }

    pub fn build_get_shelf(&self, shelf: i64) -> HttpRequest {
        self.request(&format!("/shelves/{shelf}"), None, None)
    }

    pub fn build_delete_shelf(&self, shelf: i64) -> HttpRequest {
        self.request(&format!("/shelves/{shelf}"), None, Some(HttpMethod::Delete))
    }

    pub fn build_list_books(&self, shelf: i64) -> HttpRequest {
        self.request(&format!("/shelves/{shelf}/books"), None, None)
    }

    pub fn build_create_book(&self, shelf: i64, input: &NewBook) -> Result<HttpRequest, ClientError> {
        let body = serde_json::to_string(input)?;
        Ok(self.request(&format!("/shelves/{shelf}/books"), Some(body), None))
    }

    pub fn build_get_book(&self, shelf: i64, book: i64) -> HttpRequest {
        self.request(&format!("/shelves/{shelf}/books/{book}"), None, None)
    }

    pub fn build_delete_book(&self, shelf: i64, book: i64) -> HttpRequest {
        self.request(
            &format!("/shelves/{shelf}/books/{book}"),
            None,
            Some(HttpMethod::Delete),
        )
    }

    pub fn parse_shelf(&self, response: &HttpResponse) -> Result<Shelf, ClientError> {
        parse_resource(response, "shelf")
    }

    pub fn parse_book(&self, response: &HttpResponse) -> Result<Book, ClientError> {
        parse_resource(response, "book")
    }

    /// The `shelves` array of a listing, or an empty array when absent.
    pub fn parse_shelf_list(&self, response: &HttpResponse) -> Value {
        list_field(response, "shelves")
    }

    /// The `books` array of a listing, or an empty array when absent.
    pub fn parse_book_list(&self, response: &HttpResponse) -> Value {
        list_field(response, "books")
    }

    /// POST when a body is present, GET otherwise, unless `method` says so.
    fn request(&self, path: &str, body: Option<String>, method: Option<HttpMethod>) -> HttpRequest {
        let method = method.unwrap_or(if body.is_some() {
            HttpMethod::Post
        } else {
            HttpMethod::Get
        });
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body,
        }
    }
}

fn parse_resource<T: DeserializeOwned>(
    response: &HttpResponse,
    kind: &'static str,
) -> Result<T, ClientError> {
    serde_json::from_value(response.json()).map_err(|_| ClientError::MalformedResource {
        kind,
        body: response.body.clone(),
    })
}

fn list_field(response: &HttpResponse, field: &str) -> Value {
    response
        .json()
        .get(field)
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::API_KEY_HEADER;
    use serde_json::json;

    fn client() -> BookstoreClient {
        BookstoreClient::new("http://localhost:8080")
    }

    fn ok(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: body.to_string(),
        }
    }

    #[test]
    fn build_list_shelves_produces_correct_request() {
        let req = client().build_list_shelves();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:8080/shelves");
        assert!(req.body.is_none());
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header(API_KEY_HEADER), None);
    }

    #[test]
    fn build_create_shelf_defaults_to_post() {
        let req = client().build_create_shelf(&NewShelf::new("Text books")).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8080/shelves");
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"theme": "Text books"}));
    }

    #[test]
    fn build_delete_shelf_overrides_method() {
        let req = client().build_delete_shelf(7);
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:8080/shelves/7");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_book_requests() {
        let c = client();
        let create = c
            .build_create_book(1, &NewBook::new("Graham Doggett", "Maths for Chemist"))
            .unwrap();
        assert_eq!(create.method, HttpMethod::Post);
        assert_eq!(create.path, "http://localhost:8080/shelves/1/books");

        let list = c.build_list_books(1);
        assert_eq!(list.method, HttpMethod::Get);
        assert_eq!(list.path, "http://localhost:8080/shelves/1/books");

        let get = c.build_get_book(1, 3);
        assert_eq!(get.method, HttpMethod::Get);
        assert_eq!(get.path, "http://localhost:8080/shelves/1/books/3");

        let delete = c.build_delete_book(1, 3);
        assert_eq!(delete.method, HttpMethod::Delete);
        assert_eq!(delete.path, "http://localhost:8080/shelves/1/books/3");
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = BookstoreClient::new("http://localhost:8080/");
        assert_eq!(client.build_get_shelf(2).path, "http://localhost:8080/shelves/2");
    }

    #[test]
    fn parse_shelf_success() {
        let shelf = client().parse_shelf(&ok(r#"{"id":1,"theme":"Fiction"}"#)).unwrap();
        assert_eq!(shelf, Shelf::new(1, "Fiction"));
    }

    #[test]
    fn parse_shelf_from_garbage_is_malformed() {
        let err = client().parse_shelf(&ok("not json")).unwrap_err();
        assert!(matches!(err, ClientError::MalformedResource { kind: "shelf", .. }));
    }

    #[test]
    fn parse_book_list_reads_books_field() {
        let resp = ok(r#"{"books":[{"id":3,"shelf":1,"author":"A","title":"T"}]}"#);
        assert_eq!(
            client().parse_book_list(&resp),
            json!([{"id": 3, "shelf": 1, "author": "A", "title": "T"}])
        );
    }

    #[test]
    fn parse_lists_default_to_empty() {
        assert_eq!(client().parse_book_list(&ok("{}")), json!([]));
        assert_eq!(client().parse_shelf_list(&ok("garbage")), json!([]));
    }
}
