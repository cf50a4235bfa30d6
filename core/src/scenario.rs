//! The bookstore lifecycle scenario.
//!
//! # Design
//! `ScenarioRunner` owns the transport and an immutable `ClientConfig`. Every
//! step is a method returning `Result`; the first failed assertion ends the
//! run. Resources created by the server come back as `Shelf`/`Book` values
//! and are passed by reference into later steps, never mutated.
//!
//! With verification on and an API key configured, each authenticated call is
//! preceded by two negative auth checks: one without a key (expects 401) and one
//! with a blocked key (expects 403).

use serde_json::Value;
use tracing::{debug, info};

use crate::client::BookstoreClient;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::types::{Book, NewBook, NewShelf, Shelf};
use crate::verify::Verifier;

/// Message the gateway returns for calls without any API key.
pub const UNREGISTERED_CALLER_MESSAGE: &str = "Method doesn't allow unregistered callers \
(callers without established identity). Please use API Key or other form of API consumer \
identity to call this API.";

/// Message the gateway returns for a blocked API key.
pub const BLOCKED_CLIENT_MESSAGE: &str = "Client application blocked.";

/// Key sent by the second negative auth check.
pub const BLOCKED_API_KEY: &str = "aaaa";

/// How many times `run_repeated` executes the scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    Times(u64),
    Forever,
}

impl From<Option<u64>> for Repeat {
    fn from(count: Option<u64>) -> Self {
        count.map_or(Repeat::Forever, Repeat::Times)
    }
}

pub struct ScenarioRunner<T> {
    config: ClientConfig,
    client: BookstoreClient,
    verifier: Verifier,
    transport: T,
}

impl<T: Transport> ScenarioRunner<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self {
            client: BookstoreClient::new(config.base_url()),
            verifier: Verifier::new(config.verify()),
            config,
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Run the scenario `repeat` times, stopping at the first error.
    pub fn run_repeated(&mut self, repeat: Repeat) -> Result<(), ClientError> {
        match repeat {
            Repeat::Times(count) => {
                for round in 1..=count {
                    debug!(round, count, "scenario round");
                    self.run_once()?;
                }
                Ok(())
            }
            Repeat::Forever => loop {
                self.run_once()?;
            },
        }
    }

    /// Create two shelves and two books, check every listing along the way,
    /// then delete everything again.
    pub fn run_once(&mut self) -> Result<(), ClientError> {
        let text_books = self.create_shelf(&NewShelf::new("Text books"))?;
        let fiction = self.create_shelf(&NewShelf::new("Fiction"))?;
        self.verify_shelf(&text_books)?;
        self.verify_shelf(&fiction)?;

        let maths = self.create_book(
            &text_books,
            &NewBook::new("Graham Doggett", "Maths for Chemist"),
        )?;
        self.verify_list_books(&text_books, &[maths.clone()])?;
        let astronomy = self.create_book(
            &text_books,
            &NewBook::new("George C. Comstock", "A Text-Book of Astronomy"),
        )?;
        self.verify_list_books(&text_books, &[maths.clone(), astronomy.clone()])?;
        self.verify_book(&maths)?;
        self.verify_book(&astronomy)?;

        // fiction has no books
        self.verify_list_books(&fiction, &[])?;

        self.delete_book(&astronomy)?;
        self.verify_list_books(&text_books, &[maths.clone()])?;
        self.delete_book(&maths)?;
        self.verify_list_books(&text_books, &[])?;

        self.delete_shelf(&fiction)?;
        self.delete_shelf(&text_books)
    }

    /// Delete every shelf the server currently lists.
    pub fn clear(&mut self) -> Result<(), ClientError> {
        info!("Clear existing shelves.");
        let response = self.send(self.client.build_list_shelves(), false)?;
        self.verifier.assert_equal("list shelves status", response.status, 200u16)?;
        let listed = match self.client.parse_shelf_list(&response) {
            Value::Array(entries) => entries,
            _ => Vec::new(),
        };
        for entry in listed {
            let shelf: Shelf =
                serde_json::from_value(entry.clone()).map_err(|_| ClientError::MalformedResource {
                    kind: "shelf",
                    body: entry.to_string(),
                })?;
            self.delete_shelf(&shelf)?;
        }
        Ok(())
    }

    pub fn create_shelf(&mut self, input: &NewShelf) -> Result<Shelf, ClientError> {
        info!(theme = %input.theme, "Create shelf");
        let request = self.client.build_create_shelf(input)?;
        let response = self.send(request, true)?;
        self.verifier.assert_equal("create shelf status", response.status, 200u16)?;
        // The server assigns the id; only the theme has to come back as sent.
        let json = response.json();
        self.verifier.assert_equal(
            "created shelf theme",
            string_field(&json, "theme"),
            input.theme.as_str(),
        )?;
        self.client.parse_shelf(&response)
    }

    pub fn verify_shelf(&mut self, shelf: &Shelf) -> Result<(), ClientError> {
        info!("Verify shelf: shelves/{}", shelf.id);
        let response = self.send(self.client.build_get_shelf(shelf.id), true)?;
        self.verifier.assert_equal("get shelf status", response.status, 200u16)?;
        self.verifier.assert_equal("shelf", response.json(), shelf.to_json())
    }

    pub fn delete_shelf(&mut self, shelf: &Shelf) -> Result<(), ClientError> {
        info!("Remove shelf: shelves/{}", shelf.id);
        let response = self.send(self.client.build_delete_shelf(shelf.id), true)?;
        self.verifier.assert_equal("delete shelf status", response.status, 204u16)
    }

    /// The top-level listing is public, so no key and no auth checks.
    pub fn verify_list_shelves(&mut self, shelves: &[Shelf]) -> Result<(), ClientError> {
        let response = self.send(self.client.build_list_shelves(), false)?;
        self.verifier.assert_equal("list shelves status", response.status, 200u16)?;
        let expected = Value::Array(shelves.iter().map(Shelf::to_json).collect());
        self.verifier
            .assert_equal("shelves", self.client.parse_shelf_list(&response), expected)
    }

    pub fn create_book(&mut self, shelf: &Shelf, input: &NewBook) -> Result<Book, ClientError> {
        info!(
            shelf = shelf.id,
            author = %input.author,
            title = %input.title,
            "Create book"
        );
        let request = self.client.build_create_book(shelf.id, input)?;
        let response = self.send(request, true)?;
        self.verifier.assert_equal("create book status", response.status, 200u16)?;
        let json = response.json();
        self.verifier.assert_equal(
            "created book author",
            string_field(&json, "author"),
            input.author.as_str(),
        )?;
        self.verifier.assert_equal(
            "created book title",
            string_field(&json, "title"),
            input.title.as_str(),
        )?;
        self.client.parse_book(&response)
    }

    pub fn verify_book(&mut self, book: &Book) -> Result<(), ClientError> {
        info!("Verify book: /shelves/{}/books/{}", book.shelf, book.id);
        let response = self.send(self.client.build_get_book(book.shelf, book.id), true)?;
        self.verifier.assert_equal("get book status", response.status, 200u16)?;
        self.verifier.assert_equal("book", response.json(), book.to_json())
    }

    pub fn delete_book(&mut self, book: &Book) -> Result<(), ClientError> {
        info!("Remove book: /shelves/{}/books/{}", book.shelf, book.id);
        let response = self.send(self.client.build_delete_book(book.shelf, book.id), true)?;
        self.verifier.assert_equal("delete book status", response.status, 204u16)
    }

    pub fn verify_list_books(&mut self, shelf: &Shelf, books: &[Book]) -> Result<(), ClientError> {
        let response = self.send(self.client.build_list_books(shelf.id), true)?;
        self.verifier.assert_equal("list books status", response.status, 200u16)?;
        let expected = Value::Array(books.iter().map(Book::to_json).collect());
        self.verifier
            .assert_equal("books", self.client.parse_book_list(&response), expected)
    }

    /// Issue `request`, attaching the configured key when `authenticated`.
    fn send(&mut self, request: HttpRequest, authenticated: bool) -> Result<HttpResponse, ClientError> {
        let api_key = if authenticated {
            self.config.api_key().map(str::to_owned)
        } else {
            None
        };
        if api_key.is_some() && self.verifier.enabled() {
            self.check_auth_rejections(&request)?;
        }
        self.call(&request.with_api_key(api_key.as_deref()))
    }

    fn check_auth_rejections(&mut self, request: &HttpRequest) -> Result<(), ClientError> {
        info!("Negative test: remove api_key.");
        let response = self.call(&request.with_api_key(None))?;
        self.verifier
            .assert_equal("unregistered caller status", response.status, 401u16)?;
        self.verifier.assert_equal(
            "unregistered caller message",
            response.json()["message"].clone(),
            UNREGISTERED_CALLER_MESSAGE,
        )?;
        info!("Completed unregistered test.");

        info!("Negative test: pass blocked api_key.");
        let response = self.call(&request.with_api_key(Some(BLOCKED_API_KEY)))?;
        self.verifier.assert_equal("blocked key status", response.status, 403u16)?;
        self.verifier.assert_equal(
            "blocked key message",
            response.json()["message"].clone(),
            BLOCKED_CLIENT_MESSAGE,
        )?;
        info!("Completed blocked api_key test.");
        Ok(())
    }

    fn call(&mut self, request: &HttpRequest) -> Result<HttpResponse, ClientError> {
        debug!(
            method = request.method.as_str(),
            url = %request.path,
            headers = ?request.headers,
            body = request.body.as_deref().unwrap_or("None"),
            "HTTP request"
        );
        let response = self.transport.execute(request)?;
        debug!(status = response.status, body = %response.body, "HTTP response");
        Ok(response)
    }
}

fn string_field<'a>(json: &'a Value, field: &str) -> &'a str {
    json.get(field).and_then(Value::as_str).unwrap_or("")
}
