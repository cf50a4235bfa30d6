use std::{
    collections::{BTreeMap, HashSet},
    fmt::Display,
    sync::Arc,
};

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Request, State,
    },
    http::{request::Parts, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const DEFAULT_API_KEY: &str = "test-key";

pub const UNREGISTERED_CALLER_MESSAGE: &str = "Method doesn't allow unregistered callers \
(callers without established identity). Please use API Key or other form of API consumer \
identity to call this API.";
pub const BLOCKED_CLIENT_MESSAGE: &str = "Client application blocked.";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shelf {
    pub id: i64,
    pub theme: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub shelf: i64,
    pub author: String,
    pub title: String,
}

#[derive(Deserialize)]
pub struct ShelfRequest {
    pub theme: Option<String>,
}

#[derive(Deserialize)]
pub struct BookRequest {
    pub author: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShelfList {
    pub shelves: Vec<Shelf>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookList {
    pub books: Vec<Book>,
}

/// Error answered as `{"error": <status>, "message": <text>}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn shelf_not_found(id: impl Display) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("Shelf {id} not found."))
    }

    fn book_not_found(id: impl Display) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("Book {id} not found."))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(_: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Missing request body.")
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(StatusCode::NOT_FOUND, rejection.body_text())
    }
}

/// `axum::Json` whose rejections use the `ApiError` envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Path` whose rejections use the `ApiError` envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Ids arrive as raw path segments so that anything unknown, numeric or
/// not, is answered with the same 404.
fn shelf_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| ApiError::shelf_not_found(raw))
}

fn book_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| ApiError::book_not_found(raw))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.status.as_u16(),
            "message": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug)]
struct ShelfEntry {
    shelf: Shelf,
    books: BTreeMap<i64, Book>,
}

/// In-memory bookstore. Shelves and books draw ids from one counter, so
/// iterating by id is iterating in creation order.
#[derive(Debug, Default)]
pub struct Store {
    last_id: i64,
    shelves: BTreeMap<i64, ShelfEntry>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Two shelves with one book each.
    pub fn with_sample_data() -> Self {
        let mut store = Self::new();
        for (theme, author, title) in [
            ("Fiction", "Neal Stephenson", "REAMDE"),
            ("Fantasy", "George R.R. Martin", "A Game of Thrones"),
        ] {
            let shelf = Shelf {
                id: store.next_id(),
                theme: theme.to_string(),
            };
            let book = Book {
                id: store.next_id(),
                shelf: shelf.id,
                author: author.to_string(),
                title: title.to_string(),
            };
            store.shelves.insert(
                shelf.id,
                ShelfEntry {
                    shelf,
                    books: BTreeMap::from([(book.id, book)]),
                },
            );
        }
        store
    }

    pub fn list_shelves(&self) -> Vec<Shelf> {
        self.shelves.values().map(|entry| entry.shelf.clone()).collect()
    }

    pub fn create_shelf(&mut self, theme: String) -> Shelf {
        let shelf = Shelf {
            id: self.next_id(),
            theme,
        };
        self.shelves.insert(
            shelf.id,
            ShelfEntry {
                shelf: shelf.clone(),
                books: BTreeMap::new(),
            },
        );
        shelf
    }

    pub fn get_shelf(&self, id: i64) -> Result<Shelf, ApiError> {
        self.shelf(id).map(|entry| entry.shelf.clone())
    }

    pub fn delete_shelf(&mut self, id: i64) -> Result<(), ApiError> {
        self.shelves
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| ApiError::shelf_not_found(id))
    }

    pub fn list_books(&self, shelf: i64) -> Result<Vec<Book>, ApiError> {
        Ok(self.shelf(shelf)?.books.values().cloned().collect())
    }

    pub fn create_book(&mut self, shelf: i64, author: String, title: String) -> Result<Book, ApiError> {
        if !self.shelves.contains_key(&shelf) {
            return Err(ApiError::shelf_not_found(shelf));
        }
        let book = Book {
            id: self.next_id(),
            shelf,
            author,
            title,
        };
        self.shelf_mut(shelf)?.books.insert(book.id, book.clone());
        Ok(book)
    }

    pub fn get_book(&self, shelf: i64, book: i64) -> Result<Book, ApiError> {
        self.shelf(shelf)?
            .books
            .get(&book)
            .cloned()
            .ok_or_else(|| ApiError::book_not_found(book))
    }

    pub fn delete_book(&mut self, shelf: i64, book: i64) -> Result<Book, ApiError> {
        self.shelf_mut(shelf)?
            .books
            .remove(&book)
            .ok_or_else(|| ApiError::book_not_found(book))
    }

    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn shelf(&self, id: i64) -> Result<&ShelfEntry, ApiError> {
        self.shelves.get(&id).ok_or_else(|| ApiError::shelf_not_found(id))
    }

    fn shelf_mut(&mut self, id: i64) -> Result<&mut ShelfEntry, ApiError> {
        self.shelves
            .get_mut(&id)
            .ok_or_else(|| ApiError::shelf_not_found(id))
    }
}

pub type Db = Arc<RwLock<Store>>;

/// API keys the gateway lets through. Any other key is blocked.
#[derive(Clone, Debug)]
pub struct ApiKeys(Arc<HashSet<String>>);

impl ApiKeys {
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self(Arc::new(keys.into_iter().map(Into::into).collect()))
    }

    pub fn allows(&self, key: &str) -> bool {
        self.0.contains(key)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub keys: ApiKeys,
}

/// A caller that presented an allowed API key.
pub struct Caller;

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match parts.headers.get(API_KEY_HEADER) {
            None => Err(ApiError::new(
                StatusCode::UNAUTHORIZED,
                UNREGISTERED_CALLER_MESSAGE,
            )),
            Some(value) if value.to_str().is_ok_and(|key| state.keys.allows(key)) => Ok(Caller),
            Some(_) => Err(ApiError::new(StatusCode::FORBIDDEN, BLOCKED_CLIENT_MESSAGE)),
        }
    }
}

/// Empty store, accepting only `DEFAULT_API_KEY`.
pub fn app() -> Router {
    app_with(Store::new(), ApiKeys::new([DEFAULT_API_KEY]))
}

pub fn app_with(store: Store, keys: ApiKeys) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(store)),
        keys,
    };
    Router::new()
        .route("/version", get(version))
        .route("/shelves", get(list_shelves).post(create_shelf))
        .route("/shelves/{shelf}", get(get_shelf).delete(delete_shelf))
        .route("/shelves/{shelf}/books", get(list_books).post(create_book))
        .route(
            "/shelves/{shelf}/books/{book}",
            get(get_book).delete(delete_book),
        )
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

pub async fn run(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}

async fn log_request(request: Request, next: Next) -> Response {
    info!(method = %request.method(), uri = %request.uri(), "request");
    next.run(request).await
}

async fn version() -> Json<serde_json::Value> {
    Json(json!({ "version": env!("CARGO_PKG_VERSION") }))
}

async fn list_shelves(State(state): State<AppState>) -> Json<ShelfList> {
    let store = state.db.read().await;
    Json(ShelfList {
        shelves: store.list_shelves(),
    })
}

async fn create_shelf(
    _caller: Caller,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ShelfRequest>,
) -> Result<Json<Shelf>, ApiError> {
    let theme = input.theme.ok_or_else(|| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            "Shelf resource is missing required 'theme'.",
        )
    })?;
    Ok(Json(state.db.write().await.create_shelf(theme)))
}

async fn get_shelf(
    _caller: Caller,
    State(state): State<AppState>,
    ApiPath(shelf): ApiPath<String>,
) -> Result<Json<Shelf>, ApiError> {
    state.db.read().await.get_shelf(shelf_id(&shelf)?).map(Json)
}

async fn delete_shelf(
    _caller: Caller,
    State(state): State<AppState>,
    ApiPath(shelf): ApiPath<String>,
) -> Result<StatusCode, ApiError> {
    state.db.write().await.delete_shelf(shelf_id(&shelf)?)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_books(
    _caller: Caller,
    State(state): State<AppState>,
    ApiPath(shelf): ApiPath<String>,
) -> Result<Json<BookList>, ApiError> {
    let books = state.db.read().await.list_books(shelf_id(&shelf)?)?;
    Ok(Json(BookList { books }))
}

async fn create_book(
    _caller: Caller,
    State(state): State<AppState>,
    ApiPath(shelf): ApiPath<String>,
    ApiJson(input): ApiJson<BookRequest>,
) -> Result<Json<Book>, ApiError> {
    let author = input.author.ok_or_else(|| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            "Book resource is missing required 'author'.",
        )
    })?;
    let title = input.title.ok_or_else(|| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            "Book resource is missing required 'title'.",
        )
    })?;
    state
        .db
        .write()
        .await
        .create_book(shelf_id(&shelf)?, author, title)
        .map(Json)
}

async fn get_book(
    _caller: Caller,
    State(state): State<AppState>,
    ApiPath((shelf, book)): ApiPath<(String, String)>,
) -> Result<Json<Book>, ApiError> {
    state
        .db
        .read()
        .await
        .get_book(shelf_id(&shelf)?, book_id(&book)?)
        .map(Json)
}

async fn delete_book(
    _caller: Caller,
    State(state): State<AppState>,
    ApiPath((shelf, book)): ApiPath<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state
        .db
        .write()
        .await
        .delete_book(shelf_id(&shelf)?, book_id(&book)?)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_shared_between_shelves_and_books() {
        let mut store = Store::new();
        let shelf = store.create_shelf("Text books".to_string());
        let book = store
            .create_book(shelf.id, "Graham Doggett".to_string(), "Maths for Chemist".to_string())
            .unwrap();
        let other = store.create_shelf("Fiction".to_string());
        assert_eq!((shelf.id, book.id, other.id), (1, 2, 3));
        assert_eq!(book.shelf, shelf.id);
    }

    #[test]
    fn books_list_in_creation_order() {
        let mut store = Store::new();
        let shelf = store.create_shelf("Text books".to_string());
        let first = store.create_book(shelf.id, "A".to_string(), "One".to_string()).unwrap();
        let second = store.create_book(shelf.id, "B".to_string(), "Two".to_string()).unwrap();
        assert_eq!(store.list_books(shelf.id).unwrap(), vec![first.clone(), second]);

        store.delete_book(shelf.id, 3).unwrap();
        assert_eq!(store.list_books(shelf.id).unwrap(), vec![first]);
    }

    #[test]
    fn missing_shelf_is_not_found() {
        let mut store = Store::new();
        let err = store
            .create_book(9, "A".to_string(), "T".to_string())
            .unwrap_err();
        assert_eq!(err, ApiError::new(StatusCode::NOT_FOUND, "Shelf 9 not found."));
        assert_eq!(
            store.delete_shelf(9).unwrap_err().message,
            "Shelf 9 not found."
        );
    }

    #[test]
    fn missing_book_is_not_found() {
        let mut store = Store::new();
        let shelf = store.create_shelf("Fiction".to_string());
        let err = store.get_book(shelf.id, 5).unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Book 5 not found.");
    }

    #[test]
    fn deleting_a_shelf_drops_its_books() {
        let mut store = Store::with_sample_data();
        assert_eq!(store.list_shelves().len(), 2);
        store.delete_shelf(1).unwrap();
        assert_eq!(store.list_shelves(), vec![Shelf { id: 3, theme: "Fantasy".to_string() }]);
        assert!(store.get_book(1, 2).is_err());
    }

    #[test]
    fn sample_data_matches_seed() {
        let store = Store::with_sample_data();
        let books = store.list_books(3).unwrap();
        assert_eq!(books[0].author, "George R.R. Martin");
        assert_eq!(books[0].title, "A Game of Thrones");
    }

    #[test]
    fn api_keys_allow_only_listed_keys() {
        let keys = ApiKeys::new(["good", "also-good"]);
        assert!(keys.allows("good"));
        assert!(keys.allows("also-good"));
        assert!(!keys.allows("aaaa"));
        assert!(!keys.allows(""));
    }

    #[test]
    fn unparsable_ids_are_not_found() {
        assert_eq!(shelf_id("12").unwrap(), 12);
        assert_eq!(shelf_id("abc").unwrap_err().message, "Shelf abc not found.");
        let err = book_id("1.5").unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Book 1.5 not found.");
    }

    #[test]
    fn shelf_request_theme_is_optional() {
        let input: ShelfRequest = serde_json::from_str("{}").unwrap();
        assert!(input.theme.is_none());
    }
}
