//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! `requests.json` describes the request each `build_*` method must produce;
//! `responses.json` pairs simulated server answers with what the client reads
//! from them. Bodies are compared as parsed JSON, not raw strings.

use bookstore_core::{
    BookstoreClient, ClientError, HttpMethod, HttpResponse, NewBook, NewShelf,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:8080";

fn client() -> BookstoreClient {
    BookstoreClient::new(BASE_URL)
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn id(args: &Value, name: &str) -> i64 {
    args[name].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let args = &case["args"];
        let expected_req = &case["expected_request"];

        let req = match case["operation"].as_str().unwrap() {
            "list_shelves" => c.build_list_shelves(),
            "create_shelf" => {
                let input: NewShelf = serde_json::from_value(args["input"].clone()).unwrap();
                c.build_create_shelf(&input).unwrap()
            }
            "get_shelf" => c.build_get_shelf(id(args, "shelf")),
            "delete_shelf" => c.build_delete_shelf(id(args, "shelf")),
            "list_books" => c.build_list_books(id(args, "shelf")),
            "create_book" => {
                let input: NewBook = serde_json::from_value(args["input"].clone()).unwrap();
                c.build_create_book(id(args, "shelf"), &input).unwrap()
            }
            "get_book" => c.build_get_book(id(args, "shelf"), id(args, "book")),
            "delete_book" => c.build_delete_book(id(args, "shelf"), id(args, "book")),
            other => panic!("{name}: unknown operation: {other}"),
        };

        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.path, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: path");

        let expected_headers: Vec<(String, String)> = expected_req["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");

        match req.body.as_deref() {
            Some(body) => {
                let body: Value = serde_json::from_str(body).unwrap();
                assert_eq!(body, expected_req["body"], "{name}: body");
            }
            None => assert!(expected_req["body"].is_null(), "{name}: body should be None"),
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = &case["simulated_response"];
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            headers: vec![(
                "content-type".to_string(),
                sim["content_type"].as_str().unwrap().to_string(),
            )],
            body: sim["body"].as_str().unwrap().to_string(),
        };

        assert_eq!(response.json(), case["expected_json"], "{name}: json");
        assert_eq!(
            response.is_json(),
            case["expected_is_json"].as_bool().unwrap(),
            "{name}: is_json"
        );

        let result = match case["parse"].as_str().unwrap() {
            "shelf" => c.parse_shelf(&response).map(|shelf| shelf.to_json()),
            "book" => c.parse_book(&response).map(|book| book.to_json()),
            "shelf_list" => Ok(c.parse_shelf_list(&response)),
            "book_list" => Ok(c.parse_book_list(&response)),
            other => panic!("{name}: unknown parse target: {other}"),
        };

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error.as_str().unwrap() {
                "MalformedResource" => assert!(
                    matches!(err, ClientError::MalformedResource { .. }),
                    "{name}: expected MalformedResource"
                ),
                other => panic!("{name}: unknown expected_error: {other}"),
            }
        } else {
            assert_eq!(result.unwrap(), case["expected_result"], "{name}: parsed result");
        }
    }
}
