use crate::auth::sessions;
use crate::db::connection::{init_db, Database};
use astra::Body;
use http::{Method, Request};
use std::io::Read;
use std::time::{SystemTime, UNIX_EPOCH};

/// Fresh file-backed test database using the production schema. Each call
/// gets its own file so router tests never share state.
pub fn init_test_db(name: &str) -> Database {
    let path = std::env::temp_dir().join(format!(
        "{name}_{}.sqlite",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    let db = Database::new(path);
    init_db(&db, "sql/schema.sql").unwrap_or_else(|e| panic!("Database initialization failed: {e}"));
    db
}

/// Log a user in directly against the db and return the session token.
pub fn login_session(db: &Database, email: &str) -> String {
    db.with_conn(|conn| sessions::login(conn, email)).unwrap()
}

pub fn get(uri: &str) -> astra::Request {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn get_with_session(uri: &str, session: &str) -> astra::Request {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("Cookie", format!("session={session}"))
        .body(Body::empty())
        .unwrap()
}

/// POST an urlencoded form with the session cookie attached.
pub fn post_form(uri: &str, body: &str, session: &str) -> astra::Request {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .header("Cookie", format!("session={session}"))
        .body(Body::from(body.as_bytes().to_vec()))
        .unwrap()
}

pub fn post_form_anonymous(uri: &str, body: &str) -> astra::Request {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(Body::from(body.as_bytes().to_vec()))
        .unwrap()
}

pub fn body_string(resp: astra::Response) -> String {
    let mut out = String::new();
    resp.into_body().reader().read_to_string(&mut out).unwrap();
    out
}

/// Follow the Location header of a 303 (e.g. "/prestamos/1") and return it.
pub fn location(resp: &astra::Response) -> String {
    resp.headers()
        .get("Location")
        .expect("expected a Location header")
        .to_str()
        .unwrap()
        .to_string()
}
