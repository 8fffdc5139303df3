use std::fmt;

/// Errors surfaced to the initiating request. Nothing here is retried
/// automatically; every failed business operation leaves the database
/// exactly as it was (all multi-write operations run in one transaction).
#[derive(Debug)]
pub enum ServerError {
    NotFound,
    BadRequest(String),
    /// An outbound stock posting asked for more than the current balance.
    InsufficientStock { disponible: f64, solicitado: f64 },
    /// The underlying transaction could not commit (e.g. SQLITE_BUSY).
    TransactionConflict(String),
    DbError(String),
    InternalError,
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::NotFound => write!(f, "Not Found"),
            ServerError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            ServerError::InsufficientStock {
                disponible,
                solicitado,
            } => write!(
                f,
                "Stock insuficiente. Disponible: {disponible}, Solicitado: {solicitado}"
            ),
            ServerError::TransactionConflict(msg) => write!(f, "Transaction Conflict: {msg}"),
            ServerError::DbError(msg) => write!(f, "Database Error: {msg}"),
            ServerError::InternalError => write!(f, "Internal Server Error"),
        }
    }
}

impl std::error::Error for ServerError {}
