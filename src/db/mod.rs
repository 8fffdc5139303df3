pub mod colaboradores;
pub mod connection;
pub mod dashboard;
pub mod herramientas;
pub mod mantenimientos;
pub mod materiales;
pub mod movimientos;
pub mod obras;
pub mod prestamos;
pub mod sequences;

pub use connection::Database;
