pub mod colaboradores;
pub mod dashboard;
pub mod herramientas;
pub mod login;
pub mod materiales;
pub mod movimientos;
pub mod obras;
pub mod prestamos;
