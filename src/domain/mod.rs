pub mod estados;
pub mod forms;
pub mod prestamo;
