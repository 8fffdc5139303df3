// src/domain/prestamo.rs

use crate::domain::estados::PrestamoStatus;

/// Determines the canonical status of a loan from its line items.
///
/// The status is derived, never set directly: `devuelto` only when every
/// line has come back, `parcial` when some have, `activo` when none have.
pub fn derive_estado(returned_flags: &[bool]) -> PrestamoStatus {
    let todas = returned_flags.iter().all(|d| *d);
    let algunas = returned_flags.iter().any(|d| *d);

    if todas && !returned_flags.is_empty() {
        PrestamoStatus::Devuelto
    } else if algunas {
        PrestamoStatus::Parcial
    } else {
        PrestamoStatus::Activo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_lines_returned_is_activo() {
        assert_eq!(derive_estado(&[false, false]), PrestamoStatus::Activo);
    }

    #[test]
    fn some_lines_returned_is_parcial() {
        assert_eq!(derive_estado(&[true, false]), PrestamoStatus::Parcial);
        assert_eq!(derive_estado(&[false, true, true]), PrestamoStatus::Parcial);
    }

    #[test]
    fn all_lines_returned_is_devuelto() {
        assert_eq!(derive_estado(&[true]), PrestamoStatus::Devuelto);
        assert_eq!(derive_estado(&[true, true, true]), PrestamoStatus::Devuelto);
    }
}
