// src/domain/estados.rs
//
// Status vocabularies shared by the db layer, the forms and the templates.
// Stored in SQLite as their spanish wire strings (the same values the
// original paper forms used), so every enum round-trips through ToSql/FromSql.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};

macro_rules! estado_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }

            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($s => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let s = value.as_str()?;
                Self::parse(s).ok_or_else(|| FromSqlError::Other(
                    format!("unknown {}: {s}", stringify!($name)).into(),
                ))
            }
        }
    };
}

estado_enum!(ToolStatus {
    Disponible => "disponible",
    EnUso => "en_uso",
    Mantenimiento => "mantenimiento",
    Baja => "baja",
});

estado_enum!(ColaboradorStatus {
    Activo => "activo",
    Inactivo => "inactivo",
});

estado_enum!(ObraStatus {
    Activa => "activa",
    Pausada => "pausada",
    Finalizada => "finalizada",
});

estado_enum!(PrestamoStatus {
    Activo => "activo",
    Parcial => "parcial",
    Devuelto => "devuelto",
});

estado_enum!(MovimientoTipo {
    Entrada => "entrada",
    Salida => "salida",
});

// Condition a tool comes back in. "malo" routes the tool to maintenance.
estado_enum!(CondicionDevolucion {
    Bueno => "bueno",
    Regular => "regular",
    Malo => "malo",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estados_round_trip_through_their_wire_strings() {
        for e in [
            ToolStatus::Disponible,
            ToolStatus::EnUso,
            ToolStatus::Mantenimiento,
            ToolStatus::Baja,
        ] {
            assert_eq!(ToolStatus::parse(e.as_str()), Some(e));
        }
        assert_eq!(ToolStatus::parse("prestada"), None);
        assert_eq!(PrestamoStatus::parse("parcial"), Some(PrestamoStatus::Parcial));
        assert_eq!(MovimientoTipo::parse("entrada"), Some(MovimientoTipo::Entrada));
    }
}
