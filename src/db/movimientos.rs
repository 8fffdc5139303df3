// src/db/movimientos.rs
//
// Tool scan movements (the QR gate flow): one row per salida/entrada scan,
// updating the tool's state and location alongside. Distinct from the
// material stock ledger in movimientos_materiales.

use rusqlite::{params, Row};

use crate::db::connection::{now_millis, tx_err, Database};
use crate::domain::estados::{MovimientoTipo, ToolStatus};
use crate::errors::ServerError;

#[derive(Debug, Clone)]
pub struct Movimiento {
    pub id: i64,
    pub tool_id: i64,
    pub tool_code: String,
    pub tipo: MovimientoTipo,
    pub responsable: String,
    pub destino: String,
    pub fecha: i64,
    pub usuario_id: String,
}

/// Record a scan movement and update the tool in the same transaction.
/// A salida parks the tool at the destination as `en_uso`; an entrada brings
/// it back to the Bodega as `disponible`.
pub fn add_movement(
    db: &Database,
    tool_id: i64,
    tipo: MovimientoTipo,
    responsable: &str,
    destino: &str,
    usuario_id: &str,
) -> Result<(), ServerError> {
    db.with_conn(|conn| {
        let tx = conn.transaction().map_err(tx_err)?;

        let tool_code: String = tx
            .query_row(
                "select codigo from herramientas where id = ?",
                params![tool_id],
                |r| r.get(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => ServerError::NotFound,
                other => ServerError::DbError(other.to_string()),
            })?;

        let now = now_millis();
        tx.execute(
            "insert into movimientos
               (tool_id, tool_code, tipo, responsable, destino, fecha, usuario_id)
             values (?, ?, ?, ?, ?, ?, ?)",
            params![tool_id, tool_code, tipo, responsable, destino, now, usuario_id],
        )
        .map_err(|e| ServerError::DbError(format!("insert movimiento failed: {e}")))?;

        let (estado, ubicacion) = match tipo {
            MovimientoTipo::Salida => (ToolStatus::EnUso, destino),
            MovimientoTipo::Entrada => (ToolStatus::Disponible, "Bodega"),
        };
        tx.execute(
            "update herramientas set estado = ?, ubicacion = ?, updated_at = ? where id = ?",
            params![estado, ubicacion, now, tool_id],
        )
        .map_err(|e| ServerError::DbError(format!("update herramienta failed: {e}")))?;

        tx.commit().map_err(tx_err)
    })
}

pub fn get_movements(db: &Database, limit: i64) -> Result<Vec<Movimiento>, ServerError> {
    db.with_conn(|conn| {
        let mut stmt = conn
            .prepare(
                "select id, tool_id, tool_code, tipo, responsable, destino, fecha, usuario_id
                 from movimientos order by fecha desc, id desc limit ?",
            )
            .map_err(|e| ServerError::DbError(e.to_string()))?;
        let rows = stmt
            .query_map(params![limit], from_row)
            .map_err(|e| ServerError::DbError(e.to_string()))?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
        }
        Ok(out)
    })
}

fn from_row(row: &Row) -> rusqlite::Result<Movimiento> {
    Ok(Movimiento {
        id: row.get(0)?,
        tool_id: row.get(1)?,
        tool_code: row.get(2)?,
        tipo: row.get(3)?,
        responsable: row.get(4)?,
        destino: row.get(5)?,
        fecha: row.get(6)?,
        usuario_id: row.get(7)?,
    })
}
