// src/db/mantenimientos.rs

use rusqlite::{params, Row};

use crate::db::connection::{now_millis, tx_err, Database};
use crate::errors::ServerError;

#[derive(Debug, Clone)]
pub struct Mantenimiento {
    pub id: i64,
    pub tool_id: i64,
    pub tool_code: String,
    pub tipo: String,
    pub descripcion: String,
    pub costo: Option<f64>,
    pub tecnico: String,
    pub fecha: i64,
    pub next_maintenance_date: Option<i64>,
    pub created_by: String,
    pub created_at: i64,
}

#[derive(Debug)]
pub struct NuevoMantenimiento {
    pub tool_id: i64,
    pub tipo: String,
    pub descripcion: String,
    pub costo: Option<f64>,
    pub tecnico: String,
    pub fecha: i64,
    pub next_maintenance_date: Option<i64>,
}

/// Append a maintenance record and, when a next date was given, push it onto
/// the tool so the dashboard alert window picks it up.
pub fn add_maintenance_record(
    db: &Database,
    registro: &NuevoMantenimiento,
    created_by: &str,
) -> Result<i64, ServerError> {
    db.with_conn(|conn| {
        let tx = conn.transaction().map_err(tx_err)?;

        let tool_code: String = tx
            .query_row(
                "select codigo from herramientas where id = ?",
                params![registro.tool_id],
                |r| r.get(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => ServerError::NotFound,
                other => ServerError::DbError(other.to_string()),
            })?;

        let now = now_millis();
        tx.execute(
            "insert into mantenimientos
               (tool_id, tool_code, tipo, descripcion, costo, tecnico, fecha,
                next_maintenance_date, created_by, created_at)
             values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                registro.tool_id,
                tool_code,
                registro.tipo,
                registro.descripcion,
                registro.costo,
                registro.tecnico,
                registro.fecha,
                registro.next_maintenance_date,
                created_by,
                now,
            ],
        )
        .map_err(|e| ServerError::DbError(format!("insert mantenimiento failed: {e}")))?;
        let id = tx.last_insert_rowid();

        if let Some(next) = registro.next_maintenance_date {
            tx.execute(
                "update herramientas set next_maintenance_date = ?, updated_at = ? where id = ?",
                params![next, now, registro.tool_id],
            )
            .map_err(|e| ServerError::DbError(format!("update herramienta failed: {e}")))?;
        }

        tx.commit().map_err(tx_err)?;
        Ok(id)
    })
}

pub fn get_maintenance_records(
    db: &Database,
    tool_id: i64,
) -> Result<Vec<Mantenimiento>, ServerError> {
    db.with_conn(|conn| {
        let mut stmt = conn
            .prepare(
                "select id, tool_id, tool_code, tipo, descripcion, costo, tecnico, fecha,
                        next_maintenance_date, created_by, created_at
                 from mantenimientos where tool_id = ? order by fecha desc, id desc",
            )
            .map_err(|e| ServerError::DbError(e.to_string()))?;
        let rows = stmt
            .query_map(params![tool_id], from_row)
            .map_err(|e| ServerError::DbError(e.to_string()))?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
        }
        Ok(out)
    })
}

fn from_row(row: &Row) -> rusqlite::Result<Mantenimiento> {
    Ok(Mantenimiento {
        id: row.get(0)?,
        tool_id: row.get(1)?,
        tool_code: row.get(2)?,
        tipo: row.get(3)?,
        descripcion: row.get(4)?,
        costo: row.get(5)?,
        tecnico: row.get(6)?,
        fecha: row.get(7)?,
        next_maintenance_date: row.get(8)?,
        created_by: row.get(9)?,
        created_at: row.get(10)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::herramientas::{add_tool, get_tool_by_id};
    use crate::db::test_support::{make_test_db, tool_form};

    #[test]
    fn record_with_next_date_updates_the_tool() {
        let db = make_test_db();
        let id = add_tool(&db, &tool_form("Taladro", "HER-001")).unwrap();
        let next = now_millis() + 30 * 24 * 60 * 60 * 1000;

        add_maintenance_record(
            &db,
            &NuevoMantenimiento {
                tool_id: id,
                tipo: "preventivo".into(),
                descripcion: "Cambio de escobillas".into(),
                costo: Some(45.0),
                tecnico: "Carlos".into(),
                fecha: now_millis(),
                next_maintenance_date: Some(next),
            },
            "admin",
        )
        .unwrap();

        let tool = get_tool_by_id(&db, id).unwrap().unwrap();
        assert_eq!(tool.next_maintenance_date, Some(next));

        let registros = get_maintenance_records(&db, id).unwrap();
        assert_eq!(registros.len(), 1);
        assert_eq!(registros[0].tool_code, "HER-001");
    }
}
