// src/db/herramientas.rs

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::connection::{now_millis, Database};
use crate::domain::estados::ToolStatus;
use crate::domain::forms::ToolForm;
use crate::errors::ServerError;

#[derive(Debug, Clone)]
pub struct Tool {
    pub id: i64,
    pub nombre: String,
    pub codigo: String,
    pub categoria: String,
    pub estado: ToolStatus,
    pub ubicacion: String,
    pub descripcion: String,
    pub imagen_url: String,
    pub next_maintenance_date: Option<i64>,
    pub created_at: i64,
    pub updated_at: Option<i64>,
}

const TOOL_COLUMNS: &str = "id, nombre, codigo, categoria, estado, ubicacion, descripcion, \
     imagen_url, next_maintenance_date, created_at, updated_at";

fn tool_from_row(row: &Row) -> rusqlite::Result<Tool> {
    Ok(Tool {
        id: row.get(0)?,
        nombre: row.get(1)?,
        codigo: row.get(2)?,
        categoria: row.get(3)?,
        estado: row.get(4)?,
        ubicacion: row.get(5)?,
        descripcion: row.get(6)?,
        imagen_url: row.get(7)?,
        next_maintenance_date: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

pub fn add_tool(db: &Database, form: &ToolForm) -> Result<i64, ServerError> {
    db.with_conn(|conn| {
        conn.execute(
            "insert into herramientas
               (nombre, codigo, categoria, estado, ubicacion, descripcion,
                imagen_url, next_maintenance_date, created_at)
             values (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                form.nombre,
                form.codigo,
                form.categoria,
                form.estado,
                form.ubicacion,
                form.descripcion,
                form.imagen_url,
                form.next_maintenance_date,
                now_millis(),
            ],
        )
        .map_err(|e| ServerError::DbError(format!("insert herramienta failed: {e}")))?;
        Ok(conn.last_insert_rowid())
    })
}

pub fn get_tools(db: &Database) -> Result<Vec<Tool>, ServerError> {
    db.with_conn(|conn| {
        query_tools(
            conn,
            &format!("select {TOOL_COLUMNS} from herramientas order by created_at desc"),
            params![],
        )
    })
}

pub fn get_tools_by_estado(db: &Database, estado: ToolStatus) -> Result<Vec<Tool>, ServerError> {
    db.with_conn(|conn| {
        query_tools(
            conn,
            &format!(
                "select {TOOL_COLUMNS} from herramientas where estado = ? order by nombre asc"
            ),
            params![estado],
        )
    })
}

pub fn get_tool_by_id(db: &Database, id: i64) -> Result<Option<Tool>, ServerError> {
    db.with_conn(|conn| get_tool_by_id_conn(conn, id))
}

pub fn get_tool_by_id_conn(conn: &Connection, id: i64) -> Result<Option<Tool>, ServerError> {
    conn.query_row(
        &format!("select {TOOL_COLUMNS} from herramientas where id = ?"),
        params![id],
        tool_from_row,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select herramienta failed: {e}")))
}

/// QR flow: decoded text is matched against `codigo`.
pub fn get_tool_by_code(db: &Database, code: &str) -> Result<Option<Tool>, ServerError> {
    db.with_conn(|conn| {
        conn.query_row(
            &format!("select {TOOL_COLUMNS} from herramientas where codigo = ? limit 1"),
            params![code],
            tool_from_row,
        )
        .optional()
        .map_err(|e| ServerError::DbError(format!("select herramienta by codigo failed: {e}")))
    })
}

pub fn update_tool(db: &Database, id: i64, form: &ToolForm) -> Result<(), ServerError> {
    db.with_conn(|conn| {
        let updated = conn
            .execute(
                "update herramientas set
                   nombre = ?, codigo = ?, categoria = ?, estado = ?, ubicacion = ?,
                   descripcion = ?, imagen_url = ?, next_maintenance_date = ?, updated_at = ?
                 where id = ?",
                params![
                    form.nombre,
                    form.codigo,
                    form.categoria,
                    form.estado,
                    form.ubicacion,
                    form.descripcion,
                    form.imagen_url,
                    form.next_maintenance_date,
                    now_millis(),
                    id,
                ],
            )
            .map_err(|e| ServerError::DbError(format!("update herramienta failed: {e}")))?;
        if updated == 0 {
            return Err(ServerError::NotFound);
        }
        Ok(())
    })
}

pub fn update_tool_status_conn(
    conn: &Connection,
    id: i64,
    estado: ToolStatus,
) -> Result<(), ServerError> {
    let updated = conn
        .execute(
            "update herramientas set estado = ?, updated_at = ? where id = ?",
            params![estado, now_millis(), id],
        )
        .map_err(|e| ServerError::DbError(format!("update estado herramienta failed: {e}")))?;
    if updated == 0 {
        return Err(ServerError::NotFound);
    }
    Ok(())
}

pub fn delete_tool(db: &Database, id: i64) -> Result<(), ServerError> {
    db.with_conn(|conn| {
        conn.execute("delete from herramientas where id = ?", params![id])
            .map_err(|e| ServerError::DbError(format!("delete herramienta failed: {e}")))?;
        Ok(())
    })
}

/// Tools whose next maintenance falls within the next 7 days (or is already
/// overdue), soonest first.
pub fn get_maintenance_alerts(db: &Database, now: i64) -> Result<Vec<Tool>, ServerError> {
    let cutoff = now + 7 * 24 * 60 * 60 * 1000;
    db.with_conn(|conn| {
        query_tools(
            conn,
            &format!(
                "select {TOOL_COLUMNS} from herramientas
                 where next_maintenance_date is not null and next_maintenance_date <= ?
                 order by next_maintenance_date asc"
            ),
            params![cutoff],
        )
    })
}

fn query_tools(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<Tool>, ServerError> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| ServerError::DbError(e.to_string()))?;
    let rows = stmt
        .query_map(params, tool_from_row)
        .map_err(|e| ServerError::DbError(e.to_string()))?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{make_test_db, tool_form};

    #[test]
    fn add_and_fetch_by_code() {
        let db = make_test_db();
        let id = add_tool(&db, &tool_form("Taladro", "HER-001")).unwrap();

        let tool = get_tool_by_code(&db, "HER-001").unwrap().unwrap();
        assert_eq!(tool.id, id);
        assert_eq!(tool.estado, ToolStatus::Disponible);

        assert!(get_tool_by_code(&db, "HER-999").unwrap().is_none());
    }

    #[test]
    fn maintenance_alerts_window_is_seven_days_ascending() {
        let db = make_test_db();
        let now = now_millis();
        let day = 24 * 60 * 60 * 1000;

        for (code, offset) in [("HER-001", 6 * day), ("HER-002", 2 * day), ("HER-003", 30 * day)]
        {
            let mut form = tool_form("Equipo", code);
            form.next_maintenance_date = Some(now + offset);
            add_tool(&db, &form).unwrap();
        }
        // no date at all: never alerts
        add_tool(&db, &tool_form("Pala", "HER-004")).unwrap();

        let alerts = get_maintenance_alerts(&db, now).unwrap();
        let codes: Vec<_> = alerts.iter().map(|t| t.codigo.as_str()).collect();
        assert_eq!(codes, vec!["HER-002", "HER-001"]);
    }

    #[test]
    fn update_missing_tool_is_not_found() {
        let db = make_test_db();
        let result = db.with_conn(|conn| update_tool_status_conn(conn, 42, ToolStatus::EnUso));
        assert!(matches!(result, Err(ServerError::NotFound)));
    }
}
