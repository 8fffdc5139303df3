// src/db/obras.rs

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::connection::{now_millis, Database};
use crate::domain::estados::ObraStatus;
use crate::domain::forms::ObraForm;
use crate::errors::ServerError;

#[derive(Debug, Clone)]
pub struct Obra {
    pub id: i64,
    pub nombre: String,
    pub codigo: String,
    pub cliente: String,
    pub ubicacion: String,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
    pub estado: ObraStatus,
    pub fecha_inicio: i64,
    pub fecha_fin: Option<i64>,
    pub descripcion: String,
    pub created_at: i64,
    pub updated_at: Option<i64>,
}

const COLUMNS: &str = "id, nombre, codigo, cliente, ubicacion, latitud, longitud, estado, \
     fecha_inicio, fecha_fin, descripcion, created_at, updated_at";

fn from_row(row: &Row) -> rusqlite::Result<Obra> {
    Ok(Obra {
        id: row.get(0)?,
        nombre: row.get(1)?,
        codigo: row.get(2)?,
        cliente: row.get(3)?,
        ubicacion: row.get(4)?,
        latitud: row.get(5)?,
        longitud: row.get(6)?,
        estado: row.get(7)?,
        fecha_inicio: row.get(8)?,
        fecha_fin: row.get(9)?,
        descripcion: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

pub fn add_obra(db: &Database, form: &ObraForm) -> Result<i64, ServerError> {
    db.with_conn(|conn| {
        conn.execute(
            "insert into obras
               (nombre, codigo, cliente, ubicacion, latitud, longitud, estado,
                fecha_inicio, fecha_fin, descripcion, created_at)
             values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                form.nombre,
                form.codigo,
                form.cliente,
                form.ubicacion,
                form.latitud,
                form.longitud,
                form.estado,
                form.fecha_inicio,
                form.fecha_fin,
                form.descripcion,
                now_millis(),
            ],
        )
        .map_err(|e| ServerError::DbError(format!("insert obra failed: {e}")))?;
        Ok(conn.last_insert_rowid())
    })
}

pub fn get_obras(db: &Database) -> Result<Vec<Obra>, ServerError> {
    db.with_conn(|conn| {
        query(
            conn,
            &format!("select {COLUMNS} from obras order by nombre asc"),
            params![],
        )
    })
}

pub fn get_obras_activas(db: &Database) -> Result<Vec<Obra>, ServerError> {
    db.with_conn(|conn| {
        query(
            conn,
            &format!("select {COLUMNS} from obras where estado = ? order by nombre asc"),
            params![ObraStatus::Activa],
        )
    })
}

pub fn get_obra_by_id(db: &Database, id: i64) -> Result<Option<Obra>, ServerError> {
    db.with_conn(|conn| get_obra_by_id_conn(conn, id))
}

pub fn get_obra_by_id_conn(conn: &Connection, id: i64) -> Result<Option<Obra>, ServerError> {
    conn.query_row(
        &format!("select {COLUMNS} from obras where id = ?"),
        params![id],
        from_row,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select obra failed: {e}")))
}

pub fn update_obra(db: &Database, id: i64, form: &ObraForm) -> Result<(), ServerError> {
    db.with_conn(|conn| {
        let updated = conn
            .execute(
                "update obras set
                   nombre = ?, codigo = ?, cliente = ?, ubicacion = ?, latitud = ?,
                   longitud = ?, estado = ?, fecha_inicio = ?, fecha_fin = ?,
                   descripcion = ?, updated_at = ?
                 where id = ?",
                params![
                    form.nombre,
                    form.codigo,
                    form.cliente,
                    form.ubicacion,
                    form.latitud,
                    form.longitud,
                    form.estado,
                    form.fecha_inicio,
                    form.fecha_fin,
                    form.descripcion,
                    now_millis(),
                    id,
                ],
            )
            .map_err(|e| ServerError::DbError(format!("update obra failed: {e}")))?;
        if updated == 0 {
            return Err(ServerError::NotFound);
        }
        Ok(())
    })
}

pub fn delete_obra(db: &Database, id: i64) -> Result<(), ServerError> {
    db.with_conn(|conn| {
        conn.execute("delete from obras where id = ?", params![id])
            .map_err(|e| ServerError::DbError(format!("delete obra failed: {e}")))?;
        Ok(())
    })
}

fn query(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<Obra>, ServerError> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| ServerError::DbError(e.to_string()))?;
    let rows = stmt
        .query_map(params, from_row)
        .map_err(|e| ServerError::DbError(e.to_string()))?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
    }
    Ok(out)
}
