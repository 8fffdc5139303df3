// src/db/colaboradores.rs

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::connection::{now_millis, Database};
use crate::domain::estados::ColaboradorStatus;
use crate::domain::forms::ColaboradorForm;
use crate::errors::ServerError;

#[derive(Debug, Clone)]
pub struct Colaborador {
    pub id: i64,
    pub nombre: String,
    pub cedula: String,
    pub cargo: String,
    pub telefono: String,
    pub email: String,
    pub estado: ColaboradorStatus,
    pub foto_url: String,
    pub created_at: i64,
    pub updated_at: Option<i64>,
}

const COLUMNS: &str =
    "id, nombre, cedula, cargo, telefono, email, estado, foto_url, created_at, updated_at";

fn from_row(row: &Row) -> rusqlite::Result<Colaborador> {
    Ok(Colaborador {
        id: row.get(0)?,
        nombre: row.get(1)?,
        cedula: row.get(2)?,
        cargo: row.get(3)?,
        telefono: row.get(4)?,
        email: row.get(5)?,
        estado: row.get(6)?,
        foto_url: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

pub fn add_colaborador(db: &Database, form: &ColaboradorForm) -> Result<i64, ServerError> {
    db.with_conn(|conn| {
        conn.execute(
            "insert into colaboradores
               (nombre, cedula, cargo, telefono, email, estado, foto_url, created_at)
             values (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                form.nombre,
                form.cedula,
                form.cargo,
                form.telefono,
                form.email,
                form.estado,
                form.foto_url,
                now_millis(),
            ],
        )
        .map_err(|e| ServerError::DbError(format!("insert colaborador failed: {e}")))?;
        Ok(conn.last_insert_rowid())
    })
}

pub fn get_colaboradores(db: &Database) -> Result<Vec<Colaborador>, ServerError> {
    db.with_conn(|conn| {
        query(
            conn,
            &format!("select {COLUMNS} from colaboradores order by nombre asc"),
            params![],
        )
    })
}

pub fn get_colaboradores_activos(db: &Database) -> Result<Vec<Colaborador>, ServerError> {
    db.with_conn(|conn| {
        query(
            conn,
            &format!(
                "select {COLUMNS} from colaboradores where estado = ? order by nombre asc"
            ),
            params![ColaboradorStatus::Activo],
        )
    })
}

pub fn get_colaborador_by_id(db: &Database, id: i64) -> Result<Option<Colaborador>, ServerError> {
    db.with_conn(|conn| get_colaborador_by_id_conn(conn, id))
}

pub fn get_colaborador_by_id_conn(
    conn: &Connection,
    id: i64,
) -> Result<Option<Colaborador>, ServerError> {
    conn.query_row(
        &format!("select {COLUMNS} from colaboradores where id = ?"),
        params![id],
        from_row,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select colaborador failed: {e}")))
}

pub fn update_colaborador(
    db: &Database,
    id: i64,
    form: &ColaboradorForm,
) -> Result<(), ServerError> {
    db.with_conn(|conn| {
        let updated = conn
            .execute(
                "update colaboradores set
                   nombre = ?, cedula = ?, cargo = ?, telefono = ?, email = ?,
                   estado = ?, foto_url = ?, updated_at = ?
                 where id = ?",
                params![
                    form.nombre,
                    form.cedula,
                    form.cargo,
                    form.telefono,
                    form.email,
                    form.estado,
                    form.foto_url,
                    now_millis(),
                    id,
                ],
            )
            .map_err(|e| ServerError::DbError(format!("update colaborador failed: {e}")))?;
        if updated == 0 {
            return Err(ServerError::NotFound);
        }
        Ok(())
    })
}

pub fn delete_colaborador(db: &Database, id: i64) -> Result<(), ServerError> {
    db.with_conn(|conn| {
        conn.execute("delete from colaboradores where id = ?", params![id])
            .map_err(|e| ServerError::DbError(format!("delete colaborador failed: {e}")))?;
        Ok(())
    })
}

fn query(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<Colaborador>, ServerError> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{colaborador_form, make_test_db};

    #[test]
    fn activos_filter_excludes_inactive() {
        let db = make_test_db();
        add_colaborador(&db, &colaborador_form("Ana", "100")).unwrap();
        let mut inactivo = colaborador_form("Luis", "200");
        inactivo.estado = ColaboradorStatus::Inactivo;
        add_colaborador(&db, &inactivo).unwrap();

        let activos = get_colaboradores_activos(&db).unwrap();
        assert_eq!(activos.len(), 1);
        assert_eq!(activos[0].nombre, "Ana");

        // full listing keeps everyone, sorted by name
        let todos = get_colaboradores(&db).unwrap();
        assert_eq!(todos.len(), 2);
        assert_eq!(todos[0].nombre, "Ana");
    }
}
