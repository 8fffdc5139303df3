// src/db/prestamos.rs
//
// Chain-of-custody loans: one colaborador, one obra, several tool line items
// with individual return tracking. Issue and return are each one SQLite
// transaction; the loan estado is derived from its lines and written only
// here.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use crate::db::connection::{now_millis, tx_err, Database};
use crate::db::herramientas::{get_tool_by_id_conn, update_tool_status_conn};
use crate::db::{colaboradores, obras};
use crate::domain::estados::{CondicionDevolucion, PrestamoStatus, ToolStatus};
use crate::domain::forms::{DevolucionForm, SalidaForm};
use crate::domain::prestamo::derive_estado;
use crate::errors::ServerError;

#[derive(Debug, Clone, Serialize)]
pub struct Prestamo {
    pub id: i64,
    pub colaborador_id: i64,
    /// Snapshot of the colaborador's name at issue time, by design.
    pub colaborador_nombre: String,
    pub obra_id: i64,
    /// Snapshot of the obra's name at issue time, by design.
    pub obra_nombre: String,
    pub estado: PrestamoStatus,
    pub fecha_salida: i64,
    pub fecha_devolucion: Option<i64>,
    pub observaciones: String,
    pub recibido_por: String,
    pub created_at: i64,
    pub updated_at: Option<i64>,
    pub herramientas: Vec<PrestamoHerramienta>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrestamoHerramienta {
    pub tool_id: i64,
    pub tool_code: String,
    pub tool_nombre: String,
    pub devuelto: bool,
    pub fecha_devolucion: Option<i64>,
    pub estado_devolucion: Option<CondicionDevolucion>,
    pub observaciones_devolucion: Option<String>,
}

const PRESTAMO_COLUMNS: &str = "id, colaborador_id, colaborador_nombre, obra_id, obra_nombre, \
     estado, fecha_salida, fecha_devolucion, observaciones, recibido_por, created_at, updated_at";

fn header_from_row(row: &Row) -> rusqlite::Result<Prestamo> {
    Ok(Prestamo {
        id: row.get(0)?,
        colaborador_id: row.get(1)?,
        colaborador_nombre: row.get(2)?,
        obra_id: row.get(3)?,
        obra_nombre: row.get(4)?,
        estado: row.get(5)?,
        fecha_salida: row.get(6)?,
        fecha_devolucion: row.get(7)?,
        observaciones: row.get(8)?,
        recibido_por: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
        herramientas: Vec::new(),
    })
}

fn load_lines(conn: &Connection, prestamo_id: i64) -> Result<Vec<PrestamoHerramienta>, ServerError> {
    let mut stmt = conn
        .prepare(
            "select tool_id, tool_code, tool_nombre, devuelto, fecha_devolucion,
                    estado_devolucion, observaciones_devolucion
             from prestamo_herramientas
             where prestamo_id = ?
             order by posicion asc",
        )
        .map_err(|e| ServerError::DbError(e.to_string()))?;
    let rows = stmt
        .query_map(params![prestamo_id], |row| {
            Ok(PrestamoHerramienta {
                tool_id: row.get(0)?,
                tool_code: row.get(1)?,
                tool_nombre: row.get(2)?,
                devuelto: row.get::<_, i64>(3)? != 0,
                fecha_devolucion: row.get(4)?,
                estado_devolucion: row.get(5)?,
                observaciones_devolucion: row.get(6)?,
            })
        })
        .map_err(|e| ServerError::DbError(e.to_string()))?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
    }
    Ok(out)
}

/// Issue a loan: insert the header, its line items (all pending), and flip
/// every referenced tool to `en_uso`. All-or-nothing.
pub fn crear_prestamo_salida(
    db: &Database,
    form: &SalidaForm,
    recibido_por: &str,
) -> Result<i64, ServerError> {
    if form.tool_ids.is_empty() {
        return Err(ServerError::BadRequest(
            "seleccione al menos una herramienta".into(),
        ));
    }

    db.with_conn(|conn| {
        let tx = conn.transaction().map_err(tx_err)?;

        let colaborador = colaboradores::get_colaborador_by_id_conn(&tx, form.colaborador_id)?
            .ok_or(ServerError::NotFound)?;
        let obra = obras::get_obra_by_id_conn(&tx, form.obra_id)?.ok_or(ServerError::NotFound)?;

        let now = now_millis();
        tx.execute(
            "insert into prestamos
               (colaborador_id, colaborador_nombre, obra_id, obra_nombre, estado,
                fecha_salida, observaciones, recibido_por, created_at)
             values (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                form.colaborador_id,
                colaborador.nombre,
                form.obra_id,
                obra.nombre,
                PrestamoStatus::Activo,
                now,
                form.observaciones,
                recibido_por,
                now,
            ],
        )
        .map_err(|e| ServerError::DbError(format!("insert prestamo failed: {e}")))?;
        let prestamo_id = tx.last_insert_rowid();

        for (posicion, tool_id) in form.tool_ids.iter().enumerate() {
            let tool = get_tool_by_id_conn(&tx, *tool_id)?.ok_or(ServerError::NotFound)?;
            tx.execute(
                "insert into prestamo_herramientas
                   (prestamo_id, posicion, tool_id, tool_code, tool_nombre, devuelto)
                 values (?, ?, ?, ?, ?, 0)",
                params![prestamo_id, posicion as i64, tool.id, tool.codigo, tool.nombre],
            )
            .map_err(|e| ServerError::DbError(format!("insert linea prestamo failed: {e}")))?;

            update_tool_status_conn(&tx, tool.id, ToolStatus::EnUso)?;
        }

        tx.commit().map_err(tx_err)?;
        Ok(prestamo_id)
    })
}

/// Return some or all tools of a loan.
///
/// Lines already returned are left untouched (a repeated identical call
/// writes nothing), and a requested tool that is not on the loan is silently
/// ignored. When `continua_en_obra` is set and lines remain pending, a fresh
/// loan is created for exactly those lines at the new obra (or the original
/// one). Returned tools go to `mantenimiento` when the condition was `malo`,
/// otherwise back to `disponible`. One transaction for everything.
pub fn devolver_herramientas(
    db: &Database,
    prestamo_id: i64,
    form: &DevolucionForm,
) -> Result<(), ServerError> {
    db.with_conn(|conn| {
        let tx = conn.transaction().map_err(tx_err)?;

        let prestamo = tx
            .query_row(
                &format!("select {PRESTAMO_COLUMNS} from prestamos where id = ?"),
                params![prestamo_id],
                header_from_row,
            )
            .optional()
            .map_err(|e| ServerError::DbError(format!("select prestamo failed: {e}")))?
            .ok_or(ServerError::NotFound)?;

        let lineas = load_lines(&tx, prestamo_id)?;
        let now = now_millis();

        // Lines newly marked returned by this call. Already-returned lines
        // and tools that are not on the loan fall through.
        let mut nuevas: Vec<(&PrestamoHerramienta, CondicionDevolucion, Option<String>)> =
            Vec::new();
        for pedida in &form.lineas {
            if let Some(linea) = lineas
                .iter()
                .find(|l| l.tool_id == pedida.tool_id && !l.devuelto)
            {
                nuevas.push((linea, pedida.condicion, pedida.observaciones.clone()));
            }
        }

        if !nuevas.is_empty() {
            for (linea, condicion, observaciones) in &nuevas {
                tx.execute(
                    "update prestamo_herramientas
                     set devuelto = 1, fecha_devolucion = ?, estado_devolucion = ?,
                         observaciones_devolucion = ?
                     where prestamo_id = ? and tool_id = ? and devuelto = 0",
                    params![now, condicion, observaciones, prestamo_id, linea.tool_id],
                )
                .map_err(|e| ServerError::DbError(format!("update linea failed: {e}")))?;

                let nuevo_estado = match condicion {
                    CondicionDevolucion::Malo => ToolStatus::Mantenimiento,
                    _ => ToolStatus::Disponible,
                };
                update_tool_status_conn(&tx, linea.tool_id, nuevo_estado)?;
            }

            let flags: Vec<bool> = lineas
                .iter()
                .map(|l| l.devuelto || nuevas.iter().any(|(n, _, _)| n.tool_id == l.tool_id))
                .collect();
            let estado = derive_estado(&flags);
            let fecha_devolucion = match estado {
                PrestamoStatus::Devuelto => Some(now),
                _ => None,
            };
            tx.execute(
                "update prestamos set estado = ?, fecha_devolucion = ?, updated_at = ?
                 where id = ?",
                params![estado, fecha_devolucion, now, prestamo_id],
            )
            .map_err(|e| ServerError::DbError(format!("update prestamo failed: {e}")))?;
        }

        // Partial return continuing at another obra: the pending lines move
        // to a brand-new loan; the original keeps its identity and history.
        let pendientes: Vec<&PrestamoHerramienta> = lineas
            .iter()
            .filter(|l| !l.devuelto && !nuevas.iter().any(|(n, _, _)| n.tool_id == l.tool_id))
            .collect();

        if form.continua_en_obra && !pendientes.is_empty() {
            let (obra_id, obra_nombre) = match form.nueva_obra_id {
                Some(id) => {
                    let obra =
                        obras::get_obra_by_id_conn(&tx, id)?.ok_or(ServerError::NotFound)?;
                    (id, obra.nombre)
                }
                None => (prestamo.obra_id, prestamo.obra_nombre.clone()),
            };

            tx.execute(
                "insert into prestamos
                   (colaborador_id, colaborador_nombre, obra_id, obra_nombre, estado,
                    fecha_salida, observaciones, recibido_por, created_at)
                 values (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    prestamo.colaborador_id,
                    prestamo.colaborador_nombre,
                    obra_id,
                    obra_nombre,
                    PrestamoStatus::Activo,
                    now,
                    format!("Continúa de préstamo anterior #{prestamo_id}"),
                    prestamo.recibido_por,
                    now,
                ],
            )
            .map_err(|e| ServerError::DbError(format!("insert continuacion failed: {e}")))?;
            let nuevo_id = tx.last_insert_rowid();

            for (posicion, linea) in pendientes.iter().enumerate() {
                tx.execute(
                    "insert into prestamo_herramientas
                       (prestamo_id, posicion, tool_id, tool_code, tool_nombre, devuelto)
                     values (?, ?, ?, ?, ?, 0)",
                    params![
                        nuevo_id,
                        posicion as i64,
                        linea.tool_id,
                        linea.tool_code,
                        linea.tool_nombre
                    ],
                )
                .map_err(|e| ServerError::DbError(format!("insert linea continuacion failed: {e}")))?;
            }
        }

        tx.commit().map_err(tx_err)
    })
}

// ---------- queries ----------

pub fn get_prestamos(db: &Database) -> Result<Vec<Prestamo>, ServerError> {
    query_with_lines(
        db,
        &format!("select {PRESTAMO_COLUMNS} from prestamos order by fecha_salida desc, id desc"),
        params![],
    )
}

pub fn get_prestamos_activos(db: &Database) -> Result<Vec<Prestamo>, ServerError> {
    query_with_lines(
        db,
        &format!(
            "select {PRESTAMO_COLUMNS} from prestamos where estado = ?
             order by fecha_salida desc, id desc"
        ),
        params![PrestamoStatus::Activo],
    )
}

pub fn get_prestamos_pendientes(db: &Database) -> Result<Vec<Prestamo>, ServerError> {
    query_with_lines(
        db,
        &format!(
            "select {PRESTAMO_COLUMNS} from prestamos where estado in (?, ?)
             order by fecha_salida desc, id desc"
        ),
        params![PrestamoStatus::Activo, PrestamoStatus::Parcial],
    )
}

pub fn get_prestamos_por_colaborador(
    db: &Database,
    colaborador_id: i64,
) -> Result<Vec<Prestamo>, ServerError> {
    query_with_lines(
        db,
        &format!(
            "select {PRESTAMO_COLUMNS} from prestamos where colaborador_id = ?
             order by fecha_salida desc, id desc"
        ),
        params![colaborador_id],
    )
}

pub fn get_prestamos_por_obra(db: &Database, obra_id: i64) -> Result<Vec<Prestamo>, ServerError> {
    query_with_lines(
        db,
        &format!(
            "select {PRESTAMO_COLUMNS} from prestamos where obra_id = ?
             order by fecha_salida desc, id desc"
        ),
        params![obra_id],
    )
}

/// Every loan that ever carried this tool, newest first.
pub fn get_historial_herramienta(db: &Database, tool_id: i64) -> Result<Vec<Prestamo>, ServerError> {
    query_with_lines(
        db,
        &format!(
            "select {PRESTAMO_COLUMNS} from prestamos
             where id in (select prestamo_id from prestamo_herramientas where tool_id = ?)
             order by fecha_salida desc, id desc"
        ),
        params![tool_id],
    )
}

pub fn get_prestamo_by_id(db: &Database, id: i64) -> Result<Option<Prestamo>, ServerError> {
    db.with_conn(|conn| {
        let header = conn
            .query_row(
                &format!("select {PRESTAMO_COLUMNS} from prestamos where id = ?"),
                params![id],
                header_from_row,
            )
            .optional()
            .map_err(|e| ServerError::DbError(format!("select prestamo failed: {e}")))?;
        match header {
            None => Ok(None),
            Some(mut p) => {
                p.herramientas = load_lines(conn, p.id)?;
                Ok(Some(p))
            }
        }
    })
}

fn query_with_lines(
    db: &Database,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<Prestamo>, ServerError> {
    db.with_conn(|conn| {
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| ServerError::DbError(e.to_string()))?;
        let rows = stmt
            .query_map(params, header_from_row)
            .map_err(|e| ServerError::DbError(e.to_string()))?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
        }
        drop(stmt);
        for p in &mut out {
            p.herramientas = load_lines(conn, p.id)?;
        }
        Ok(out)
    })
}
