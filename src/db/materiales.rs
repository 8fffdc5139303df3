// src/db/materiales.rs
//
// Material store plus the stock ledger. `cantidad_disponible` is a running
// balance owned by `registrar_movimiento`; no other code path writes it.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::connection::{now_millis, tx_err, Database};
use crate::db::{colaboradores, obras};
use crate::domain::estados::MovimientoTipo;
use crate::domain::forms::{MaterialForm, MovimientoForm};
use crate::errors::ServerError;

#[derive(Debug, Clone)]
pub struct Material {
    pub id: i64,
    pub nombre: String,
    pub codigo: String,
    pub categoria: String,
    pub unidad: String,
    pub cantidad_disponible: f64,
    pub cantidad_minima: f64,
    pub ubicacion: String,
    pub descripcion: String,
    pub precio_unitario: Option<f64>,
    pub created_at: i64,
    pub updated_at: Option<i64>,
}

impl Material {
    pub fn stock_bajo(&self) -> bool {
        self.cantidad_minima > 0.0 && self.cantidad_disponible <= self.cantidad_minima
    }
}

#[derive(Debug, Clone)]
pub struct MovimientoMaterial {
    pub id: i64,
    pub material_id: i64,
    pub material_nombre: String,
    pub tipo: MovimientoTipo,
    pub cantidad: f64,
    pub obra_id: Option<i64>,
    pub obra_nombre: Option<String>,
    pub colaborador_id: Option<i64>,
    pub colaborador_nombre: Option<String>,
    pub proveedor: Option<String>,
    pub factura: Option<String>,
    pub costo_total: Option<f64>,
    pub fecha: i64,
    pub usuario_id: String,
    pub observaciones: String,
}

/// One row of the per-obra consumption summary.
#[derive(Debug, Clone)]
pub struct ConsumoObra {
    pub material_id: i64,
    pub nombre: String,
    pub cantidad: f64,
    pub unidad: String,
}

const MATERIAL_COLUMNS: &str = "id, nombre, codigo, categoria, unidad, cantidad_disponible, \
     cantidad_minima, ubicacion, descripcion, precio_unitario, created_at, updated_at";

const MOVIMIENTO_COLUMNS: &str = "id, material_id, material_nombre, tipo, cantidad, obra_id, \
     obra_nombre, colaborador_id, colaborador_nombre, proveedor, factura, costo_total, fecha, \
     usuario_id, observaciones";

fn material_from_row(row: &Row) -> rusqlite::Result<Material> {
    Ok(Material {
        id: row.get(0)?,
        nombre: row.get(1)?,
        codigo: row.get(2)?,
        categoria: row.get(3)?,
        unidad: row.get(4)?,
        cantidad_disponible: row.get(5)?,
        cantidad_minima: row.get(6)?,
        ubicacion: row.get(7)?,
        descripcion: row.get(8)?,
        precio_unitario: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn movimiento_from_row(row: &Row) -> rusqlite::Result<MovimientoMaterial> {
    Ok(MovimientoMaterial {
        id: row.get(0)?,
        material_id: row.get(1)?,
        material_nombre: row.get(2)?,
        tipo: row.get(3)?,
        cantidad: row.get(4)?,
        obra_id: row.get(5)?,
        obra_nombre: row.get(6)?,
        colaborador_id: row.get(7)?,
        colaborador_nombre: row.get(8)?,
        proveedor: row.get(9)?,
        factura: row.get(10)?,
        costo_total: row.get(11)?,
        fecha: row.get(12)?,
        usuario_id: row.get(13)?,
        observaciones: row.get(14)?,
    })
}

/// Create the material and, when a starting quantity was given, post the
/// "Inventario Inicial" entrada right after. The two steps are separate
/// operations, not one transaction (see DESIGN.md).
pub fn add_material(
    db: &Database,
    form: &MaterialForm,
    usuario_id: &str,
) -> Result<i64, ServerError> {
    let id = db.with_conn(|conn| {
        conn.execute(
            "insert into materiales
               (nombre, codigo, categoria, unidad, cantidad_disponible, cantidad_minima,
                ubicacion, descripcion, precio_unitario, created_at)
             values (?, ?, ?, ?, 0, ?, ?, ?, ?, ?)",
            params![
                form.nombre,
                form.codigo,
                form.categoria,
                form.unidad,
                form.cantidad_minima,
                form.ubicacion,
                form.descripcion,
                form.precio_unitario,
                now_millis(),
            ],
        )
        .map_err(|e| ServerError::DbError(format!("insert material failed: {e}")))?;
        Ok(conn.last_insert_rowid())
    })?;

    if form.cantidad_inicial > 0.0 {
        let inicial = MovimientoForm {
            tipo: MovimientoTipo::Entrada,
            cantidad: form.cantidad_inicial,
            obra_id: None,
            colaborador_id: None,
            proveedor: None,
            factura: None,
            costo_total: None,
            observaciones: "Inventario Inicial".into(),
        };
        registrar_movimiento(db, id, &inicial, usuario_id)?;
    }

    Ok(id)
}

pub fn get_materials(db: &Database) -> Result<Vec<Material>, ServerError> {
    db.with_conn(|conn| {
        let mut stmt = conn
            .prepare(&format!(
                "select {MATERIAL_COLUMNS} from materiales order by nombre asc"
            ))
            .map_err(|e| ServerError::DbError(e.to_string()))?;
        let rows = stmt
            .query_map(params![], material_from_row)
            .map_err(|e| ServerError::DbError(e.to_string()))?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
        }
        Ok(out)
    })
}

pub fn get_material_by_id(db: &Database, id: i64) -> Result<Option<Material>, ServerError> {
    db.with_conn(|conn| get_material_by_id_conn(conn, id))
}

pub fn get_material_by_id_conn(
    conn: &Connection,
    id: i64,
) -> Result<Option<Material>, ServerError> {
    conn.query_row(
        &format!("select {MATERIAL_COLUMNS} from materiales where id = ?"),
        params![id],
        material_from_row,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select material failed: {e}")))
}

/// Descriptive edits only. The balance is owned by the ledger.
pub fn update_material(db: &Database, id: i64, form: &MaterialForm) -> Result<(), ServerError> {
    db.with_conn(|conn| {
        let updated = conn
            .execute(
                "update materiales set
                   nombre = ?, codigo = ?, categoria = ?, unidad = ?, cantidad_minima = ?,
                   ubicacion = ?, descripcion = ?, precio_unitario = ?, updated_at = ?
                 where id = ?",
                params![
                    form.nombre,
                    form.codigo,
                    form.categoria,
                    form.unidad,
                    form.cantidad_minima,
                    form.ubicacion,
                    form.descripcion,
                    form.precio_unitario,
                    now_millis(),
                    id,
                ],
            )
            .map_err(|e| ServerError::DbError(format!("update material failed: {e}")))?;
        if updated == 0 {
            return Err(ServerError::NotFound);
        }
        Ok(())
    })
}

/// Post one stock movement and update the balance in a single transaction.
///
/// The balance is read inside the transaction; a value fetched earlier in the
/// request must never be used here, or concurrent salidas would silently
/// corrupt stock. An overdraw aborts with `InsufficientStock` and writes
/// nothing.
pub fn registrar_movimiento(
    db: &Database,
    material_id: i64,
    mov: &MovimientoForm,
    usuario_id: &str,
) -> Result<(), ServerError> {
    if mov.cantidad <= 0.0 {
        return Err(ServerError::BadRequest(
            "la cantidad debe ser mayor a cero".into(),
        ));
    }

    db.with_conn(|conn| {
        let tx = conn.transaction().map_err(tx_err)?;

        let row: Option<(f64, String)> = tx
            .query_row(
                "select cantidad_disponible, nombre from materiales where id = ?",
                params![material_id],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()
            .map_err(|e| ServerError::DbError(format!("select balance failed: {e}")))?;

        let Some((actual, material_nombre)) = row else {
            return Err(ServerError::NotFound);
        };

        let nuevo = match mov.tipo {
            MovimientoTipo::Entrada => actual + mov.cantidad,
            MovimientoTipo::Salida => {
                if mov.cantidad > actual {
                    return Err(ServerError::InsufficientStock {
                        disponible: actual,
                        solicitado: mov.cantidad,
                    });
                }
                actual - mov.cantidad
            }
        };

        // Snapshot obra / colaborador names for the ledger entry.
        let obra_nombre = match mov.obra_id {
            Some(id) => Some(
                obras::get_obra_by_id_conn(&tx, id)?
                    .ok_or(ServerError::NotFound)?
                    .nombre,
            ),
            None => None,
        };
        let colaborador_nombre = match mov.colaborador_id {
            Some(id) => Some(
                colaboradores::get_colaborador_by_id_conn(&tx, id)?
                    .ok_or(ServerError::NotFound)?
                    .nombre,
            ),
            None => None,
        };

        let now = now_millis();
        tx.execute(
            "update materiales set cantidad_disponible = ?, updated_at = ? where id = ?",
            params![nuevo, now, material_id],
        )
        .map_err(|e| ServerError::DbError(format!("update balance failed: {e}")))?;

        tx.execute(
            "insert into movimientos_materiales
               (material_id, material_nombre, tipo, cantidad, obra_id, obra_nombre,
                colaborador_id, colaborador_nombre, proveedor, factura, costo_total,
                fecha, usuario_id, observaciones)
             values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                material_id,
                material_nombre,
                mov.tipo,
                mov.cantidad,
                mov.obra_id,
                obra_nombre,
                mov.colaborador_id,
                colaborador_nombre,
                mov.proveedor,
                mov.factura,
                mov.costo_total,
                now,
                usuario_id,
                mov.observaciones,
            ],
        )
        .map_err(|e| ServerError::DbError(format!("insert movimiento failed: {e}")))?;

        tx.commit().map_err(tx_err)
    })
}

pub fn get_material_movements(
    db: &Database,
    material_id: i64,
) -> Result<Vec<MovimientoMaterial>, ServerError> {
    db.with_conn(|conn| {
        query_movimientos(
            conn,
            &format!(
                "select {MOVIMIENTO_COLUMNS} from movimientos_materiales
                 where material_id = ? order by fecha desc, id desc limit 50"
            ),
            params![material_id],
        )
    })
}

pub fn get_all_movements(db: &Database, limit: i64) -> Result<Vec<MovimientoMaterial>, ServerError> {
    db.with_conn(|conn| {
        query_movimientos(
            conn,
            &format!(
                "select {MOVIMIENTO_COLUMNS} from movimientos_materiales
                 order by fecha desc, id desc limit ?"
            ),
            params![limit],
        )
    })
}

/// Salidas sent to one obra, aggregated per material with its unit.
pub fn get_materiales_por_obra(db: &Database, obra_id: i64) -> Result<Vec<ConsumoObra>, ServerError> {
    db.with_conn(|conn| {
        let mut stmt = conn
            .prepare(
                "select mm.material_id,
                        mm.material_nombre,
                        sum(mm.cantidad),
                        coalesce(m.unidad, 'unidad')
                 from movimientos_materiales mm
                 left join materiales m on m.id = mm.material_id
                 where mm.obra_id = ? and mm.tipo = ?
                 group by mm.material_id
                 order by mm.material_nombre asc",
            )
            .map_err(|e| ServerError::DbError(e.to_string()))?;
        let rows = stmt
            .query_map(params![obra_id, MovimientoTipo::Salida], |row| {
                Ok(ConsumoObra {
                    material_id: row.get(0)?,
                    nombre: row.get(1)?,
                    cantidad: row.get(2)?,
                    unidad: row.get(3)?,
                })
            })
            .map_err(|e| ServerError::DbError(e.to_string()))?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
        }
        Ok(out)
    })
}

fn query_movimientos(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<MovimientoMaterial>, ServerError> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| ServerError::DbError(e.to_string()))?;
    let rows = stmt
        .query_map(params, movimiento_from_row)
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
    use crate::db::test_support::{make_test_db, material_form, obra_form};

    fn salida(cantidad: f64, obra_id: Option<i64>) -> MovimientoForm {
        MovimientoForm {
            tipo: MovimientoTipo::Salida,
            cantidad,
            obra_id,
            colaborador_id: None,
            proveedor: None,
            factura: None,
            costo_total: None,
            observaciones: String::new(),
        }
    }

    fn entrada(cantidad: f64) -> MovimientoForm {
        MovimientoForm {
            tipo: MovimientoTipo::Entrada,
            cantidad,
            obra_id: None,
            colaborador_id: None,
            proveedor: None,
            factura: None,
            costo_total: None,
            observaciones: String::new(),
        }
    }

    #[test]
    fn creation_with_initial_stock_posts_entrada() {
        let db = make_test_db();
        let id = add_material(&db, &material_form("Cemento", "MAT-001", 25.0), "admin").unwrap();

        let material = get_material_by_id(&db, id).unwrap().unwrap();
        assert_eq!(material.cantidad_disponible, 25.0);

        let movs = get_material_movements(&db, id).unwrap();
        assert_eq!(movs.len(), 1);
        assert_eq!(movs[0].tipo, MovimientoTipo::Entrada);
        assert_eq!(movs[0].cantidad, 25.0);
        assert_eq!(movs[0].observaciones, "Inventario Inicial");
    }

    // Scenario from the stock ledger contract: 0 -> +50 -> -20 to a site
    // -> -40 must fail leaving the balance at 30.
    #[test]
    fn stock_scenario_in_out_overdraw() {
        let db = make_test_db();
        let obra_id = crate::db::obras::add_obra(&db, &obra_form("Torre", "OBR-001")).unwrap();
        let mat = add_material(&db, &material_form("Varilla", "MAT-001", 0.0), "admin").unwrap();

        let mut inicial = entrada(50.0);
        inicial.observaciones = "Initial stock".into();
        registrar_movimiento(&db, mat, &inicial, "admin").unwrap();
        assert_eq!(balance(&db, mat), 50.0);

        registrar_movimiento(&db, mat, &salida(20.0, Some(obra_id)), "admin").unwrap();
        assert_eq!(balance(&db, mat), 30.0);

        let err = registrar_movimiento(&db, mat, &salida(40.0, None), "admin").unwrap_err();
        assert!(matches!(
            err,
            ServerError::InsufficientStock {
                disponible,
                solicitado,
            } if disponible == 30.0 && solicitado == 40.0
        ));
        assert_eq!(balance(&db, mat), 30.0);

        // the failed salida left no ledger entry either
        let movs = get_material_movements(&db, mat).unwrap();
        assert_eq!(movs.len(), 2);
        let out = movs
            .iter()
            .find(|m| m.tipo == MovimientoTipo::Salida)
            .unwrap();
        assert_eq!(out.cantidad, 20.0);
        assert_eq!(out.obra_id, Some(obra_id));
        assert_eq!(out.obra_nombre.as_deref(), Some("Torre"));
    }

    // Ledger-consistency law: replaying every movement from zero reproduces
    // the stored balance.
    #[test]
    fn replaying_movements_reproduces_balance() {
        let db = make_test_db();
        let mat = add_material(&db, &material_form("Clavos", "MAT-002", 100.0), "admin").unwrap();
        registrar_movimiento(&db, mat, &salida(30.0, None), "admin").unwrap();
        registrar_movimiento(&db, mat, &entrada(12.5), "admin").unwrap();
        registrar_movimiento(&db, mat, &salida(2.5, None), "admin").unwrap();

        let replayed: f64 = get_material_movements(&db, mat)
            .unwrap()
            .iter()
            .map(|m| match m.tipo {
                MovimientoTipo::Entrada => m.cantidad,
                MovimientoTipo::Salida => -m.cantidad,
            })
            .sum();
        assert_eq!(replayed, balance(&db, mat));
        assert_eq!(replayed, 80.0);
    }

    #[test]
    fn movement_against_missing_material_is_not_found() {
        let db = make_test_db();
        assert!(matches!(
            registrar_movimiento(&db, 99, &entrada(1.0), "admin"),
            Err(ServerError::NotFound)
        ));
    }

    #[test]
    fn consumption_per_obra_aggregates_salidas_only() {
        let db = make_test_db();
        let obra_id = crate::db::obras::add_obra(&db, &obra_form("Torre", "OBR-001")).unwrap();
        let mat = add_material(&db, &material_form("Cemento", "MAT-001", 100.0), "admin").unwrap();

        registrar_movimiento(&db, mat, &salida(10.0, Some(obra_id)), "admin").unwrap();
        registrar_movimiento(&db, mat, &salida(5.0, Some(obra_id)), "admin").unwrap();
        // entrada with obra context must not count as consumption
        registrar_movimiento(&db, mat, &entrada(7.0), "admin").unwrap();

        let consumo = get_materiales_por_obra(&db, obra_id).unwrap();
        assert_eq!(consumo.len(), 1);
        assert_eq!(consumo[0].cantidad, 15.0);
        assert_eq!(consumo[0].unidad, "unidad");
    }

    #[test]
    fn update_material_never_touches_balance() {
        let db = make_test_db();
        let mat = add_material(&db, &material_form("Cemento", "MAT-001", 40.0), "admin").unwrap();

        let mut edit = material_form("Cemento Gris", "MAT-001", 999.0);
        edit.cantidad_minima = 5.0;
        update_material(&db, mat, &edit).unwrap();

        let material = get_material_by_id(&db, mat).unwrap().unwrap();
        assert_eq!(material.nombre, "Cemento Gris");
        assert_eq!(material.cantidad_disponible, 40.0);
    }

    fn balance(db: &Database, id: i64) -> f64 {
        get_material_by_id(db, id).unwrap().unwrap().cantidad_disponible
    }
}
