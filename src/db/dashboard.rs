// src/db/dashboard.rs
//
// Read-only aggregation for the landing page: everything is loaded and
// reduced in memory, no caching, no incremental state.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::db::connection::{now_millis, Database};
use crate::db::herramientas::{self, Tool};
use crate::db::movimientos::{self, Movimiento};
use crate::domain::estados::ToolStatus;
use crate::errors::ServerError;

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total: usize,
    pub disponible: usize,
    pub en_uso: usize,
    pub mantenimiento: usize,
    pub baja: usize,
    pub by_category: BTreeMap<String, usize>,
}

pub struct Dashboard {
    pub stats: DashboardStats,
    pub recent_movements: Vec<Movimiento>,
    pub maintenance_alerts: Vec<Tool>,
}

pub fn get_dashboard(db: &Database) -> Result<Dashboard, ServerError> {
    let tools = herramientas::get_tools(db)?;
    let recent_movements = movimientos::get_movements(db, 5)?;
    let maintenance_alerts = herramientas::get_maintenance_alerts(db, now_millis())?;

    Ok(Dashboard {
        stats: compute_stats(&tools),
        recent_movements,
        maintenance_alerts,
    })
}

pub fn compute_stats(tools: &[Tool]) -> DashboardStats {
    let count = |estado: ToolStatus| tools.iter().filter(|t| t.estado == estado).count();

    let mut by_category = BTreeMap::new();
    for tool in tools {
        *by_category.entry(tool.categoria.clone()).or_insert(0) += 1;
    }

    DashboardStats {
        total: tools.len(),
        disponible: count(ToolStatus::Disponible),
        en_uso: count(ToolStatus::EnUso),
        mantenimiento: count(ToolStatus::Mantenimiento),
        baja: count(ToolStatus::Baja),
        by_category,
    }
}
