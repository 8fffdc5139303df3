use maud::{html, Markup};

use crate::auth::CurrentUser;
use crate::db::dashboard::Dashboard;
use crate::templates::{desktop_layout, estado_badge, fmt_fecha, fmt_fecha_corta};

pub fn dashboard_page(dash: &Dashboard, user: Option<&CurrentUser>) -> Markup {
    desktop_layout(
        "Inicio",
        user,
        html! {
            main class="container" {
                h1 { "Panel de control" }

                section class="card" {
                    h3 { "Herramientas" }
                    ul class="stats" {
                        li { strong { (dash.stats.total) } " en total" }
                        li { strong { (dash.stats.disponible) } " disponibles" }
                        li { strong { (dash.stats.en_uso) } " en uso" }
                        li { strong { (dash.stats.mantenimiento) } " en mantenimiento" }
                        li { strong { (dash.stats.baja) } " dadas de baja" }
                    }
                    @if !dash.stats.by_category.is_empty() {
                        h4 { "Por categoría" }
                        ul {
                            @for (categoria, n) in &dash.stats.by_category {
                                li { (categoria) ": " (n) }
                            }
                        }
                    }
                }

                section class="card" {
                    h3 { "Alertas de mantenimiento (próximos 7 días)" }
                    @if dash.maintenance_alerts.is_empty() {
                        p { "Sin mantenimientos próximos." }
                    } @else {
                        ul {
                            @for tool in &dash.maintenance_alerts {
                                li {
                                    a href={ "/herramientas/" (tool.id) } { (tool.codigo) " · " (tool.nombre) }
                                    @if let Some(fecha) = tool.next_maintenance_date {
                                        " · " (fmt_fecha_corta(fecha))
                                    }
                                }
                            }
                        }
                    }
                }

                section class="card" {
                    h3 { "Movimientos recientes" }
                    @if dash.recent_movements.is_empty() {
                        p { "Sin movimientos registrados." }
                    } @else {
                        table {
                            thead {
                                tr { th { "Fecha" } th { "Herramienta" } th { "Tipo" } th { "Destino" } }
                            }
                            tbody {
                                @for mov in &dash.recent_movements {
                                    tr {
                                        td { (fmt_fecha(mov.fecha)) }
                                        td { (mov.tool_code) }
                                        td { (estado_badge(mov.tipo.as_str())) }
                                        td { (mov.destino) }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}
