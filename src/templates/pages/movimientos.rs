use maud::{html, Markup};

use crate::auth::CurrentUser;
use crate::db::herramientas::Tool;
use crate::db::materiales::MovimientoMaterial;
use crate::db::movimientos::Movimiento;
use crate::templates::{desktop_layout, estado_badge, fmt_fecha};

pub fn list_page(
    de_herramientas: &[Movimiento],
    de_materiales: &[MovimientoMaterial],
    user: Option<&CurrentUser>,
) -> Markup {
    desktop_layout(
        "Movimientos",
        user,
        html! {
            main class="container" {
                h1 { "Movimientos recientes" }

                section class="card" {
                    h3 { "Herramientas" }
                    @if de_herramientas.is_empty() {
                        p { "Sin movimientos de herramientas." }
                    } @else {
                        table {
                            thead {
                                tr {
                                    th { "Fecha" } th { "Herramienta" } th { "Tipo" }
                                    th { "Responsable" } th { "Destino" }
                                }
                            }
                            tbody {
                                @for m in de_herramientas {
                                    tr {
                                        td { (fmt_fecha(m.fecha)) }
                                        td { (m.tool_code) }
                                        td { (estado_badge(m.tipo.as_str())) }
                                        td { (m.responsable) }
                                        td { (m.destino) }
                                    }
                                }
                            }
                        }
                    }
                }

                section class="card" {
                    h3 { "Materiales" }
                    @if de_materiales.is_empty() {
                        p { "Sin movimientos de materiales." }
                    } @else {
                        table {
                            thead {
                                tr {
                                    th { "Fecha" } th { "Material" } th { "Tipo" }
                                    th { "Cantidad" } th { "Obra" }
                                }
                            }
                            tbody {
                                @for m in de_materiales {
                                    tr {
                                        td { (fmt_fecha(m.fecha)) }
                                        td { (m.material_nombre) }
                                        td { (estado_badge(m.tipo.as_str())) }
                                        td { (m.cantidad) }
                                        td { (m.obra_nombre.as_deref().unwrap_or("—")) }
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

/// Result page of the code lookup (the QR flow resolves decoded text here).
pub fn buscar_page(codigo: &str, tool: Option<&Tool>, user: Option<&CurrentUser>) -> Markup {
    desktop_layout(
        "Buscar herramienta",
        user,
        html! {
            main class="container" {
                h1 { "Búsqueda por código" }
                @match tool {
                    Some(t) => {
                        p {
                            "Código " strong { (codigo) } " corresponde a "
                            a href={ "/herramientas/" (t.id) } { (t.nombre) }
                            " " (estado_badge(t.estado.as_str()))
                        }
                    }
                    None => {
                        p { "Ninguna herramienta tiene el código " strong { (codigo) } "." }
                    }
                }
                p { a href="/herramientas" { "Volver al listado" } }
            }
        },
    )
}
