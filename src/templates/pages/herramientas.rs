use maud::{html, Markup};

use crate::auth::CurrentUser;
use crate::db::herramientas::Tool;
use crate::db::mantenimientos::Mantenimiento;
use crate::db::prestamos::Prestamo;
use crate::templates::{desktop_layout, estado_badge, fmt_fecha, fmt_fecha_corta};

pub fn list_page(tools: &[Tool], user: Option<&CurrentUser>) -> Markup {
    desktop_layout(
        "Herramientas",
        user,
        html! {
            main class="container" {
                h1 { "Herramientas" }
                p {
                    a href="/herramientas/nuevo" class="button" { "Registrar herramienta" }
                }
                form method="get" action="/herramientas/buscar" class="inline" {
                    input type="text" name="codigo" placeholder="Código (QR)" required;
                    button type="submit" { "Buscar" }
                }
                table {
                    thead {
                        tr {
                            th { "Código" } th { "Nombre" } th { "Categoría" }
                            th { "Estado" } th { "Ubicación" }
                        }
                    }
                    tbody {
                        @for tool in tools {
                            tr {
                                td { a href={ "/herramientas/" (tool.id) } { (tool.codigo) } }
                                td { (tool.nombre) }
                                td { (tool.categoria) }
                                td { (estado_badge(tool.estado.as_str())) }
                                td { (tool.ubicacion) }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn form_page(
    tool: Option<&Tool>,
    codigo_sugerido: &str,
    user: Option<&CurrentUser>,
) -> Markup {
    let (title, action) = match tool {
        Some(t) => ("Editar herramienta", format!("/herramientas/{}/editar", t.id)),
        None => ("Registrar herramienta", "/herramientas/nuevo".to_string()),
    };
    let codigo = tool.map(|t| t.codigo.as_str()).unwrap_or(codigo_sugerido);

    desktop_layout(
        title,
        user,
        html! {
            main class="container" {
                h1 { (title) }
                form method="post" action=(action) class="card" {
                    label { "Nombre" input type="text" name="nombre" required
                        value=(tool.map(|t| t.nombre.as_str()).unwrap_or("")); }
                    label { "Código" input type="text" name="codigo" required value=(codigo); }
                    label { "Categoría" input type="text" name="categoria" required
                        value=(tool.map(|t| t.categoria.as_str()).unwrap_or("")); }
                    label { "Estado"
                        select name="estado" {
                            @for estado in ["disponible", "en_uso", "mantenimiento", "baja"] {
                                @if tool.map(|t| t.estado.as_str()) == Some(estado) {
                                    option value=(estado) selected { (estado) }
                                } @else {
                                    option value=(estado) { (estado) }
                                }
                            }
                        }
                    }
                    label { "Ubicación" input type="text" name="ubicacion" required
                        value=(tool.map(|t| t.ubicacion.as_str()).unwrap_or("Bodega")); }
                    label { "Descripción" textarea name="descripcion" {
                        (tool.map(|t| t.descripcion.as_str()).unwrap_or(""))
                    } }
                    label { "Imagen (URL)" input type="url" name="imagen_url"
                        value=(tool.map(|t| t.imagen_url.as_str()).unwrap_or("")); }
                    label { "Próximo mantenimiento"
                        input type="date" name="next_maintenance_date"
                            value=(tool
                                .and_then(|t| t.next_maintenance_date)
                                .map(fmt_fecha_corta)
                                .unwrap_or_default());
                    }
                    button type="submit" { "Guardar" }
                }
            }
        },
    )
}

pub fn detail_page(
    tool: &Tool,
    historial: &[Prestamo],
    mantenimientos: &[Mantenimiento],
    user: Option<&CurrentUser>,
) -> Markup {
    desktop_layout(
        &tool.nombre,
        user,
        html! {
            main class="container" {
                h1 { (tool.codigo) " · " (tool.nombre) }
                section class="card" {
                    p { "Estado: " (estado_badge(tool.estado.as_str())) }
                    p { "Categoría: " (tool.categoria) }
                    p { "Ubicación: " (tool.ubicacion) }
                    @if !tool.descripcion.is_empty() { p { (tool.descripcion) } }
                    @if let Some(fecha) = tool.next_maintenance_date {
                        p { "Próximo mantenimiento: " (fmt_fecha_corta(fecha)) }
                    }
                    p {
                        a href={ "/herramientas/" (tool.id) "/editar" } { "Editar" }
                    }
                    form method="post" action={ "/herramientas/" (tool.id) "/eliminar" } {
                        button type="submit" { "Eliminar" }
                    }
                }

                section class="card" {
                    h3 { "Registrar movimiento" }
                    form method="post" action={ "/herramientas/" (tool.id) "/movimiento" } {
                        label { "Tipo"
                            select name="tipo" {
                                option value="salida" { "Salida" }
                                option value="entrada" { "Entrada" }
                            }
                        }
                        label { "Responsable" input type="text" name="responsable" required; }
                        label { "Destino (salidas)" input type="text" name="destino"; }
                        button type="submit" { "Registrar" }
                    }
                }

                section class="card" {
                    h3 { "Historial de préstamos" }
                    @if historial.is_empty() {
                        p { "Nunca ha salido en préstamo." }
                    } @else {
                        ul {
                            @for p in historial {
                                li {
                                    a href={ "/prestamos/" (p.id) } {
                                        (fmt_fecha(p.fecha_salida)) " · " (p.obra_nombre)
                                        " · " (p.colaborador_nombre)
                                    }
                                    " " (estado_badge(p.estado.as_str()))
                                }
                            }
                        }
                    }
                }

                section class="card" {
                    h3 { "Mantenimientos" }
                    @if mantenimientos.is_empty() {
                        p { "Sin registros de mantenimiento." }
                    } @else {
                        ul {
                            @for m in mantenimientos {
                                li {
                                    (fmt_fecha_corta(m.fecha)) " · " (m.tipo) " · " (m.tecnico)
                                    ": " (m.descripcion)
                                }
                            }
                        }
                    }
                    form method="post" action={ "/herramientas/" (tool.id) "/mantenimiento" } {
                        label { "Tipo"
                            select name="tipo" {
                                option value="preventivo" { "Preventivo" }
                                option value="correctivo" { "Correctivo" }
                            }
                        }
                        label { "Descripción" input type="text" name="descripcion" required; }
                        label { "Costo" input type="number" name="costo" step="any" min="0"; }
                        label { "Técnico" input type="text" name="tecnico"; }
                        label { "Fecha" input type="date" name="fecha" required; }
                        label { "Próximo mantenimiento" input type="date" name="next_maintenance_date"; }
                        button type="submit" { "Registrar mantenimiento" }
                    }
                }
            }
        },
    )
}
