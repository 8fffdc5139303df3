use maud::{html, Markup};

use crate::auth::CurrentUser;
use crate::db::colaboradores::Colaborador;
use crate::db::herramientas::Tool;
use crate::db::obras::Obra;
use crate::db::prestamos::Prestamo;
use crate::templates::{desktop_layout, estado_badge, fmt_fecha};

pub fn list_page(prestamos: &[Prestamo], user: Option<&CurrentUser>) -> Markup {
    desktop_layout(
        "Préstamos",
        user,
        html! {
            main class="container" {
                h1 { "Préstamos" }
                p {
                    a href="/prestamos/salida" class="button" { "Registrar salida" }
                    " "
                    a href="/prestamos?filtro=pendientes" { "Solo pendientes" }
                    " · "
                    a href="/prestamos" { "Todos" }
                }
                table {
                    thead {
                        tr {
                            th { "Salida" } th { "Colaborador" } th { "Obra" }
                            th { "Herramientas" } th { "Estado" }
                        }
                    }
                    tbody {
                        @for p in prestamos {
                            tr {
                                td { a href={ "/prestamos/" (p.id) } { (fmt_fecha(p.fecha_salida)) } }
                                td { (p.colaborador_nombre) }
                                td { (p.obra_nombre) }
                                td {
                                    (p.herramientas.iter().filter(|h| !h.devuelto).count())
                                    " / " (p.herramientas.len()) " pendientes"
                                }
                                td { (estado_badge(p.estado.as_str())) }
                            }
                        }
                    }
                }
            }
        },
    )
}

/// Issue form: only tools currently `disponible` are offered, which is the
/// caller-side guard against double-lending.
pub fn salida_page(
    colaboradores: &[Colaborador],
    obras: &[Obra],
    disponibles: &[Tool],
    user: Option<&CurrentUser>,
) -> Markup {
    desktop_layout(
        "Registrar salida",
        user,
        html! {
            main class="container" {
                h1 { "Registrar salida de herramientas" }
                form method="post" action="/prestamos/salida" class="card" {
                    label { "Colaborador"
                        select name="colaborador_id" required {
                            @for c in colaboradores {
                                option value=(c.id) { (c.nombre) " (" (c.cedula) ")" }
                            }
                        }
                    }
                    label { "Obra"
                        select name="obra_id" required {
                            @for o in obras {
                                option value=(o.id) { (o.codigo) " · " (o.nombre) }
                            }
                        }
                    }
                    fieldset {
                        legend { "Herramientas disponibles" }
                        @if disponibles.is_empty() {
                            p { "No hay herramientas disponibles." }
                        }
                        @for t in disponibles {
                            label class="check" {
                                input type="checkbox" name="tool_id" value=(t.id);
                                (t.codigo) " · " (t.nombre)
                            }
                        }
                    }
                    label { "Observaciones" input type="text" name="observaciones"; }
                    button type="submit" { "Registrar salida" }
                }
            }
        },
    )
}

pub fn detail_page(prestamo: &Prestamo, obras: &[Obra], user: Option<&CurrentUser>) -> Markup {
    let pendientes: Vec<_> = prestamo.herramientas.iter().filter(|h| !h.devuelto).collect();

    desktop_layout(
        "Préstamo",
        user,
        html! {
            main class="container" {
                h1 { "Préstamo #" (prestamo.id) " " (estado_badge(prestamo.estado.as_str())) }
                section class="card" {
                    p { "Colaborador: " (prestamo.colaborador_nombre) }
                    p { "Obra: " (prestamo.obra_nombre) }
                    p { "Salida: " (fmt_fecha(prestamo.fecha_salida)) }
                    @if let Some(fecha) = prestamo.fecha_devolucion {
                        p { "Devolución completa: " (fmt_fecha(fecha)) }
                    }
                    p { "Recibido por: " (prestamo.recibido_por) }
                    @if !prestamo.observaciones.is_empty() { p { (prestamo.observaciones) } }
                }

                section class="card" {
                    h3 { "Herramientas" }
                    table {
                        thead {
                            tr { th { "Código" } th { "Nombre" } th { "Devuelta" } th { "Condición" } }
                        }
                        tbody {
                            @for h in &prestamo.herramientas {
                                tr {
                                    td { (h.tool_code) }
                                    td { (h.tool_nombre) }
                                    td {
                                        @match h.fecha_devolucion {
                                            Some(f) => (fmt_fecha(f)),
                                            None => "pendiente",
                                        }
                                    }
                                    td {
                                        @match &h.estado_devolucion {
                                            Some(c) => (estado_badge(c.as_str())),
                                            None => "—",
                                        }
                                    }
                                }
                            }
                        }
                    }
                }

                @if !pendientes.is_empty() {
                    section class="card" {
                        h3 { "Registrar devolución" }
                        form method="post" action={ "/prestamos/" (prestamo.id) "/devolucion" } {
                            @for h in &pendientes {
                                fieldset {
                                    label class="check" {
                                        input type="checkbox" name="devolver" value=(h.tool_id);
                                        (h.tool_code) " · " (h.tool_nombre)
                                    }
                                    label { "Condición"
                                        select name={ "condicion_" (h.tool_id) } {
                                            option value="bueno" { "Bueno" }
                                            option value="regular" { "Regular" }
                                            option value="malo" { "Malo" }
                                        }
                                    }
                                    label { "Observaciones"
                                        input type="text" name={ "observaciones_" (h.tool_id) };
                                    }
                                }
                            }
                            label class="check" {
                                input type="checkbox" name="continua_en_obra" value="1";
                                "Las herramientas no devueltas continúan en obra"
                            }
                            label { "Nueva obra (opcional)"
                                select name="nueva_obra_id" {
                                    option value="" { "Misma obra" }
                                    @for o in obras {
                                        option value=(o.id) { (o.codigo) " · " (o.nombre) }
                                    }
                                }
                            }
                            button type="submit" { "Registrar devolución" }
                        }
                    }
                }
            }
        },
    )
}
