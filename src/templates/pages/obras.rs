use maud::{html, Markup};

use crate::auth::CurrentUser;
use crate::db::materiales::ConsumoObra;
use crate::db::obras::Obra;
use crate::db::prestamos::Prestamo;
use crate::templates::{desktop_layout, estado_badge, fmt_fecha, fmt_fecha_corta};

pub fn list_page(obras: &[Obra], user: Option<&CurrentUser>) -> Markup {
    desktop_layout(
        "Obras",
        user,
        html! {
            main class="container" {
                h1 { "Obras" }
                p { a href="/obras/nuevo" class="button" { "Registrar obra" } }
                table {
                    thead {
                        tr {
                            th { "Código" } th { "Nombre" } th { "Cliente" }
                            th { "Estado" } th { "Inicio" }
                        }
                    }
                    tbody {
                        @for o in obras {
                            tr {
                                td { a href={ "/obras/" (o.id) } { (o.codigo) } }
                                td { (o.nombre) }
                                td { (o.cliente) }
                                td { (estado_badge(o.estado.as_str())) }
                                td { (fmt_fecha_corta(o.fecha_inicio)) }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn form_page(obra: Option<&Obra>, codigo_sugerido: &str, user: Option<&CurrentUser>) -> Markup {
    let (title, action) = match obra {
        Some(o) => ("Editar obra", format!("/obras/{}/editar", o.id)),
        None => ("Registrar obra", "/obras/nuevo".to_string()),
    };
    let codigo = obra.map(|o| o.codigo.as_str()).unwrap_or(codigo_sugerido);

    desktop_layout(
        title,
        user,
        html! {
            main class="container" {
                h1 { (title) }
                form method="post" action=(action) class="card" {
                    label { "Nombre" input type="text" name="nombre" required
                        value=(obra.map(|o| o.nombre.as_str()).unwrap_or("")); }
                    label { "Código" input type="text" name="codigo" required value=(codigo); }
                    label { "Cliente" input type="text" name="cliente"
                        value=(obra.map(|o| o.cliente.as_str()).unwrap_or("")); }
                    label { "Ubicación" input type="text" name="ubicacion" required
                        value=(obra.map(|o| o.ubicacion.as_str()).unwrap_or("")); }
                    label { "Latitud" input type="text" name="latitud"
                        value=(obra.and_then(|o| o.latitud).map(|v| v.to_string()).unwrap_or_default()); }
                    label { "Longitud" input type="text" name="longitud"
                        value=(obra.and_then(|o| o.longitud).map(|v| v.to_string()).unwrap_or_default()); }
                    label { "Estado"
                        select name="estado" {
                            @for estado in ["activa", "pausada", "finalizada"] {
                                @if obra.map(|o| o.estado.as_str()) == Some(estado) {
                                    option value=(estado) selected { (estado) }
                                } @else {
                                    option value=(estado) { (estado) }
                                }
                            }
                        }
                    }
                    label { "Fecha de inicio" input type="date" name="fecha_inicio" required
                        value=(obra.map(|o| fmt_fecha_corta(o.fecha_inicio)).unwrap_or_default()); }
                    label { "Fecha de fin" input type="date" name="fecha_fin"
                        value=(obra.and_then(|o| o.fecha_fin).map(fmt_fecha_corta).unwrap_or_default()); }
                    label { "Descripción" textarea name="descripcion" {
                        (obra.map(|o| o.descripcion.as_str()).unwrap_or(""))
                    } }
                    button type="submit" { "Guardar" }
                }
            }
        },
    )
}

pub fn detail_page(
    obra: &Obra,
    prestamos: &[Prestamo],
    consumo: &[ConsumoObra],
    user: Option<&CurrentUser>,
) -> Markup {
    desktop_layout(
        &obra.nombre,
        user,
        html! {
            main class="container" {
                h1 { (obra.codigo) " · " (obra.nombre) }
                section class="card" {
                    p { "Estado: " (estado_badge(obra.estado.as_str())) }
                    p { "Ubicación: " (obra.ubicacion) }
                    @if !obra.cliente.is_empty() { p { "Cliente: " (obra.cliente) } }
                    @if let (Some(lat), Some(lon)) = (obra.latitud, obra.longitud) {
                        p { "Coordenadas: " (lat) ", " (lon) }
                    }
                    p { "Inicio: " (fmt_fecha_corta(obra.fecha_inicio)) }
                    @if let Some(fin) = obra.fecha_fin { p { "Fin: " (fmt_fecha_corta(fin)) } }
                    p { a href={ "/obras/" (obra.id) "/editar" } { "Editar" } }
                }
                section class="card" {
                    h3 { "Materiales enviados" }
                    @if consumo.is_empty() {
                        p { "Sin salidas de material hacia esta obra." }
                    } @else {
                        table {
                            thead { tr { th { "Material" } th { "Cantidad" } th { "Unidad" } } }
                            tbody {
                                @for c in consumo {
                                    tr { td { (c.nombre) } td { (c.cantidad) } td { (c.unidad) } }
                                }
                            }
                        }
                    }
                }
                section class="card" {
                    h3 { "Préstamos en esta obra" }
                    @if prestamos.is_empty() {
                        p { "Sin préstamos registrados." }
                    } @else {
                        ul {
                            @for p in prestamos {
                                li {
                                    a href={ "/prestamos/" (p.id) } {
                                        (fmt_fecha(p.fecha_salida)) " · " (p.colaborador_nombre)
                                    }
                                    " " (estado_badge(p.estado.as_str()))
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}
