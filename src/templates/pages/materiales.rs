use maud::{html, Markup};

use crate::auth::CurrentUser;
use crate::db::materiales::{Material, MovimientoMaterial};
use crate::db::obras::Obra;
use crate::templates::{desktop_layout, estado_badge, fmt_fecha};

pub fn list_page(materiales: &[Material], user: Option<&CurrentUser>) -> Markup {
    desktop_layout(
        "Materiales",
        user,
        html! {
            main class="container" {
                h1 { "Materiales" }
                p { a href="/materiales/nuevo" class="button" { "Registrar material" } }
                table {
                    thead {
                        tr {
                            th { "Código" } th { "Nombre" } th { "Categoría" }
                            th { "Disponible" } th { "Mínimo" }
                        }
                    }
                    tbody {
                        @for m in materiales {
                            tr class=(if m.stock_bajo() { "stock-bajo" } else { "" }) {
                                td { a href={ "/materiales/" (m.id) } { (m.codigo) } }
                                td { (m.nombre) }
                                td { (m.categoria) }
                                td { (m.cantidad_disponible) " " (m.unidad) }
                                td { (m.cantidad_minima) }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn form_page(material: Option<&Material>, user: Option<&CurrentUser>) -> Markup {
    let (title, action) = match material {
        Some(m) => ("Editar material", format!("/materiales/{}/editar", m.id)),
        None => ("Registrar material", "/materiales/nuevo".to_string()),
    };

    desktop_layout(
        title,
        user,
        html! {
            main class="container" {
                h1 { (title) }
                form method="post" action=(action) class="card" {
                    label { "Nombre" input type="text" name="nombre" required
                        value=(material.map(|m| m.nombre.as_str()).unwrap_or("")); }
                    label { "Código" input type="text" name="codigo" required
                        value=(material.map(|m| m.codigo.as_str()).unwrap_or("")); }
                    label { "Categoría" input type="text" name="categoria" required
                        value=(material.map(|m| m.categoria.as_str()).unwrap_or("")); }
                    label { "Unidad" input type="text" name="unidad" required
                        value=(material.map(|m| m.unidad.as_str()).unwrap_or("unidad")); }
                    @if material.is_none() {
                        // only at creation: becomes the "Inventario Inicial" entrada
                        label { "Cantidad inicial" input type="number" name="cantidad_inicial"
                            step="any" min="0" value="0"; }
                    }
                    label { "Cantidad mínima" input type="number" name="cantidad_minima"
                        step="any" min="0"
                        value=(material.map(|m| m.cantidad_minima.to_string()).unwrap_or_default()); }
                    label { "Ubicación" input type="text" name="ubicacion"
                        value=(material.map(|m| m.ubicacion.as_str()).unwrap_or("")); }
                    label { "Precio unitario" input type="number" name="precio_unitario"
                        step="any" min="0"
                        value=(material
                            .and_then(|m| m.precio_unitario)
                            .map(|v| v.to_string())
                            .unwrap_or_default()); }
                    label { "Descripción" textarea name="descripcion" {
                        (material.map(|m| m.descripcion.as_str()).unwrap_or(""))
                    } }
                    button type="submit" { "Guardar" }
                }
            }
        },
    )
}

pub fn detail_page(
    material: &Material,
    movimientos: &[MovimientoMaterial],
    obras: &[Obra],
    user: Option<&CurrentUser>,
) -> Markup {
    desktop_layout(
        &material.nombre,
        user,
        html! {
            main class="container" {
                h1 { (material.codigo) " · " (material.nombre) }
                section class="card" {
                    p {
                        "Disponible: " strong { (material.cantidad_disponible) " " (material.unidad) }
                        @if material.stock_bajo() { " " span class="badge badge-alerta" { "stock bajo" } }
                    }
                    p { "Mínimo: " (material.cantidad_minima) }
                    @if !material.ubicacion.is_empty() { p { "Ubicación: " (material.ubicacion) } }
                    p { a href={ "/materiales/" (material.id) "/editar" } { "Editar" } }
                }

                section class="card" {
                    h3 { "Registrar movimiento" }
                    form method="post" action={ "/materiales/" (material.id) "/movimiento" } {
                        label { "Tipo"
                            select name="tipo" {
                                option value="entrada" { "Entrada" }
                                option value="salida" { "Salida" }
                            }
                        }
                        label { "Cantidad" input type="number" name="cantidad"
                            step="any" min="0" required; }
                        label { "Obra destino (salidas)"
                            select name="obra_id" {
                                option value="" { "—" }
                                @for o in obras {
                                    option value=(o.id) { (o.codigo) " · " (o.nombre) }
                                }
                            }
                        }
                        label { "Proveedor (entradas)" input type="text" name="proveedor"; }
                        label { "Factura" input type="text" name="factura"; }
                        label { "Observaciones" input type="text" name="observaciones"; }
                        button type="submit" { "Registrar" }
                    }
                }

                section class="card" {
                    h3 { "Movimientos" }
                    @if movimientos.is_empty() {
                        p { "Sin movimientos registrados." }
                    } @else {
                        table {
                            thead {
                                tr {
                                    th { "Fecha" } th { "Tipo" } th { "Cantidad" }
                                    th { "Obra" } th { "Observaciones" }
                                }
                            }
                            tbody {
                                @for mov in movimientos {
                                    tr {
                                        td { (fmt_fecha(mov.fecha)) }
                                        td { (estado_badge(mov.tipo.as_str())) }
                                        td { (mov.cantidad) }
                                        td { (mov.obra_nombre.as_deref().unwrap_or("—")) }
                                        td { (mov.observaciones) }
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
