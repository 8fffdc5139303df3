use maud::{html, Markup};

use crate::auth::CurrentUser;
use crate::db::colaboradores::Colaborador;
use crate::db::prestamos::Prestamo;
use crate::templates::{desktop_layout, estado_badge, fmt_fecha};

pub fn list_page(colaboradores: &[Colaborador], user: Option<&CurrentUser>) -> Markup {
    desktop_layout(
        "Colaboradores",
        user,
        html! {
            main class="container" {
                h1 { "Colaboradores" }
                p { a href="/colaboradores/nuevo" class="button" { "Registrar colaborador" } }
                table {
                    thead {
                        tr { th { "Nombre" } th { "Cédula" } th { "Cargo" } th { "Estado" } }
                    }
                    tbody {
                        @for c in colaboradores {
                            tr {
                                td { a href={ "/colaboradores/" (c.id) } { (c.nombre) } }
                                td { (c.cedula) }
                                td { (c.cargo) }
                                td { (estado_badge(c.estado.as_str())) }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn form_page(colaborador: Option<&Colaborador>, user: Option<&CurrentUser>) -> Markup {
    let (title, action) = match colaborador {
        Some(c) => ("Editar colaborador", format!("/colaboradores/{}/editar", c.id)),
        None => ("Registrar colaborador", "/colaboradores/nuevo".to_string()),
    };

    desktop_layout(
        title,
        user,
        html! {
            main class="container" {
                h1 { (title) }
                form method="post" action=(action) class="card" {
                    label { "Nombre" input type="text" name="nombre" required
                        value=(colaborador.map(|c| c.nombre.as_str()).unwrap_or("")); }
                    label { "Cédula" input type="text" name="cedula" required
                        value=(colaborador.map(|c| c.cedula.as_str()).unwrap_or("")); }
                    label { "Cargo" input type="text" name="cargo" required
                        value=(colaborador.map(|c| c.cargo.as_str()).unwrap_or("")); }
                    label { "Teléfono" input type="tel" name="telefono"
                        value=(colaborador.map(|c| c.telefono.as_str()).unwrap_or("")); }
                    label { "Email" input type="email" name="email"
                        value=(colaborador.map(|c| c.email.as_str()).unwrap_or("")); }
                    label { "Estado"
                        select name="estado" {
                            @for estado in ["activo", "inactivo"] {
                                @if colaborador.map(|c| c.estado.as_str()) == Some(estado) {
                                    option value=(estado) selected { (estado) }
                                } @else {
                                    option value=(estado) { (estado) }
                                }
                            }
                        }
                    }
                    label { "Foto (URL)" input type="url" name="foto_url"
                        value=(colaborador.map(|c| c.foto_url.as_str()).unwrap_or("")); }
                    button type="submit" { "Guardar" }
                }
            }
        },
    )
}

pub fn detail_page(
    colaborador: &Colaborador,
    prestamos: &[Prestamo],
    user: Option<&CurrentUser>,
) -> Markup {
    desktop_layout(
        &colaborador.nombre,
        user,
        html! {
            main class="container" {
                h1 { (colaborador.nombre) }
                section class="card" {
                    p { "Cédula: " (colaborador.cedula) }
                    p { "Cargo: " (colaborador.cargo) }
                    p { "Estado: " (estado_badge(colaborador.estado.as_str())) }
                    @if !colaborador.telefono.is_empty() { p { "Teléfono: " (colaborador.telefono) } }
                    @if !colaborador.email.is_empty() { p { "Email: " (colaborador.email) } }
                    p { a href={ "/colaboradores/" (colaborador.id) "/editar" } { "Editar" } }
                }
                section class="card" {
                    h3 { "Préstamos" }
                    @if prestamos.is_empty() {
                        p { "Sin préstamos registrados." }
                    } @else {
                        ul {
                            @for p in prestamos {
                                li {
                                    a href={ "/prestamos/" (p.id) } {
                                        (fmt_fecha(p.fecha_salida)) " · " (p.obra_nombre)
                                        " · " (p.herramientas.len()) " herramienta(s)"
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
