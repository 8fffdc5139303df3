use maud::{html, Markup, DOCTYPE};

use crate::auth::CurrentUser;

pub fn desktop_layout(title: &str, user: Option<&CurrentUser>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="es" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " · Bodega" }
                link rel="stylesheet" href="/static/main.css";
            }
            body {
                header class="flex items-center justify-between px-6 py-3 shadow" {
                    h3 { a href="/" { "Bodega" } }
                    nav {
                        ul {
                            li { a href="/" { "Inicio" } }
                            li { a href="/herramientas" { "Herramientas" } }
                            li { a href="/materiales" { "Materiales" } }
                            li { a href="/prestamos" { "Préstamos" } }
                            li { a href="/colaboradores" { "Colaboradores" } }
                            li { a href="/obras" { "Obras" } }
                            li { a href="/movimientos" { "Movimientos" } }
                        }
                    }
                    @match user {
                        Some(u) => {
                            form method="post" action="/logout" class="inline" {
                                span { (u.email) " " }
                                button type="submit" { "Salir" }
                            }
                        }
                        None => {
                            a href="/login" class="text-base font-medium" { "Ingresar" }
                        }
                    }
                }
                (content)
            }
        }
    }
}
