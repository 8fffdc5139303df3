use maud::{html, Markup};

use crate::templates::desktop_layout;

pub fn login_page() -> Markup {
    desktop_layout(
        "Ingresar",
        None,
        html! {
            main class="container" {
                h1 { "Ingresar" }
                form method="post" action="/login" class="card" {
                    label {
                        "Email"
                        input type="email" name="email" required placeholder="nombre@empresa.com";
                    }
                    button type="submit" { "Entrar" }
                }
            }
        },
    )
}
