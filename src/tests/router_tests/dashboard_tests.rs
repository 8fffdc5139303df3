use crate::router::handle;
use crate::tests::utils::{body_string, get, init_test_db, login_session, post_form};

#[test]
fn dashboard_loads_with_empty_database() {
    let db = init_test_db("dash_empty");

    let resp = handle(get("/"), &db).unwrap();
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("Herramientas"));
    assert!(body.contains("0"));
}

#[test]
fn dashboard_counts_tools_by_estado() {
    let db = init_test_db("dash_counts");
    let session = login_session(&db, "ana@bodega.com");

    for (codigo, estado) in [
        ("HER-001", "disponible"),
        ("HER-002", "disponible"),
        ("HER-003", "mantenimiento"),
    ] {
        let body = format!(
            "nombre=Equipo&codigo={codigo}&categoria=Electrica\
             &estado={estado}&ubicacion=Bodega"
        );
        handle(post_form("/herramientas/nuevo", &body, &session), &db).unwrap();
    }

    let body = body_string(handle(get("/"), &db).unwrap());
    assert!(body.contains("disponible"));
    assert!(body.contains("mantenimiento"));
}

#[test]
fn stylesheet_is_served() {
    let db = init_test_db("dash_css");

    let resp = handle(get("/static/main.css"), &db).unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("Content-Type").unwrap(),
        "text/css; charset=utf-8"
    );

    let body = body_string(resp);
    assert!(body.contains(".badge-disponible"));
}

#[test]
fn stats_endpoint_returns_json() {
    let db = init_test_db("dash_json");
    let session = login_session(&db, "ana@bodega.com");

    let body = "nombre=Taladro&codigo=HER-001&categoria=Electrica\
                &estado=disponible&ubicacion=Bodega";
    handle(post_form("/herramientas/nuevo", body, &session), &db).unwrap();

    let resp = handle(get("/api/stats"), &db).unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("Content-Type").unwrap(),
        "application/json"
    );

    let json = body_string(resp);
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["total"], 1);
    assert_eq!(parsed["disponible"], 1);
    assert_eq!(parsed["by_category"]["Electrica"], 1);
}
