use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::utils::{
    body_string, get, init_test_db, location, login_session, post_form,
};

fn crear_herramienta(db: &crate::db::Database, session: &str, codigo: &str) -> String {
    let body = format!(
        "nombre=Taladro+Percutor&codigo={codigo}&categoria=Electrica\
         &estado=disponible&ubicacion=Bodega"
    );
    let resp = handle(post_form("/herramientas/nuevo", &body, session), db).unwrap();
    assert_eq!(resp.status(), 303);
    location(&resp)
}

#[test]
fn create_then_list_and_detail() {
    let db = init_test_db("her_create");
    let session = login_session(&db, "ana@bodega.com");

    let detail_url = crear_herramienta(&db, &session, "HER-001");

    let resp = handle(get("/herramientas"), &db).unwrap();
    let body = body_string(resp);
    assert!(body.contains("HER-001"));
    assert!(body.contains("Taladro Percutor"));

    let resp = handle(get(&detail_url), &db).unwrap();
    let body = body_string(resp);
    assert!(body.contains("Taladro Percutor"));
    assert!(body.contains("disponible"));
}

#[test]
fn nuevo_form_suggests_a_sequence_code() {
    let db = init_test_db("her_codigo_sugerido");

    let resp = handle(get("/herramientas/nuevo"), &db).unwrap();
    let body = body_string(resp);
    assert!(body.contains("HER-001"));

    // a second render consumes the counter, gaps are acceptable
    let resp = handle(get("/herramientas/nuevo"), &db).unwrap();
    let body = body_string(resp);
    assert!(body.contains("HER-002"));
}

#[test]
fn buscar_resolves_a_scanned_code() {
    let db = init_test_db("her_buscar");
    let session = login_session(&db, "ana@bodega.com");
    crear_herramienta(&db, &session, "HER-042");

    let resp = handle(get("/herramientas/buscar?codigo=HER-042"), &db).unwrap();
    let body = body_string(resp);
    assert!(body.contains("Taladro Percutor"));

    let resp = handle(get("/herramientas/buscar?codigo=HER-999"), &db).unwrap();
    let body = body_string(resp);
    assert!(body.contains("Ninguna herramienta"));
}

#[test]
fn scan_movement_updates_state_and_location() {
    let db = init_test_db("her_scan");
    let session = login_session(&db, "ana@bodega.com");
    let detail_url = crear_herramienta(&db, &session, "HER-001");

    let resp = handle(
        post_form(
            &format!("{detail_url}/movimiento"),
            "tipo=salida&responsable=Ana&destino=Torre+Norte",
            &session,
        ),
        &db,
    )
    .unwrap();
    assert_eq!(resp.status(), 303);

    let resp = handle(get(&detail_url), &db).unwrap();
    let body = body_string(resp);
    assert!(body.contains("en_uso"));
    assert!(body.contains("Torre Norte"));

    // entrada brings it back to the Bodega
    handle(
        post_form(
            &format!("{detail_url}/movimiento"),
            "tipo=entrada&responsable=Ana",
            &session,
        ),
        &db,
    )
    .unwrap();
    let body = body_string(handle(get(&detail_url), &db).unwrap());
    assert!(body.contains("disponible"));
}

#[test]
fn maintenance_record_shows_on_the_detail_page() {
    let db = init_test_db("her_mantenimiento");
    let session = login_session(&db, "ana@bodega.com");
    let detail_url = crear_herramienta(&db, &session, "HER-001");

    handle(
        post_form(
            &format!("{detail_url}/mantenimiento"),
            "tipo=preventivo&descripcion=Cambio+de+escobillas\
             &tecnico=Carlos&fecha=2026-08-20&next_maintenance_date=2026-11-20",
            &session,
        ),
        &db,
    )
    .unwrap();

    let body = body_string(handle(get(&detail_url), &db).unwrap());
    assert!(body.contains("Cambio de escobillas"));
    assert!(body.contains("2026-11-20"));
}

#[test]
fn missing_tool_detail_is_not_found() {
    let db = init_test_db("her_missing");
    assert!(matches!(
        handle(get("/herramientas/99"), &db),
        Err(ServerError::NotFound)
    ));
}
