use crate::db::materiales;
use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::utils::{
    body_string, get, init_test_db, location, login_session, post_form,
};

fn crear_material(db: &crate::db::Database, session: &str, inicial: &str) -> (i64, String) {
    let body = format!(
        "nombre=Cemento+Gris&codigo=MAT-001&categoria=Aglomerantes\
         &unidad=saco&cantidad_minima=10&cantidad_inicial={inicial}"
    );
    let resp = handle(post_form("/materiales/nuevo", &body, session), db).unwrap();
    assert_eq!(resp.status(), 303);
    let url = location(&resp);
    let id: i64 = url.rsplit('/').next().unwrap().parse().unwrap();
    (id, url)
}

#[test]
fn creation_posts_the_initial_inventory_entry() {
    let db = init_test_db("mat_inicial");
    let session = login_session(&db, "ana@bodega.com");
    let (id, detail_url) = crear_material(&db, &session, "50");

    let material = materiales::get_material_by_id(&db, id).unwrap().unwrap();
    assert_eq!(material.cantidad_disponible, 50.0);

    let body = body_string(handle(get(&detail_url), &db).unwrap());
    assert!(body.contains("Inventario Inicial"));
}

#[test]
fn salida_posts_against_the_balance() {
    let db = init_test_db("mat_salida");
    let session = login_session(&db, "ana@bodega.com");
    let (id, detail_url) = crear_material(&db, &session, "50");

    let resp = handle(
        post_form(
            &format!("{detail_url}/movimiento"),
            "tipo=salida&cantidad=20&observaciones=Fundicion+losa",
            &session,
        ),
        &db,
    )
    .unwrap();
    assert_eq!(resp.status(), 303);

    let material = materiales::get_material_by_id(&db, id).unwrap().unwrap();
    assert_eq!(material.cantidad_disponible, 30.0);
}

#[test]
fn overdraw_is_rejected_and_balance_survives() {
    let db = init_test_db("mat_overdraw");
    let session = login_session(&db, "ana@bodega.com");
    let (id, detail_url) = crear_material(&db, &session, "30");

    let result = handle(
        post_form(
            &format!("{detail_url}/movimiento"),
            "tipo=salida&cantidad=40",
            &session,
        ),
        &db,
    );
    match result {
        Err(ServerError::InsufficientStock {
            disponible,
            solicitado,
        }) => {
            assert_eq!(disponible, 30.0);
            assert_eq!(solicitado, 40.0);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    let material = materiales::get_material_by_id(&db, id).unwrap().unwrap();
    assert_eq!(material.cantidad_disponible, 30.0);
}

#[test]
fn low_stock_is_flagged_on_the_list() {
    let db = init_test_db("mat_stock_bajo");
    let session = login_session(&db, "ana@bodega.com");
    // minimum is 10, so an initial 5 is already low
    crear_material(&db, &session, "5");

    let body = body_string(handle(get("/materiales"), &db).unwrap());
    assert!(body.contains("stock-bajo"));
}
