use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::utils::{
    body_string, get, get_with_session, init_test_db, post_form_anonymous,
};

#[test]
fn login_page_loads_successfully() {
    let db = init_test_db("auth_login_page");

    let resp = handle(get("/login"), &db).expect("Failed to handle request");
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("form"));
    assert!(body.contains("email"));
}

#[test]
fn login_sets_session_cookie_and_redirects() {
    let db = init_test_db("auth_login_post");

    let resp = handle(
        post_form_anonymous("/login", "email=ana%40bodega.com"),
        &db,
    )
    .expect("Failed to handle request");

    assert_eq!(resp.status(), 303);
    let cookie = resp
        .headers()
        .get("Set-Cookie")
        .expect("login should set a cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("session="));

    // the cookie authenticates subsequent requests
    let token = cookie
        .trim_start_matches("session=")
        .split(';')
        .next()
        .unwrap()
        .to_string();
    let resp = handle(get_with_session("/", &token), &db).unwrap();
    let body = body_string(resp);
    assert!(body.contains("ana@bodega.com"));
}

#[test]
fn login_rejects_garbage_email() {
    let db = init_test_db("auth_login_garbage");

    let result = handle(post_form_anonymous("/login", "email=no-arroba"), &db);
    assert!(matches!(result, Err(ServerError::BadRequest(_))));
}

#[test]
fn mutating_route_without_session_is_rejected() {
    let db = init_test_db("auth_guard");

    let body = "nombre=Taladro&codigo=HER-001&categoria=Electrica\
                &estado=disponible&ubicacion=Bodega";
    let result = handle(post_form_anonymous("/herramientas/nuevo", body), &db);
    assert!(matches!(result, Err(ServerError::BadRequest(_))));
}

#[test]
fn logout_revokes_the_session() {
    let db = init_test_db("auth_logout");
    let token = crate::tests::utils::login_session(&db, "ana@bodega.com");

    let resp = handle(
        crate::tests::utils::post_form("/logout", "", &token),
        &db,
    )
    .unwrap();
    assert_eq!(resp.status(), 303);

    // the old token no longer authenticates
    let resp = handle(get_with_session("/", &token), &db).unwrap();
    let body = body_string(resp);
    assert!(!body.contains("ana@bodega.com"));
}
