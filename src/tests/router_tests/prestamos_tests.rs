use crate::db::{herramientas, prestamos, Database};
use crate::domain::estados::{PrestamoStatus, ToolStatus};
use crate::router::handle;
use crate::tests::utils::{
    body_string, get, init_test_db, location, login_session, post_form,
};

struct Escenario {
    session: String,
    obra_id: i64,
    taladro_id: i64,
    martillo_id: i64,
}

fn montar(db: &Database) -> Escenario {
    let session = login_session(db, "ana@bodega.com");

    handle(
        post_form(
            "/colaboradores/nuevo",
            "nombre=Pedro+Rojas&cedula=1-1111-1111&cargo=Maestro+de+obras&estado=activo",
            &session,
        ),
        db,
    )
    .unwrap();

    let resp = handle(
        post_form(
            "/obras/nuevo",
            "nombre=Torre+Norte&codigo=OBR-001&ubicacion=San+Jose\
             &estado=activa&fecha_inicio=2026-01-15",
            &session,
        ),
        db,
    )
    .unwrap();
    let obra_id: i64 = location(&resp).rsplit('/').next().unwrap().parse().unwrap();

    let mut tool_ids = Vec::new();
    for (nombre, codigo) in [("Taladro", "HER-001"), ("Martillo", "HER-002")] {
        let body = format!(
            "nombre={nombre}&codigo={codigo}&categoria=Manual\
             &estado=disponible&ubicacion=Bodega"
        );
        let resp = handle(post_form("/herramientas/nuevo", &body, &session), db).unwrap();
        tool_ids.push(location(&resp).rsplit('/').next().unwrap().parse().unwrap());
    }

    Escenario {
        session,
        obra_id,
        taladro_id: tool_ids[0],
        martillo_id: tool_ids[1],
    }
}

fn registrar_salida(db: &Database, esc: &Escenario) -> (i64, String) {
    let body = format!(
        "colaborador_id=1&obra_id={}&tool_id={}&tool_id={}",
        esc.obra_id, esc.taladro_id, esc.martillo_id
    );
    let resp = handle(post_form("/prestamos/salida", &body, &esc.session), db).unwrap();
    assert_eq!(resp.status(), 303);
    let url = location(&resp);
    let id: i64 = url.rsplit('/').next().unwrap().parse().unwrap();
    (id, url)
}

#[test]
fn salida_creates_an_active_loan_and_flips_the_tools() {
    let db = init_test_db("pre_salida");
    let esc = montar(&db);
    let (prestamo_id, detail_url) = registrar_salida(&db, &esc);

    let prestamo = prestamos::get_prestamo_by_id(&db, prestamo_id)
        .unwrap()
        .unwrap();
    assert_eq!(prestamo.estado, PrestamoStatus::Activo);
    assert_eq!(prestamo.recibido_por, "ana@bodega.com");
    assert_eq!(prestamo.herramientas.len(), 2);

    let taladro = herramientas::get_tool_by_id(&db, esc.taladro_id)
        .unwrap()
        .unwrap();
    assert_eq!(taladro.estado, ToolStatus::EnUso);

    let body = body_string(handle(get(&detail_url), &db).unwrap());
    assert!(body.contains("Pedro Rojas"));
    assert!(body.contains("Torre Norte"));
    assert!(body.contains("HER-001"));
}

#[test]
fn partial_then_full_return_through_the_form() {
    let db = init_test_db("pre_devolucion");
    let esc = montar(&db);
    let (prestamo_id, detail_url) = registrar_salida(&db, &esc);

    // return the taladro damaged, the martillo stays out
    let body = format!(
        "devolver={id}&condicion_{id}=malo&observaciones_{id}=Mango+rajado",
        id = esc.taladro_id
    );
    handle(
        post_form(&format!("{detail_url}/devolucion"), &body, &esc.session),
        &db,
    )
    .unwrap();

    let prestamo = prestamos::get_prestamo_by_id(&db, prestamo_id)
        .unwrap()
        .unwrap();
    assert_eq!(prestamo.estado, PrestamoStatus::Parcial);
    let taladro = herramientas::get_tool_by_id(&db, esc.taladro_id)
        .unwrap()
        .unwrap();
    assert_eq!(taladro.estado, ToolStatus::Mantenimiento);

    // then the martillo comes back in good shape
    let body = format!(
        "devolver={id}&condicion_{id}=bueno",
        id = esc.martillo_id
    );
    handle(
        post_form(&format!("{detail_url}/devolucion"), &body, &esc.session),
        &db,
    )
    .unwrap();

    let prestamo = prestamos::get_prestamo_by_id(&db, prestamo_id)
        .unwrap()
        .unwrap();
    assert_eq!(prestamo.estado, PrestamoStatus::Devuelto);
    assert!(prestamo.fecha_devolucion.is_some());
    let martillo = herramientas::get_tool_by_id(&db, esc.martillo_id)
        .unwrap()
        .unwrap();
    assert_eq!(martillo.estado, ToolStatus::Disponible);
}

#[test]
fn continuation_opens_a_new_loan_at_the_new_site() {
    let db = init_test_db("pre_continuacion");
    let esc = montar(&db);
    let (prestamo_id, detail_url) = registrar_salida(&db, &esc);

    let resp = handle(
        post_form(
            "/obras/nuevo",
            "nombre=Plaza+Sur&codigo=OBR-002&ubicacion=Cartago\
             &estado=activa&fecha_inicio=2026-03-01",
            &esc.session,
        ),
        &db,
    )
    .unwrap();
    let nueva_obra: i64 = location(&resp).rsplit('/').next().unwrap().parse().unwrap();

    let body = format!(
        "devolver={id}&condicion_{id}=bueno&continua_en_obra=1&nueva_obra_id={nueva_obra}",
        id = esc.taladro_id
    );
    handle(
        post_form(&format!("{detail_url}/devolucion"), &body, &esc.session),
        &db,
    )
    .unwrap();

    // the original stays partial, a fresh active loan holds the martillo at
    // Plaza Sur
    let original = prestamos::get_prestamo_by_id(&db, prestamo_id)
        .unwrap()
        .unwrap();
    assert_eq!(original.estado, PrestamoStatus::Parcial);

    let activos = prestamos::get_prestamos_activos(&db).unwrap();
    assert_eq!(activos.len(), 1);
    let continuacion = &activos[0];
    assert_eq!(continuacion.obra_id, nueva_obra);
    assert_eq!(continuacion.herramientas.len(), 1);
    assert_eq!(continuacion.herramientas[0].tool_id, esc.martillo_id);
    assert!(continuacion
        .observaciones
        .contains(&format!("#{prestamo_id}")));
}

#[test]
fn salida_form_offers_only_available_tools() {
    let db = init_test_db("pre_disponibles");
    let esc = montar(&db);
    registrar_salida(&db, &esc);

    let body = body_string(handle(get("/prestamos/salida"), &db).unwrap());
    assert!(body.contains("No hay herramientas disponibles."));
}
