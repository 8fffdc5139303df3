use std::io::Read;

use astra::Request;
use url::form_urlencoded;

use crate::auth::sessions::{self, CurrentUser};
use crate::db::connection::now_millis;
use crate::db::mantenimientos::{self, NuevoMantenimiento};
use crate::db::{
    colaboradores, dashboard, herramientas, materiales, movimientos, obras, prestamos, sequences,
    Database,
};
use crate::domain::forms::{
    ColaboradorForm, DevolucionForm, FormValues, MantenimientoForm, MaterialForm, MovimientoForm,
    ObraForm, SalidaForm, ScanForm, ToolForm,
};
use crate::errors::ServerError;
use crate::responses::{
    css_response, html_response, json_response, redirect, redirect_with_cookie, ResultResp,
};
use crate::templates::pages;

pub fn handle(mut req: Request, db: &Database) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let user = current_user(&req, db)?;

    match (method.as_str(), segments.as_slice()) {
        // ----- dashboard -----
        ("GET", []) => {
            let dash = dashboard::get_dashboard(db)?;
            html_response(pages::dashboard::dashboard_page(&dash, user.as_ref()))
        }
        ("GET", ["static", "main.css"]) => css_response(include_str!("../static/main.css")),
        ("GET", ["api", "stats"]) => {
            let dash = dashboard::get_dashboard(db)?;
            let body = serde_json::to_string(&dash.stats)
                .map_err(|e| ServerError::DbError(format!("serialize stats failed: {e}")))?;
            json_response(body)
        }

        // ----- auth -----
        ("GET", ["login"]) => html_response(pages::login::login_page()),
        ("POST", ["login"]) => {
            let form = read_form(&mut req)?;
            let email = form
                .get("email")
                .ok_or_else(|| ServerError::BadRequest("campo requerido: email".into()))?
                .to_string();
            let token = db.with_conn(|conn| sessions::login(conn, &email))?;
            redirect_with_cookie(
                "/",
                &format!("session={token}; Path=/; HttpOnly; SameSite=Lax"),
            )
        }
        ("POST", ["logout"]) => {
            if let Some(token) = session_token(&req) {
                db.with_conn(|conn| sessions::revoke_session(conn, &token, now_millis()))?;
            }
            redirect_with_cookie("/", "session=; Path=/; Max-Age=0")
        }

        // ----- herramientas -----
        ("GET", ["herramientas"]) => {
            let tools = herramientas::get_tools(db)?;
            html_response(pages::herramientas::list_page(&tools, user.as_ref()))
        }
        ("GET", ["herramientas", "nuevo"]) => {
            let sugerido = sequences::next_code(db, "HER", "herramientas");
            html_response(pages::herramientas::form_page(None, &sugerido, user.as_ref()))
        }
        ("POST", ["herramientas", "nuevo"]) => {
            require_user(&user)?;
            let form = ToolForm::from_form(&read_form(&mut req)?)?;
            let id = herramientas::add_tool(db, &form)?;
            redirect(&format!("/herramientas/{id}"))
        }
        ("GET", ["herramientas", "buscar"]) => {
            let query = parse_query(&req);
            let codigo = query
                .get("codigo")
                .ok_or_else(|| ServerError::BadRequest("campo requerido: codigo".into()))?;
            let tool = herramientas::get_tool_by_code(db, codigo)?;
            html_response(pages::movimientos::buscar_page(
                codigo,
                tool.as_ref(),
                user.as_ref(),
            ))
        }
        ("GET", ["herramientas", id]) => {
            let id = parse_id(id)?;
            let tool = herramientas::get_tool_by_id(db, id)?.ok_or(ServerError::NotFound)?;
            let historial = prestamos::get_historial_herramienta(db, id)?;
            let mantenimientos = mantenimientos::get_maintenance_records(db, id)?;
            html_response(pages::herramientas::detail_page(
                &tool,
                &historial,
                &mantenimientos,
                user.as_ref(),
            ))
        }
        ("GET", ["herramientas", id, "editar"]) => {
            let id = parse_id(id)?;
            let tool = herramientas::get_tool_by_id(db, id)?.ok_or(ServerError::NotFound)?;
            html_response(pages::herramientas::form_page(Some(&tool), "", user.as_ref()))
        }
        ("POST", ["herramientas", id, "editar"]) => {
            require_user(&user)?;
            let id = parse_id(id)?;
            let form = ToolForm::from_form(&read_form(&mut req)?)?;
            herramientas::update_tool(db, id, &form)?;
            redirect(&format!("/herramientas/{id}"))
        }
        ("POST", ["herramientas", id, "eliminar"]) => {
            require_user(&user)?;
            herramientas::delete_tool(db, parse_id(id)?)?;
            redirect("/herramientas")
        }
        ("POST", ["herramientas", id, "movimiento"]) => {
            let usuario = require_user(&user)?;
            let id = parse_id(id)?;
            let form = ScanForm::from_form(&read_form(&mut req)?)?;
            movimientos::add_movement(
                db,
                id,
                form.tipo,
                &form.responsable,
                &form.destino,
                &usuario.email,
            )?;
            redirect(&format!("/herramientas/{id}"))
        }
        ("POST", ["herramientas", id, "mantenimiento"]) => {
            let usuario = require_user(&user)?;
            let id = parse_id(id)?;
            let form = MantenimientoForm::from_form(&read_form(&mut req)?)?;
            mantenimientos::add_maintenance_record(
                db,
                &NuevoMantenimiento {
                    tool_id: id,
                    tipo: form.tipo,
                    descripcion: form.descripcion,
                    costo: form.costo,
                    tecnico: form.tecnico,
                    fecha: form.fecha,
                    next_maintenance_date: form.next_maintenance_date,
                },
                &usuario.email,
            )?;
            redirect(&format!("/herramientas/{id}"))
        }

        // ----- colaboradores -----
        ("GET", ["colaboradores"]) => {
            let lista = colaboradores::get_colaboradores(db)?;
            html_response(pages::colaboradores::list_page(&lista, user.as_ref()))
        }
        ("GET", ["colaboradores", "nuevo"]) => {
            html_response(pages::colaboradores::form_page(None, user.as_ref()))
        }
        ("POST", ["colaboradores", "nuevo"]) => {
            require_user(&user)?;
            let form = ColaboradorForm::from_form(&read_form(&mut req)?)?;
            let id = colaboradores::add_colaborador(db, &form)?;
            redirect(&format!("/colaboradores/{id}"))
        }
        ("GET", ["colaboradores", id]) => {
            let id = parse_id(id)?;
            let colaborador =
                colaboradores::get_colaborador_by_id(db, id)?.ok_or(ServerError::NotFound)?;
            let historial = prestamos::get_prestamos_por_colaborador(db, id)?;
            html_response(pages::colaboradores::detail_page(
                &colaborador,
                &historial,
                user.as_ref(),
            ))
        }
        ("GET", ["colaboradores", id, "editar"]) => {
            let id = parse_id(id)?;
            let colaborador =
                colaboradores::get_colaborador_by_id(db, id)?.ok_or(ServerError::NotFound)?;
            html_response(pages::colaboradores::form_page(
                Some(&colaborador),
                user.as_ref(),
            ))
        }
        ("POST", ["colaboradores", id, "editar"]) => {
            require_user(&user)?;
            let id = parse_id(id)?;
            let form = ColaboradorForm::from_form(&read_form(&mut req)?)?;
            colaboradores::update_colaborador(db, id, &form)?;
            redirect(&format!("/colaboradores/{id}"))
        }
        ("POST", ["colaboradores", id, "eliminar"]) => {
            require_user(&user)?;
            colaboradores::delete_colaborador(db, parse_id(id)?)?;
            redirect("/colaboradores")
        }

        // ----- obras -----
        ("GET", ["obras"]) => {
            let lista = obras::get_obras(db)?;
            html_response(pages::obras::list_page(&lista, user.as_ref()))
        }
        ("GET", ["obras", "nuevo"]) => {
            let sugerido = sequences::next_code(db, "OBR", "obras");
            html_response(pages::obras::form_page(None, &sugerido, user.as_ref()))
        }
        ("POST", ["obras", "nuevo"]) => {
            require_user(&user)?;
            let form = ObraForm::from_form(&read_form(&mut req)?)?;
            let id = obras::add_obra(db, &form)?;
            redirect(&format!("/obras/{id}"))
        }
        ("GET", ["obras", id]) => {
            let id = parse_id(id)?;
            let obra = obras::get_obra_by_id(db, id)?.ok_or(ServerError::NotFound)?;
            let historial = prestamos::get_prestamos_por_obra(db, id)?;
            let consumo = materiales::get_materiales_por_obra(db, id)?;
            html_response(pages::obras::detail_page(
                &obra,
                &historial,
                &consumo,
                user.as_ref(),
            ))
        }
        ("GET", ["obras", id, "editar"]) => {
            let id = parse_id(id)?;
            let obra = obras::get_obra_by_id(db, id)?.ok_or(ServerError::NotFound)?;
            html_response(pages::obras::form_page(Some(&obra), "", user.as_ref()))
        }
        ("POST", ["obras", id, "editar"]) => {
            require_user(&user)?;
            let id = parse_id(id)?;
            let form = ObraForm::from_form(&read_form(&mut req)?)?;
            obras::update_obra(db, id, &form)?;
            redirect(&format!("/obras/{id}"))
        }
        ("POST", ["obras", id, "eliminar"]) => {
            require_user(&user)?;
            obras::delete_obra(db, parse_id(id)?)?;
            redirect("/obras")
        }

        // ----- materiales -----
        ("GET", ["materiales"]) => {
            let lista = materiales::get_materials(db)?;
            html_response(pages::materiales::list_page(&lista, user.as_ref()))
        }
        ("GET", ["materiales", "nuevo"]) => {
            html_response(pages::materiales::form_page(None, user.as_ref()))
        }
        ("POST", ["materiales", "nuevo"]) => {
            let usuario = require_user(&user)?;
            let form = MaterialForm::from_form(&read_form(&mut req)?)?;
            let id = materiales::add_material(db, &form, &usuario.email)?;
            redirect(&format!("/materiales/{id}"))
        }
        ("GET", ["materiales", id]) => {
            let id = parse_id(id)?;
            let material =
                materiales::get_material_by_id(db, id)?.ok_or(ServerError::NotFound)?;
            let movimientos = materiales::get_material_movements(db, id)?;
            let obras_activas = obras::get_obras_activas(db)?;
            html_response(pages::materiales::detail_page(
                &material,
                &movimientos,
                &obras_activas,
                user.as_ref(),
            ))
        }
        ("GET", ["materiales", id, "editar"]) => {
            let id = parse_id(id)?;
            let material =
                materiales::get_material_by_id(db, id)?.ok_or(ServerError::NotFound)?;
            html_response(pages::materiales::form_page(Some(&material), user.as_ref()))
        }
        ("POST", ["materiales", id, "editar"]) => {
            require_user(&user)?;
            let id = parse_id(id)?;
            let form = MaterialForm::from_form(&read_form(&mut req)?)?;
            materiales::update_material(db, id, &form)?;
            redirect(&format!("/materiales/{id}"))
        }
        ("POST", ["materiales", id, "movimiento"]) => {
            let usuario = require_user(&user)?;
            let id = parse_id(id)?;
            let form = MovimientoForm::from_form(&read_form(&mut req)?)?;
            materiales::registrar_movimiento(db, id, &form, &usuario.email)?;
            redirect(&format!("/materiales/{id}"))
        }

        // ----- prestamos -----
        ("GET", ["prestamos"]) => {
            let query = parse_query(&req);
            let lista = match query.get("filtro").map(String::as_str) {
                Some("pendientes") => prestamos::get_prestamos_pendientes(db)?,
                _ => prestamos::get_prestamos(db)?,
            };
            html_response(pages::prestamos::list_page(&lista, user.as_ref()))
        }
        ("GET", ["prestamos", "salida"]) => {
            let activos = colaboradores::get_colaboradores_activos(db)?;
            let obras_activas = obras::get_obras_activas(db)?;
            let disponibles = herramientas::get_tools_by_estado(
                db,
                crate::domain::estados::ToolStatus::Disponible,
            )?;
            html_response(pages::prestamos::salida_page(
                &activos,
                &obras_activas,
                &disponibles,
                user.as_ref(),
            ))
        }
        ("POST", ["prestamos", "salida"]) => {
            let usuario = require_user(&user)?;
            let form = SalidaForm::from_form(&read_form(&mut req)?)?;
            let id = prestamos::crear_prestamo_salida(db, &form, &usuario.email)?;
            redirect(&format!("/prestamos/{id}"))
        }
        ("GET", ["prestamos", id]) => {
            let id = parse_id(id)?;
            let prestamo = prestamos::get_prestamo_by_id(db, id)?.ok_or(ServerError::NotFound)?;
            let obras_activas = obras::get_obras_activas(db)?;
            html_response(pages::prestamos::detail_page(
                &prestamo,
                &obras_activas,
                user.as_ref(),
            ))
        }
        ("POST", ["prestamos", id, "devolucion"]) => {
            require_user(&user)?;
            let id = parse_id(id)?;
            let form = DevolucionForm::from_form(&read_form(&mut req)?)?;
            prestamos::devolver_herramientas(db, id, &form)?;
            redirect(&format!("/prestamos/{id}"))
        }

        // ----- movimientos -----
        ("GET", ["movimientos"]) => {
            let de_herramientas = movimientos::get_movements(db, 50)?;
            let de_materiales = materiales::get_all_movements(db, 50)?;
            html_response(pages::movimientos::list_page(
                &de_herramientas,
                &de_materiales,
                user.as_ref(),
            ))
        }

        _ => Err(ServerError::NotFound),
    }
}

fn parse_id(raw: &str) -> Result<i64, ServerError> {
    raw.parse::<i64>().map_err(|_| ServerError::NotFound)
}

/// Mutating routes need a session; GETs stay open.
fn require_user<'a>(user: &'a Option<CurrentUser>) -> Result<&'a CurrentUser, ServerError> {
    user.as_ref()
        .ok_or_else(|| ServerError::BadRequest("inicie sesión para continuar".into()))
}

fn current_user(req: &Request, db: &Database) -> Result<Option<CurrentUser>, ServerError> {
    let Some(token) = session_token(req) else {
        return Ok(None);
    };
    db.with_conn(|conn| sessions::load_user_from_session(conn, &token, now_millis()))
}

fn session_token(req: &Request) -> Option<String> {
    let cookies = req.headers().get("Cookie")?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == "session").then(|| value.to_string())
    })
}

fn parse_query(req: &Request) -> std::collections::HashMap<String, String> {
    let mut map = std::collections::HashMap::new();
    if let Some(q) = req.uri().query() {
        for (k, v) in form_urlencoded::parse(q.as_bytes()) {
            map.insert(k.into_owned(), v.into_owned());
        }
    }
    map
}

fn read_form(req: &mut Request) -> Result<FormValues, ServerError> {
    let mut buf = Vec::new();
    req.body_mut()
        .reader()
        .read_to_end(&mut buf)
        .map_err(|_| ServerError::BadRequest("cuerpo de la petición ilegible".into()))?;
    let pairs = form_urlencoded::parse(&buf)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    Ok(FormValues::from_pairs(pairs))
}
