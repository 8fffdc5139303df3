// src/domain/forms.rs
//
// Single validated-construction step between the loose urlencoded form fields
// and the db layer. Every mutating route parses its body into one of these
// typed records first; the db functions never see raw strings.

use chrono::NaiveDate;

use crate::domain::estados::{
    ColaboradorStatus, CondicionDevolucion, MovimientoTipo, ObraStatus, ToolStatus,
};
use crate::errors::ServerError;

/// Decoded form body. Keeps every pair so repeated keys (checkbox groups,
/// per-line fields) stay addressable.
#[derive(Debug, Default)]
pub struct FormValues {
    pairs: Vec<(String, String)>,
}

impl FormValues {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    fn required(&self, key: &str) -> Result<String, ServerError> {
        match self.get(key).map(str::trim) {
            Some(v) if !v.is_empty() => Ok(v.to_string()),
            _ => Err(ServerError::BadRequest(format!("campo requerido: {key}"))),
        }
    }

    fn optional(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn optional_f64(&self, key: &str) -> Result<Option<f64>, ServerError> {
        match self.optional(key) {
            None => Ok(None),
            Some(v) => v
                .parse::<f64>()
                .map(Some)
                .map_err(|_| ServerError::BadRequest(format!("numero invalido: {key}"))),
        }
    }

    fn required_f64(&self, key: &str) -> Result<f64, ServerError> {
        self.optional_f64(key)?
            .ok_or_else(|| ServerError::BadRequest(format!("campo requerido: {key}")))
    }

    fn required_id(&self, key: &str) -> Result<i64, ServerError> {
        self.required(key)?
            .parse::<i64>()
            .map_err(|_| ServerError::BadRequest(format!("id invalido: {key}")))
    }

    /// Form date inputs arrive as YYYY-MM-DD; persisted as midnight-UTC millis.
    fn optional_date_millis(&self, key: &str) -> Result<Option<i64>, ServerError> {
        match self.optional(key) {
            None => Ok(None),
            Some(v) => {
                let date = NaiveDate::parse_from_str(&v, "%Y-%m-%d")
                    .map_err(|_| ServerError::BadRequest(format!("fecha invalida: {key}")))?;
                let dt = date
                    .and_hms_opt(0, 0, 0)
                    .ok_or_else(|| ServerError::BadRequest(format!("fecha invalida: {key}")))?;
                Ok(Some(dt.and_utc().timestamp_millis()))
            }
        }
    }

    fn required_date_millis(&self, key: &str) -> Result<i64, ServerError> {
        self.optional_date_millis(key)?
            .ok_or_else(|| ServerError::BadRequest(format!("campo requerido: {key}")))
    }
}

// ---------- entity forms ----------

#[derive(Debug)]
pub struct ToolForm {
    pub nombre: String,
    pub codigo: String,
    pub categoria: String,
    pub estado: ToolStatus,
    pub ubicacion: String,
    pub descripcion: String,
    pub imagen_url: String,
    pub next_maintenance_date: Option<i64>,
}

impl ToolForm {
    pub fn from_form(form: &FormValues) -> Result<Self, ServerError> {
        Ok(Self {
            nombre: form.required("nombre")?,
            codigo: form.required("codigo")?,
            categoria: form.required("categoria")?,
            estado: parse_estado(form, "estado", ToolStatus::parse)?,
            ubicacion: form.required("ubicacion")?,
            descripcion: form.optional("descripcion").unwrap_or_default(),
            imagen_url: form.optional("imagen_url").unwrap_or_default(),
            next_maintenance_date: form.optional_date_millis("next_maintenance_date")?,
        })
    }
}

#[derive(Debug)]
pub struct ColaboradorForm {
    pub nombre: String,
    pub cedula: String,
    pub cargo: String,
    pub telefono: String,
    pub email: String,
    pub estado: ColaboradorStatus,
    pub foto_url: String,
}

impl ColaboradorForm {
    pub fn from_form(form: &FormValues) -> Result<Self, ServerError> {
        Ok(Self {
            nombre: form.required("nombre")?,
            cedula: form.required("cedula")?,
            cargo: form.required("cargo")?,
            telefono: form.optional("telefono").unwrap_or_default(),
            email: form.optional("email").unwrap_or_default(),
            estado: parse_estado(form, "estado", ColaboradorStatus::parse)?,
            foto_url: form.optional("foto_url").unwrap_or_default(),
        })
    }
}

#[derive(Debug)]
pub struct ObraForm {
    pub nombre: String,
    pub codigo: String,
    pub cliente: String,
    pub ubicacion: String,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
    pub estado: ObraStatus,
    pub fecha_inicio: i64,
    pub fecha_fin: Option<i64>,
    pub descripcion: String,
}

impl ObraForm {
    pub fn from_form(form: &FormValues) -> Result<Self, ServerError> {
        Ok(Self {
            nombre: form.required("nombre")?,
            codigo: form.required("codigo")?,
            cliente: form.optional("cliente").unwrap_or_default(),
            ubicacion: form.required("ubicacion")?,
            latitud: form.optional_f64("latitud")?,
            longitud: form.optional_f64("longitud")?,
            estado: parse_estado(form, "estado", ObraStatus::parse)?,
            fecha_inicio: form.required_date_millis("fecha_inicio")?,
            fecha_fin: form.optional_date_millis("fecha_fin")?,
            descripcion: form.optional("descripcion").unwrap_or_default(),
        })
    }
}

#[derive(Debug)]
pub struct MaterialForm {
    pub nombre: String,
    pub codigo: String,
    pub categoria: String,
    pub unidad: String,
    pub cantidad_minima: f64,
    pub ubicacion: String,
    pub descripcion: String,
    pub precio_unitario: Option<f64>,
    /// Only read at creation; posted as the "Inventario Inicial" entrada.
    pub cantidad_inicial: f64,
}

impl MaterialForm {
    pub fn from_form(form: &FormValues) -> Result<Self, ServerError> {
        Ok(Self {
            nombre: form.required("nombre")?,
            codigo: form.required("codigo")?,
            categoria: form.required("categoria")?,
            unidad: form.required("unidad")?,
            cantidad_minima: form.optional_f64("cantidad_minima")?.unwrap_or(0.0),
            ubicacion: form.optional("ubicacion").unwrap_or_default(),
            descripcion: form.optional("descripcion").unwrap_or_default(),
            precio_unitario: form.optional_f64("precio_unitario")?,
            cantidad_inicial: form.optional_f64("cantidad_inicial")?.unwrap_or(0.0),
        })
    }
}

// ---------- ledger forms ----------

#[derive(Debug)]
pub struct MovimientoForm {
    pub tipo: MovimientoTipo,
    pub cantidad: f64,
    pub obra_id: Option<i64>,
    pub colaborador_id: Option<i64>,
    pub proveedor: Option<String>,
    pub factura: Option<String>,
    pub costo_total: Option<f64>,
    pub observaciones: String,
}

impl MovimientoForm {
    pub fn from_form(form: &FormValues) -> Result<Self, ServerError> {
        let cantidad = form.required_f64("cantidad")?;
        if cantidad <= 0.0 {
            return Err(ServerError::BadRequest(
                "la cantidad debe ser mayor a cero".into(),
            ));
        }
        Ok(Self {
            tipo: parse_estado(form, "tipo", MovimientoTipo::parse)?,
            cantidad,
            obra_id: form
                .optional("obra_id")
                .map(|v| {
                    v.parse::<i64>()
                        .map_err(|_| ServerError::BadRequest("id invalido: obra_id".into()))
                })
                .transpose()?,
            colaborador_id: form
                .optional("colaborador_id")
                .map(|v| {
                    v.parse::<i64>()
                        .map_err(|_| ServerError::BadRequest("id invalido: colaborador_id".into()))
                })
                .transpose()?,
            proveedor: form.optional("proveedor"),
            factura: form.optional("factura"),
            costo_total: form.optional_f64("costo_total")?,
            observaciones: form.optional("observaciones").unwrap_or_default(),
        })
    }
}

/// Tool scan movement (the QR gate flow on the tool detail page).
#[derive(Debug)]
pub struct ScanForm {
    pub tipo: MovimientoTipo,
    pub responsable: String,
    pub destino: String,
}

impl ScanForm {
    pub fn from_form(form: &FormValues) -> Result<Self, ServerError> {
        let tipo = parse_estado(form, "tipo", MovimientoTipo::parse)?;
        let destino = match tipo {
            MovimientoTipo::Salida => form.required("destino")?,
            MovimientoTipo::Entrada => form.optional("destino").unwrap_or_default(),
        };
        Ok(Self {
            tipo,
            responsable: form.required("responsable")?,
            destino,
        })
    }
}

#[derive(Debug)]
pub struct MantenimientoForm {
    pub tipo: String,
    pub descripcion: String,
    pub costo: Option<f64>,
    pub tecnico: String,
    pub fecha: i64,
    pub next_maintenance_date: Option<i64>,
}

impl MantenimientoForm {
    pub fn from_form(form: &FormValues) -> Result<Self, ServerError> {
        Ok(Self {
            tipo: form.required("tipo")?,
            descripcion: form.required("descripcion")?,
            costo: form.optional_f64("costo")?,
            tecnico: form.optional("tecnico").unwrap_or_default(),
            fecha: form.required_date_millis("fecha")?,
            next_maintenance_date: form.optional_date_millis("next_maintenance_date")?,
        })
    }
}

#[derive(Debug)]
pub struct SalidaForm {
    pub colaborador_id: i64,
    pub obra_id: i64,
    pub tool_ids: Vec<i64>,
    pub observaciones: String,
}

impl SalidaForm {
    pub fn from_form(form: &FormValues) -> Result<Self, ServerError> {
        let mut tool_ids = Vec::new();
        for raw in form.get_all("tool_id") {
            let id = raw
                .parse::<i64>()
                .map_err(|_| ServerError::BadRequest("id invalido: tool_id".into()))?;
            if !tool_ids.contains(&id) {
                tool_ids.push(id);
            }
        }
        if tool_ids.is_empty() {
            return Err(ServerError::BadRequest(
                "seleccione al menos una herramienta".into(),
            ));
        }
        Ok(Self {
            colaborador_id: form.required_id("colaborador_id")?,
            obra_id: form.required_id("obra_id")?,
            tool_ids,
            observaciones: form.optional("observaciones").unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct DevolucionLinea {
    pub tool_id: i64,
    pub condicion: CondicionDevolucion,
    pub observaciones: Option<String>,
}

#[derive(Debug)]
pub struct DevolucionForm {
    pub lineas: Vec<DevolucionLinea>,
    pub continua_en_obra: bool,
    pub nueva_obra_id: Option<i64>,
}

impl DevolucionForm {
    /// The return form posts one checkbox `devolver` per line plus per-line
    /// fields keyed by tool id (`condicion_<id>`, `observaciones_<id>`).
    pub fn from_form(form: &FormValues) -> Result<Self, ServerError> {
        let mut lineas = Vec::new();
        for raw in form.get_all("devolver") {
            let tool_id = raw
                .parse::<i64>()
                .map_err(|_| ServerError::BadRequest("id invalido: devolver".into()))?;
            let condicion = form
                .get(&format!("condicion_{tool_id}"))
                .and_then(CondicionDevolucion::parse)
                .unwrap_or(CondicionDevolucion::Bueno);
            let observaciones = form
                .optional(&format!("observaciones_{tool_id}"));
            lineas.push(DevolucionLinea {
                tool_id,
                condicion,
                observaciones,
            });
        }
        if lineas.is_empty() {
            return Err(ServerError::BadRequest(
                "seleccione al menos una herramienta a devolver".into(),
            ));
        }
        let continua_en_obra = form.get("continua_en_obra").is_some();
        Ok(Self {
            lineas,
            continua_en_obra,
            nueva_obra_id: form
                .optional("nueva_obra_id")
                .map(|v| {
                    v.parse::<i64>()
                        .map_err(|_| ServerError::BadRequest("id invalido: nueva_obra_id".into()))
                })
                .transpose()?,
        })
    }
}

fn parse_estado<T>(
    form: &FormValues,
    key: &str,
    parse: fn(&str) -> Option<T>,
) -> Result<T, ServerError> {
    let raw = form.required(key)?;
    parse(&raw).ok_or_else(|| ServerError::BadRequest(format!("valor invalido: {key}")))
}
