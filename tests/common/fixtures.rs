//! Static API payloads and spreadsheet bodies used across harnesses.

use serde_json::{json, Value};

/// Rows as `GET /pginalog` returns them: mixed key casing, a null row, a
/// row without a machine and one without a timestamp.
pub fn pgina_rows() -> Value {
    json!([
        {"timeStamp": "2026-03-02T08:15:00Z", "host": "pc-a", "ip": "10.0.0.1", "machine": "LAB-01", "message": "login user=ana success"},
        {"TimeStamp": "2026-03-02T09:00:00Z", "Host": "pc-b", "Ip": "10.0.0.2", "Machine": "LAB-02", "Message": "login user=bob success"},
        null,
        {"timeStamp": "2026-03-03 10:30:00", "host": "pc-a", "ip": "10.0.0.1", "machine": "LAB-01", "message": "login user=bob success"},
        {"timeStamp": "2026-02-10T12:00:00Z", "host": "pc-c", "ip": "10.0.0.3", "machine": "", "message": "session start"},
        {"timeStamp": "2025-12-24T18:00:00Z", "host": "pc-a", "ip": "10.0.0.1", "machine": "LAB-01", "message": "USER: cy logged on"}
    ])
}

/// Rows as `GET /users` returns them: camelCase and snake_case mixed.
pub fn user_rows() -> Value {
    json!([
        {"userId": 1, "userName": "ana", "email": "ana@lab.mx", "name": "Ana", "apellidoPaterno": "López", "apellidoMaterno": "Ruiz", "isActive": true, "createdAt": "2026-01-05T10:00:00Z"},
        {"user_id": 2, "user_name": "bob", "email": null, "name": "Roberto", "apellido_paterno": "Soto", "apellido_materno": "Díaz", "is_active": false, "created_at": "2026-01-06T10:00:00Z"},
        {"userId": 3, "userName": "cy", "email": "cy@lab.mx", "name": "Cyntia", "apellidoPaterno": "Paz", "apellidoMaterno": "Gil"}
    ])
}

/// Header row with canonical field names, columns out of positional order.
pub const CSV_CANONICAL: &str = "\
email,userName,password,name,apellidoPaterno,apellidoMaterno
ana@lab.mx,ana,s3cret,Ana,López,Ruiz
,bob,hunter2,Roberto,Soto,Díaz
cy@lab.mx,,pw,Cyntia,Paz,Gil
";

/// Spanish headers the synonym table only partly recognizes. Resolved by
/// column position.
pub const CSV_SPANISH_POSITIONAL: &str = "\
Usuario,Clave,Correo,Nombre,A. Paterno,A. Materno
dora,pw1,dora@lab.mx,Dora,Vega,Luna
";

/// No header row at all. A first row holding text is taken for a header,
/// so only `fer` is importable.
pub const CSV_HEADERLESS: &str = "\
eva,1234,eva@lab.mx,Eva,Mora,Rey
fer,5678,,Fernando,Cano,Sol
";

/// Only a header row.
pub const CSV_HEADER_ONLY: &str = "userName,password,email,name,apellidoPaterno,apellidoMaterno\n";
