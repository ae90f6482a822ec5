//! Plain-text rendering of tables and dashboard figures.
//!
//! Timestamps are shown in whatever zone the caller passes; the binary
//! passes `Local`, tests pass `Utc`.

use chrono::{DateTime, TimeZone, Utc};
use labdash_core::import::ImportSummary;
use labdash_core::table::Page;
use labdash_core::{DashboardStatistics, LogRecord, MonthlyStatistic, Period, Session, User, Window};
use comfy_table::{presets, ContentArrangement, Table, TableComponent};
use std::fmt::{Display, Write};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DASH: &str = "-";

// ---------------------------------------------------------------------------
// Column layout
// ---------------------------------------------------------------------------

/// Borderless, left-aligned table: two spaces between columns and a dashed
/// rule under the header.
fn text_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_style(TableComponent::HeaderLines, '-')
        .set_style(TableComponent::VerticalLines, ' ')
        .set_style(TableComponent::MiddleHeaderIntersections, ' ')
        .set_header(headers.to_vec());
    table
}

/// Append `table` to `out`, one line per row, without trailing blanks.
fn write_table(out: &mut String, mut table: Table) {
    let last = table.column_count().saturating_sub(1);
    for (i, column) in table.column_iter_mut().enumerate() {
        column.set_padding((0, u16::from(i < last)));
    }
    for line in table.lines() {
        out.push_str(line.trim_end());
        out.push('\n');
    }
}

fn timestamp<Tz: TimeZone>(ts: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    ts.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string()
}

fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => DASH.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Users table. `total_users` is the size of the unfiltered list, which
/// picks the empty-state message.
pub fn users<Tz: TimeZone>(page: &Page<'_, &User>, total_users: usize, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    if total_users == 0 {
        return "No hay usuarios para mostrar.\n".to_string();
    }
    if page.total_items == 0 {
        return "No hay usuarios que coincidan con la búsqueda.\n".to_string();
    }

    let mut table = text_table(&[
        "ID",
        "Usuario",
        "Email",
        "Nombre",
        "Apellido Paterno",
        "Apellido Materno",
        "Estado",
        "Creado",
    ]);
    for user in page.items {
        table.add_row(vec![
            user.user_id.map_or_else(|| DASH.to_string(), |id| id.to_string()),
            user.user_name.clone(),
            or_dash(user.email.as_deref()),
            user.name.clone(),
            user.apellido_paterno.clone(),
            user.apellido_materno.clone(),
            if user.is_active { "Activo" } else { "Inactivo" }.to_string(),
            user.created_at.map_or_else(|| DASH.to_string(), |ts| timestamp(ts, tz)),
        ]);
    }

    let mut out = String::new();
    write_table(&mut out, table);
    let _ = writeln!(out, "Página {} de {}", page.page + 1, page.total_pages);
    out
}

pub fn user_line(user: &User) -> String {
    let status = if user.is_active { "Activo" } else { "Inactivo" };
    let id = user.user_id.map_or_else(|| DASH.to_string(), |id| id.to_string());
    format!("{} (ID {}): {}\n", user.user_name, id, status)
}

// ---------------------------------------------------------------------------
// Logs
// ---------------------------------------------------------------------------

pub fn logs<Tz: TimeZone>(page: &Page<'_, LogRecord>, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    if page.total_items == 0 {
        return "No hay registros disponibles.\n".to_string();
    }

    let mut table = text_table(&["Fecha", "Host", "IP", "Máquina", "Mensaje"]);
    for record in page.items {
        table.add_row(vec![
            timestamp(record.timestamp, tz),
            or_dash(record.host.as_deref()),
            or_dash(record.ip.as_deref()),
            or_dash(record.machine.as_deref()),
            or_dash(record.message.as_deref()),
        ]);
    }

    let mut out = String::new();
    write_table(&mut out, table);
    let _ = writeln!(
        out,
        "Página {} de {} • {} registros",
        page.page + 1,
        page.total_pages,
        page.total_items
    );
    out
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

pub struct DashboardView<'a> {
    pub period: Period,
    pub window: Window,
    pub stats: &'a DashboardStatistics,
    pub year: i32,
    pub years: &'a [i32],
    pub monthly: &'a [MonthlyStatistic],
}

pub fn dashboard<Tz: TimeZone>(view: &DashboardView<'_>, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Periodo: {} ({} a {})",
        view.period.label(),
        timestamp(view.window.start, tz),
        timestamp(view.window.end, tz)
    );
    let _ = writeln!(out, "Accesos totales: {}", view.stats.total_access);
    let _ = writeln!(out, "Máquinas: {}", view.stats.total_machines);
    let _ = writeln!(out, "Usuarios únicos: {}", view.stats.unique_users);
    out.push('\n');

    if view.stats.machine_stats.is_empty() {
        out.push_str("No hay accesos en este periodo.\n");
    } else {
        let mut table =
            text_table(&["Máquina", "Accesos", "Usuarios", "Último acceso", "IP", "Host"]);
        for machine in &view.stats.machine_stats {
            table.add_row(vec![
                machine.machine.clone(),
                machine.total_access.to_string(),
                machine.unique_users.len().to_string(),
                timestamp(machine.last_access, tz),
                or_dash(machine.ip.as_deref()),
                or_dash(machine.host.as_deref()),
            ]);
        }
        write_table(&mut out, table);
    }
    out.push('\n');

    let years: Vec<String> = view.years.iter().map(i32::to_string).collect();
    let _ = writeln!(
        out,
        "Accesos por mes ({}){}",
        view.year,
        if years.is_empty() { String::new() } else { format!(", años con datos: {}", years.join(", ")) }
    );
    let mut table = text_table(&["Mes", "Accesos", "Máquinas activas"]);
    for month in view.monthly {
        table.add_row(vec![
            month.month.clone(),
            month.accesses.to_string(),
            month.active_machines.to_string(),
        ]);
    }
    write_table(&mut out, table);
    out
}

// ---------------------------------------------------------------------------
// Misc
// ---------------------------------------------------------------------------

pub fn session(session: &Session) -> String {
    let role = if session.user.is_admin { "administrador" } else { "usuario" };
    let email = session
        .user
        .email
        .as_deref()
        .map(|e| format!(" <{e}>"))
        .unwrap_or_default();
    format!("{}{} ({})\n", session.user.username, email, role)
}

pub fn import_summary(summary: &ImportSummary, users_after: usize) -> String {
    format!("{summary}\nUsuarios registrados: {users_after}\n")
}
