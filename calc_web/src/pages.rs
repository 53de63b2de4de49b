//! Server-rendered HTML.
//!
//! Pages are assembled with `write!` into a `String`; every piece of
//! user-supplied or stored text goes through [`escape`].

use std::fmt::Write;

use calc_core::calculations::form::{FormState, PreparedForms, FORM_ID_FIELD};
use calc_core::calculations::{CalculationResult, CalculatorKind};
use calc_core::records::RecordFile;
use calc_core::shaft::editor::{HiddenField, TextField, FIELD_ATTRIBUTE};
use calc_core::shaft::table::SegmentField;
use calc_core::ShaftEditor;

use crate::shaft_form::{ShaftPageState, ShaftSlot};

/// Outcome of the optional "save this result" checkbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveNotice {
    Saved,
    Failed(String),
}

/// Escape text for element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap page content in the shared document shell and navigation.
pub fn layout(title: &str, body: &str) -> String {
    let mut html = String::new();
    let _ = writeln!(html, "<!DOCTYPE html>");
    let _ = writeln!(html, "<html lang=\"en\">");
    let _ = writeln!(html, "<head>");
    let _ = writeln!(html, "<meta charset=\"utf-8\">");
    let _ = writeln!(
        html,
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">"
    );
    let _ = writeln!(html, "<title>{} | Beltworks</title>", escape(title));
    let _ = writeln!(html, "<link rel=\"stylesheet\" href=\"/static/style.css\">");
    let _ = writeln!(html, "</head>");
    let _ = writeln!(html, "<body>");
    html.push_str(&nav());
    let _ = writeln!(html, "<main>");
    let _ = writeln!(html, "<h1>{}</h1>", escape(title));
    html.push_str(body);
    let _ = writeln!(html, "</main>");
    let _ = writeln!(html, "</body>");
    let _ = writeln!(html, "</html>");
    html
}

fn nav() -> String {
    let mut html = String::new();
    let _ = writeln!(html, "<nav class=\"site-nav\">");
    let _ = writeln!(html, "<a class=\"brand\" href=\"/\">Beltworks</a>");
    for kind in CalculatorKind::ALL {
        let _ = writeln!(
            html,
            "<a href=\"/calculator/{}\">{}</a>",
            kind.slug(),
            escape(kind.title())
        );
    }
    let _ = writeln!(html, "<a href=\"/shaft\">Shaft editor</a>");
    let _ = writeln!(html, "<a href=\"/saved-results\">Saved results</a>");
    let _ = writeln!(html, "</nav>");
    html
}

fn render_notice(notice: Option<&SaveNotice>) -> String {
    match notice {
        Some(SaveNotice::Saved) => {
            "<p class=\"notice success\">Result saved. <a href=\"/saved-results\">View saved results</a></p>\n"
                .to_string()
        }
        Some(SaveNotice::Failed(message)) => format!(
            "<p class=\"notice error\">Result could not be saved: {}</p>\n",
            escape(message)
        ),
        None => String::new(),
    }
}

fn render_result(result: &CalculationResult) -> String {
    let mut html = String::new();
    let _ = writeln!(html, "<section class=\"result\">");
    let _ = writeln!(html, "<h3>{}</h3>", escape(&result.title));
    let _ = writeln!(
        html,
        "<p class=\"result-value\">{} {}</p>",
        result.value,
        escape(&result.units)
    );
    let _ = writeln!(html, "<p>{}</p>", escape(&result.description));
    let _ = writeln!(html, "</section>");
    html
}

/// One calculator form. `action` is the URL it posts to.
fn render_form(state: &FormState, action: &str) -> String {
    let kind = state.kind();
    let mut html = String::new();

    let _ = writeln!(html, "<section class=\"calculator\" id=\"{}\">", kind.slug());
    let _ = writeln!(html, "<h2>{}</h2>", escape(kind.title()));
    let _ = writeln!(html, "<p class=\"summary\">{}</p>", escape(kind.summary()));
    let _ = writeln!(html, "<form method=\"post\" action=\"{}\">", escape(action));
    let _ = writeln!(
        html,
        "<input type=\"hidden\" name=\"{}\" value=\"{}\">",
        FORM_ID_FIELD,
        kind.slug()
    );

    if let FormState::Bound(form) = state {
        if let Some(message) = &form.form_error {
            let _ = writeln!(html, "<p class=\"form-error\">{}</p>", escape(message));
        }
    }

    for spec in kind.fields() {
        let id = format!("{}-{}", kind.slug(), spec.name);
        let _ = writeln!(html, "<div class=\"field\">");
        let _ = writeln!(html, "<label for=\"{}\">{}</label>", id, escape(spec.label));
        let _ = write!(
            html,
            "<input type=\"number\" step=\"any\" id=\"{}\" name=\"{}\" value=\"{}\"",
            id,
            spec.name,
            escape(&state.value(spec))
        );
        if let Some(min) = spec.min {
            let _ = write!(html, " min=\"{}\"", min);
        }
        if let Some(max) = spec.max {
            let _ = write!(html, " max=\"{}\"", max);
        }
        let _ = writeln!(html, " required>");
        let _ = writeln!(html, "<small class=\"help\">{}</small>", escape(spec.help));
        if let Some(error) = state.error(spec.name) {
            let _ = writeln!(html, "<p class=\"field-error\">{}</p>", escape(error));
        }
        let _ = writeln!(html, "</div>");
    }

    let _ = writeln!(
        html,
        "<label class=\"save\"><input type=\"checkbox\" name=\"save\" value=\"on\"> Save this result</label>"
    );
    let _ = writeln!(html, "<button type=\"submit\">Calculate</button>");
    let _ = writeln!(html, "</form>");

    if let FormState::Bound(form) = state {
        if let Some(result) = &form.result {
            html.push_str(&render_result(result));
        }
    }

    let _ = writeln!(html, "</section>");
    html
}

/// Landing page with every calculator.
pub fn home_page(prepared: &PreparedForms, notice: Option<&SaveNotice>) -> String {
    let mut body = String::new();
    let _ = writeln!(
        body,
        "<p class=\"lead\">Quick engineering checks for belt conveyor drives.</p>"
    );
    body.push_str(&render_notice(notice));
    for state in &prepared.forms {
        body.push_str(&render_form(state, "/"));
    }
    layout("Belt conveyor calculators", &body)
}

/// Page for a single calculator.
pub fn calculator_page(state: &FormState, notice: Option<&SaveNotice>) -> String {
    let kind = state.kind();
    let mut body = render_notice(notice);
    body.push_str(&render_form(state, &format!("/calculator/{}", kind.slug())));
    layout(kind.title(), &body)
}

fn render_editor(slot: &ShaftSlot, editor: &ShaftEditor<TextField>) -> String {
    let mut html = String::new();

    let _ = writeln!(html, "<section class=\"shaft\">");
    let _ = writeln!(html, "<h2>{}</h2>", escape(slot.title));
    let _ = writeln!(
        html,
        "<div class=\"shaft-editor\" id=\"{}\" {}=\"{}\">",
        slot.container_id, FIELD_ATTRIBUTE, slot.field_id
    );

    let _ = writeln!(html, "<table class=\"segments\">");
    let _ = writeln!(
        html,
        "<thead><tr><th>#</th><th>{}</th><th>{}</th><th></th></tr></thead>",
        SegmentField::Length.label(),
        SegmentField::Diameter.label()
    );
    let _ = writeln!(html, "<tbody>");
    for row in editor.rows() {
        let _ = writeln!(html, "<tr>");
        let _ = writeln!(html, "<td>{}</td>", row.number);
        for field in [SegmentField::Length, SegmentField::Diameter] {
            let _ = writeln!(
                html,
                "<td><input type=\"number\" step=\"any\" min=\"0\" name=\"{}\" value=\"{}\" aria-label=\"{} {}\"></td>",
                slot.input_name(field, row.number),
                row.value(field),
                field.label(),
                row.number
            );
        }
        let disabled = if row.removable { "" } else { " disabled" };
        let _ = writeln!(
            html,
            "<td><button type=\"submit\" name=\"action\" value=\"remove:{}:{}\"{}>Remove</button></td>",
            slot.field_id, row.number, disabled
        );
        let _ = writeln!(html, "</tr>");
    }
    let _ = writeln!(html, "</tbody>");
    let _ = writeln!(html, "</table>");

    let _ = writeln!(
        html,
        "<button type=\"submit\" name=\"action\" value=\"add:{}\">Add segment</button>",
        slot.field_id
    );
    let _ = writeln!(html, "<div class=\"shaft-preview\">");
    html.push_str(&editor.preview_svg());
    let _ = writeln!(html, "</div>");
    let _ = writeln!(
        html,
        "<p class=\"shaft-summary\">{}</p>",
        escape(&editor.summary_text())
    );
    let _ = writeln!(html, "</div>");
    let _ = writeln!(
        html,
        "<input type=\"hidden\" id=\"{0}\" name=\"{0}\" value=\"{1}\">",
        slot.field_id,
        escape(editor.field().value())
    );
    let _ = writeln!(html, "</section>");
    html
}

/// Shaft editor page.
pub fn shaft_page(page: &ShaftPageState) -> String {
    let mut body = String::new();
    let _ = writeln!(
        body,
        "<p class=\"lead\">Describe each shaft as cylindrical segments from left to right.</p>"
    );

    if page.submitted {
        let _ = writeln!(body, "<div class=\"notice success\">");
        let _ = writeln!(body, "<p>Geometry submitted.</p>");
        let _ = writeln!(body, "<ul>");
        for (slot, editor) in page.editors() {
            let _ = writeln!(
                body,
                "<li>{}: {} segments. {}</li>",
                escape(slot.title),
                editor.segments().len(),
                escape(&editor.summary_text())
            );
        }
        let _ = writeln!(body, "</ul>");
        let _ = writeln!(body, "</div>");
    }

    // Row edits are validated server-side; `min` on the inputs is only a hint,
    // so an out-of-range row must not block Remove or Add.
    let _ = writeln!(body, "<form method=\"post\" action=\"/shaft\" novalidate>");
    // First submit button in the form; Enter in a row input commits edits.
    let _ = writeln!(
        body,
        "<button type=\"submit\" name=\"action\" value=\"update\" class=\"default-action\" tabindex=\"-1\">Update</button>"
    );

    for (slot, editor) in page.editors() {
        body.push_str(&render_editor(slot, editor));
    }
    for (container_id, error) in &page.attached.failed {
        let _ = writeln!(
            body,
            "<p class=\"notice error\">Editor {} is unavailable: {}</p>",
            escape(container_id),
            escape(&error.to_string())
        );
    }

    let _ = writeln!(body, "<div class=\"actions\">");
    let _ = writeln!(
        body,
        "<button type=\"submit\" name=\"action\" value=\"update\">Update</button>"
    );
    let _ = writeln!(
        body,
        "<button type=\"submit\" name=\"action\" value=\"submit\">Submit geometry</button>"
    );
    let _ = writeln!(body, "</div>");
    let _ = writeln!(body, "</form>");

    layout("Shaft geometry", &body)
}

/// Saved calculation records, newest first.
pub fn saved_results_page(file: &RecordFile) -> String {
    let mut body = String::new();

    if file.is_empty() {
        let _ = writeln!(
            body,
            "<p>No saved results yet. Tick \"Save this result\" on a calculator to keep one.</p>"
        );
        return layout("Saved results", &body);
    }

    let _ = writeln!(body, "<table class=\"records\">");
    let _ = writeln!(
        body,
        "<thead><tr><th>Saved</th><th>Calculator</th><th>Result</th><th>Inputs</th></tr></thead>"
    );
    let _ = writeln!(body, "<tbody>");
    for record in &file.records {
        let _ = writeln!(body, "<tr>");
        let _ = writeln!(
            body,
            "<td>{}</td>",
            record.created_at.format("%Y-%m-%d %H:%M UTC")
        );
        let _ = writeln!(body, "<td>{}</td>", escape(record.calculator.title()));
        let _ = writeln!(
            body,
            "<td>{}: {} {}</td>",
            escape(&record.result.title),
            record.result.value,
            escape(&record.result.units)
        );
        let _ = writeln!(
            body,
            "<td><code>{}</code></td>",
            escape(&record.input_data.to_string())
        );
        let _ = writeln!(body, "</tr>");
    }
    let _ = writeln!(body, "</tbody>");
    let _ = writeln!(body, "</table>");

    layout("Saved results", &body)
}

/// Plain error page.
pub fn error_page(title: &str, message: &str) -> String {
    let body = format!("<p class=\"notice error\">{}</p>\n", escape(message));
    layout(title, &body)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use calc_core::calculations::form::prepare_forms;
    use calc_core::records::CalculationRecord;
    use serde_json::json;

    use super::*;
    use crate::shaft_form::initial_page;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_layout_has_navigation() {
        let html = layout("Test", "<p>body</p>");
        assert!(html.contains("<title>Test | Beltworks</title>"));
        assert!(html.contains("href=\"/calculator/belt_power\""));
        assert!(html.contains("href=\"/calculator/pulley_torque\""));
        assert!(html.contains("href=\"/calculator/belt_tension\""));
        assert!(html.contains("href=\"/shaft\""));
        assert!(html.contains("href=\"/saved-results\""));
    }

    #[test]
    fn test_home_page_unbound() {
        let html = home_page(&prepare_forms(None), None);
        assert!(html.contains("name=\"form_id\" value=\"belt_power\""));
        assert!(html.contains("name=\"wrap_angle\" value=\"180\""));
        assert!(!html.contains("class=\"result\""));
    }

    #[test]
    fn test_home_page_shows_errors_and_result() {
        let data: HashMap<String, String> = [
            ("form_id", "pulley_torque"),
            ("power", "15"),
            ("rotational_speed", "1450"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let html = home_page(&prepare_forms(Some(&data)), Some(&SaveNotice::Saved));
        assert!(html.contains("98.8 N·m"));
        assert!(html.contains("Result saved."));

        let mut bad = data.clone();
        bad.insert("power".into(), "<script>".into());
        let html = home_page(&prepare_forms(Some(&bad)), None);
        assert!(html.contains("Enter a number."));
        assert!(html.contains("value=\"&lt;script&gt;\""));
    }

    #[test]
    fn test_shaft_page_markup() {
        let html = shaft_page(&initial_page(&HashMap::new()));
        assert!(html.contains("data-shaft-field=\"drive_shaft\""));
        assert!(html.contains("name=\"drive_shaft.length.1\" value=\"150\""));
        assert!(html.contains("value=\"remove:tail_shaft:3\""));
        assert!(html.contains("<svg"));
        assert!(html.contains("Minimum diameter: 45.0 mm • Total length: 420.0 mm"));
        assert!(html.contains("name=\"drive_shaft\" value=\"[{"));
        assert!(html.contains("&quot;length_mm&quot;:150.0"));
    }

    #[test]
    fn test_shaft_form_skips_browser_validation() {
        let html = shaft_page(&initial_page(&HashMap::new()));
        assert!(html.contains("<form method=\"post\" action=\"/shaft\" novalidate>"));
        assert!(html.contains("min=\"0\" name=\"tail_shaft.diameter.2\""));
    }

    #[test]
    fn test_single_segment_cannot_be_removed() {
        let query: HashMap<String, String> = [(
            "drive_shaft".to_string(),
            r#"[{"length_mm":80,"diameter_mm":30}]"#.to_string(),
        )]
        .into_iter()
        .collect();
        let html = shaft_page(&initial_page(&query));
        assert!(html.contains("value=\"remove:drive_shaft:1\" disabled"));
    }

    #[test]
    fn test_saved_results_page() {
        assert!(saved_results_page(&RecordFile::new()).contains("No saved results yet"));

        let mut file = RecordFile::new();
        file.insert(
            CalculationRecord::new(
                CalculatorKind::PulleyTorque,
                json!({ "power": 15.0, "rotational_speed": 1450.0 }),
                CalculationResult::new("Pulley torque", "d", 98.8, "N·m"),
            ),
            10,
        );
        let html = saved_results_page(&file);
        assert!(html.contains("Pulley torque: 98.8 N·m"));
        assert!(html.contains("&quot;power&quot;:15.0"));
    }
}
