//! Server-side driving of the shaft editors.
//!
//! The shaft page is a plain HTML form. Every button press posts the whole
//! form: each editor's hidden geometry field, every row input, and the
//! pressed button's `action` value. A request is replayed onto freshly
//! attached editors in this order:
//!
//! 1. attach one editor per container, seeded from its posted hidden field
//! 2. commit every row input whose value differs from the row's pre-fill
//! 3. apply the pressed button (add, remove, update or submit)
//!
//! The page is then re-rendered from the editors' state.

use std::collections::HashMap;

use calc_core::shaft::editor::{attach_all, AttachedEditors, TextField};
use calc_core::shaft::table::{parse_field_value, SegmentField};
use calc_core::shaft::{EditorAction, EditorContainer, ShaftEditor};
use tracing::{debug, info, warn};

/// One editor hosted on the shaft page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaftSlot {
    pub container_id: &'static str,
    pub field_id: &'static str,
    pub title: &'static str,
}

pub const SHAFT_SLOTS: &[ShaftSlot] = &[
    ShaftSlot {
        container_id: "drive-shaft-editor",
        field_id: "drive_shaft",
        title: "Drive pulley shaft",
    },
    ShaftSlot {
        container_id: "tail-shaft-editor",
        field_id: "tail_shaft",
        title: "Tail pulley shaft",
    },
];

impl ShaftSlot {
    pub fn for_container(container_id: &str) -> Option<&'static ShaftSlot> {
        SHAFT_SLOTS.iter().find(|slot| slot.container_id == container_id)
    }

    pub fn container(&self) -> EditorContainer {
        EditorContainer::new(self.container_id, self.field_id)
    }

    /// Form name of a row input, e.g. `drive_shaft.length.2`
    pub fn input_name(&self, field: SegmentField, number: usize) -> String {
        format!("{}.{}.{}", self.field_id, field.name(), number)
    }
}

/// The button pressed on the shaft page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormCommand {
    /// Commit row edits only
    Update,
    /// Commit row edits and accept the geometry
    Submit,
    /// Append a segment to one editor
    Add { field_id: String },
    /// Remove a 1-based row from one editor
    Remove { field_id: String, number: usize },
}

impl FormCommand {
    /// Parse an `action` button value. Anything unrecognised is a plain update.
    pub fn parse(raw: Option<&str>) -> Self {
        let raw = raw.map(str::trim).unwrap_or("");
        let mut parts = raw.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("submit"), None, None) => FormCommand::Submit,
            (Some("add"), Some(field_id), None) if !field_id.is_empty() => FormCommand::Add {
                field_id: field_id.to_string(),
            },
            (Some("remove"), Some(field_id), Some(number)) => match number.parse() {
                Ok(number) if number > 0 => FormCommand::Remove {
                    field_id: field_id.to_string(),
                    number,
                },
                _ => FormCommand::Update,
            },
            _ => FormCommand::Update,
        }
    }

    /// The editor action this command performs on `field_id`'s editor, if any.
    fn action_for(&self, field_id: &str) -> Option<EditorAction> {
        match self {
            FormCommand::Add { field_id: target } if target == field_id => Some(EditorAction::Add),
            FormCommand::Remove {
                field_id: target,
                number,
            } if target == field_id => Some(EditorAction::Remove { index: number - 1 }),
            _ => None,
        }
    }
}

/// Editors for one rendering of the shaft page.
pub struct ShaftPageState {
    pub attached: AttachedEditors<TextField>,
    pub submitted: bool,
}

impl ShaftPageState {
    /// Editors paired with their slot, in page order
    pub fn editors(&self) -> impl Iterator<Item = (&'static ShaftSlot, &ShaftEditor<TextField>)> {
        self.attached.editors.iter().filter_map(|(container_id, editor)| {
            ShaftSlot::for_container(container_id).map(|slot| (slot, editor))
        })
    }
}

fn containers() -> Vec<EditorContainer> {
    SHAFT_SLOTS.iter().map(ShaftSlot::container).collect()
}

/// Attach every editor to the given field values.
pub fn load_page(mut fields: HashMap<String, String>) -> ShaftPageState {
    let attached = attach_all(&containers(), &mut fields);
    for (container_id, error) in &attached.failed {
        warn!(container = %container_id, error = %error, "shaft editor left uninitialised");
    }
    ShaftPageState {
        attached,
        submitted: false,
    }
}

/// Page state for a GET: any field missing from `query` starts empty,
/// which seeds the default shape.
pub fn initial_page(query: &HashMap<String, String>) -> ShaftPageState {
    let fields = SHAFT_SLOTS
        .iter()
        .map(|slot| {
            let value = query.get(slot.field_id).cloned().unwrap_or_default();
            (slot.field_id.to_string(), value)
        })
        .collect();
    load_page(fields)
}

/// Replay a posted shaft form.
pub fn handle_post(data: HashMap<String, String>) -> ShaftPageState {
    let command = FormCommand::parse(data.get("action").map(String::as_str));
    let mut page = load_page(data.clone());

    for (container_id, editor) in &mut page.attached.editors {
        let Some(slot) = ShaftSlot::for_container(container_id) else {
            continue;
        };

        let committed = commit_row_edits(slot, editor, &data);
        if committed > 0 {
            debug!(editor = slot.field_id, committed, "committed row edits");
        }

        if let Some(action) = command.action_for(slot.field_id) {
            let changed = editor.apply(&action);
            debug!(editor = slot.field_id, ?action, changed, "applied editor action");
        }
    }

    if command == FormCommand::Submit {
        page.submitted = true;
        for (slot, editor) in page.editors() {
            info!(
                editor = slot.field_id,
                segments = editor.segments().len(),
                summary = %editor.summary(),
                "shaft geometry submitted"
            );
        }
    }

    page
}

/// Commit every posted row input that differs from its pre-fill.
///
/// Unchanged inputs are skipped so the rounded pre-fill never overwrites
/// the stored full-precision value.
fn commit_row_edits(
    slot: &ShaftSlot,
    editor: &mut ShaftEditor<TextField>,
    data: &HashMap<String, String>,
) -> usize {
    let rows = editor.rows().to_vec();
    let mut committed = 0;

    for row in &rows {
        for field in [SegmentField::Length, SegmentField::Diameter] {
            let Some(raw) = data.get(&slot.input_name(field, row.number)) else {
                continue;
            };
            if parse_field_value(raw) == Some(row.value(field)) {
                continue;
            }
            let action = EditorAction::Edit {
                index: row.index(),
                field,
                raw: raw.clone(),
            };
            if editor.apply(&action) {
                committed += 1;
            }
        }
    }

    committed
}

#[cfg(test)]
mod tests {
    use calc_core::shaft::editor::HiddenField;
    use calc_core::shaft::{decode, default_segments, Segment};

    use super::*;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn drive(page: &ShaftPageState) -> &ShaftEditor<TextField> {
        page.editors()
            .find(|(slot, _)| slot.field_id == "drive_shaft")
            .map(|(_, editor)| editor)
            .unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(FormCommand::parse(None), FormCommand::Update);
        assert_eq!(FormCommand::parse(Some("submit")), FormCommand::Submit);
        assert_eq!(
            FormCommand::parse(Some("add:drive_shaft")),
            FormCommand::Add {
                field_id: "drive_shaft".into()
            }
        );
        assert_eq!(
            FormCommand::parse(Some("remove:tail_shaft:2")),
            FormCommand::Remove {
                field_id: "tail_shaft".into(),
                number: 2
            }
        );
        assert_eq!(FormCommand::parse(Some("remove:tail_shaft:0")), FormCommand::Update);
        assert_eq!(FormCommand::parse(Some("explode")), FormCommand::Update);
    }

    #[test]
    fn test_row_input_names() {
        let slot = &SHAFT_SLOTS[0];
        assert_eq!(slot.input_name(SegmentField::Length, 3), "drive_shaft.length.3");
        assert_eq!(slot.input_name(SegmentField::Diameter, 1), "drive_shaft.diameter.1");
    }

    #[test]
    fn test_initial_page_uses_default_shape() {
        let page = initial_page(&HashMap::new());
        assert_eq!(page.editors().count(), SHAFT_SLOTS.len());
        assert_eq!(drive(&page).segments(), default_segments().as_slice());
        assert!(!page.submitted);
    }

    #[test]
    fn test_initial_page_seeds_from_query() {
        let query = form(&[("drive_shaft", r#"[{"length_mm":80,"diameter_mm":30}]"#)]);
        let page = initial_page(&query);
        assert_eq!(drive(&page).segments(), &[Segment::new(80.0, 30.0)]);
    }

    #[test]
    fn test_add_targets_one_editor() {
        let page = handle_post(form(&[
            ("drive_shaft", ""),
            ("tail_shaft", ""),
            ("action", "add:drive_shaft"),
        ]));
        let counts: Vec<usize> = page.editors().map(|(_, e)| e.segments().len()).collect();
        assert_eq!(counts, vec![4, 3]);
    }

    #[test]
    fn test_row_edit_and_remove_in_one_post() {
        let page = handle_post(form(&[
            ("drive_shaft", ""),
            ("tail_shaft", ""),
            ("drive_shaft.length.1", "200"),
            ("drive_shaft.diameter.1", "60"),
            ("action", "remove:drive_shaft:3"),
        ]));
        let editor = drive(&page);
        assert_eq!(
            editor.segments(),
            &[Segment::new(200.0, 60.0), Segment::new(120.0, 45.0)]
        );
        assert_eq!(decode(editor.field().value()).unwrap(), editor.segments());
    }

    #[test]
    fn test_unchanged_prefill_keeps_precision() {
        let geometry = r#"[{"length_mm":150.04,"diameter_mm":60}]"#;
        let page = handle_post(form(&[
            ("drive_shaft", geometry),
            ("tail_shaft", ""),
            ("drive_shaft.length.1", "150"),
            ("drive_shaft.diameter.1", "60"),
        ]));
        assert_eq!(drive(&page).segments()[0].length_mm, 150.04);
    }

    #[test]
    fn test_invalid_edit_ignored() {
        let page = handle_post(form(&[
            ("drive_shaft", ""),
            ("tail_shaft", ""),
            ("drive_shaft.length.2", "-5"),
            ("drive_shaft.diameter.2", "abc"),
        ]));
        assert_eq!(drive(&page).segments(), default_segments().as_slice());
    }

    #[test]
    fn test_missing_field_disables_only_that_editor() {
        let page = handle_post(form(&[("drive_shaft", ""), ("action", "submit")]));
        assert_eq!(page.attached.editors.len(), 1);
        assert_eq!(page.attached.failed.len(), 1);
        assert_eq!(page.attached.failed[0].0, "tail-shaft-editor");
        assert!(page.submitted);
    }
}
