//! # Shaft Editor Controller
//!
//! [`ShaftEditor`] owns one segment list and keeps four things in step
//! with it: the table rows, the hidden form field, the preview scene and
//! the summary. Every successful mutation triggers a full resync in that
//! order; rejected edits and refused removals change nothing.
//!
//! Editors are created explicitly, one per container, with
//! [`ShaftEditor::new`] or [`attach`]. Instances never share state, so any
//! number of them can live side by side.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::shaft::editor::{ShaftEditor, TextField, EditorAction};
//! use calc_core::shaft::table::SegmentField;
//!
//! let field = TextField::new("geometry", r#"[{"length_mm":100,"diameter_mm":40}]"#);
//! let mut editor = ShaftEditor::new(field);
//!
//! // Last segment can't be removed
//! assert!(!editor.apply(&EditorAction::Remove { index: 0 }));
//!
//! assert!(editor.apply(&EditorAction::Edit {
//!     index: 0,
//!     field: SegmentField::Diameter,
//!     raw: "55".to_string(),
//! }));
//! assert_eq!(editor.summary_text(), "Minimum diameter: 55.0 mm • Total length: 100.0 mm");
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::codec::{encode, seed_segments};
use super::preview::{layout, to_svg, PreviewScene};
use super::summary::{summarize, Summary};
use super::table::{parse_field_value, render_rows, SegmentField, TableRow};
use super::{is_positive_finite, Segment, FALLBACK_SEGMENT};
use crate::errors::{CalcError, CalcResult};

/// Attribute on an editor container naming its hidden field's id.
pub const FIELD_ATTRIBUTE: &str = "data-shaft-field";

/// A text-holding form field the editor keeps in sync.
pub trait HiddenField {
    /// Current text
    fn value(&self) -> &str;

    /// Replace the text
    fn set_value(&mut self, text: String);
}

/// In-memory hidden field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextField {
    id: String,
    value: String,
}

impl TextField {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        TextField {
            id: id.into(),
            value: value.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl HiddenField for TextField {
    fn value(&self) -> &str {
        &self.value
    }

    fn set_value(&mut self, text: String) {
        self.value = text;
    }
}

/// Something that can hand out hidden fields by id (a page, a posted form).
pub trait FieldLookup {
    type Field: HiddenField;

    fn find_field(&mut self, id: &str) -> Option<Self::Field>;
}

/// Posted form data: every key is a field id.
impl FieldLookup for HashMap<String, String> {
    type Field = TextField;

    fn find_field(&mut self, id: &str) -> Option<TextField> {
        self.get(id).map(|value| TextField::new(id, value.clone()))
    }
}

/// An element that should host an editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorContainer {
    /// Container element id (used for reporting)
    pub id: String,

    /// Value of the `data-shaft-field` attribute, if present
    pub field_id: Option<String>,
}

impl EditorContainer {
    pub fn new(id: impl Into<String>, field_id: impl Into<String>) -> Self {
        EditorContainer {
            id: id.into(),
            field_id: Some(field_id.into()),
        }
    }
}

/// A user action against one editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditorAction {
    /// Append a copy of the last segment
    Add,
    /// Commit raw text into one field of the segment at `index` (0-based)
    Edit {
        index: usize,
        field: SegmentField,
        raw: String,
    },
    /// Remove the segment at `index` (0-based)
    Remove { index: usize },
}

/// Editor state for one container.
#[derive(Debug, Clone)]
pub struct ShaftEditor<F: HiddenField = TextField> {
    segments: Vec<Segment>,
    field: F,
    rows: Vec<TableRow>,
    preview: PreviewScene,
    summary: Summary,
}

impl<F: HiddenField> ShaftEditor<F> {
    /// Create an editor bound to `field`.
    ///
    /// The segment list is seeded from the field's current text, or the
    /// default shape if that yields no valid segment. The initial resync
    /// rewrites the field in canonical form.
    pub fn new(field: F) -> Self {
        let segments = seed_segments(field.value());
        let mut editor = ShaftEditor {
            rows: Vec::new(),
            preview: PreviewScene::default(),
            summary: summarize(&segments),
            segments,
            field,
        };
        editor.resync();
        editor
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn preview(&self) -> &PreviewScene {
        &self.preview
    }

    /// Preview rendered as SVG markup
    pub fn preview_svg(&self) -> String {
        to_svg(&self.preview)
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }

    pub fn summary_text(&self) -> String {
        self.summary.to_string()
    }

    pub fn field(&self) -> &F {
        &self.field
    }

    /// Release the hidden field (e.g. to submit it with the form)
    pub fn into_field(self) -> F {
        self.field
    }

    /// Dispatch an action. Returns `true` when it changed the geometry.
    pub fn apply(&mut self, action: &EditorAction) -> bool {
        match action {
            EditorAction::Add => {
                self.add_segment();
                true
            }
            EditorAction::Edit { index, field, raw } => self.commit_edit(*index, *field, raw),
            EditorAction::Remove { index } => self.remove_segment(*index),
        }
    }

    /// Append a segment cloned from the last one.
    pub fn add_segment(&mut self) {
        let next = self.segments.last().copied().unwrap_or(FALLBACK_SEGMENT);
        self.segments.push(next);
        self.resync();
    }

    /// Commit raw field text. Invalid text or an unknown row is ignored.
    pub fn commit_edit(&mut self, index: usize, field: SegmentField, raw: &str) -> bool {
        match parse_field_value(raw) {
            Some(value) => self.set_dimension(index, field, value),
            None => false,
        }
    }

    /// Typed variant of [`ShaftEditor::commit_edit`].
    pub fn set_dimension(&mut self, index: usize, field: SegmentField, value: f64) -> bool {
        if !is_positive_finite(value) {
            return false;
        }
        let Some(segment) = self.segments.get_mut(index) else {
            return false;
        };
        field.set(segment, value);
        self.resync();
        true
    }

    /// Remove the segment at `index`, unless it is the only one left.
    pub fn remove_segment(&mut self, index: usize) -> bool {
        if self.segments.len() <= 1 || index >= self.segments.len() {
            return false;
        }
        self.segments.remove(index);
        self.resync();
        true
    }

    /// Rebuild every render target and rewrite the hidden field.
    pub fn resync(&mut self) {
        self.rows = render_rows(&self.segments);
        self.field.set_value(encode(&self.segments));
        self.preview = layout(&self.segments);
        self.summary = summarize(&self.segments);
    }
}

/// Attach an editor to a container, locating its hidden field through `lookup`.
///
/// Fails with [`CalcError::MissingField`] if the container has no field
/// attribute or the named field does not exist.
pub fn attach<L: FieldLookup>(
    container: &EditorContainer,
    lookup: &mut L,
) -> CalcResult<ShaftEditor<L::Field>> {
    let field_id = container
        .field_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| CalcError::missing_field(FIELD_ATTRIBUTE))?;

    let field = lookup
        .find_field(field_id)
        .ok_or_else(|| CalcError::missing_field(field_id))?;

    Ok(ShaftEditor::new(field))
}

/// Outcome of attaching editors to every container on a page.
pub struct AttachedEditors<F: HiddenField> {
    /// Active editors, keyed by container id, in container order
    pub editors: Vec<(String, ShaftEditor<F>)>,

    /// Containers left uninitialised, with the reason
    pub failed: Vec<(String, CalcError)>,
}

/// Attach an editor to each container. A failure only disables that container.
pub fn attach_all<L: FieldLookup>(
    containers: &[EditorContainer],
    lookup: &mut L,
) -> AttachedEditors<L::Field> {
    let mut attached = AttachedEditors {
        editors: Vec::new(),
        failed: Vec::new(),
    };

    for container in containers {
        match attach(container, lookup) {
            Ok(editor) => attached.editors.push((container.id.clone(), editor)),
            Err(e) => attached.failed.push((container.id.clone(), e)),
        }
    }

    attached
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shaft::codec::decode;
    use crate::shaft::default_segments;
    use proptest::prelude::*;

    /// Field that counts writes, to observe whether a resync happened.
    struct CountingField {
        value: String,
        writes: usize,
    }

    impl HiddenField for CountingField {
        fn value(&self) -> &str {
            &self.value
        }

        fn set_value(&mut self, text: String) {
            self.value = text;
            self.writes += 1;
        }
    }

    fn counting_editor() -> ShaftEditor<CountingField> {
        ShaftEditor::new(CountingField {
            value: String::new(),
            writes: 0,
        })
    }

    #[test]
    fn test_new_seeds_default_and_syncs() {
        let editor = ShaftEditor::new(TextField::new("geometry", "not json"));
        assert_eq!(editor.segments(), default_segments().as_slice());
        assert_eq!(editor.rows().len(), 3);
        assert_eq!(editor.preview().rects().count(), 3);
        assert_eq!(decode(editor.field().value()), Some(default_segments()));
        assert_eq!(
            editor.summary_text(),
            "Minimum diameter: 45.0 mm • Total length: 420.0 mm"
        );
    }

    #[test]
    fn test_new_seeds_from_field() {
        let field = TextField::new("g", r#"[{"length_mm":80,"diameter_mm":30},{"length_mm":-1,"diameter_mm":5}]"#);
        let editor = ShaftEditor::new(field);
        assert_eq!(editor.segments(), &[Segment::new(80.0, 30.0)]);
    }

    #[test]
    fn test_add_clones_last_segment() {
        let mut editor = ShaftEditor::new(TextField::new("g", r#"[{"length_mm":10,"diameter_mm":5},{"length_mm":20,"diameter_mm":7}]"#));
        editor.add_segment();
        assert_eq!(editor.segments().len(), 3);
        assert_eq!(editor.segments()[2], Segment::new(20.0, 7.0));
        assert_eq!(editor.rows()[2].number, 3);
        assert_eq!(decode(editor.field().value()).unwrap().len(), 3);
    }

    #[test]
    fn test_edit_updates_in_place() {
        let mut editor = counting_editor();
        let writes = editor.field().writes;

        assert!(editor.commit_edit(1, SegmentField::Length, "200"));
        assert_eq!(editor.segments()[1], Segment::new(200.0, 45.0));
        assert_eq!(editor.field().writes, writes + 1);
        assert_eq!(editor.summary().total_length_mm, 500.0);
    }

    #[test]
    fn test_invalid_edit_is_rejected_without_resync() {
        let mut editor = counting_editor();
        let before_value = editor.field().value().to_string();
        let before_writes = editor.field().writes;

        for raw in ["0", "-1", "abc", "", "NaN"] {
            assert!(!editor.commit_edit(0, SegmentField::Diameter, raw), "raw: {raw:?}");
        }
        assert!(!editor.commit_edit(99, SegmentField::Diameter, "10"));

        assert_eq!(editor.segments()[0], Segment::new(150.0, 60.0));
        assert_eq!(editor.field().value(), before_value);
        assert_eq!(editor.field().writes, before_writes);
    }

    #[test]
    fn test_remove_never_drops_below_one() {
        let mut editor = ShaftEditor::new(TextField::new("g", ""));
        while editor.segments().len() > 1 {
            assert!(editor.remove_segment(0));
        }
        for _ in 0..5 {
            assert!(!editor.remove_segment(0));
        }
        assert_eq!(editor.segments(), &[Segment::new(150.0, 60.0)]);
        assert!(!editor.rows()[0].removable);
    }

    #[test]
    fn test_remove_at_index() {
        let mut editor = ShaftEditor::new(TextField::new("g", ""));
        assert!(editor.apply(&EditorAction::Remove { index: 1 }));
        assert_eq!(
            editor.segments(),
            &[Segment::new(150.0, 60.0), Segment::new(150.0, 60.0)]
        );
        assert!(!editor.apply(&EditorAction::Remove { index: 7 }));
    }

    #[test]
    fn test_attach_locates_field() {
        let mut form = HashMap::new();
        form.insert("geometry".to_string(), r#"[{"length_mm":50,"diameter_mm":20}]"#.to_string());

        let editor = attach(&EditorContainer::new("shaft-1", "geometry"), &mut form).unwrap();
        assert_eq!(editor.field().id(), "geometry");
        assert_eq!(editor.segments(), &[Segment::new(50.0, 20.0)]);
    }

    #[test]
    fn test_attach_failure_is_isolated() {
        let mut form = HashMap::new();
        form.insert("a".to_string(), String::new());
        form.insert("b".to_string(), r#"[{"length_mm":5,"diameter_mm":5}]"#.to_string());

        let containers = vec![
            EditorContainer::new("first", "a"),
            EditorContainer::new("broken", "missing"),
            EditorContainer {
                id: "no-attr".to_string(),
                field_id: None,
            },
            EditorContainer::new("second", "b"),
        ];
        let mut attached = attach_all(&containers, &mut form);

        assert_eq!(attached.editors.len(), 2);
        assert_eq!(attached.failed.len(), 2);
        assert_eq!(attached.failed[0].0, "broken");
        assert_eq!(attached.failed[0].1, CalcError::missing_field("missing"));
        assert_eq!(attached.failed[1].1, CalcError::missing_field(FIELD_ATTRIBUTE));

        // Editors are independent
        attached.editors[0].1.add_segment();
        assert_eq!(attached.editors[0].1.segments().len(), 4);
        assert_eq!(attached.editors[1].1.segments().len(), 1);
    }

    #[test]
    fn test_action_serialization() {
        let action: EditorAction =
            serde_json::from_str(r#"{"type":"edit","index":2,"field":"diameter","raw":"12"}"#).unwrap();
        assert_eq!(
            action,
            EditorAction::Edit {
                index: 2,
                field: SegmentField::Diameter,
                raw: "12".to_string()
            }
        );
    }

    fn action_strategy() -> impl Strategy<Value = EditorAction> {
        prop_oneof![
            Just(EditorAction::Add),
            (0usize..6).prop_map(|index| EditorAction::Remove { index }),
            (0usize..6, any::<bool>(), prop_oneof![
                Just("0".to_string()),
                Just("-3".to_string()),
                Just("x".to_string()),
                (0.5f64..500.0).prop_map(|v| v.to_string()),
            ])
                .prop_map(|(index, length, raw)| EditorAction::Edit {
                    index,
                    field: if length { SegmentField::Length } else { SegmentField::Diameter },
                    raw,
                }),
        ]
    }

    proptest! {
        #[test]
        fn editor_invariants_hold(actions in prop::collection::vec(action_strategy(), 0..40)) {
            let mut editor = ShaftEditor::new(TextField::new("g", ""));
            for action in &actions {
                editor.apply(action);

                prop_assert!(!editor.segments().is_empty());
                prop_assert!(editor.segments().iter().all(Segment::is_valid));
                prop_assert_eq!(editor.rows().len(), editor.segments().len());
                prop_assert_eq!(editor.field().value(), encode(editor.segments()));
            }
        }
    }
}
