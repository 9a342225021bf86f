//! Form descriptions, submitted data and validation helpers.
//!
//! A registered model describes its inputs as [`FieldSpec`]s, reads a
//! submission through a [`FormReader`] that collects every error before
//! giving up, and hands templates a flat list of [`FieldView`]s.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use axum::body::Bytes;
use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;

use eshop_core::{Email, Money, RangeError};

use crate::models::ImageUpdate;
use crate::services::media_url;

/// Key for errors that do not belong to a single field.
pub const NON_FIELD: &str = "__all__";

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";
const WHOLE_NUMBER: &str = "Enter a whole number.";
const NOT_NEGATIVE: &str = "Ensure this value is greater than or equal to 0.";

/// Suffix of the checkbox that clears an image field.
pub const CLEAR_SUFFIX: &str = "-clear";

/// Whether a form creates a new row or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

// =============================================================================
// Errors
// =============================================================================

/// Validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A single error on one field.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_owned()).or_default().push(message.into());
    }

    /// Messages for `field`, empty if it is valid.
    #[must_use]
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn non_field(&self) -> &[String] {
        self.get(NON_FIELD)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn merge(&mut self, other: Self) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// Field names that have errors.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

// =============================================================================
// Submitted data
// =============================================================================

/// A file part of a multipart submission, not yet validated.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// A multipart submission split into text values and file parts.
#[derive(Debug, Default)]
pub struct RawForm {
    pub values: HashMap<String, String>,
    pub uploads: HashMap<String, Upload>,
}

impl RawForm {
    /// Drain a multipart body. File inputs left empty by the browser are
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns `MultipartError` if the body is malformed or too large.
    pub async fn read(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(ToOwned::to_owned) else {
                continue;
            };

            if let Some(file_name) = field.file_name().map(ToOwned::to_owned) {
                let bytes = field.bytes().await?;
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                form.uploads.insert(name, Upload { file_name, bytes });
            } else {
                let value = field.text().await?;
                form.values.insert(name, value);
            }
        }

        Ok(form)
    }
}

/// Text values plus the resolved action for each image field.
#[derive(Debug, Clone, Default)]
pub struct FormData {
    values: HashMap<String, String>,
    images: HashMap<String, ImageUpdate>,
}

impl FormData {
    #[must_use]
    pub const fn new(values: HashMap<String, String>, images: HashMap<String, ImageUpdate>) -> Self {
        Self { values, images }
    }

    /// Build from literal pairs.
    #[must_use]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            values: pairs
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
            images: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_image(mut self, name: &str, update: ImageUpdate) -> Self {
        self.images.insert(name.to_owned(), update);
        self
    }

    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn image(&self, name: &str) -> ImageUpdate {
        self.images.get(name).cloned().unwrap_or_default()
    }
}

// =============================================================================
// Reading and validating
// =============================================================================

/// Reads typed values out of a [`FormData`], recording an error for every
/// field that fails instead of stopping at the first one.
///
/// Failed reads return a placeholder value; callers must check
/// [`FormReader::finish`] before using anything they read.
pub struct FormReader<'a> {
    form: &'a FormData,
    errors: FieldErrors,
}

impl<'a> FormReader<'a> {
    #[must_use]
    pub fn new(form: &'a FormData) -> Self {
        Self {
            form,
            errors: FieldErrors::new(),
        }
    }

    pub fn error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.add(field, message);
    }

    fn trimmed(&self, name: &str) -> &'a str {
        self.form.value(name).map_or("", str::trim)
    }

    fn check_length(&mut self, name: &str, value: &str, max_len: usize) -> bool {
        let len = value.chars().count();
        if len > max_len {
            self.error(
                name,
                format!("Ensure this value has at most {max_len} characters (it has {len})."),
            );
            return false;
        }
        true
    }

    /// Required text, trimmed, at most `max_len` characters.
    pub fn text(&mut self, name: &str, max_len: usize) -> String {
        let value = self.trimmed(name);
        if value.is_empty() {
            self.error(name, REQUIRED);
            return String::new();
        }
        self.check_length(name, value, max_len);
        value.to_owned()
    }

    /// Optional text stored as an empty string when blank.
    pub fn blank_text(&mut self, name: &str, max_len: usize) -> String {
        let value = self.trimmed(name);
        self.check_length(name, value, max_len);
        value.to_owned()
    }

    /// Optional text stored as `NULL` when blank.
    pub fn optional_text(&mut self, name: &str, max_len: usize) -> Option<String> {
        let value = self.blank_text(name, max_len);
        (!value.is_empty()).then_some(value)
    }

    /// Raw password input; not trimmed. `None` when left blank.
    #[must_use]
    pub fn password(&self, name: &str) -> Option<String> {
        self.form
            .value(name)
            .filter(|v| !v.is_empty())
            .map(ToOwned::to_owned)
    }

    /// HTML checkboxes are only submitted when ticked.
    #[must_use]
    pub fn checkbox(&self, name: &str) -> bool {
        self.form
            .value(name)
            .is_some_and(|v| matches!(v, "on" | "true" | "1"))
    }

    /// A required select value (foreign key or enum code).
    pub fn choice<T: FromStr + Default>(&mut self, name: &str) -> T {
        let value = self.trimmed(name);
        if value.is_empty() {
            self.error(name, REQUIRED);
            return T::default();
        }
        value.parse().unwrap_or_else(|_| {
            self.error(name, INVALID_CHOICE);
            T::default()
        })
    }

    /// A required price.
    pub fn money(&mut self, name: &str) -> Money {
        let value = self.trimmed(name);
        if value.is_empty() {
            self.error(name, REQUIRED);
            return Money::default();
        }
        value.parse().unwrap_or_else(|e: eshop_core::MoneyError| {
            self.error(name, e.to_string());
            Money::default()
        })
    }

    /// A required whole number that is zero or more.
    pub fn non_negative(&mut self, name: &str) -> i32 {
        let value = self.trimmed(name);
        if value.is_empty() {
            self.error(name, REQUIRED);
            return 0;
        }
        match value.parse::<i32>() {
            Ok(n) if n >= 0 => n,
            Ok(_) => {
                self.error(name, NOT_NEGATIVE);
                0
            }
            Err(_) => {
                self.error(name, WHOLE_NUMBER);
                0
            }
        }
    }

    /// A required whole number checked by a range-validating constructor.
    pub fn bounded<T: Default>(
        &mut self,
        name: &str,
        make: impl FnOnce(i64) -> Result<T, RangeError>,
    ) -> T {
        let value = self.trimmed(name);
        if value.is_empty() {
            self.error(name, REQUIRED);
            return T::default();
        }
        let Ok(n) = value.parse::<i64>() else {
            self.error(name, WHOLE_NUMBER);
            return T::default();
        };
        make(n).unwrap_or_else(|e| {
            self.error(name, e.to_string());
            T::default()
        })
    }

    /// A required email address.
    pub fn email(&mut self, name: &str, max_len: usize) -> Option<Email> {
        let value = self.trimmed(name);
        if value.is_empty() {
            self.error(name, REQUIRED);
            return None;
        }
        self.parse_email(name, value, max_len)
    }

    /// An optional email address.
    pub fn optional_email(&mut self, name: &str, max_len: usize) -> Option<Email> {
        let value = self.trimmed(name);
        if value.is_empty() {
            return None;
        }
        self.parse_email(name, value, max_len)
    }

    fn parse_email(&mut self, name: &str, value: &str, max_len: usize) -> Option<Email> {
        match Email::parse_with_max(value, max_len) {
            Ok(email) => Some(email),
            Err(e) => {
                self.error(name, e.to_string());
                None
            }
        }
    }

    /// The resolved upload action for an image field.
    #[must_use]
    pub fn image(&self, name: &str) -> ImageUpdate {
        self.form.image(name)
    }

    /// # Errors
    ///
    /// Returns every collected error if any read failed.
    pub fn finish(self) -> Result<(), FieldErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

// =============================================================================
// Field descriptions
// =============================================================================

/// One entry in a select input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Turn `(id, label)` rows into select choices.
#[must_use]
pub fn id_choices(rows: Vec<(i32, String)>) -> Vec<Choice> {
    rows.into_iter()
        .map(|(id, label)| Choice::new(id.to_string(), label))
        .collect()
}

/// Kind of input widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text { max_len: usize },
    TextArea { max_len: usize },
    Number { step: &'static str, min: Option<i64>, max: Option<i64> },
    Email { max_len: usize },
    Password,
    Checkbox,
    Select(Vec<Choice>),
    Image,
}

/// Description of one form input.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub help: Option<&'static str>,
}

impl FieldSpec {
    const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: true,
            help: None,
        }
    }

    #[must_use]
    pub const fn text(name: &'static str, label: &'static str, max_len: usize) -> Self {
        Self::new(name, label, FieldKind::Text { max_len })
    }

    #[must_use]
    pub const fn textarea(name: &'static str, label: &'static str, max_len: usize) -> Self {
        Self::new(name, label, FieldKind::TextArea { max_len })
    }

    #[must_use]
    pub const fn integer(
        name: &'static str,
        label: &'static str,
        min: Option<i64>,
        max: Option<i64>,
    ) -> Self {
        Self::new(name, label, FieldKind::Number { step: "1", min, max })
    }

    #[must_use]
    pub const fn decimal(name: &'static str, label: &'static str) -> Self {
        Self::new(
            name,
            label,
            FieldKind::Number {
                step: "0.01",
                min: Some(0),
                max: None,
            },
        )
    }

    #[must_use]
    pub const fn email(name: &'static str, label: &'static str, max_len: usize) -> Self {
        Self::new(name, label, FieldKind::Email { max_len })
    }

    #[must_use]
    pub const fn password(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Password)
    }

    #[must_use]
    pub const fn checkbox(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Checkbox).optional()
    }

    #[must_use]
    pub const fn select(name: &'static str, label: &'static str, choices: Vec<Choice>) -> Self {
        Self::new(name, label, FieldKind::Select(choices))
    }

    #[must_use]
    pub const fn image(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Image).optional()
    }

    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    #[must_use]
    pub const fn help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

// =============================================================================
// Values shown in a form
// =============================================================================

/// String values used to fill a form, plus current image paths.
#[derive(Debug, Clone, Default)]
pub struct FormValues {
    values: HashMap<String, String>,
    images: HashMap<String, String>,
}

impl FormValues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Values echoed back from a rejected submission.
    #[must_use]
    pub fn from_submission(values: HashMap<String, String>) -> Self {
        Self {
            values,
            images: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, name: &str, value: impl ToString) -> Self {
        self.values.insert(name.to_owned(), value.to_string());
        self
    }

    #[must_use]
    pub fn with_flag(self, name: &str, on: bool) -> Self {
        if on { self.with(name, "on") } else { self }
    }

    #[must_use]
    pub fn with_optional(self, name: &str, value: Option<&str>) -> Self {
        self.with(name, value.unwrap_or_default())
    }

    #[must_use]
    pub fn with_image(mut self, name: &str, path: Option<&str>) -> Self {
        if let Some(path) = path {
            self.images.insert(name.to_owned(), path.to_owned());
        }
        self
    }

    /// Take current image paths from another set of values.
    #[must_use]
    pub fn with_images_from(mut self, other: &Self) -> Self {
        self.images.clone_from(&other.images);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> &str {
        self.values.get(name).map_or("", String::as_str)
    }

    #[must_use]
    pub fn image(&self, name: &str) -> Option<&str> {
        self.images.get(name).map(String::as_str)
    }
}

/// A select option ready for rendering.
#[derive(Debug, Clone)]
pub struct OptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Everything a template needs to render one input.
#[derive(Debug, Clone)]
pub struct FieldView {
    pub name: String,
    pub label: String,
    pub input_type: &'static str,
    pub is_textarea: bool,
    pub is_select: bool,
    pub is_checkbox: bool,
    pub is_image: bool,
    pub required: bool,
    pub max_len: Option<usize>,
    pub step: Option<&'static str>,
    pub min: Option<String>,
    pub max: Option<String>,
    pub value: String,
    pub checked: bool,
    pub options: Vec<OptionView>,
    pub current_image: Option<String>,
    pub current_image_url: Option<String>,
    pub clear_name: String,
    pub help: Option<&'static str>,
    pub errors: Vec<String>,
}

impl FieldView {
    /// Combine a field description with the values and errors to show.
    #[must_use]
    pub fn build(spec: FieldSpec, values: &FormValues, errors: &FieldErrors) -> Self {
        let value = values.get(spec.name).to_owned();
        let mut view = Self {
            name: spec.name.to_owned(),
            label: spec.label.to_owned(),
            input_type: "text",
            is_textarea: false,
            is_select: false,
            is_checkbox: false,
            is_image: false,
            required: spec.required,
            max_len: None,
            step: None,
            min: None,
            max: None,
            value: String::new(),
            checked: false,
            options: Vec::new(),
            current_image: None,
            current_image_url: None,
            clear_name: format!("{}{CLEAR_SUFFIX}", spec.name),
            help: spec.help,
            errors: errors.get(spec.name).to_vec(),
        };

        match spec.kind {
            FieldKind::Text { max_len } => {
                view.max_len = Some(max_len);
                view.value = value;
            }
            FieldKind::TextArea { max_len } => {
                view.is_textarea = true;
                view.max_len = Some(max_len);
                view.value = value;
            }
            FieldKind::Number { step, min, max } => {
                view.input_type = "number";
                view.step = Some(step);
                view.min = min.map(|n| n.to_string());
                view.max = max.map(|n| n.to_string());
                view.value = value;
            }
            FieldKind::Email { max_len } => {
                view.input_type = "email";
                view.max_len = Some(max_len);
                view.value = value;
            }
            // Never echo a password back into the page.
            FieldKind::Password => view.input_type = "password",
            FieldKind::Checkbox => {
                view.input_type = "checkbox";
                view.is_checkbox = true;
                view.checked = matches!(value.as_str(), "on" | "true" | "1");
            }
            FieldKind::Select(choices) => {
                view.is_select = true;
                view.options = choices
                    .into_iter()
                    .map(|c| OptionView {
                        selected: c.value == value,
                        value: c.value,
                        label: c.label,
                    })
                    .collect();
                view.value = value;
            }
            FieldKind::Image => {
                view.input_type = "file";
                view.is_image = true;
                view.current_image = values.image(spec.name).map(ToOwned::to_owned);
                view.current_image_url = view.current_image.as_deref().map(media_url);
            }
        }

        view
    }
}

/// Build views for every field, in order.
#[must_use]
pub fn field_views(fields: Vec<FieldSpec>, values: &FormValues, errors: &FieldErrors) -> Vec<FieldView> {
    fields
        .into_iter()
        .map(|spec| FieldView::build(spec, values, errors))
        .collect()
}

#[cfg(test)]
mod tests {
    use eshop_core::{ProductId, Quantity, Rating};

    use super::*;

    #[test]
    fn test_reader_collects_every_error() {
        let form = FormData::from_pairs(&[("name", ""), ("price", "abc"), ("rating", "9")]);
        let mut reader = FormReader::new(&form);
        let _ = reader.text("name", 50);
        let _ = reader.money("price");
        let _ = reader.bounded("rating", Rating::new);
        let errors = reader.finish().unwrap_err();

        assert_eq!(errors.get("name"), [REQUIRED]);
        assert_eq!(errors.get("price"), ["Enter a number."]);
        assert_eq!(
            errors.get("rating"),
            ["Ensure this value is between 0 and 5 (got 9)."]
        );
    }

    #[test]
    fn test_reader_valid_values() {
        let form = FormData::from_pairs(&[
            ("name", "  Linen Shirt "),
            ("price", "19.99"),
            ("quantity", "50"),
            ("product", "4"),
            ("active", "on"),
        ]);
        let mut reader = FormReader::new(&form);
        assert_eq!(reader.text("name", 50), "Linen Shirt");
        assert_eq!(reader.money("price").to_string(), "19.99");
        assert_eq!(reader.bounded("quantity", Quantity::new).get(), 50);
        assert_eq!(reader.choice::<ProductId>("product"), ProductId::new(4));
        assert!(reader.checkbox("active"));
        assert!(!reader.checkbox("missing"));
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn test_quantity_out_of_range() {
        for raw in ["0", "51"] {
            let form = FormData::from_pairs(&[("quantity", raw)]);
            let mut reader = FormReader::new(&form);
            let _ = reader.bounded("quantity", Quantity::new);
            assert!(reader.finish().is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn test_text_length_limit() {
        let long = "x".repeat(51);
        let form = FormData::from_pairs(&[("name", long.as_str())]);
        let mut reader = FormReader::new(&form);
        let _ = reader.text("name", 50);
        let errors = reader.finish().unwrap_err();
        assert_eq!(
            errors.get("name"),
            ["Ensure this value has at most 50 characters (it has 51)."]
        );
    }

    #[test]
    fn test_optional_text_and_invalid_choice() {
        let form = FormData::from_pairs(&[("note", "   "), ("product", "abc")]);
        let mut reader = FormReader::new(&form);
        assert_eq!(reader.optional_text("note", 350), None);
        let _ = reader.choice::<ProductId>("product");
        let errors = reader.finish().unwrap_err();
        assert_eq!(errors.get("product"), [INVALID_CHOICE]);
        assert!(errors.get("note").is_empty());
    }

    #[test]
    fn test_non_negative() {
        let form = FormData::from_pairs(&[("a", "-1"), ("b", "1.5"), ("c", "5")]);
        let mut reader = FormReader::new(&form);
        let _ = reader.non_negative("a");
        let _ = reader.non_negative("b");
        assert_eq!(reader.non_negative("c"), 5);
        let errors = reader.finish().unwrap_err();
        assert_eq!(errors.get("a"), [NOT_NEGATIVE]);
        assert_eq!(errors.get("b"), [WHOLE_NUMBER]);
    }

    #[test]
    fn test_field_errors_merge() {
        let mut errors = FieldErrors::single("avatar", "Max size of file is 1 MB");
        errors.merge(FieldErrors::single("avatar", "second"));
        errors.merge(FieldErrors::single(NON_FIELD, "general"));
        assert_eq!(errors.get("avatar").len(), 2);
        assert_eq!(errors.non_field(), ["general"]);
        assert_eq!(errors.fields().count(), 2);
    }

    #[test]
    fn test_select_view_marks_selected() {
        let spec = FieldSpec::select(
            "size",
            "Size (FK)",
            vec![Choice::new("1", "S"), Choice::new("2", "M")],
        );
        let values = FormValues::new().with("size", 2);
        let view = FieldView::build(spec, &values, &FieldErrors::new());
        assert!(view.is_select);
        assert!(!view.options[0].selected);
        assert!(view.options[1].selected);
    }

    #[test]
    fn test_password_view_never_echoes() {
        let values = FormValues::new().with("password", "hunter22");
        let view = FieldView::build(
            FieldSpec::password("password", "Password"),
            &values,
            &FieldErrors::new(),
        );
        assert_eq!(view.input_type, "password");
        assert!(view.value.is_empty());
    }

    #[test]
    fn test_image_view_links_current_file() {
        let values = FormValues::new().with_image("category_img", Some("category/a.png"));
        let view = FieldView::build(
            FieldSpec::image("category_img", "Category Image"),
            &values,
            &FieldErrors::new(),
        );
        assert!(view.is_image);
        assert_eq!(view.current_image_url.as_deref(), Some("/media/category/a.png"));
        assert_eq!(view.clear_name, "category_img-clear");
    }
}
