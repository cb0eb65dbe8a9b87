//! Declaration of the `furniture` content type for the content platform.
//!
//! The platform enforces the declared rules at write time. This module keeps the
//! declaration in one place, prints it for the studio, and derives a JSON Schema
//! from it so exported datasets can be checked offline.

use jsonschema::JSONSchema;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

use crate::constants::{DEFAULT_UNIT, FURNITURE_TYPE, SLUG_MAX_LENGTH};
use crate::error::{CatalogError, Result};
use crate::models::Ambiente;

#[derive(Debug, Clone, Serialize)]
pub struct DocumentSchema {
    pub name: &'static str,
    pub title: &'static str,
    #[serde(rename = "type")]
    pub kind: FieldType,
    pub fields: Vec<FieldSchema>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Document,
    String,
    Text,
    Slug,
    Number,
    Object,
    Array,
    Image,
    Datetime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'static str>,
    #[serde(rename = "type")]
    pub kind: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<Validation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<FieldOptions>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldSchema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub of: Vec<FieldSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_value: Option<Value>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Validation {
    pub required: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub list: Vec<ListOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotspot: Option<bool>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ListOption {
    pub title: &'static str,
    pub value: &'static str,
}

impl FieldSchema {
    pub fn new(name: &'static str, title: &'static str, kind: FieldType) -> Self {
        Self {
            name: Some(name),
            title: Some(title),
            kind,
            validation: None,
            options: None,
            fields: Vec::new(),
            of: Vec::new(),
            initial_value: None,
        }
    }

    /// Array member declaration (no name of its own).
    pub fn member(kind: FieldType) -> Self {
        Self {
            name: None,
            title: None,
            ..Self::new("", "", kind)
        }
    }

    pub fn required(mut self) -> Self {
        self.validation = Some(Validation { required: true });
        self
    }

    pub fn options(mut self, options: FieldOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_fields(mut self, fields: Vec<FieldSchema>) -> Self {
        self.fields = fields;
        self
    }

    pub fn of(mut self, members: Vec<FieldSchema>) -> Self {
        self.of = members;
        self
    }

    pub fn initial_value(mut self, value: Value) -> Self {
        self.initial_value = Some(value);
        self
    }

    pub fn is_required(&self) -> bool {
        self.validation.map(|v| v.required).unwrap_or(false)
    }

    fn list_values(&self) -> Vec<&'static str> {
        self.options
            .as_ref()
            .map(|o| o.list.iter().map(|l| l.value).collect())
            .unwrap_or_default()
    }
}

/// The `furniture` document type.
pub fn furniture_schema() -> DocumentSchema {
    let ambientes = Ambiente::ALL
        .iter()
        .map(|a| ListOption { title: a.label(), value: a.as_str() })
        .collect();

    DocumentSchema {
        name: FURNITURE_TYPE,
        title: "Mueble",
        kind: FieldType::Document,
        fields: vec![
            FieldSchema::new("title", "Título", FieldType::String).required(),
            FieldSchema::new("slug", "Slug", FieldType::Slug).options(FieldOptions {
                source: Some("title"),
                max_length: Some(SLUG_MAX_LENGTH),
                ..Default::default()
            }),
            FieldSchema::new("description", "Descripción", FieldType::Text),
            FieldSchema::new("ambiente", "Ambiente", FieldType::String).options(FieldOptions {
                list: ambientes,
                ..Default::default()
            }),
            FieldSchema::new("measurements", "Medidas (cm)", FieldType::Object).with_fields(vec![
                FieldSchema::new("alto", "Alto", FieldType::Number),
                FieldSchema::new("ancho", "Ancho", FieldType::Number),
                FieldSchema::new("profundidad", "Profundidad", FieldType::Number),
                FieldSchema::new("unidad", "Unidad", FieldType::String)
                    .initial_value(json!(DEFAULT_UNIT)),
            ]),
            FieldSchema::new("material", "Material", FieldType::String),
            FieldSchema::new("price", "Precio", FieldType::Number),
            FieldSchema::new("images", "Imágenes", FieldType::Array).of(vec![
                FieldSchema::member(FieldType::Image)
                    .options(FieldOptions { hotspot: Some(true), ..Default::default() })
                    .with_fields(vec![FieldSchema::new("alt", "Alt text", FieldType::String)]),
            ]),
            FieldSchema::new("publishedAt", "Publicado", FieldType::Datetime),
        ],
    }
}

impl DocumentSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == Some(name))
    }

    /// JSON Schema (draft 7) describing an exported document of this type.
    pub fn to_json_schema(&self) -> Value {
        let (properties, required) = object_properties(&self.fields);
        let mut properties = properties;
        properties.insert("_id".into(), json!({"type": "string", "minLength": 1}));
        properties.insert("_type".into(), json!({"const": self.name}));

        let mut required = required;
        required.insert(0, "_id".to_string());

        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "title": self.title,
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

fn object_properties(fields: &[FieldSchema]) -> (Map<String, Value>, Vec<String>) {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in fields {
        let Some(name) = field.name else { continue };
        if field.is_required() {
            required.push(name.to_string());
        }
        properties.insert(name.to_string(), field_json_schema(field));
    }
    (properties, required)
}

fn field_json_schema(field: &FieldSchema) -> Value {
    let nullable = !field.is_required();
    let ty = |t: &str| if nullable { json!([t, "null"]) } else { json!(t) };

    match field.kind {
        FieldType::String | FieldType::Text => {
            let values = field.list_values();
            if !values.is_empty() {
                let mut allowed: Vec<Value> = values.into_iter().map(Value::from).collect();
                if nullable {
                    allowed.push(Value::Null);
                }
                json!({ "enum": allowed })
            } else if field.is_required() {
                json!({"type": "string", "minLength": 1})
            } else {
                json!({ "type": ty("string") })
            }
        }
        FieldType::Number => json!({ "type": ty("number") }),
        FieldType::Datetime => json!({ "type": ty("string"), "format": "date-time" }),
        FieldType::Slug => json!({
            "type": ty("object"),
            "properties": { "current": { "type": "string" } },
        }),
        FieldType::Object | FieldType::Document => {
            let (properties, required) = object_properties(&field.fields);
            json!({ "type": ty("object"), "properties": properties, "required": required })
        }
        FieldType::Image => {
            let (mut properties, _) = object_properties(&field.fields);
            properties.insert(
                "asset".into(),
                json!({
                    "type": "object",
                    "properties": { "_ref": { "type": "string", "minLength": 1 } },
                    "required": ["_ref"],
                }),
            );
            json!({ "type": "object", "properties": properties, "required": ["asset"] })
        }
        FieldType::Array => {
            let items = field
                .of
                .first()
                .map(field_json_schema)
                .unwrap_or_else(|| json!({}));
            json!({ "type": ty("array"), "items": items })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub document_id: String,
    pub path: String,
    pub message: String,
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "[{}] {} at '{}': {}", level, self.document_id, self.path, self.message)
    }
}

/// Checks exported `furniture` documents against the declared type.
pub struct DocumentValidator {
    compiled: JSONSchema,
}

impl DocumentValidator {
    pub fn new() -> Result<Self> {
        Self::for_schema(&furniture_schema())
    }

    pub fn for_schema(schema: &DocumentSchema) -> Result<Self> {
        let json_schema = schema.to_json_schema();
        let compiled = JSONSchema::compile(&json_schema)
            .map_err(|e| CatalogError::Config(format!("invalid document schema: {}", e)))?;
        Ok(Self { compiled })
    }

    pub fn validate(&self, doc: &Value) -> Vec<ValidationIssue> {
        let document_id = document_id(doc);
        let mut issues = Vec::new();

        if let Err(errors) = self.compiled.validate(doc) {
            for error in errors {
                issues.push(ValidationIssue {
                    document_id: document_id.clone(),
                    path: error.instance_path.to_string(),
                    message: error.to_string(),
                    severity: Severity::Error,
                });
            }
        }

        let slug = doc
            .pointer("/slug/current")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or("");
        if slug.is_empty() {
            issues.push(ValidationIssue {
                document_id,
                path: "/slug".to_string(),
                message: "no slug: the listing will not be published".to_string(),
                severity: Severity::Warning,
            });
        } else if let Some(title) = doc.get("title").and_then(Value::as_str) {
            let expected = slugify(title);
            if !expected.is_empty() && expected != slug {
                issues.push(ValidationIssue {
                    document_id,
                    path: "/slug/current".to_string(),
                    message: format!("slug '{}' does not follow the title (expected '{}')", slug, expected),
                    severity: Severity::Warning,
                });
            }
        }

        issues
    }

    /// Validates every document and checks that slugs are unique across the set.
    pub fn validate_all(&self, docs: &[Value]) -> Vec<ValidationIssue> {
        let mut issues: Vec<ValidationIssue> = docs.iter().flat_map(|d| self.validate(d)).collect();

        let mut seen: HashMap<&str, String> = HashMap::new();
        for doc in docs {
            let Some(slug) = doc
                .pointer("/slug/current")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
            else {
                continue;
            };
            let id = document_id(doc);
            if let Some(first) = seen.get(slug) {
                issues.push(ValidationIssue {
                    document_id: id,
                    path: "/slug/current".to_string(),
                    message: format!("slug '{}' already used by {}", slug, first),
                    severity: Severity::Error,
                });
            } else {
                seen.insert(slug, id);
            }
        }

        issues
    }
}

fn document_id(doc: &Value) -> String {
    doc.get("_id")
        .and_then(Value::as_str)
        .unwrap_or("<sin _id>")
        .to_string()
}

/// Slug for a title: lowercase ASCII, Spanish diacritics folded, words joined by `-`,
/// at most 96 characters.
pub fn slugify(title: &str) -> String {
    let folded: String = title
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            'a'..='z' | '0'..='9' => c,
            _ => '-',
        })
        .collect();

    let joined = folded
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<&str>>()
        .join("-");

    let truncated: String = joined.chars().take(SLUG_MAX_LENGTH).collect();
    truncated.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_doc() -> Value {
        json!({
            "_id": "mesa-1",
            "_type": "furniture",
            "title": "Mesa",
            "slug": {"_type": "slug", "current": "mesa"},
            "ambiente": "comedor",
            "measurements": {"alto": 75, "ancho": 180, "unidad": "cm"},
            "price": 1000,
            "images": [{"_type": "image", "asset": {"_ref": "image-a-10x10-jpg"}, "alt": "x"}],
            "publishedAt": "2024-05-01T12:00:00Z"
        })
    }

    #[test]
    fn declaration_matches_content_type() {
        let schema = furniture_schema();
        assert_eq!(schema.name, "furniture");
        assert!(schema.field("title").unwrap().is_required());
        assert!(!schema.field("price").unwrap().is_required());

        let ambiente = schema.field("ambiente").unwrap();
        assert_eq!(
            ambiente.list_values(),
            vec!["comedor", "dormitorio", "oficina", "bano", "exterior", "otro"]
        );

        let images = serde_json::to_value(schema.field("images").unwrap()).unwrap();
        assert_eq!(images["of"][0]["options"]["hotspot"], json!(true));
        assert_eq!(images["of"][0]["fields"][0]["name"], json!("alt"));

        let measurements = serde_json::to_value(schema.field("measurements").unwrap()).unwrap();
        assert_eq!(measurements["fields"][3]["initialValue"], json!("cm"));

        let slug = serde_json::to_value(schema.field("slug").unwrap()).unwrap();
        assert_eq!(slug["options"]["source"], json!("title"));
        assert_eq!(slug["options"]["maxLength"], json!(96));
    }

    #[test]
    fn valid_document_has_no_issues() {
        let validator = DocumentValidator::new().unwrap();
        assert!(validator.validate(&valid_doc()).is_empty());
    }

    #[test]
    fn missing_title_is_an_error() {
        let validator = DocumentValidator::new().unwrap();
        let mut doc = valid_doc();
        doc.as_object_mut().unwrap().remove("title");
        let issues = validator.validate(&doc);
        assert!(issues.iter().any(|i| i.severity == Severity::Error));
    }

    #[test]
    fn ambiente_outside_the_list_is_an_error() {
        let validator = DocumentValidator::new().unwrap();
        let mut doc = valid_doc();
        doc["ambiente"] = json!("cocina");
        let issues = validator.validate(&doc);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "/ambiente");
    }

    #[test]
    fn missing_slug_is_only_a_warning() {
        let validator = DocumentValidator::new().unwrap();
        let mut doc = valid_doc();
        doc.as_object_mut().unwrap().remove("slug");
        let issues = validator.validate(&doc);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
    }

    #[test]
    fn slug_that_drifted_from_title_is_a_warning() {
        let validator = DocumentValidator::new().unwrap();
        let mut doc = valid_doc();
        doc["title"] = json!("Mesa de Comedor");
        let issues = validator.validate(&doc);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].path, "/slug/current");
        assert!(issues[0].message.contains("mesa-de-comedor"));
    }

    #[test]
    fn duplicate_slugs_are_reported() {
        let validator = DocumentValidator::new().unwrap();
        let first = valid_doc();
        let mut second = valid_doc();
        second["_id"] = json!("mesa-2");
        let issues = validator.validate_all(&[first, second]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].document_id, "mesa-2");
        assert!(issues[0].message.contains("mesa-1"));
    }

    #[test]
    fn slugify_folds_spanish_titles() {
        assert_eq!(slugify("Mesa de Comedor Ñandú"), "mesa-de-comedor-nandu");
        assert_eq!(slugify("  Baño -- Vanitory 80cm! "), "bano-vanitory-80cm");
        assert_eq!(slugify("¿?"), "");
    }

    #[test]
    fn slugify_truncates_to_max_length() {
        let title = "ropero ".repeat(30);
        let slug = slugify(&title);
        assert!(slug.chars().count() <= SLUG_MAX_LENGTH);
        assert!(!slug.ends_with('-'));
    }
}
