use std::path::PathBuf;

use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;

use super::model::ApiError;

const FALLBACK_MIME: &str = "image/jpeg";

/// An image attached to a form, resolved once at the UI boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// A file picked on the device
    Uri {
        uri: String,
        name: String,
        mime: String,
    },
    /// An image that is already hosted somewhere
    Url(String),
}

impl FileSource {
    pub fn uri(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let name = file_name(&uri);
        let mime = guess_mime(&name).to_string();
        FileSource::Uri { uri, name, mime }
    }

    /// Accepts the loose shapes pickers hand out:
    /// `{uri, name, type}`, `{uri, fileName, mimeType}` or a plain string.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if s.is_empty() => None,
            Value::String(s) if s.starts_with("http://") || s.starts_with("https://") => {
                Some(FileSource::Url(s.clone()))
            }
            Value::String(s) => Some(FileSource::uri(s.clone())),
            Value::Object(map) => {
                let uri = map.get("uri").and_then(Value::as_str)?;
                let name = ["name", "fileName"]
                    .iter()
                    .find_map(|key| map.get(*key).and_then(Value::as_str))
                    .map(str::to_string)
                    .unwrap_or_else(|| file_name(uri));
                let mime = ["type", "mimeType"]
                    .iter()
                    .find_map(|key| map.get(*key).and_then(Value::as_str))
                    .map(str::to_string)
                    .unwrap_or_else(|| guess_mime(&name).to_string());
                Some(FileSource::Uri {
                    uri: uri.to_string(),
                    name,
                    mime,
                })
            }
            _ => None,
        }
    }
}

fn file_name(uri: &str) -> String {
    uri.rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or("upload")
        .to_string()
}

fn guess_mime(name: &str) -> &'static str {
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        "pdf" => "application/pdf",
        _ => FALLBACK_MIME,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File(FileSource),
}

/// Ordered form fields with bracketed keys, e.g. `eligibility[minAge]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    fields: Vec<(String, FormValue)>,
}

impl MultipartForm {
    /// Flattens any serializable record. `files` are attached under the
    /// given keys afterwards.
    pub fn from_record<T: Serialize>(
        record: &T,
        files: impl IntoIterator<Item = (&'static str, Option<FileSource>)>,
    ) -> Result<Self, ApiError> {
        let value =
            serde_json::to_value(record).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        let mut form = MultipartForm::default();
        match value {
            Value::Object(map) => {
                for (key, value) in map {
                    form.flatten(key, value);
                }
            }
            Value::Null => (),
            other => {
                return Err(ApiError::InvalidRequest(format!(
                    "expected a record, got {other}"
                )))
            }
        }
        for (key, file) in files {
            if let Some(file) = file {
                form.push(key.to_string(), FormValue::File(file));
            }
        }
        Ok(form)
    }

    fn flatten(&mut self, key: String, value: Value) {
        match value {
            Value::Null => (),
            Value::String(s) => self.push(key, FormValue::Text(s)),
            Value::Bool(b) => self.push(key, FormValue::Text(b.to_string())),
            Value::Number(n) => self.push(key, FormValue::Text(n.to_string())),
            Value::Array(items) => {
                for (index, item) in items.into_iter().enumerate() {
                    self.flatten(format!("{key}[{index}]"), item);
                }
            }
            Value::Object(map) => {
                for (child, item) in map {
                    self.flatten(format!("{key}[{child}]"), item);
                }
            }
        }
    }

    pub fn push(&mut self, key: String, value: FormValue) {
        self.fields.push((key, value));
    }

    pub fn get(&self, key: &str) -> Option<&FormValue> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            FormValue::Text(s) => Some(s),
            FormValue::File(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Builds the wire form. Local files are read here; hosted images are
    /// sent as their URL.
    pub async fn into_form(self) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for (key, value) in self.fields {
            form = match value {
                FormValue::Text(text) => form.text(key, text),
                FormValue::File(FileSource::Url(url)) => form.text(key, url),
                FormValue::File(FileSource::Uri { uri, name, mime }) => match local_path(&uri) {
                    Some(path) => {
                        let bytes = tokio::fs::read(&path)
                            .await
                            .map_err(|e| ApiError::File(format!("{}: {e}", path.display())))?;
                        let part = Part::bytes(bytes)
                            .file_name(name)
                            .mime_str(&mime)
                            .map_err(|e| ApiError::File(format!("{mime}: {e}")))?;
                        form.part(key, part)
                    }
                    None => form.text(key, uri),
                },
            };
        }
        Ok(form)
    }
}

/// `file://` URIs and bare paths are local; remote schemes are not.
fn local_path(uri: &str) -> Option<PathBuf> {
    match url::Url::parse(uri) {
        Ok(parsed) if parsed.scheme() == "file" => parsed.to_file_path().ok(),
        Ok(parsed) if parsed.scheme().len() > 1 => None,
        _ => Some(PathBuf::from(uri)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::types::{Eligibility, OfferDraft};
    use serde_json::json;

    #[test]
    fn nested_fields_get_bracketed_string_keys() {
        let draft = OfferDraft {
            bank_name: Some("ICICI".into()),
            is_featured: Some(true),
            key_features: vec!["Quick approval".into(), "Low fee".into()],
            eligibility: Some(Eligibility {
                min_age: Some(21),
                ..Default::default()
            }),
            ..Default::default()
        };
        let form = MultipartForm::from_record(&draft, [("bankImage", None)]).unwrap();
        assert_eq!(form.text("eligibility[minAge]"), Some("21"));
        assert_eq!(form.text("isFeatured"), Some("true"));
        assert_eq!(form.text("keyFeatures[1]"), Some("Low fee"));
        assert_eq!(form.text("bankName"), Some("ICICI"));
        assert!(form.get("bankImage").is_none());
        assert!(form.get("eligibility[maxAge]").is_none());
    }

    #[test]
    fn file_is_attached_under_its_key() {
        let image = FileSource::uri("file:///tmp/logo.png");
        let form = MultipartForm::from_record(
            &OfferDraft::default(),
            [("bankImage", Some(image.clone()))],
        )
        .unwrap();
        assert_eq!(form.len(), 1);
        assert_eq!(form.get("bankImage"), Some(&FormValue::File(image)));
    }

    #[test]
    fn picker_shapes_normalize_to_one_variant() {
        let expo = FileSource::from_json(&json!({
            "uri": "file:///data/photo.png", "name": "photo.png", "type": "image/png"
        }));
        let document = FileSource::from_json(&json!({
            "uri": "file:///data/photo.png", "fileName": "photo.png", "mimeType": "image/png"
        }));
        assert_eq!(expo, document);
        assert_eq!(
            expo,
            Some(FileSource::Uri {
                uri: "file:///data/photo.png".into(),
                name: "photo.png".into(),
                mime: "image/png".into(),
            })
        );
    }

    #[test]
    fn plain_strings_resolve_by_scheme() {
        assert_eq!(
            FileSource::from_json(&json!("https://cdn.example.com/hdfc.png")),
            Some(FileSource::Url("https://cdn.example.com/hdfc.png".into()))
        );
        assert_eq!(
            FileSource::from_json(&json!("file:///cache/IMG_1.HEIC")),
            Some(FileSource::Uri {
                uri: "file:///cache/IMG_1.HEIC".into(),
                name: "IMG_1.HEIC".into(),
                mime: "image/heic".into(),
            })
        );
        assert_eq!(FileSource::from_json(&json!("")), None);
        assert_eq!(FileSource::from_json(&json!(42)), None);
    }

    #[test]
    fn missing_type_falls_back_to_jpeg() {
        let source = FileSource::from_json(&json!({ "uri": "content://media/external/1" }));
        assert_eq!(
            source,
            Some(FileSource::Uri {
                uri: "content://media/external/1".into(),
                name: "1".into(),
                mime: "image/jpeg".into(),
            })
        );
    }

    #[test]
    fn local_paths_are_detected() {
        assert_eq!(
            local_path("file:///tmp/a.png"),
            Some(PathBuf::from("/tmp/a.png"))
        );
        assert_eq!(local_path("/tmp/a.png"), Some(PathBuf::from("/tmp/a.png")));
        assert_eq!(local_path("content://media/1"), None);
    }

    #[tokio::test]
    async fn missing_local_file_is_a_file_error() {
        let mut form = MultipartForm::default();
        form.push(
            "bankImage".into(),
            FormValue::File(FileSource::uri("/definitely/not/here.png")),
        );
        let result = form.into_form().await;
        assert!(matches!(result, Err(ApiError::File(_))));
    }

    #[tokio::test]
    async fn existing_local_file_builds_a_form() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, b"\x89PNG").unwrap();
        let mut form = MultipartForm::default();
        form.push("name".into(), FormValue::Text("x".into()));
        form.push(
            "bankImage".into(),
            FormValue::File(FileSource::uri(path.to_string_lossy().to_string())),
        );
        assert!(form.into_form().await.is_ok());
    }
}
