//! Multipart body assembly from file and text fields.

use std::path::{Path, PathBuf};

use reqwest::multipart::{Form, Part};

/// Content type used when a file extension is unknown.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

const CONTENT_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("svg", "image/svg+xml"),
    ("heic", "image/heic"),
    ("pdf", "application/pdf"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("zip", "application/zip"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("xls", "application/vnd.ms-excel"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    ("txt", "text/plain"),
    ("csv", "text/csv"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("mp3", "audio/mpeg"),
    ("m4a", "audio/mp4"),
    ("wav", "audio/wav"),
    ("mp4", "video/mp4"),
    ("mov", "video/quicktime"),
];

/// Looks up the content type for a file from its extension.
pub fn content_type_for(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| {
            CONTENT_TYPES
                .iter()
                .find(|(known, _)| known.eq_ignore_ascii_case(ext))
                .map(|(_, content_type)| *content_type)
        })
        .unwrap_or(FALLBACK_CONTENT_TYPE)
}

/// File and text fields of a multipart request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MultipartForm {
    files: Vec<(String, PathBuf)>,
    fields: Vec<(String, String)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a form from `field -> file` and `field -> text` mappings.
    pub fn from_maps<F, T, K, P, J, V>(files: F, fields: T) -> Self
    where
        F: IntoIterator<Item = (K, P)>,
        T: IntoIterator<Item = (J, V)>,
        K: Into<String>,
        P: Into<PathBuf>,
        J: Into<String>,
        V: Into<String>,
    {
        Self {
            files: files
                .into_iter()
                .map(|(name, path)| (name.into(), path.into()))
                .collect(),
            fields: fields
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }

    /// Adds a file part.
    pub fn file(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.files.push((name.into(), path.into()));
        self
    }

    /// Adds a plain text part.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Reads every file into memory so the form can be re-encoded per attempt.
    pub(crate) async fn load(self) -> Result<LoadedForm, String> {
        let mut files = Vec::with_capacity(self.files.len());
        for (field, path) in self.files {
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|err| format!("failed to read '{}': {err}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| field.clone());
            files.push(LoadedFile {
                content_type: content_type_for(&path),
                field,
                file_name,
                bytes,
            });
        }
        Ok(LoadedForm {
            files,
            fields: self.fields,
        })
    }
}

#[derive(Debug)]
pub(crate) struct LoadedFile {
    field: String,
    file_name: String,
    content_type: &'static str,
    bytes: Vec<u8>,
}

/// A [`MultipartForm`] whose files have been read.
#[derive(Debug)]
pub(crate) struct LoadedForm {
    files: Vec<LoadedFile>,
    fields: Vec<(String, String)>,
}

impl LoadedForm {
    pub(crate) fn to_form(&self) -> Result<Form, reqwest::Error> {
        let mut form = Form::new();
        for (name, value) in &self.fields {
            form = form.text(name.clone(), value.clone());
        }
        for file in &self.files {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.file_name.clone())
                .mime_str(file.content_type)?;
            form = form.part(file.field.clone(), part);
        }
        Ok(form)
    }
}
