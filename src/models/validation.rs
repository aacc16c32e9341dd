//! Structural validation of admin request bodies.
//!
//! Bodies arrive as raw bytes. Each validator parses them into a JSON object,
//! checks the exact field set and field types, and returns either the typed
//! value or every field error it found.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use super::{article::Article, site::Site};

/// A single problem with a request body.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

impl FieldError {
    fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Outcome of validating a request body.
#[derive(Debug, PartialEq)]
pub enum Validation<T> {
    Valid(T),
    Invalid(Vec<FieldError>),
}

impl<T> Validation<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn into_result(self) -> Result<T, Vec<FieldError>> {
        match self {
            Self::Valid(value) => Ok(value),
            Self::Invalid(errors) => Err(errors),
        }
    }
}

/// Join field errors into one human-readable line.
pub fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Body of `DELETE /admin/article`.
#[derive(Clone, Debug, PartialEq)]
pub struct ArticleRef {
    pub uuid: String,
}

/// Body of `DELETE /admin/attachment`.
#[derive(Clone, Debug, PartialEq)]
pub struct AttachmentRef {
    pub filename: String,
}

/// Body of `PUT /admin/attachment`.
#[derive(Clone, Debug, PartialEq)]
pub struct RelinkRequest {
    pub filename: String,
    pub article_uuid: String,
}

/// Body of `POST /public/login`.
#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

const ARTICLE_FIELDS: [&str; 5] = ["uuid", "title", "created_time", "content", "updated_time"];
const SITE_FIELDS: [&str; 5] = ["title", "description", "github", "email", "footer"];

pub fn validate_article(body: &[u8]) -> Validation<Article> {
    let mut fields = match Fields::parse(body) {
        Ok(fields) => fields,
        Err(err) => return Validation::Invalid(vec![err]),
    };
    fields.exactly(&ARTICLE_FIELDS);
    let uuid = fields.key_segment("uuid");
    let title = fields.string("title", true);
    let created_time = fields.number("created_time");
    let content = fields.string("content", false);
    let updated_time = fields.number("updated_time");

    match (uuid, title, created_time, content, updated_time) {
        (Some(uuid), Some(title), Some(created_time), Some(content), Some(updated_time))
            if fields.errors.is_empty() =>
        {
            Validation::Valid(Article {
                uuid,
                title,
                created_time,
                content,
                updated_time,
            })
        }
        _ => Validation::Invalid(fields.errors),
    }
}

pub fn validate_site(body: &[u8]) -> Validation<Site> {
    let mut fields = match Fields::parse(body) {
        Ok(fields) => fields,
        Err(err) => return Validation::Invalid(vec![err]),
    };
    fields.exactly(&SITE_FIELDS);
    let title = fields.string("title", true);
    let description = fields.string("description", false);
    let github = fields.string("github", false);
    let email = fields.string("email", false);
    let footer = fields.string("footer", false);

    match (title, description, github, email, footer) {
        (Some(title), Some(description), Some(github), Some(email), Some(footer))
            if fields.errors.is_empty() =>
        {
            Validation::Valid(Site {
                title,
                description,
                github,
                email,
                footer,
            })
        }
        _ => Validation::Invalid(fields.errors),
    }
}

pub fn validate_article_ref(body: &[u8]) -> Validation<ArticleRef> {
    let mut fields = match Fields::parse(body) {
        Ok(fields) => fields,
        Err(err) => return Validation::Invalid(vec![err]),
    };
    match fields.key_segment("uuid") {
        Some(uuid) => Validation::Valid(ArticleRef { uuid }),
        None => Validation::Invalid(fields.errors),
    }
}

pub fn validate_attachment_ref(body: &[u8]) -> Validation<AttachmentRef> {
    let mut fields = match Fields::parse(body) {
        Ok(fields) => fields,
        Err(err) => return Validation::Invalid(vec![err]),
    };
    match fields.string("filename", true) {
        Some(filename) => Validation::Valid(AttachmentRef { filename }),
        None => Validation::Invalid(fields.errors),
    }
}

pub fn validate_relink(body: &[u8]) -> Validation<RelinkRequest> {
    let mut fields = match Fields::parse(body) {
        Ok(fields) => fields,
        Err(err) => return Validation::Invalid(vec![err]),
    };
    let filename = fields.string("filename", true);
    let article_uuid = fields.string("article_uuid", true);
    match (filename, article_uuid) {
        (Some(filename), Some(article_uuid)) => Validation::Valid(RelinkRequest {
            filename,
            article_uuid,
        }),
        _ => Validation::Invalid(fields.errors),
    }
}

/// Login bodies only need to be JSON. A missing or non-string username or
/// password yields `Valid(None)`, which the caller treats as a failed login.
pub fn validate_credentials(body: &[u8]) -> Validation<Option<Credentials>> {
    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(err) => {
            return Validation::Invalid(vec![FieldError::new(
                "body",
                format!("not valid JSON: {err}"),
            )]);
        }
    };
    let field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_string);
    Validation::Valid(
        field("username")
            .zip(field("password"))
            .map(|(username, password)| Credentials { username, password }),
    )
}

/// A parsed JSON object plus the errors collected while reading it.
struct Fields {
    object: Map<String, Value>,
    errors: Vec<FieldError>,
}

impl Fields {
    fn parse(body: &[u8]) -> Result<Self, FieldError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|err| FieldError::new("body", format!("not valid JSON: {err}")))?;
        match value {
            Value::Object(object) => Ok(Self {
                object,
                errors: Vec::new(),
            }),
            _ => Err(FieldError::new("body", "expected a JSON object")),
        }
    }

    /// Record an error for every missing or unexpected field.
    fn exactly(&mut self, expected: &[&str]) {
        for key in self.object.keys() {
            if !expected.contains(&key.as_str()) {
                self.errors.push(FieldError::new(key.clone(), "unexpected field"));
            }
        }
    }

    fn string(&mut self, field: &str, non_empty: bool) -> Option<String> {
        match self.object.get(field) {
            Some(Value::String(s)) if non_empty && s.is_empty() => {
                self.errors.push(FieldError::new(field, "must not be empty"));
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.errors.push(FieldError::new(field, "must be a string"));
                None
            }
            None => {
                self.errors.push(FieldError::new(field, "is required"));
                None
            }
        }
    }

    fn number(&mut self, field: &str) -> Option<f64> {
        match self.object.get(field) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(_) => {
                self.errors.push(FieldError::new(field, "must be a number"));
                None
            }
            None => {
                self.errors.push(FieldError::new(field, "is required"));
                None
            }
        }
    }

    /// A non-empty string usable as exactly one key segment.
    fn key_segment(&mut self, field: &str) -> Option<String> {
        let value = self.string(field, true)?;
        if value.contains('/') || value.contains("..") || value.chars().any(char::is_control) {
            self.errors
                .push(FieldError::new(field, "must not contain '/', '..' or control characters"));
            return None;
        }
        Some(value)
    }
}
