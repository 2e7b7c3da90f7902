//! Helper services handed to the blog producers.

use resource_graph::{Encrypter, PathResolver, Transformer, Value};

/// Resolves resource paths against a fixed base URL.
#[derive(Debug, Clone)]
pub struct BaseUrlPath {
    base: String,
}

impl BaseUrlPath {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }
}

impl PathResolver for BaseUrlPath {
    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Hides sequential ids behind a salted hexadecimal form.
#[derive(Debug, Clone, Copy)]
pub struct HexEncrypter {
    salt: i64,
}

impl HexEncrypter {
    pub fn new(salt: i64) -> Self {
        Self { salt }
    }
}

impl Encrypter for HexEncrypter {
    // Negative ids go through their unsigned bit pattern so they parse back.
    fn encrypt_id(&self, id: i64) -> String {
        format!("{:x}", (id ^ self.salt) as u64)
    }

    fn decrypt_id(&self, encrypted: &str) -> Option<i64> {
        u64::from_str_radix(encrypted, 16)
            .ok()
            .map(|bits| bits as i64 ^ self.salt)
    }
}

/// Formats fields for the viewer of a build. Anonymous viewers see masked email
/// addresses; staff see them as stored.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewerTransformer {
    staff: bool,
}

impl ViewerTransformer {
    pub fn anonymous() -> Self {
        Self { staff: false }
    }

    pub fn staff() -> Self {
        Self { staff: true }
    }
}

impl Transformer for ViewerTransformer {
    fn transform(&self, field: &str, value: &Value) -> Value {
        match (field, value.as_str()) {
            ("email", Some(email)) if !self.staff => Value::String(mask_email(email)),
            _ => value.clone(),
        }
    }
}

fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@{}", first, domain)
        }
        None => "***".to_string(),
    }
}
