//! Decoding of the add-item form (`application/x-www-form-urlencoded`).

/// The single field submitted by the page form.
///
/// A missing `text` field decodes to an empty string so the domain
/// validation reports it the same way as a blank submission.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddItemForm {
    pub text: String,
}

impl AddItemForm {
    pub fn from_body(body: &[u8]) -> Self {
        let raw = String::from_utf8_lossy(body);
        Self {
            text: parse_form_field(&raw, "text").unwrap_or_default(),
        }
    }
}

/// Find a field in an urlencoded body and return its decoded value.
///
/// The first occurrence wins. `+` decodes to a space.
pub fn parse_form_field(body: &str, name: &str) -> Option<String> {
    for pair in body.split('&') {
        let mut it = pair.splitn(2, '=');
        let key = it.next().map(decode_component)?;
        if key == name {
            return Some(it.next().map(decode_component).unwrap_or_default());
        }
    }
    None
}

// Invalid percent-escapes fall back to the raw text.
fn decode_component(s: &str) -> String {
    let spaced = s.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(v) => v.into_owned(),
        Err(_) => spaced,
    }
}
