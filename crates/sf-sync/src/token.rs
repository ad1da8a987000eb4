//! CSRF token lookup.

use sf_api_types::CSRF_COOKIE;

/// Read cookie `name` out of a `document.cookie`-style header
/// (`a=1; b=2`). The value is percent-decoded.
pub fn get_token(cookie_header: &str, name: &str) -> Option<String> {
    if cookie_header.trim().is_empty() || name.is_empty() {
        return None;
    }
    let prefix = format!("{name}=");
    cookie_header
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(prefix.as_str()))
        .map(percent_decode)
}

/// Where a page may carry the anti-forgery token, in lookup order.
#[derive(Debug, Clone, Default)]
pub struct CsrfSources {
    pub cookie_header: Option<String>,
    pub form_field: Option<String>,
    pub meta_tag: Option<String>,
}

impl CsrfSources {
    pub fn resolve(&self) -> Option<String> {
        self.cookie_header
            .as_deref()
            .and_then(|header| get_token(header, CSRF_COOKIE))
            .or_else(|| non_empty(self.form_field.as_deref()))
            .or_else(|| non_empty(self.meta_tag.as_deref()))
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// `decodeURIComponent` without the exception: malformed escapes are kept as-is.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
