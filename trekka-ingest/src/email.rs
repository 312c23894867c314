use serde::Deserialize;

/// One message as delivered by the inbound mail relay.
///
/// Every field is optional on the wire; [`crate::Ingestor`] decides what is
/// actually required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundEmail {
    pub to: Option<String>,
    pub from: Option<String>,
    pub subject: Option<String>,
    pub text: Option<String>,
    pub html: Option<String>,
}

impl InboundEmail {
    pub fn to(&self) -> Option<&str> {
        non_empty(&self.to)
    }

    pub fn subject(&self) -> Option<&str> {
        non_empty(&self.subject)
    }

    pub fn from(&self) -> &str {
        non_empty(&self.from).unwrap_or("")
    }

    /// Plain text when present, HTML otherwise.
    pub fn body(&self) -> Option<&str> {
        non_empty(&self.text).or_else(|| non_empty(&self.html))
    }

    /// Lower-cased local part of the first recipient.
    ///
    /// `"Jane <JaNe-7f3k@import.trekka.app>, other@x"` yields `jane-7f3k`.
    pub fn import_token(&self) -> Option<String> {
        let first = self.to()?.split(',').next()?.trim();
        let address = match (first.find('<'), first.rfind('>')) {
            (Some(open), Some(close)) if open < close => &first[open + 1..close],
            _ => first,
        };
        let local = address.split('@').next()?.trim().to_lowercase();
        (!local.is_empty()).then_some(local)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// First `max_chars` characters of `s`, never splitting a code point.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
