use serde::{Serialize, Deserialize, Serializer};
use std::fmt;

/// Wraps sensitive values (sender addresses, provider API keys) so they never
/// show up in `Debug`/`Display` output, e.g. `tracing::info!("{:?}", config)`.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(pub T);

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Responses need the real value; only log formatting is masked.
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl Masked<String> {
    /// Keeps the domain of an email address visible for debugging
    /// (`********@example.com`), masks everything else.
    pub fn redacted_email(&self) -> String {
        match self.0.rsplit_once('@') {
            Some((_, domain)) if !domain.is_empty() => format!("********@{}", domain.trim_end_matches('>')),
            _ => "********".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_hides_value_in_logs() {
        let key = Masked("sk-live-secret".to_string());
        assert_eq!(format!("{:?}", key), "********");
        assert_eq!(format!("{}", key), "********");
        assert_eq!(serde_json::to_value(&key).unwrap(), "sk-live-secret");
    }

    #[test]
    fn test_redacted_email_keeps_domain() {
        let from = Masked("Jane <jane@airline.example>".to_string());
        assert_eq!(from.redacted_email(), "********@airline.example");
        assert_eq!(Masked("nobody".to_string()).redacted_email(), "********");
    }
}
