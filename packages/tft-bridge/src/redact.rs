//! Redaction of key material in logs and serialized output.

use std::fmt::{self, Debug, Display};

/// Wraps a value that must never be printed.
///
/// `Debug`, `Display` and `Serialize` all produce `<redacted>`; the value is
/// only reachable through [`Redacted::expose`].
///
/// ```
/// use tft_bridge::redact::Redacted;
///
/// let key = Redacted::new("0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80");
/// assert_eq!(format!("{}", key), "<redacted>");
/// assert_eq!(format!("{:?}", key), "<redacted>");
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Redacted<T>(T);

impl<T> Redacted<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// The wrapped value. Do not pass the result to a formatter.
    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Redacted<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> Debug for Redacted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl<T> Display for Redacted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl<T> serde::Serialize for Redacted<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        "<redacted>".serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Serialize)]
    struct Signer {
        address: &'static str,
        key: Redacted<String>,
    }

    #[test]
    fn test_nested_debug_and_json() {
        let signer = Signer {
            address: "0xf39F",
            key: Redacted::new("secret-key".to_string()),
        };

        let debug = format!("{:?}", signer);
        assert!(debug.contains("0xf39F"));
        assert!(!debug.contains("secret-key"));

        let json = serde_json::to_string(&signer).unwrap();
        assert_eq!(json, r#"{"address":"0xf39F","key":"<redacted>"}"#);
    }

    #[test]
    fn test_expose() {
        let key = Redacted::from(String::from("secret-key"));
        assert_eq!(key.expose(), "secret-key");
        assert_eq!(key.into_inner(), "secret-key");
    }
}
