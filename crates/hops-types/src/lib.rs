//! Validated primitive types shared by the hospital-operations crates.
//!
//! Form drafts hold raw strings exactly as an operator typed them. The helpers here decide
//! whether such a value counts as "filled in" before anything is sent to the backend.

#[derive(Debug, thiserror::Error)]
pub enum TextError {
    #[error("value cannot be blank")]
    Blank,
}

/// Text with at least one non-whitespace character, stored trimmed.
///
/// Record ids typed on the command line are parsed into this, so a blank id is refused before
/// any request is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        match input.as_ref().trim() {
            "" => Err(TextError::Blank),
            trimmed => Ok(Self(trimmed.to_owned())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for NonEmptyText {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Returns true when `value` holds at least one non-whitespace character.
pub fn is_filled(value: &str) -> bool {
    NonEmptyText::new(value).is_ok()
}

/// Collects the names of required fields whose values are blank.
///
/// Order follows `fields`, so callers list fields in the order a form shows them.
pub fn missing_fields<'a>(fields: &[(&'a str, &str)]) -> Vec<&'a str> {
    fields
        .iter()
        .filter(|(_, value)| !is_filled(value))
        .map(|(name, _)| *name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_id_is_trimmed() {
        let id: NonEmptyText = "  665f0a  ".parse().expect("valid id");
        assert_eq!(id.as_str(), "665f0a");
        assert_eq!(id.to_string(), "665f0a");
    }

    #[test]
    fn whitespace_only_is_blank() {
        assert!(matches!(NonEmptyText::new(" \t\n"), Err(TextError::Blank)));
        assert!(!is_filled(""));
    }

    #[test]
    fn missing_fields_keeps_form_order() {
        let missing = missing_fields(&[
            ("patientId", "P-100"),
            ("patientName", ""),
            ("department", "  "),
            ("primaryDiagnosis", "pneumonia"),
        ]);
        assert_eq!(missing, vec!["patientName", "department"]);
    }
}
