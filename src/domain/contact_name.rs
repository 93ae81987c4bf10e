use unicode_segmentation::UnicodeSegmentation;

/// First or last name of a contact, as forwarded to Rapidmail.
///
/// Unlike the email, a name is optional: a form without a name field maps to
/// an empty `ContactName`, which Rapidmail accepts. What is rejected is input
/// that cannot be a name at all: more than 256 graphemes, or control
/// characters (typically a textarea mapped to the wrong field).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactName(String);

impl ContactName {
    pub fn parse(name: String) -> Result<Self, String> {
        let name = name.trim().to_string();
        let too_long = name.graphemes(true).count() > 256;
        let bad = name.chars().any(char::is_control);
        match !too_long && !bad {
            true => Ok(Self(name)),
            false => Err(format!("Invalid name: {name:?}")),
        }
    }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl AsRef<str> for ContactName {
    fn as_ref(&self) -> &str { &self.0 }
}
