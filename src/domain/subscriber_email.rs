use std::fmt::Display;

use validator::ValidateEmail;

/// A syntactically valid email address. Anything sent to Rapidmail as a
/// recipient has passed through `parse`, so the client never has to check
/// again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    /// Surrounding whitespace is dropped before validation; form fields
    /// frequently carry a trailing space or newline.
    pub fn parse(email: String) -> Result<Self, String> {
        let email = email.trim().to_string();
        ValidateEmail::validate_email(&email)
            .then_some(Self(email.clone()))
            .ok_or(format!("Invalid email: {email:?}"))
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str { &self.0 }
}

impl Display for SubscriberEmail {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
