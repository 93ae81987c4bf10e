use secrecy::ExposeSecret;
use secrecy::Secret;

/// Rapidmail API user, as stored by the host. `status` records whether the
/// pair was accepted by `GET /apiusers` when it was saved.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: Secret<String>,
    pub status: bool,
}

impl Credentials {
    /// A blank username or password can never authenticate, so no request is
    /// made with such a pair
    pub fn is_empty(&self) -> bool {
        self.username.trim().is_empty() || self.password.expose_secret().trim().is_empty()
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: Secret::new(String::new()),
            status: false,
        }
    }
}
