use secrecy::SecretString;

/// Header carrying the session token, both on the login response and on
/// every authenticated request.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Factory account name on EdgeSwitch devices.
pub const DEFAULT_USERNAME: &str = "ubnt";

/// Username/password pair used to open a session.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}
