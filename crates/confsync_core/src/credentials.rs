//! Platform administrator credentials used in remote mode.

use std::fmt;
use zeroize::Zeroizing;

/// Name of the property holding the platform administrator user name.
pub const USERNAME_PROPERTY: &str = "platform.admin.username";

/// Name of the property holding the platform administrator password.
pub const PASSWORD_PROPERTY: &str = "platform.admin.password";

/// Administrator user name and password.
///
/// Values are not validated locally; whatever is configured is forwarded to
/// the platform, which decides whether to accept it. The password is wiped
/// from memory on drop and never printed.
#[derive(Clone, Default)]
pub struct Credentials {
    username: String,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Creates credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    /// Returns the user name.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_password() {
        let credentials = Credentials::new("platformAdmin", "s3cret");
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("platformAdmin"));
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn default_is_empty() {
        let credentials = Credentials::default();
        assert_eq!(credentials.username(), "");
        assert_eq!(credentials.password(), "");
    }
}
