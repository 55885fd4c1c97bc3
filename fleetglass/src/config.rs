use crate::errors::AutomationError;

/// Named configuration values for the portal login.
///
/// Sourced from the environment; the CLI loads `.env` before asking for them.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub login_id: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self, AutomationError> {
        Ok(Self {
            username: require("FLEETGLASS_USERNAME")?,
            password: require("FLEETGLASS_PASSWORD")?,
            login_id: require("FLEETGLASS_LOGIN_ID")?,
        })
    }
}

// Keep secrets out of debug logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .field("login_id", &self.login_id)
            .finish()
    }
}

fn require(key: &str) -> Result<String, AutomationError> {
    std::env::var(key)
        .map_err(|_| AutomationError::InvalidArgument(format!("missing configuration value {key}")))
        .and_then(|v| {
            let v = v.trim().to_string();
            if v.is_empty() {
                Err(AutomationError::InvalidArgument(format!(
                    "configuration value {key} is empty"
                )))
            } else {
                Ok(v)
            }
        })
}
