use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

/// A login account. Passwords are stored as given; see the login handler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserAccount {
    pub username: String,
    pub password: String,
    pub role: Role,
}

impl UserAccount {
    /// Checks a login attempt against this account.
    pub fn matches(&self, username: &str, password: &str, role: Role) -> bool {
        let password_ok: bool = self.password.as_bytes().ct_eq(password.as_bytes()).into();
        self.username == username && self.role == role && password_ok
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "student")]
    Requester,
    Moderator,
    Gatekeeper,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Requester => "requester",
            Role::Moderator => "moderator",
            Role::Gatekeeper => "gatekeeper",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "requester" | "student" => Ok(Role::Requester),
            "moderator" => Ok(Role::Moderator),
            "gatekeeper" => Ok(Role::Gatekeeper),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}
