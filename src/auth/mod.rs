pub mod password;
pub mod session;

use serde::{Deserialize, Serialize};

pub use password::{authenticate, AuthError};
pub use session::{AuthSession, RequireAuth, SessionKeys};

/// The authenticated user's minimal public profile. Never contains the
/// password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub surname: String,
    pub role: String,
}

impl From<crate::db::User> for Identity {
    fn from(user: crate::db::User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            surname: user.surname,
            role: user.role,
        }
    }
}
