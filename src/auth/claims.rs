/// Access token claims
///
/// Registered claims only (RFC 7519). The subject is the user's UUID as a
/// string; parsing it back is part of verification.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed issuer stamped into every access token
pub const ISSUER: &str = "chirpy";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Issuer
    pub iss: String,
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Claims for `subject`, valid from now for `ttl`
    pub fn new(subject: Uuid, ttl: chrono::Duration) -> Self {
        let now = chrono::Utc::now();
        Self {
            iss: ISSUER.to_string(),
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Subject as a well-formed identity, if it is one
    pub fn subject(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_creation() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, chrono::Duration::seconds(3600));

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_subject_extraction() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, chrono::Duration::seconds(60));

        assert_eq!(claims.subject(), Some(user_id));
    }

    #[test]
    fn test_invalid_subject() {
        let mut claims = Claims::new(Uuid::new_v4(), chrono::Duration::seconds(60));
        claims.sub = "invalid-uuid".to_string();

        assert!(claims.subject().is_none());
    }
}
