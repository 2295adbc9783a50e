/// Authentication module
///
/// Access token issue/verification, password hashing, refresh token
/// generation, credential extraction and the session service composing them.

mod claims;
mod extract;
mod jwt;
mod password;
mod refresh_token;
mod session;

pub use claims::Claims;
pub use claims::ISSUER;
pub use extract::api_key;
pub use extract::bearer_token;
pub use jwt::encode_access_token;
pub use jwt::issue_access_token;
pub use jwt::verify_access_token;
pub use password::hash_password;
pub use password::verify_password;
pub use refresh_token::generate_refresh_token;
pub use session::LoginResponse;
pub use session::RefreshResponse;
pub use session::SessionService;
