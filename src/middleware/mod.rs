/// Middleware module
///
/// Access token verification for protected resources.

mod jwt_middleware;

pub use jwt_middleware::AuthenticatedUser;
pub use jwt_middleware::JwtMiddleware;
