/// Persistence
///
/// Store traits consumed by the session service and handlers, with Postgres
/// and in-memory implementations.

mod chirps;
mod memory;
mod refresh_tokens;
mod users;

pub(crate) use chirps::chirp_not_found;
pub use chirps::Chirp;
pub use chirps::ChirpStore;
pub use chirps::ChirpView;
pub use chirps::PgChirpStore;
pub use memory::InMemoryChirpStore;
pub use memory::InMemoryRefreshTokenStore;
pub use memory::InMemoryUserStore;
pub use refresh_tokens::PgRefreshTokenStore;
pub use refresh_tokens::RefreshToken;
pub use refresh_tokens::RefreshTokenStore;
pub use users::PgUserStore;
pub use users::User;
pub use users::UserProfile;
pub use users::UserStore;
