pub mod credentials;
pub mod gate;
pub mod token;

pub use credentials::{CredentialError, CredentialStore, Registration};
pub use gate::{require_auth, require_role};
pub use token::{TokenClaims, TokenError, TokenService, TokenSubject};
