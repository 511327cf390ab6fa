pub mod cors;
pub mod identity;
pub mod jwt;
pub mod password;

pub use cors::{create_cors_layer, CorsConfig};
pub use identity::{IdentityError, IdentityProvider, JwtIdentityProvider};
pub use jwt::{extract_bearer_token, Claims, JwtConfig, JwtManager, TokenPair, TokenType};
pub use password::{validate_password, Argon2Config, PasswordHasher};
