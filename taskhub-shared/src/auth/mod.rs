/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: HS256 access tokens
/// - [`actor`]: resolves a bearer token to the calling [`actor::Actor`]
/// - [`policy`]: the access policy evaluator, the single place where roles,
///   membership and assignment are turned into allow/deny decisions
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::auth::password::{hash_password, verify_password};
/// use taskhub_shared::auth::jwt::{create_token, validate_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let token = create_token(&Claims::new(42), "secret-key")?;
/// assert_eq!(validate_token(&token, "secret-key")?.sub, 42);
/// # Ok(())
/// # }
/// ```

pub mod actor;
pub mod jwt;
pub mod password;
pub mod policy;
