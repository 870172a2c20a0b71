//! Random token generation for session artifacts.

/// Default length for the anti-forgery token (in characters).
pub const ANTI_FORGERY_TOKEN_LENGTH: usize = 32;

/// Default length for the opaque session id (in characters).
pub const SESSION_ID_LENGTH: usize = 16;

/// Generates a random alphanumeric token.
///
/// The token consists of characters a-z, A-Z, 0-9, providing
/// approximately 5.95 bits of entropy per character.
///
/// # Example
///
/// ```rust
/// use gatehouse::crypto::generate_token;
///
/// let token = generate_token(32);
/// assert_eq!(token.len(), 32);
/// ```
pub fn generate_token(length: usize) -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(rng.sample(rand::distributions::Alphanumeric)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_length() {
        assert_eq!(generate_token(16).len(), 16);
        assert_eq!(generate_token(32).len(), 32);
        assert_eq!(generate_token(64).len(), 64);
    }

    #[test]
    fn test_generate_token_unique() {
        assert_ne!(generate_token(32), generate_token(32));
    }

    #[test]
    fn test_generate_token_alphanumeric() {
        let token = generate_token(100);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
