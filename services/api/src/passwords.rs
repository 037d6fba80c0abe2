//! Salted Argon2 password hashing

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};

/// Hashes and verifies account passwords
///
/// Hashing is CPU bound, so callers run it on the blocking thread pool.
#[derive(Clone, Default)]
pub struct Passwords {
    argon2: Argon2<'static>,
}

impl Passwords {
    /// Argon2id with explicit cost parameters
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, argon2::Error> {
        let params = Params::new(m_cost, t_cost, p_cost, None)?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, password: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        Ok(self
            .argon2
            .hash_password(password.as_bytes(), &salt)?
            .to_string())
    }

    /// Check a password against a stored PHC hash string
    ///
    /// An unparseable stored hash never verifies.
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        match PasswordHash::new(stored_hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passwords() -> Passwords {
        Passwords::with_params(8, 1, 1).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let passwords = passwords();
        let hash = passwords.hash("hunter2").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(passwords.verify("hunter2", &hash));
        assert!(!passwords.verify("hunter3", &hash));
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        let passwords = passwords();
        assert_ne!(
            passwords.hash("hunter2").unwrap(),
            passwords.hash("hunter2").unwrap()
        );
    }

    #[test]
    fn test_plaintext_stored_value_never_verifies() {
        assert!(!passwords().verify("hunter2", "hunter2"));
    }
}
