//! Signed role tokens.
//!
//! A token has the form `<role>.<hex hmac-sha256>`, so a client cannot
//! self-assign a role by editing a header. Which roles may do what is not
//! decided here; that check lives in the service gate.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use taskdeck_core::Role;

type HmacSha256 = Hmac<Sha256>;

/// Mints and verifies role tokens with a shared secret.
pub struct TokenSigner {
    secret: Vec<u8>,
}

impl TokenSigner {
    /// Build a signer around the configured secret.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret)
            .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"))
    }

    /// Mint a token carrying `role`.
    #[must_use]
    pub fn issue(&self, role: Role) -> String {
        let mut mac = self.mac();
        mac.update(role.as_str().as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());
        format!("{role}.{signature}")
    }

    /// Return the embedded role when the signature checks out.
    ///
    /// Any malformed or tampered token yields `None`; callers degrade to
    /// [`Role::Guest`].
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<Role> {
        let (label, signature_hex) = token.split_once('.')?;
        let role: Role = label.parse().ok()?;
        let signature = hex::decode(signature_hex).ok()?;
        let mut mac = self.mac();
        mac.update(label.as_bytes());
        mac.verify_slice(&signature).ok()?;
        Some(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_verify() {
        let signer = TokenSigner::new("secret");
        for role in [Role::Admin, Role::User, Role::Guest] {
            let token = signer.issue(role);
            assert_eq!(signer.verify(&token), Some(role));
        }
    }

    #[test]
    fn tampered_role_is_rejected() {
        let signer = TokenSigner::new("secret");
        let token = signer.issue(Role::User);
        let forged = token.replacen("user", "admin", 1);
        assert_eq!(signer.verify(&forged), None);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = TokenSigner::new("secret-a").issue(Role::Admin);
        assert_eq!(TokenSigner::new("secret-b").verify(&token), None);
    }

    #[test]
    fn garbage_is_rejected() {
        let signer = TokenSigner::new("secret");
        assert_eq!(signer.verify(""), None);
        assert_eq!(signer.verify("admin"), None);
        assert_eq!(signer.verify("admin.nothex"), None);
        assert_eq!(signer.verify("superuser.00ff"), None);
    }
}
