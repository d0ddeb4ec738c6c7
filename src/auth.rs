//! Authentication gate.
//!
//! Credentials are not checked against any store: a login or signup
//! succeeds whenever every field is filled in.

use tracing::debug;

/// Decides whether a login or signup attempt succeeds.
pub trait AuthGate {
    fn attempt_login(&self, email: &str, password: &str) -> bool;
    fn attempt_signup(&self, name: &str, email: &str, password: &str) -> bool;
}

/// Accepts any attempt whose fields are all non-empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockAuthGate;

impl AuthGate for MockAuthGate {
    fn attempt_login(&self, email: &str, password: &str) -> bool {
        let accepted = all_filled(&[email, password]);
        debug!("Login attempt for '{}': accepted={}", email, accepted);
        accepted
    }

    fn attempt_signup(&self, name: &str, email: &str, password: &str) -> bool {
        let accepted = all_filled(&[name, email, password]);
        debug!("Signup attempt for '{}': accepted={}", email, accepted);
        accepted
    }
}

fn all_filled(fields: &[&str]) -> bool {
    fields.iter().all(|field| !field.is_empty())
}
