use validator::validate_email;

/// Syntactic e-mail check used for the built-in candidate email field.
/// The domain must also be dotted; bare hosts are not accepted.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    validate_email(email)
        && email
            .rsplit_once('@')
            .is_some_and(|(_, domain)| domain.contains('.'))
}

/// Canonical form stored on applications and used for idempotency keys.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
