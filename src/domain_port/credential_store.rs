use crate::domain_model::*;

/// Process-wide holder of the access/refresh pair.
///
/// Implementations never fail: persistence problems are logged, not
/// returned. Every write is applied under a single lock so readers never
/// observe a half-updated pair.
pub trait CredentialStore: Send + Sync {
    fn access(&self) -> Option<Token>;
    fn refresh(&self) -> Option<Token>;
    fn snapshot(&self) -> CredentialPair;
    /// Replace only the fields present in `update`.
    fn set(&self, update: CredentialPair);
    /// Remove both credentials. Idempotent.
    fn clear(&self);
}
