use crate::domain_model::*;
use crate::domain_port::*;
use parking_lot::RwLock;

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    pair: RwLock<CredentialPair>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(pair: CredentialPair) -> Self {
        Self {
            pair: RwLock::new(pair),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn access(&self) -> Option<Token> {
        self.pair.read().access.clone()
    }

    fn refresh(&self) -> Option<Token> {
        self.pair.read().refresh.clone()
    }

    fn snapshot(&self) -> CredentialPair {
        self.pair.read().clone()
    }

    fn set(&self, update: CredentialPair) {
        self.pair.write().merge(update);
    }

    fn clear(&self) {
        *self.pair.write() = CredentialPair::default();
    }
}
