//! Thread-safe handle.

use crate::error::AccessError;
use crate::service::AccessControlService;
use std::sync::{Arc, Mutex};

/// Cloneable handle that serializes callers onto one service instance.
///
/// Every closure passed to [`SharedAccessControl::with`] runs under the lock,
/// so a multi-step interaction is never interleaved with another caller.
#[derive(Clone)]
pub struct SharedAccessControl {
    inner: Arc<Mutex<AccessControlService>>,
}

impl SharedAccessControl {
    pub fn new(service: AccessControlService) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    pub fn with<T>(
        &self,
        f: impl FnOnce(&mut AccessControlService) -> Result<T, AccessError>,
    ) -> Result<T, AccessError> {
        let mut service = self.inner.lock().map_err(|_| AccessError::LockPoisoned)?;
        f(&mut service)
    }

    /// Read-only access; never mutates state.
    pub fn read<T>(&self, f: impl FnOnce(&AccessControlService) -> T) -> Result<T, AccessError> {
        let service = self.inner.lock().map_err(|_| AccessError::LockPoisoned)?;
        Ok(f(&service))
    }
}

impl From<AccessControlService> for SharedAccessControl {
    fn from(service: AccessControlService) -> Self {
        Self::new(service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_types::MemberId;

    #[test]
    fn poisoned_lock_is_reported() {
        let shared = SharedAccessControl::new(AccessControlService::with_defaults(MemberId::new("admin")));

        let poisoner = shared.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.inner.lock().unwrap();
            panic!("poison");
        })
        .join();

        assert!(matches!(shared.read(|svc| svc.members().len()), Err(AccessError::LockPoisoned)));
    }
}
