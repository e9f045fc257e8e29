//! Proveedor de identidad: entrega el `UserId` del usuario autenticado.

use std::sync::{Arc, RwLock};

use crate::model::UserId;

/// Colaborador externo de autenticación. `None` significa "no autenticado".
pub trait IdentityProvider {
    fn current_user(&self) -> Option<UserId>;
}

impl<T: IdentityProvider + ?Sized> IdentityProvider for Arc<T> {
    fn current_user(&self) -> Option<UserId> {
        (**self).current_user()
    }
}

/// Identidad de sesión mutable (login / logout durante la vida del flujo).
#[derive(Debug, Default)]
pub struct SessionIdentity {
    user: RwLock<Option<UserId>>,
}

impl SessionIdentity {
    pub fn authenticated(user: UserId) -> Self {
        Self { user: RwLock::new(Some(user)) }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, user: UserId) {
        *self.user.write().unwrap_or_else(|p| p.into_inner()) = Some(user);
    }

    pub fn sign_out(&self) {
        *self.user.write().unwrap_or_else(|p| p.into_inner()) = None;
    }
}

impl IdentityProvider for SessionIdentity {
    fn current_user(&self) -> Option<UserId> {
        *self.user.read().unwrap_or_else(|p| p.into_inner())
    }
}
