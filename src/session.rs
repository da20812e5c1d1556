//! Per-invocation session context.
//!
//! Holds who is acting and which currency dashboard figures are shown in.
//! One `Session` is built at startup and passed to the handlers that need it.

use crate::currency::CurrencyConverter;
use crate::error::ValidationError;
use crate::models::{Role, UserProfile};

/// The USD/COP toggle for dashboard-level aggregates.
///
/// Project figures always use the project's own converter instead.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCurrency {
    Usd,
    Cop(CurrencyConverter),
}

impl DisplayCurrency {
    pub fn cop(rate: f64) -> Result<Self, ValidationError> {
        Ok(Self::Cop(CurrencyConverter::new("COP", rate)?))
    }

    pub fn from_code(code: &str, cop_rate: f64) -> Result<Self, ValidationError> {
        match code.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "COP" => Self::cop(cop_rate),
            other => Err(ValidationError::InvalidVariant {
                field: "display currency",
                value: other.to_string(),
            }),
        }
    }

    pub fn toggle(&self, cop_rate: f64) -> Result<Self, ValidationError> {
        match self {
            Self::Usd => Self::cop(cop_rate),
            Self::Cop(_) => Ok(Self::Usd),
        }
    }

    pub fn converter(&self) -> CurrencyConverter {
        match self {
            Self::Usd => CurrencyConverter::usd(),
            Self::Cop(converter) => converter.clone(),
        }
    }
}

/// What a user is allowed to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ManageFinances,
    EditOperations,
    ManageUsers,
}

impl Capability {
    fn granted_to(&self, role: Role) -> bool {
        match self {
            Capability::ManageFinances => role.can_manage_finances(),
            Capability::EditOperations => role.can_edit_operations(),
            Capability::ManageUsers => role.can_manage_users(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    user: Option<UserProfile>,
    display: DisplayCurrency,
}

impl Session {
    pub fn new(user: Option<UserProfile>, display: DisplayCurrency) -> Self {
        if let Some(u) = &user {
            tracing::debug!(user = %u.email, role = %u.role, "session opened");
        }
        Self { user, display }
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Option<i32> {
        self.user.as_ref().map(|u| u.id)
    }

    pub fn display(&self) -> &DisplayCurrency {
        &self.display
    }

    pub fn set_display(&mut self, display: DisplayCurrency) {
        self.display = display;
    }

    /// Fail unless the session user holds `capability`
    pub fn require(&self, capability: Capability) -> Result<&UserProfile, ValidationError> {
        let user = self.user.as_ref().ok_or_else(|| {
            ValidationError::PermissionDenied("this action needs a user, pass --as-user <email>".to_string())
        })?;

        if !capability.granted_to(user.role) {
            return Err(ValidationError::PermissionDenied(format!(
                "{} ({}) may not {}",
                user.email,
                user.role,
                match capability {
                    Capability::ManageFinances => "manage contracts or payments",
                    Capability::EditOperations => "edit operational records",
                    Capability::ManageUsers => "manage users",
                }
            )));
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> UserProfile {
        UserProfile {
            id: 4,
            email: "ana@epc.co".into(),
            full_name: "Ana Ruiz".into(),
            role,
        }
    }

    #[test]
    fn display_toggle_switches_currency() {
        let d = DisplayCurrency::from_code("usd", 4000.0).unwrap();
        assert_eq!(d.converter().to_display(100.0), "100.00");

        let d = d.toggle(4000.0).unwrap();
        assert_eq!(d.converter().to_display(100.0), "400,000");
        assert_eq!(d.toggle(4000.0).unwrap(), DisplayCurrency::Usd);
    }

    #[test]
    fn display_rejects_bad_input() {
        assert!(DisplayCurrency::from_code("COP", 0.0).is_err());
        assert!(DisplayCurrency::from_code("MXN", 17.0).is_err());
    }

    #[test]
    fn roles_gate_capabilities() {
        let anon = Session::new(None, DisplayCurrency::Usd);
        assert!(anon.require(Capability::EditOperations).is_err());

        let engineer = Session::new(Some(user(Role::Engineer)), DisplayCurrency::Usd);
        assert!(engineer.require(Capability::EditOperations).is_ok());
        assert!(engineer.require(Capability::ManageFinances).is_err());

        let pm = Session::new(Some(user(Role::ProjectManager)), DisplayCurrency::Usd);
        assert!(pm.require(Capability::ManageFinances).is_ok());
        assert!(pm.require(Capability::ManageUsers).is_err());

        let admin = Session::new(Some(user(Role::Admin)), DisplayCurrency::Usd);
        assert_eq!(admin.require(Capability::ManageUsers).unwrap().id, 4);
    }
}
