//! Admin session gate
//!
//! A single shared PIN compared on entry; on match the caller holds an opaque
//! session value for the rest of the process. Deliberately not a hardened
//! security boundary.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct AdminGate {
    pin: String,
}

/// Opaque proof of a successful PIN check.
#[derive(Debug, Clone)]
pub struct AdminSession {
    started_at: DateTime<Utc>,
}

impl AdminSession {
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

impl AdminGate {
    pub fn new(pin: impl Into<String>) -> Self {
        Self { pin: pin.into() }
    }

    pub fn authenticate(&self, pin: &str) -> Result<AdminSession> {
        if pin == self.pin {
            Ok(AdminSession {
                started_at: Utc::now(),
            })
        } else {
            Err(Error::InvalidPin)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_pin_opens_a_session() {
        let gate = AdminGate::new("4921");
        assert!(gate.authenticate("4921").is_ok());
    }

    #[test]
    fn wrong_pin_is_rejected() {
        let gate = AdminGate::new("4921");
        assert!(matches!(gate.authenticate("0000"), Err(Error::InvalidPin)));
        assert!(matches!(gate.authenticate(""), Err(Error::InvalidPin)));
    }
}
