use std::collections::HashMap;
use tracing::warn;

use crate::domain::errors::GuardError;
use crate::domain::value_objects::SqlIdentifier;

/// Allow-list of table and column names for one subsystem.
///
/// An identifier must be syntactically valid *and* listed. Matching is
/// case-insensitive and returns the spelling registered in the allow-list.
#[derive(Debug, Clone)]
pub struct SqlIdentifierGuard {
    subsystem: String,
    allowed: HashMap<String, SqlIdentifier>,
}

impl SqlIdentifierGuard {
    /// Every allow-listed name must itself be a valid identifier
    pub fn new<'a>(
        subsystem: impl Into<String>,
        allowed: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, GuardError> {
        let allowed = allowed
            .into_iter()
            .map(|name| {
                let identifier = SqlIdentifier::new(name)?;
                Ok((name.to_lowercase(), identifier))
            })
            .collect::<Result<HashMap<_, _>, GuardError>>()?;

        Ok(Self {
            subsystem: subsystem.into(),
            allowed,
        })
    }

    pub fn subsystem(&self) -> &str {
        &self.subsystem
    }

    pub fn is_allowed(&self, candidate: &str) -> bool {
        self.check(candidate).is_ok()
    }

    pub fn check(&self, candidate: &str) -> Result<SqlIdentifier, GuardError> {
        let identifier = SqlIdentifier::new(candidate.trim()).map_err(|e| {
            warn!(subsystem = %self.subsystem, "Rejected invalid SQL identifier");
            GuardError::from(e)
        })?;

        match self.allowed.get(&identifier.as_str().to_lowercase()) {
            Some(registered) => Ok(registered.clone()),
            None => {
                warn!(
                    subsystem = %self.subsystem,
                    identifier = %identifier,
                    "Rejected SQL identifier outside the allow-list"
                );
                Err(GuardError::NotAllowed {
                    subsystem: self.subsystem.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory_guard() -> SqlIdentifierGuard {
        SqlIdentifierGuard::new("inventory", ["productos_obra", "movimientos", "Bodegas"]).unwrap()
    }

    #[test]
    fn test_allowed_identifier() {
        let guard = inventory_guard();
        assert_eq!(guard.check("productos_obra").unwrap().as_str(), "productos_obra");
        assert_eq!(guard.check("bodegas").unwrap().as_str(), "Bodegas");
        assert!(guard.is_allowed(" movimientos "));
    }

    #[test]
    fn test_valid_but_unlisted_identifier() {
        let guard = inventory_guard();
        assert_eq!(
            guard.check("usuarios"),
            Err(GuardError::NotAllowed {
                subsystem: "inventory".to_string()
            })
        );
    }

    #[test]
    fn test_invalid_identifier() {
        let guard = inventory_guard();
        assert!(matches!(
            guard.check("productos; DROP TABLE x"),
            Err(GuardError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            guard.check("drop"),
            Err(GuardError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_allow_list_entries_are_validated() {
        assert!(SqlIdentifierGuard::new("bad", ["ok_name", "not valid"]).is_err());
        assert!(SqlIdentifierGuard::new("bad", ["select"]).is_err());
    }
}
