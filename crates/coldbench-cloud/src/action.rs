//! Actions applied to function replicas

use crate::error::CloudError;
use std::str::FromStr;

/// Interaction with a range of function replicas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FleetAction {
    /// Create the function and its fronting API
    Deploy,
    /// Push new code and configuration to an existing function
    Update,
    /// Delete the function and its fronting API
    Remove,
}

impl FleetAction {
    pub const ALL: [FleetAction; 3] = [
        FleetAction::Deploy,
        FleetAction::Update,
        FleetAction::Remove,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FleetAction::Deploy => "deploy",
            FleetAction::Update => "update",
            FleetAction::Remove => "remove",
        }
    }

    /// Whether a run of this action records a gateway table
    pub fn produces_table(&self) -> bool {
        matches!(self, FleetAction::Deploy)
    }

    /// Whether the action uploads a function package
    pub fn needs_package(&self) -> bool {
        matches!(self, FleetAction::Deploy | FleetAction::Update)
    }
}

impl std::fmt::Display for FleetAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FleetAction {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deploy" => Ok(FleetAction::Deploy),
            "update" => Ok(FleetAction::Update),
            "remove" => Ok(FleetAction::Remove),
            _ => Err(CloudError::InvalidAction(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_actions() {
        for action in FleetAction::ALL {
            assert_eq!(action.as_str().parse::<FleetAction>().unwrap(), action);
        }
        assert_eq!("Deploy".parse::<FleetAction>().unwrap(), FleetAction::Deploy);
    }

    #[test]
    fn test_parse_unknown_action() {
        let err = "destroy".parse::<FleetAction>().unwrap_err();
        assert!(matches!(err, CloudError::InvalidAction(ref a) if a == "destroy"));
    }

    #[test]
    fn test_only_deploy_produces_table() {
        assert!(FleetAction::Deploy.produces_table());
        assert!(!FleetAction::Update.produces_table());
        assert!(!FleetAction::Remove.produces_table());
        assert!(FleetAction::Update.needs_package());
        assert!(!FleetAction::Remove.needs_package());
    }
}
