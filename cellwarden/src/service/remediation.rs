//! Operator permissions and remediation actions.

use std::collections::HashSet;
use std::fmt;

use crate::cell::CellKey;

/// Permission nodes checked by the command layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Access to the command surface at all
    Admin,
    /// Start and cancel preloads
    Preload,
    /// Inspect a cell
    Info,
    /// View problems and receive alerts
    Monitor,
    Reset,
    Reload,
    Unload,
    Delete,
}

impl Permission {
    pub fn node(&self) -> &'static str {
        match self {
            Self::Admin => "cellwarden.admin",
            Self::Preload => "cellwarden.preload",
            Self::Info => "cellwarden.info",
            Self::Monitor => "cellwarden.monitor",
            Self::Reset => "cellwarden.reset",
            Self::Reload => "cellwarden.reload",
            Self::Unload => "cellwarden.unload",
            Self::Delete => "cellwarden.delete",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.node())
    }
}

/// Something that can answer whether an operator holds a permission node.
pub trait Grants {
    fn grants(&self, node: &str) -> bool;
}

impl<F> Grants for F
where
    F: Fn(&str) -> bool,
{
    fn grants(&self, node: &str) -> bool {
        self(node)
    }
}

impl Grants for HashSet<String> {
    fn grants(&self, node: &str) -> bool {
        self.contains(node)
    }
}

impl<S: AsRef<str>> Grants for [S] {
    fn grants(&self, node: &str) -> bool {
        self.iter().any(|n| n.as_ref() == node)
    }
}

/// Grants every permission.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllGranted;

impl Grants for AllGranted {
    fn grants(&self, _node: &str) -> bool {
        true
    }
}

/// Operator actions that can fix a problematic cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemediationAction {
    /// Unload discarding resident changes, then load again
    Reset,
    /// Save, unload, load again and record the new load time
    Reload,
    /// Save and unload
    Unload,
    /// Unload without saving
    Delete,
}

impl RemediationAction {
    /// All actions in the order they are offered to operators.
    pub const ALL: [RemediationAction; 4] = [Self::Reset, Self::Reload, Self::Unload, Self::Delete];

    pub fn permission(&self) -> Permission {
        match self {
            Self::Reset => Permission::Reset,
            Self::Reload => Permission::Reload,
            Self::Unload => Permission::Unload,
            Self::Delete => Permission::Delete,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::Reload => "reload",
            Self::Unload => "unload",
            Self::Delete => "delete",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Reset => "Reset the cell",
            Self::Reload => "Reinstall the cell",
            Self::Unload => "Unload the cell",
            Self::Delete => "Delete the cell",
        }
    }

    /// Operator command performing this action on `key`.
    pub fn command(&self, key: &CellKey) -> String {
        format!("{} {} {} {}", self.name(), key.world(), key.x(), key.z())
    }
}

impl fmt::Display for RemediationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An action an operator may run on a specific cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionItem {
    pub action: RemediationAction,
    pub command: String,
}

impl fmt::Display for ActionItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.command, self.action.description())
    }
}

/// Actions on `key` the operator is allowed to run, in offer order.
pub fn permitted_actions<G: Grants + ?Sized>(key: &CellKey, grants: &G) -> Vec<ActionItem> {
    RemediationAction::ALL
        .iter()
        .filter(|action| grants.grants(action.permission().node()))
        .map(|action| ActionItem {
            action: *action,
            command: action.command(key),
        })
        .collect()
}
