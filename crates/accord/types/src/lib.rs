//! Accord Types - the shared vocabulary of the authority layer
//!
//! Identifiers, roles, actions and decisions used by every Accord crate.
//! Nothing in here holds state; ledgers and engines live in their own crates.

#![deny(unsafe_code)]

pub mod clock;
pub mod error;
pub mod event;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::TypeError;
pub use event::{EventJournal, GovernanceEvent, JournalEntry};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wall-clock instant used for every timestamp in the system.
pub type Timestamp = DateTime<Utc>;

/// Balance and penalty amounts, in minimal token units.
pub type TokenAmount = u64;

/// Longest window any configured duration may describe (100 years).
pub const MAX_WINDOW_SECS: u64 = 100 * 365 * 24 * 60 * 60;

/// Convert a configured number of seconds into a chrono duration, saturating
/// at [`MAX_WINDOW_SECS`].
pub fn window(secs: u64) -> chrono::Duration {
    chrono::Duration::seconds(secs.min(MAX_WINDOW_SECS) as i64)
}

/// `at + secs`, saturating at the latest representable instant.
pub fn offset(at: Timestamp, secs: u64) -> Timestamp {
    at.checked_add_signed(window(secs))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberId(pub String);
impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a misbehavior report.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId(pub String);
impl ReportId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}
impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of a member in the group hierarchy.
///
/// Discriminants are the wire codes used by role lookups; unknown codes are
/// rejected rather than mapped to `Undefined`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    Undefined = 0,
    Admin = 1,
    PrimaryHead = 2,
    SecondaryHead = 3,
    RegularMember = 4,
}

impl Role {
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Primary and secondary heads form the head set.
    pub fn is_head(&self) -> bool {
        matches!(self, Role::PrimaryHead | Role::SecondaryHead)
    }

    /// Roles that may be stored on a member record and appear in a policy matrix.
    pub fn is_assignable(&self) -> bool {
        matches!(
            self,
            Role::PrimaryHead | Role::SecondaryHead | Role::RegularMember
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Role::Undefined => "UNDEFINED",
            Role::Admin => "ADMIN",
            Role::PrimaryHead => "PRIMARY_GROUP_HEAD",
            Role::SecondaryHead => "SECONDARY_GROUP_HEAD",
            Role::RegularMember => "REGULAR_MEMBER",
        }
    }
}

impl TryFrom<u8> for Role {
    type Error = TypeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Role::Undefined),
            1 => Ok(Role::Admin),
            2 => Ok(Role::PrimaryHead),
            3 => Ok(Role::SecondaryHead),
            4 => Ok(Role::RegularMember),
            other => Err(TypeError::UnknownRole(other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberStatus {
    Active,
    /// Administrative suspension with no end time.
    Blocked,
    /// Set by the judge; paired with a blocking window.
    Malicious,
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MemberStatus::Active => "ACTIVE",
            MemberStatus::Blocked => "BLOCKED",
            MemberStatus::Malicious => "MALICIOUS",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    View,
    Edit,
    Delete,
}

/// Privilege tier of an action; drives quorum sizing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActionTier {
    Read,
    Write,
    Destructive,
}

impl Action {
    pub fn tier(&self) -> ActionTier {
        match self {
            Action::View => ActionTier::Read,
            Action::Edit => ActionTier::Write,
            Action::Delete => ActionTier::Destructive,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Edit => "edit",
            Action::Delete => "delete",
        }
    }
}

impl FromStr for Action {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "view" => Ok(Action::View),
            "edit" => Ok(Action::Edit),
            "delete" => Ok(Action::Delete),
            _ => Err(TypeError::UnknownAction(s.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceId(pub String);
impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two shared tables guarded by the quorum workflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceTable {
    Global,
    Local,
}

impl ResourceTable {
    pub const GLOBAL_ID: &'static str = "GlobalResourceTable";
    pub const LOCAL_ID: &'static str = "LocalResourceTable";

    pub fn resource_id(&self) -> ResourceId {
        ResourceId::new(self.as_str())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceTable::Global => Self::GLOBAL_ID,
            ResourceTable::Local => Self::LOCAL_ID,
        }
    }
}

impl FromStr for ResourceTable {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            Self::GLOBAL_ID => Ok(ResourceTable::Global),
            Self::LOCAL_ID => Ok(ResourceTable::Local),
            other => Err(TypeError::UnknownTable(other.to_string())),
        }
    }
}

impl fmt::Display for ResourceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a policy lookup. Absence of an entry means `Deny`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

impl FromStr for Decision {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(Decision::Allow),
            "disallow" | "deny" => Ok(Decision::Deny),
            _ => Err(TypeError::UnknownDecision(s.to_string())),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Decision::Allow => "allow",
            Decision::Deny => "disallow",
        })
    }
}

/// Kinds of misbehavior the judge can sanction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MisbehaviorKind {
    UnauthorizedAccess,
    TooFrequentAccess,
    DataTampering,
    DenialOfService,
}

impl MisbehaviorKind {
    pub fn reason(&self) -> &'static str {
        match self {
            MisbehaviorKind::UnauthorizedAccess => "Unauthorized access attempt",
            MisbehaviorKind::TooFrequentAccess => "Too frequent access",
            MisbehaviorKind::DataTampering => "Tampering with data",
            MisbehaviorKind::DenialOfService => "Denial of Service",
        }
    }
}

impl fmt::Display for MisbehaviorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// One row of the global resource table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    pub member: MemberId,
    pub name: String,
    pub member_type: String,
    pub role: Role,
    pub status: MemberStatus,
}

/// One row of the local resource table: a resource managed by a head pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalResourceEntry {
    pub resource: String,
    pub owner: MemberId,
    pub partner: MemberId,
    pub active: bool,
}
