//! Accord Identity - the role ledger
//!
//! Authoritative store of member identity, role and status. Every other
//! component reads roles and blocking windows from here; only the judge
//! writes status, and only through the narrow `record_*` API.

#![deny(unsafe_code)]

use accord_types::{MemberId, MemberStatus, Role, TableEntry, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

/// Role ledger keyed by member id.
#[derive(Debug, Default)]
pub struct RoleLedger {
    members: HashMap<MemberId, Member>,
    order: Vec<MemberId>,
}

impl RoleLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new member with an explicit role.
    pub fn register(
        &mut self,
        id: MemberId,
        name: impl Into<String>,
        member_type: impl Into<String>,
        role: Role,
        now: Timestamp,
    ) -> Result<Member, IdentityError> {
        if !role.is_assignable() {
            return Err(IdentityError::InvalidRole(role));
        }
        if self.members.contains_key(&id) {
            return Err(IdentityError::AlreadyRegistered(id));
        }

        let member = Member {
            id: id.clone(),
            name: name.into(),
            member_type: member_type.into(),
            role,
            status: MemberStatus::Active,
            registered_at: now,
            last_status_update: now,
            blocking_end_time: None,
            last_reward_at: None,
            misbehavior_count: 0,
        };

        info!(member = %id, role = %role, "Member registered");
        self.order.push(id.clone());
        self.members.insert(id, member.clone());
        Ok(member)
    }

    pub fn member(&self, id: &MemberId) -> Result<&Member, IdentityError> {
        self.members
            .get(id)
            .ok_or_else(|| IdentityError::NotFound(id.clone()))
    }

    pub fn role_of(&self, id: &MemberId) -> Result<Role, IdentityError> {
        self.member(id).map(|m| m.role)
    }

    pub fn contains(&self, id: &MemberId) -> bool {
        self.members.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Snapshot of all members in registration order.
    pub fn members(&self) -> Vec<Member> {
        self.iter().cloned().collect()
    }

    fn iter(&self) -> impl Iterator<Item = &Member> {
        self.order.iter().filter_map(|id| self.members.get(id))
    }

    /// The global resource table: one row per member, in registration order.
    pub fn global_resource_table(&self) -> Vec<TableEntry> {
        self.iter().map(Member::table_entry).collect()
    }

    pub fn primary_heads(&self) -> Vec<MemberId> {
        self.iter()
            .filter(|m| m.role == Role::PrimaryHead)
            .map(|m| m.id.clone())
            .collect()
    }

    pub fn count_with_role(&self, role: Role) -> usize {
        self.iter().filter(|m| m.role == role).count()
    }

    /// Exchange the roles of two members in one step.
    pub fn swap_roles(&mut self, a: &MemberId, b: &MemberId) -> Result<(Role, Role), IdentityError> {
        if a == b {
            return Err(IdentityError::SameMember(a.clone()));
        }
        let role_a = self.role_of(a)?;
        let role_b = self.role_of(b)?;

        self.get_mut(a)?.role = role_b;
        self.get_mut(b)?.role = role_a;

        info!(first = %a, second = %b, first_role = %role_b, second_role = %role_a, "Roles swapped");
        Ok((role_b, role_a))
    }

    pub fn remove(&mut self, id: &MemberId) -> Result<Member, IdentityError> {
        let member = self
            .members
            .remove(id)
            .ok_or_else(|| IdentityError::NotFound(id.clone()))?;
        self.order.retain(|m| m != id);
        info!(member = %id, "Member removed");
        Ok(member)
    }

    /// Mark a member malicious with a blocking window ending at `blocking_end`.
    pub fn record_misbehavior(
        &mut self,
        id: &MemberId,
        at: Timestamp,
        blocking_end: Timestamp,
    ) -> Result<(), IdentityError> {
        let member = self.get_mut(id)?;
        member.status = MemberStatus::Malicious;
        member.last_status_update = at;
        member.misbehavior_count = member.misbehavior_count.saturating_add(1);
        // A later report never shortens an existing window.
        member.blocking_end_time = Some(match member.blocking_end_time {
            Some(current) if current > blocking_end => current,
            _ => blocking_end,
        });
        debug!(member = %id, until = %blocking_end, "Misbehavior recorded");
        Ok(())
    }

    pub fn record_reward(&mut self, id: &MemberId, at: Timestamp) -> Result<(), IdentityError> {
        self.get_mut(id)?.last_reward_at = Some(at);
        Ok(())
    }

    /// Restore a malicious member whose window has run out.
    ///
    /// Returns `true` if the member was reinstated by this call.
    pub fn lift_expired_block(&mut self, id: &MemberId, now: Timestamp) -> Result<bool, IdentityError> {
        let member = self.get_mut(id)?;
        match member.blocking_end_time {
            Some(end) if now >= end => {
                member.blocking_end_time = None;
                if member.status == MemberStatus::Malicious {
                    member.status = MemberStatus::Active;
                    member.last_status_update = now;
                }
                info!(member = %id, "Blocking window expired, member reinstated");
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Administrative suspension with no end time.
    pub fn suspend(&mut self, id: &MemberId, now: Timestamp) -> Result<(), IdentityError> {
        let member = self.get_mut(id)?;
        member.status = MemberStatus::Blocked;
        member.last_status_update = now;
        info!(member = %id, "Member suspended");
        Ok(())
    }

    /// Lift an administrative suspension or a judge's window early.
    pub fn reinstate(&mut self, id: &MemberId, now: Timestamp) -> Result<(), IdentityError> {
        let member = self.get_mut(id)?;
        member.status = MemberStatus::Active;
        member.blocking_end_time = None;
        member.last_status_update = now;
        info!(member = %id, "Member reinstated");
        Ok(())
    }

    fn get_mut(&mut self, id: &MemberId) -> Result<&mut Member, IdentityError> {
        self.members
            .get_mut(id)
            .ok_or_else(|| IdentityError::NotFound(id.clone()))
    }
}

/// A member record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    /// Free-form bookkeeping tag; never consulted by policy.
    pub member_type: String,
    pub role: Role,
    pub status: MemberStatus,
    pub registered_at: Timestamp,
    pub last_status_update: Timestamp,
    pub blocking_end_time: Option<Timestamp>,
    pub last_reward_at: Option<Timestamp>,
    pub misbehavior_count: u32,
}

impl Member {
    /// True while a judge's blocking window is still open at `now`.
    pub fn is_blocked_at(&self, now: Timestamp) -> bool {
        matches!(self.blocking_end_time, Some(end) if now < end)
    }

    pub fn is_suspended(&self) -> bool {
        self.status == MemberStatus::Blocked
    }

    pub fn table_entry(&self) -> TableEntry {
        TableEntry {
            member: self.id.clone(),
            name: self.name.clone(),
            member_type: self.member_type.clone(),
            role: self.role,
            status: self.status,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Member not found: {0}")]
    NotFound(MemberId),

    #[error("Member already registered: {0}")]
    AlreadyRegistered(MemberId),

    #[error("Role cannot be assigned to a member: {0}")]
    InvalidRole(Role),

    #[error("Operation needs two distinct members, got {0} twice")]
    SameMember(MemberId),
}
