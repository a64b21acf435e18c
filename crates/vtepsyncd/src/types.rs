//! VTEP address, set, and flood-list action types.

use serde::{Deserialize, Serialize};
use std::collections::btree_set;
use std::collections::BTreeSet;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::VtepsyncError;

/// Default BGP community marking VTEP loopback routes.
pub const DEFAULT_COMMUNITY: &str = "5555:5555";

/// Default VXLAN interface carrying the flood list.
pub const DEFAULT_VXLAN_INTERFACE: &str = "Vxlan1";

/// Remote VTEP address.
///
/// Canonical form is the bare dotted quad with no mask suffix. Ordering is
/// numeric, so sets iterate `10.0.0.9` before `10.0.0.10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VtepAddress(Ipv4Addr);

impl VtepAddress {
    pub const fn new(a: u8, b: u8, c: u8, d: u8) -> Self {
        VtepAddress(Ipv4Addr::new(a, b, c, d))
    }
}

impl fmt::Display for VtepAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for VtepAddress {
    type Err = VtepsyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Ipv4Addr>().map(VtepAddress).map_err(|_| {
            VtepsyncError::validation(
                "vtep address",
                format!("'{}' is not a dotted-quad IPv4 address", s),
            )
        })
    }
}

impl From<Ipv4Addr> for VtepAddress {
    fn from(addr: Ipv4Addr) -> Self {
        VtepAddress(addr)
    }
}

/// Set of VTEP addresses built fresh for each reconciliation cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VtepSet(BTreeSet<VtepAddress>);

impl VtepSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an address, returning false if it was already present.
    pub fn insert(&mut self, addr: VtepAddress) -> bool {
        self.0.insert(addr)
    }

    pub fn remove(&mut self, addr: &VtepAddress) -> bool {
        self.0.remove(addr)
    }

    pub fn contains(&self, addr: &VtepAddress) -> bool {
        self.0.contains(addr)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates addresses in numeric order.
    pub fn iter(&self) -> btree_set::Iter<'_, VtepAddress> {
        self.0.iter()
    }

    /// Addresses in `self` that are not in `other`, in numeric order.
    pub fn difference<'a>(&'a self, other: &'a VtepSet) -> impl Iterator<Item = &'a VtepAddress> {
        self.0.difference(&other.0)
    }
}

impl FromIterator<VtepAddress> for VtepSet {
    fn from_iter<I: IntoIterator<Item = VtepAddress>>(iter: I) -> Self {
        VtepSet(iter.into_iter().collect())
    }
}

impl Extend<VtepAddress> for VtepSet {
    fn extend<I: IntoIterator<Item = VtepAddress>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl<'a> IntoIterator for &'a VtepSet {
    type Item = &'a VtepAddress;
    type IntoIter = btree_set::Iter<'a, VtepAddress>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for VtepSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, addr) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", addr)?;
        }
        write!(f, "]")
    }
}

/// BGP community tag in `16bit:16bit` form, e.g. `5555:5555`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CommunityTag(String);

impl CommunityTag {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CommunityTag {
    fn default() -> Self {
        CommunityTag(DEFAULT_COMMUNITY.to_string())
    }
}

impl fmt::Display for CommunityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CommunityTag {
    type Err = VtepsyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            VtepsyncError::validation(
                "community",
                format!("'{}' is not in 16bit:16bit format", s),
            )
        };

        let (asn, value) = s.split_once(':').ok_or_else(invalid)?;
        for half in [asn, value] {
            if half.is_empty() || half.len() > 5 || !half.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            half.parse::<u16>().map_err(|_| invalid())?;
        }

        Ok(CommunityTag(s.to_string()))
    }
}

/// Operation applied to a flood list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloodOp {
    Add,
    Remove,
}

impl FloodOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FloodOp::Add => "add",
            FloodOp::Remove => "remove",
        }
    }
}

impl fmt::Display for FloodOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single change the reconciler wants applied to the flood list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloodAction {
    Add(VtepAddress),
    Remove(VtepAddress),
}

impl FloodAction {
    pub fn op(&self) -> FloodOp {
        match self {
            FloodAction::Add(_) => FloodOp::Add,
            FloodAction::Remove(_) => FloodOp::Remove,
        }
    }

    pub fn address(&self) -> VtepAddress {
        match self {
            FloodAction::Add(addr) | FloodAction::Remove(addr) => *addr,
        }
    }

    /// Structured record of this action for the audit log.
    pub fn to_change(&self) -> FloodListChange {
        FloodListChange {
            action: self.op(),
            address: self.address(),
        }
    }
}

impl fmt::Display for FloodAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op(), self.address())
    }
}

/// Audit record `{action, address}` emitted for every dispatched action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloodListChange {
    pub action: FloodOp,
    pub address: VtepAddress,
}
