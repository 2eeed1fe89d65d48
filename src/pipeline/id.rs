//! Identity types for bound nodes and source registrations.
//!
//! The evaluator numbers every node it creates for a binding, in creation
//! order, so diagnostics can name nodes and quota checks can count them.
//! Shared sources hand out a `ListenerId` per registration so a node can
//! unregister exactly itself.

use std::fmt;

/// Sequential identifier of a node within one binding.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The identifier that follows this one.
    #[inline]
    pub fn next(self) -> NodeId {
        NodeId(self.0 + 1)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Handle for a registration with a shared source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(id.next(), NodeId(43));
    }

    #[test]
    fn test_node_id_debug() {
        assert_eq!(format!("{:?}", NodeId(3)), "NodeId(3)");
        assert_eq!(format!("{}", NodeId(3)), "NodeId(3)");
    }
}
