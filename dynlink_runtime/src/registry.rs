//! Operation name registry for array receivers
//!
//! The closed set of pseudo-methods every array-shaped receiver answers to.
//! Arity counts arguments after the receiver.

use std::fmt;

/// How a registry entry is turned into a bound operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionRule {
    /// Indexed read, specialized to the element type
    ElementGet,
    /// Indexed write, specialized to the element type
    ElementSet,
    /// Element count
    Length,
    /// Lazy single-pass iterator construction
    Iterator,
    /// Textual rendering
    Render,
    /// Fixed-size view over the same storage
    ListView,
    /// Deep element-wise equality
    Equals,
    /// Constant naming the receiver's concrete type
    ClassConstant,
    /// First element
    Head,
    /// All but the first element
    Tail,
    /// Zero-length check
    IsEmpty,
}

/// Registry entry: (name, required arity, resolution rule)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub arity: usize,
    pub rule: ResolutionRule,
}

impl fmt::Display for OperationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

const fn op(name: &'static str, arity: usize, rule: ResolutionRule) -> OperationDescriptor {
    OperationDescriptor { name, arity, rule }
}

/// Every operation supported on array receivers
pub static ARRAY_OPERATIONS: [OperationDescriptor; 12] = [
    op("get", 1, ResolutionRule::ElementGet),
    op("set", 2, ResolutionRule::ElementSet),
    op("size", 0, ResolutionRule::Length),
    op("length", 0, ResolutionRule::Length),
    op("iterator", 0, ResolutionRule::Iterator),
    op("toString", 0, ResolutionRule::Render),
    op("asList", 0, ResolutionRule::ListView),
    op("equals", 1, ResolutionRule::Equals),
    op("getClass", 0, ResolutionRule::ClassConstant),
    op("head", 0, ResolutionRule::Head),
    op("tail", 0, ResolutionRule::Tail),
    op("isEmpty", 0, ResolutionRule::IsEmpty),
];

/// Look up an array operation by name (case-sensitive)
pub fn array_operation(name: &str) -> Option<&'static OperationDescriptor> {
    ARRAY_OPERATIONS.iter().find(|d| d.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_arities() {
        assert_eq!(array_operation("get").map(|d| d.arity), Some(1));
        assert_eq!(array_operation("set").map(|d| d.arity), Some(2));
        assert_eq!(array_operation("equals").map(|d| d.arity), Some(1));
        for name in [
            "size", "length", "iterator", "toString", "asList", "getClass", "head", "tail",
            "isEmpty",
        ] {
            assert_eq!(array_operation(name).map(|d| d.arity), Some(0), "{}", name);
        }
    }

    #[test]
    fn test_size_and_length_share_rule() {
        let size = array_operation("size").unwrap();
        let length = array_operation("length").unwrap();
        assert_eq!(size.rule, length.rule);
        assert_eq!(size.to_string(), "size/0");
    }

    #[test]
    fn test_unknown_names() {
        assert!(array_operation("push").is_none());
        assert!(array_operation("Get").is_none());
        assert!(array_operation("").is_none());
    }
}
