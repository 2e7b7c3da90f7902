//! # Relationships
//!
//! A [`Relationship`] declares one named link from a node type to its children: which
//! producer builds the child nodes, and which [`DataFunction`] fetches their records.
//! Producers return these from [`NodeProducer::relationships`](crate::NodeProducer::relationships);
//! the engine only reads them.

use crate::function::DataFunction;

/// Declares one named relationship on a node type.
///
/// # Flags
///
/// - **optional**: unresolvable parameters or an empty fetch skip the relationship
///   instead of failing the build.
/// - **force_list**: the linkage renders as a list even with zero or one child.
/// - **suppress_children**: child nodes are built with a depth budget of zero, so their
///   own relationships are never expanded.
///
/// ```
/// use resource_graph::{DataFunction, Relationship};
///
/// let comments = Relationship::new(
///     "comments",
///     "comment",
///     DataFunction::table("comments").bind("articleId", "id"),
/// )
/// .optional()
/// .force_list();
///
/// assert!(comments.is_optional());
/// assert!(comments.is_force_list());
/// assert!(!comments.is_suppress_children());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    name: String,
    producer: String,
    function: DataFunction,
    optional: bool,
    force_list: bool,
    suppress_children: bool,
}

impl Relationship {
    pub fn new(
        name: impl Into<String>,
        producer: impl Into<String>,
        function: DataFunction,
    ) -> Self {
        Self {
            name: name.into(),
            producer: producer.into(),
            function,
            optional: false,
            force_list: false,
            suppress_children: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn force_list(mut self) -> Self {
        self.force_list = true;
        self
    }

    pub fn suppress_children(mut self) -> Self {
        self.suppress_children = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type tag of the producer that builds the child nodes.
    pub fn producer(&self) -> &str {
        &self.producer
    }

    pub fn function(&self) -> &DataFunction {
        &self.function
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_force_list(&self) -> bool {
        self.force_list
    }

    pub fn is_suppress_children(&self) -> bool {
        self.suppress_children
    }

    /// Depth budget handed to each child node, given the budget left after descending.
    pub fn child_depth(&self, remaining: u32) -> u32 {
        if self.suppress_children {
            0
        } else {
            remaining
        }
    }
}
