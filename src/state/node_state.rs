/// Lifecycle of a directory node during the crawl
///
/// `Pending → Fetching → Listed → {Recursing, Done}`; a node reaches `Done`
/// directly from `Pending` or `Fetching` when it is skipped or its fetch fails.
use std::fmt;

/// Represents the current state of a directory node in the crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeState {
    /// Node has been discovered but has not passed the dedup check
    Pending,

    /// Node holds a concurrency slot and its listing is being fetched
    Fetching,

    /// Listing was fetched and parsed; entries are being classified
    Listed,

    /// Child subtrees were spawned and are being awaited
    Recursing,

    /// Node and every subtree it spawned have finished
    Done,
}

impl NodeState {
    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: NodeState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Fetching)
                | (Self::Pending, Self::Done)
                | (Self::Fetching, Self::Listed)
                | (Self::Fetching, Self::Done)
                | (Self::Listed, Self::Recursing)
                | (Self::Listed, Self::Done)
                | (Self::Recursing, Self::Done)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Listed => "listed",
            Self::Recursing => "recursing",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
