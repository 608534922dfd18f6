//! Node ordering for connection attempts.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::Node;

/// Picks the candidate order for connection attempts.
///
/// Every call produces a fresh uniform permutation of the full node set;
/// nothing is remembered across calls and the currently active node is
/// not excluded. Cheap random load spreading, not health-aware routing.
pub struct NodeSelector {
    rng: StdRng,
}

impl NodeSelector {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic selector for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniformly shuffled copy of `nodes`.
    pub fn order_for_attempt(
        &mut self,
        nodes: &[Node],
    ) -> Vec<Node> {
        let mut order = nodes.to_vec();
        order.shuffle(&mut self.rng);
        order
    }
}

impl Default for NodeSelector {
    fn default() -> Self {
        Self::new()
    }
}
