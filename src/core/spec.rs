//! Shape of one actuator's slice of the action space.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Continuous action count plus the size of every discrete branch.
///
/// A branch is one discrete decision ("pick 1 of K"); `branch_sizes[i]` is K
/// for branch `i`. The discrete flat buffer holds one `i32` per branch, while
/// the action mask holds one flag per possible value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActionSpec {
    num_continuous_actions: usize,
    branch_sizes: Vec<usize>,
}

impl ActionSpec {
    pub fn new(num_continuous_actions: usize, branch_sizes: Vec<usize>) -> Self {
        Self {
            num_continuous_actions,
            branch_sizes,
        }
    }

    pub fn make_continuous(num_actions: usize) -> Self {
        Self::new(num_actions, Vec::new())
    }

    pub fn make_discrete(branch_sizes: &[usize]) -> Self {
        Self::new(0, branch_sizes.to_vec())
    }

    /// Concatenate several specs in order: continuous counts add up, branch lists append.
    pub fn combine<'a, I>(specs: I) -> Self
    where
        I: IntoIterator<Item = &'a ActionSpec>,
    {
        let mut out = ActionSpec::default();
        for s in specs {
            out.num_continuous_actions += s.num_continuous_actions;
            out.branch_sizes.extend_from_slice(&s.branch_sizes);
        }
        out
    }

    #[inline]
    pub fn num_continuous_actions(&self) -> usize {
        self.num_continuous_actions
    }

    /// Number of discrete branches.
    #[inline]
    pub fn num_discrete_actions(&self) -> usize {
        self.branch_sizes.len()
    }

    #[inline]
    pub fn branch_sizes(&self) -> &[usize] {
        &self.branch_sizes
    }

    #[inline]
    pub fn sum_of_discrete_branch_sizes(&self) -> usize {
        self.branch_sizes.iter().sum()
    }

    #[inline]
    pub fn has_continuous(&self) -> bool {
        self.num_continuous_actions > 0
    }

    pub fn is_empty(&self) -> bool {
        self.num_continuous_actions == 0 && self.branch_sizes.is_empty()
    }
}
