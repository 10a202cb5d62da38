//! Discrete action mask shared by every actuator on one manager.
//!
//! Layout: one flag per possible discrete value, grouped by branch. Branches are
//! laid out in the manager's frozen (name-sorted) actuator order, so the same
//! actuator set always produces the same boundaries.
//!
//! Actuators never see the mask directly. During a mask pass the manager points
//! the cursor at the actuator's first branch and hands it a [`MaskWriter`] that
//! can only address that actuator's own branches.

use std::ops::Range;

use crate::error::{ActuatorError, Result};

#[derive(Debug, Clone, Default)]
pub struct DiscreteActionMask {
    // true = value disabled for this step.
    masked: Vec<bool>,
    branch_sizes: Vec<usize>,
    // branch_starts[i] is the flag index of branch i's first value.
    branch_starts: Vec<usize>,
    current_branch_offset: usize,
    any_masked: bool,
}

impl DiscreteActionMask {
    /// Build a mask for the given branches (already in frozen actuator order).
    pub fn new(branch_sizes: Vec<usize>) -> Self {
        let mut branch_starts = Vec::with_capacity(branch_sizes.len());
        let mut start = 0usize;
        for &size in &branch_sizes {
            branch_starts.push(start);
            start += size;
        }

        Self {
            masked: vec![false; start],
            branch_sizes,
            branch_starts,
            current_branch_offset: 0,
            any_masked: false,
        }
    }

    /// Permit every value again and rewind the cursor.
    pub fn reset(&mut self) {
        if self.any_masked {
            self.masked.fill(false);
            self.any_masked = false;
        }
        self.current_branch_offset = 0;
    }

    /// Position the cursor at a branch index (not a flag index).
    pub fn set_current_branch_offset(&mut self, offset: usize) {
        self.current_branch_offset = offset;
    }

    pub fn current_branch_offset(&self) -> usize {
        self.current_branch_offset
    }

    /// Writer limited to `num_branches` branches starting at the cursor.
    ///
    /// Branches past the end of the mask are clipped, so a writer can never
    /// reach outside the mask even if the cursor was misplaced.
    pub fn writer(&mut self, num_branches: usize) -> MaskWriter<'_> {
        let first = self.current_branch_offset.min(self.branch_sizes.len());
        let count = num_branches.min(self.branch_sizes.len() - first);
        MaskWriter {
            mask: self,
            first_branch: first,
            num_branches: count,
        }
    }

    /// Total number of discrete values covered by the mask.
    pub fn len(&self) -> usize {
        self.masked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masked.is_empty()
    }

    pub fn num_branches(&self) -> usize {
        self.branch_sizes.len()
    }

    pub fn branch_sizes(&self) -> &[usize] {
        &self.branch_sizes
    }

    /// Flag range of one branch, or `None` if the branch does not exist.
    pub fn branch_range(&self, branch: usize) -> Option<Range<usize>> {
        let start = *self.branch_starts.get(branch)?;
        Some(start..start + self.branch_sizes[branch])
    }

    /// All flags, true meaning "disabled".
    pub fn as_slice(&self) -> &[bool] {
        &self.masked
    }

    /// Whether any value has been disabled since the last reset.
    pub fn any_masked(&self) -> bool {
        self.any_masked
    }

    /// Absolute lookup, independent of the cursor.
    pub fn is_masked(&self, branch: usize, action: usize) -> bool {
        match self.branch_range(branch) {
            Some(r) if action < r.len() => self.masked[r.start + action],
            _ => false,
        }
    }

    /// Reject masks that leave a branch without any permitted value.
    pub fn validate(&self) -> Result<()> {
        if !self.any_masked {
            return Ok(());
        }
        for branch in 0..self.branch_sizes.len() {
            let Some(range) = self.branch_range(branch) else {
                continue;
            };
            if !range.is_empty() && self.masked[range].iter().all(|m| *m) {
                return Err(ActuatorError::BranchFullyMasked { branch });
            }
        }
        Ok(())
    }
}

/// Mask access for a single actuator's branches.
///
/// Branch indices are relative: branch 0 is the actuator's own first branch.
#[derive(Debug)]
pub struct MaskWriter<'a> {
    mask: &'a mut DiscreteActionMask,
    first_branch: usize,
    num_branches: usize,
}

impl MaskWriter<'_> {
    pub fn num_branches(&self) -> usize {
        self.num_branches
    }

    /// Size of one of this actuator's branches.
    pub fn branch_size(&self, branch: usize) -> Option<usize> {
        if branch < self.num_branches {
            Some(self.mask.branch_sizes[self.first_branch + branch])
        } else {
            None
        }
    }

    /// Enable or disable `action` within this actuator's `branch`.
    pub fn set_action_enabled(&mut self, branch: usize, action: usize, enabled: bool) -> Result<()> {
        let idx = self.flag_index(branch, action)?;
        self.mask.masked[idx] = !enabled;
        if !enabled {
            self.mask.any_masked = true;
        }
        Ok(())
    }

    pub fn is_action_enabled(&self, branch: usize, action: usize) -> Result<bool> {
        let idx = self.flag_index(branch, action)?;
        Ok(!self.mask.masked[idx])
    }

    fn flag_index(&self, branch: usize, action: usize) -> Result<usize> {
        let out_of_range = ActuatorError::MaskOutOfRange {
            branch,
            action,
            branches: self.num_branches,
        };
        if branch >= self.num_branches {
            return Err(out_of_range);
        }
        let abs = self.first_branch + branch;
        if action >= self.mask.branch_sizes[abs] {
            return Err(out_of_range);
        }
        Ok(self.mask.branch_starts[abs] + action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_boundaries_follow_sizes() {
        let mask = DiscreteActionMask::new(vec![3, 2, 4]);
        assert_eq!(mask.len(), 9);
        assert_eq!(mask.branch_range(0), Some(0..3));
        assert_eq!(mask.branch_range(1), Some(3..5));
        assert_eq!(mask.branch_range(2), Some(5..9));
        assert_eq!(mask.branch_range(3), None);
    }

    #[test]
    fn writer_is_relative_to_cursor() {
        let mut mask = DiscreteActionMask::new(vec![3, 2, 4]);
        mask.set_current_branch_offset(2);
        {
            let mut w = mask.writer(1);
            w.set_action_enabled(0, 1, false).unwrap();
        }
        assert!(mask.is_masked(2, 1));
        assert_eq!(mask.as_slice().iter().filter(|m| **m).count(), 1);
        assert!(mask.as_slice()[6]);
    }

    #[test]
    fn writer_cannot_reach_neighbouring_branches() {
        let mut mask = DiscreteActionMask::new(vec![3, 2, 4]);
        mask.set_current_branch_offset(1);
        let mut w = mask.writer(1);

        assert_eq!(
            w.set_action_enabled(1, 0, false),
            Err(ActuatorError::MaskOutOfRange {
                branch: 1,
                action: 0,
                branches: 1
            })
        );
        // Action 2 exists in neighbouring branches but not in this one (size 2).
        assert!(w.set_action_enabled(0, 2, false).is_err());
        drop(w);
        assert!(!mask.any_masked());
    }

    #[test]
    fn writer_clips_past_the_end() {
        let mut mask = DiscreteActionMask::new(vec![2]);
        mask.set_current_branch_offset(5);
        let w = mask.writer(3);
        assert_eq!(w.num_branches(), 0);
    }

    #[test]
    fn reset_clears_flags_and_cursor() {
        let mut mask = DiscreteActionMask::new(vec![2, 2]);
        mask.set_current_branch_offset(1);
        mask.writer(1).set_action_enabled(0, 0, false).unwrap();
        assert!(mask.any_masked());

        mask.reset();
        assert!(!mask.any_masked());
        assert_eq!(mask.current_branch_offset(), 0);
        assert!(mask.as_slice().iter().all(|m| !m));
    }

    #[test]
    fn validate_rejects_fully_masked_branch() {
        let mut mask = DiscreteActionMask::new(vec![2, 3]);
        mask.set_current_branch_offset(0);
        {
            let mut w = mask.writer(2);
            w.set_action_enabled(1, 0, false).unwrap();
            w.set_action_enabled(1, 1, false).unwrap();
        }
        assert!(mask.validate().is_ok());

        mask.writer(2).set_action_enabled(1, 2, false).unwrap();
        assert_eq!(
            mask.validate(),
            Err(ActuatorError::BranchFullyMasked { branch: 1 })
        );
    }

    #[test]
    fn re_enabling_a_value() {
        let mut mask = DiscreteActionMask::new(vec![2]);
        let mut w = mask.writer(1);
        w.set_action_enabled(0, 1, false).unwrap();
        assert_eq!(w.is_action_enabled(0, 1), Ok(false));
        w.set_action_enabled(0, 1, true).unwrap();
        assert_eq!(w.is_action_enabled(0, 1), Ok(true));
    }
}
