use crate::manager::ActuatorManager;

#[cfg(feature = "serde")]
use serde::Serialize;

/// A read-only picture of where every actuator lives in the flat buffers.
///
/// Design intent:
/// - Observers cannot mutate the manager or its actuators.
/// - Snapshotting allocates; the step loop stays unchanged.
/// - Two managers with the same actuator set produce equal snapshots once
///   frozen, whatever order the actuators were registered in.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct LayoutSnapshot {
    pub frozen: bool,
    pub num_continuous_actions: usize,
    pub num_discrete_actions: usize,
    pub sum_of_discrete_branch_sizes: usize,
    pub actuators: Vec<ActuatorSlot>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ActuatorSlot {
    pub name: String,
    pub continuous_offset: usize,
    pub continuous_len: usize,
    /// First discrete branch (index into the discrete buffer).
    pub discrete_offset: usize,
    pub discrete_len: usize,
    /// Flag ranges in the action mask, one per branch, as `[start, end)`.
    pub mask_ranges: Vec<(usize, usize)>,
}

pub struct LayoutAdapter<'a> {
    manager: &'a ActuatorManager,
}

impl<'a> LayoutAdapter<'a> {
    pub fn new(manager: &'a ActuatorManager) -> Self {
        Self { manager }
    }

    /// Offsets are computed from the current order, so before freeze they
    /// reflect registration order rather than the final layout.
    pub fn snapshot(&self) -> LayoutSnapshot {
        let mut continuous_offset = 0usize;
        let mut discrete_offset = 0usize;
        let mut flag = 0usize;

        let actuators = self
            .manager
            .entries()
            .iter()
            .map(|e| {
                let mask_ranges = e
                    .spec
                    .branch_sizes()
                    .iter()
                    .map(|&size| {
                        let r = (flag, flag + size);
                        flag += size;
                        r
                    })
                    .collect();
                let slot = ActuatorSlot {
                    name: e.name.clone(),
                    continuous_offset,
                    continuous_len: e.spec.num_continuous_actions(),
                    discrete_offset,
                    discrete_len: e.spec.num_discrete_actions(),
                    mask_ranges,
                };
                continuous_offset += slot.continuous_len;
                discrete_offset += slot.discrete_len;
                slot
            })
            .collect();

        LayoutSnapshot {
            frozen: self.manager.is_frozen(),
            num_continuous_actions: self.manager.num_continuous_actions(),
            num_discrete_actions: self.manager.num_discrete_actions(),
            sum_of_discrete_branch_sizes: self.manager.sum_of_discrete_branch_sizes(),
            actuators,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::{handle, Actuator};
    use crate::buffers::ActionBuffers;
    use crate::spec::ActionSpec;

    struct Fixed(&'static str, ActionSpec);

    impl Actuator for Fixed {
        fn name(&self) -> &str {
            self.0
        }
        fn action_spec(&self) -> &ActionSpec {
            &self.1
        }
        fn on_action_received(&mut self, _actions: ActionBuffers<'_>) {}
    }

    #[test]
    fn snapshot_matches_mask_boundaries() {
        let mut m = ActuatorManager::default();
        m.push(handle(Fixed("Y", ActionSpec::make_discrete(&[4])))).unwrap();
        m.push(handle(Fixed("X", ActionSpec::make_discrete(&[3, 2])))).unwrap();
        m.freeze().unwrap();

        let snap = LayoutAdapter::new(&m).snapshot();
        assert!(snap.frozen);
        assert_eq!(snap.actuators[0].name, "X");
        assert_eq!(snap.actuators[0].mask_ranges, vec![(0, 3), (3, 5)]);
        assert_eq!(snap.actuators[1].discrete_offset, 2);
        assert_eq!(snap.actuators[1].mask_ranges, vec![(5, 9)]);

        for (branch, slot_range) in snap
            .actuators
            .iter()
            .flat_map(|s| s.mask_ranges.iter())
            .enumerate()
        {
            let r = m.discrete_action_mask().branch_range(branch).unwrap();
            assert_eq!((r.start, r.end), *slot_range);
        }
    }
}
