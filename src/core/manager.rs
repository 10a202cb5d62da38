//! Aggregates many actuators into one flat action space and dispatches each step.
//!
//! ## Lifecycle
//!
//! A manager starts **open**: actuators can be added, inserted, replaced and
//! removed freely, and no buffers exist yet. The first call that needs buffers
//! (`update_actions`, `write_action_mask`, `execute_actions`, `apply_heuristic`)
//! or an explicit [`ActuatorManager::freeze`] moves it to **frozen**:
//!
//! 1. names are checked for uniqueness and all actuators must agree on having
//!    continuous actions;
//! 2. actuators are sorted by name (ordinal);
//! 3. the continuous buffer, the discrete buffer and the mask are allocated at
//!    their final size.
//!
//! There is no way back. Sorting by name means the buffer offsets depend only on
//! the actuator set, never on registration order, so stored actions can be
//! replayed against the same actuators in another process.
//!
//! ## Per-step cycle
//!
//! ```text
//! update_actions(policy output) -> write_action_mask() -> execute_actions()
//! ```
//!
//! with `reset_data()` at episode boundaries.

use hashbrown::HashMap;
use std::cell::RefMut;
use tracing::{debug, trace, warn};

use crate::actuator::{Actuator, ActuatorHandle};
use crate::buffers::{copy_or_zero, ActionBuffers, ActionBuffersMut};
use crate::collection::{ActuatorList, Registered};
use crate::config::ManagerConfig;
use crate::error::{ActuatorError, BufferKind, Result};
use crate::mask::DiscreteActionMask;
use crate::spec::ActionSpec;

pub struct ActuatorManager {
    cfg: ManagerConfig,
    actuators: ActuatorList,

    // Empty until freeze, then fixed-size for the manager's lifetime.
    continuous: Vec<f32>,
    discrete: Vec<i32>,
    mask: DiscreteActionMask,

    by_name: HashMap<String, usize>,
}

impl Default for ActuatorManager {
    fn default() -> Self {
        Self::new(ManagerConfig::default())
    }
}

impl ActuatorManager {
    pub fn new(cfg: ManagerConfig) -> Self {
        Self {
            cfg,
            actuators: ActuatorList::with_capacity(cfg.capacity),
            continuous: Vec::new(),
            discrete: Vec::new(),
            mask: DiscreteActionMask::default(),
            by_name: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.cfg
    }

    pub fn push(&mut self, actuator: ActuatorHandle) -> Result<()> {
        self.actuators.push(actuator)
    }

    pub fn insert(&mut self, index: usize, actuator: ActuatorHandle) -> Result<()> {
        self.actuators.insert(index, actuator)
    }

    pub fn set(&mut self, index: usize, actuator: ActuatorHandle) -> Result<ActuatorHandle> {
        self.actuators.set(index, actuator)
    }

    pub fn remove_at(&mut self, index: usize) -> Result<ActuatorHandle> {
        self.actuators.remove_at(index)
    }

    pub fn remove(&mut self, actuator: &ActuatorHandle) -> Result<bool> {
        self.actuators.remove(actuator)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.actuators.clear()
    }

    pub fn contains(&self, actuator: &ActuatorHandle) -> bool {
        self.actuators.contains(actuator)
    }

    pub fn index_of(&self, actuator: &ActuatorHandle) -> Option<usize> {
        self.actuators.index_of(actuator)
    }

    pub fn get(&self, index: usize) -> Option<&ActuatorHandle> {
        self.actuators.get(index)
    }

    pub fn len(&self) -> usize {
        self.actuators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actuators.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActuatorHandle> + '_ {
        self.actuators.iter()
    }

    pub fn actuators(&self) -> &ActuatorList {
        &self.actuators
    }

    /// Look an actuator up by name.
    pub fn find(&self, name: &str) -> Option<&ActuatorHandle> {
        if self.is_frozen() {
            let idx = *self.by_name.get(name)?;
            return self.actuators.get(idx);
        }
        self.actuators
            .entries()
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.handle)
    }

    pub fn num_continuous_actions(&self) -> usize {
        self.actuators.num_continuous_actions()
    }

    /// Number of discrete branches across all actuators.
    pub fn num_discrete_actions(&self) -> usize {
        self.actuators.num_discrete_actions()
    }

    pub fn sum_of_discrete_branch_sizes(&self) -> usize {
        self.actuators.sum_of_discrete_branch_sizes()
    }

    pub fn total_number_of_actions(&self) -> usize {
        self.num_continuous_actions() + self.num_discrete_actions()
    }

    /// All actuator specs concatenated in current order.
    pub fn combined_action_spec(&self) -> ActionSpec {
        ActionSpec::combine(self.actuators.entries().iter().map(|e| &e.spec))
    }

    pub fn is_frozen(&self) -> bool {
        self.actuators.is_frozen()
    }

    /// Validate, sort and allocate. Repeat calls are no-ops.
    pub fn freeze(&mut self) -> Result<()> {
        if self.is_frozen() {
            return Ok(());
        }
        if let Err(e) = self.actuators.freeze() {
            warn!(error = %e, "actuator validation failed");
            return Err(e);
        }

        let entries = self.actuators.entries();
        self.continuous = vec![0.0; self.actuators.num_continuous_actions()];
        self.discrete = vec![0; self.actuators.num_discrete_actions()];

        let branch_sizes: Vec<usize> = entries
            .iter()
            .flat_map(|e| e.spec.branch_sizes().iter().copied())
            .collect();
        self.mask = DiscreteActionMask::new(branch_sizes);
        debug_assert_eq!(self.mask.len(), self.actuators.sum_of_discrete_branch_sizes());

        self.by_name = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.clone(), i))
            .collect();

        debug!(
            actuators = entries.len(),
            continuous = self.continuous.len(),
            discrete_branches = self.discrete.len(),
            discrete_values = self.mask.len(),
            "actuators frozen"
        );
        Ok(())
    }

    /// Copy the policy's output into the flat buffers.
    ///
    /// An empty source zeroes its buffer ("no action this step"). A non-empty
    /// source must match the buffer length exactly; both sources are checked
    /// before either buffer is written.
    pub fn update_actions(&mut self, continuous: &[f32], discrete: &[i32]) -> Result<()> {
        self.freeze()?;
        check_source(BufferKind::Continuous, continuous.len(), self.continuous.len())?;
        check_source(BufferKind::Discrete, discrete.len(), self.discrete.len())?;

        copy_or_zero(continuous, &mut self.continuous);
        copy_or_zero(discrete, &mut self.discrete);
        Ok(())
    }

    /// Rebuild the mask by letting each actuator disable values in its own branches.
    ///
    /// On any error the mask is left fully permitted.
    pub fn write_action_mask(&mut self) -> Result<()> {
        self.freeze()?;
        self.mask.reset();

        let mut branch_offset = 0usize;
        for e in self.actuators.entries() {
            let branches = e.spec.num_discrete_actions();
            self.mask.set_current_branch_offset(branch_offset);

            let res = borrow_actuator(e).and_then(|mut a| {
                let mut writer = self.mask.writer(branches);
                a.write_discrete_action_mask(&mut writer)
            });
            if let Err(err) = res {
                self.mask.reset();
                return Err(err);
            }
            branch_offset += branches;
        }
        debug_assert_eq!(branch_offset, self.mask.num_branches());

        if self.cfg.validate_mask {
            if let Err(err) = self.mask.validate() {
                warn!(error = %err, "rejecting action mask");
                self.mask.reset();
                return Err(err);
            }
        }
        Ok(())
    }

    /// Hand every actuator its segment of the stored actions, in frozen order.
    ///
    /// Segments tile the flat buffers exactly: each actuator's continuous and
    /// discrete segments start where the previous actuator's ended.
    pub fn execute_actions(&mut self) -> Result<()> {
        self.freeze()?;
        self.ensure_available()?;

        let mut continuous_start = 0usize;
        let mut discrete_start = 0usize;
        for e in self.actuators.entries() {
            let c_end = continuous_start + e.spec.num_continuous_actions();
            let d_end = discrete_start + e.spec.num_discrete_actions();
            let actions = ActionBuffers::new(
                &self.continuous[continuous_start..c_end],
                &self.discrete[discrete_start..d_end],
            );

            trace!(
                actuator = %e.name,
                continuous_start,
                discrete_start,
                "dispatching actions"
            );
            borrow_actuator(e)?.on_action_received(actions);

            continuous_start = c_end;
            discrete_start = d_end;
        }
        debug_assert_eq!(continuous_start, self.continuous.len());
        debug_assert_eq!(discrete_start, self.discrete.len());
        Ok(())
    }

    /// Ask every actuator for heuristic actions, written into caller-owned buffers.
    ///
    /// The output buffers must be sized to the manager's totals.
    pub fn apply_heuristic(&mut self, continuous_out: &mut [f32], discrete_out: &mut [i32]) -> Result<()> {
        self.freeze()?;
        check_exact(BufferKind::Continuous, continuous_out.len(), self.continuous.len())?;
        check_exact(BufferKind::Discrete, discrete_out.len(), self.discrete.len())?;
        self.ensure_available()?;

        let mut c_rest: &mut [f32] = continuous_out;
        let mut d_rest: &mut [i32] = discrete_out;
        for e in self.actuators.entries() {
            let (c, c_tail) = std::mem::take(&mut c_rest).split_at_mut(e.spec.num_continuous_actions());
            let (d, d_tail) = std::mem::take(&mut d_rest).split_at_mut(e.spec.num_discrete_actions());
            c_rest = c_tail;
            d_rest = d_tail;

            let mut out = ActionBuffersMut::new(c, d);
            borrow_actuator(e)?.heuristic(&mut out);
        }
        Ok(())
    }

    /// Zero both buffers and reset every actuator. Does nothing before freeze.
    pub fn reset_data(&mut self) -> Result<()> {
        if !self.is_frozen() {
            return Ok(());
        }
        self.ensure_available()?;
        self.continuous.fill(0.0);
        self.discrete.fill(0);
        for e in self.actuators.entries() {
            borrow_actuator(e)?.reset_data();
        }
        Ok(())
    }

    pub fn stored_actions(&self) -> ActionBuffers<'_> {
        ActionBuffers::new(&self.continuous, &self.discrete)
    }

    pub fn stored_continuous_actions(&self) -> &[f32] {
        &self.continuous
    }

    pub fn stored_discrete_actions(&self) -> &[i32] {
        &self.discrete
    }

    pub fn discrete_action_mask(&self) -> &DiscreteActionMask {
        &self.mask
    }

    pub(crate) fn entries(&self) -> &[Registered] {
        self.actuators.entries()
    }

    // Fail before the first callback rather than halfway through a pass.
    fn ensure_available(&self) -> Result<()> {
        for e in self.actuators.entries() {
            borrow_actuator(e)?;
        }
        Ok(())
    }
}

fn borrow_actuator(entry: &Registered) -> Result<RefMut<'_, dyn Actuator + 'static>> {
    entry
        .handle
        .try_borrow_mut()
        .map_err(|_| ActuatorError::ActuatorBusy {
            name: entry.name.clone(),
        })
}

fn check_source(buffer: BufferKind, actual: usize, expected: usize) -> Result<()> {
    if actual == 0 {
        return Ok(());
    }
    check_exact(buffer, actual, expected)
}

fn check_exact(buffer: BufferKind, actual: usize, expected: usize) -> Result<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(ActuatorError::BufferLengthMismatch {
            buffer,
            expected,
            actual,
        })
    }
}
