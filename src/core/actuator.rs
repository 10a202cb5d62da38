//! The capability set every actuator exposes to the manager.

use std::cell::RefCell;
use std::rc::Rc;

use crate::buffers::{ActionBuffers, ActionBuffersMut};
use crate::error::Result;
use crate::mask::MaskWriter;
use crate::spec::ActionSpec;

/// A component that owns a slice of the combined action space.
///
/// `name` and `action_spec` must not change while the actuator is registered
/// with a manager; the manager captures both at registration time.
pub trait Actuator {
    fn name(&self) -> &str;

    fn action_spec(&self) -> &ActionSpec;

    /// Disable discrete values for the coming step. The writer only reaches this
    /// actuator's own branches.
    fn write_discrete_action_mask(&mut self, _mask: &mut MaskWriter<'_>) -> Result<()> {
        Ok(())
    }

    /// Receive this actuator's segment of the decoded actions.
    fn on_action_received(&mut self, actions: ActionBuffers<'_>);

    /// Fill in actions without a policy (manual control, scripted agents).
    fn heuristic(&mut self, _actions_out: &mut ActionBuffersMut<'_>) {}

    fn reset_data(&mut self) {}
}

/// Shared handle to an actuator. The manager holds clones; the creator keeps ownership.
pub type ActuatorHandle = Rc<RefCell<dyn Actuator>>;

/// Wrap a concrete actuator into a handle.
pub fn handle<A: Actuator + 'static>(actuator: A) -> ActuatorHandle {
    Rc::new(RefCell::new(actuator))
}

/// The action half of an actuator, for components that do not want to
/// implement naming and spec bookkeeping themselves.
pub trait ActionReceiver {
    fn on_action_received(&mut self, actions: ActionBuffers<'_>);

    fn write_discrete_action_mask(&mut self, _mask: &mut MaskWriter<'_>) -> Result<()> {
        Ok(())
    }
}

pub trait HeuristicProvider {
    fn heuristic(&mut self, actions_out: &mut ActionBuffersMut<'_>);
}

/// Adapts an [`ActionReceiver`] (and optionally a [`HeuristicProvider`]) into an [`Actuator`].
///
/// The registered name carries a suffix describing the action space, so two
/// vector actuators built from the same base name but different specs do not
/// collide.
pub struct VectorActuator<R> {
    receiver: R,
    heuristic: Option<Box<dyn HeuristicProvider>>,
    spec: ActionSpec,
    name: String,
}

impl<R: ActionReceiver> VectorActuator<R> {
    pub fn new(receiver: R, spec: ActionSpec, base_name: &str) -> Self {
        let name = format!("{}{}", base_name, Self::suffix(&spec));
        Self {
            receiver,
            heuristic: None,
            spec,
            name,
        }
    }

    pub fn with_heuristic(mut self, provider: Box<dyn HeuristicProvider>) -> Self {
        self.heuristic = Some(provider);
        self
    }

    pub fn receiver(&self) -> &R {
        &self.receiver
    }

    pub fn receiver_mut(&mut self) -> &mut R {
        &mut self.receiver
    }

    fn suffix(spec: &ActionSpec) -> String {
        match (spec.num_continuous_actions(), spec.num_discrete_actions()) {
            (0, _) => "-Discrete".to_string(),
            (_, 0) => "-Continuous".to_string(),
            (c, d) => format!("-Continuous-{c}-Discrete-{d}"),
        }
    }
}

impl<R: ActionReceiver> Actuator for VectorActuator<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn action_spec(&self) -> &ActionSpec {
        &self.spec
    }

    fn write_discrete_action_mask(&mut self, mask: &mut MaskWriter<'_>) -> Result<()> {
        self.receiver.write_discrete_action_mask(mask)
    }

    fn on_action_received(&mut self, actions: ActionBuffers<'_>) {
        self.receiver.on_action_received(actions);
    }

    fn heuristic(&mut self, actions_out: &mut ActionBuffersMut<'_>) {
        if let Some(h) = self.heuristic.as_mut() {
            h.heuristic(actions_out);
        }
    }
}
