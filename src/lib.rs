//! # actuate
//!
//! Aggregates independently written actuators into one flat action space and
//! dispatches each step's actions back to them.
//!
//! ## Quick Start
//!
//! ```
//! use actuate::prelude::*;
//!
//! struct Wheel {
//!     spec: ActionSpec,
//!     torque: f32,
//! }
//!
//! impl Actuator for Wheel {
//!     fn name(&self) -> &str {
//!         "wheel"
//!     }
//!     fn action_spec(&self) -> &ActionSpec {
//!         &self.spec
//!     }
//!     fn on_action_received(&mut self, actions: ActionBuffers<'_>) {
//!         self.torque = actions.continuous[0];
//!     }
//! }
//!
//! let wheel = std::rc::Rc::new(std::cell::RefCell::new(Wheel {
//!     spec: ActionSpec::make_continuous(1),
//!     torque: 0.0,
//! }));
//!
//! let mut manager = ActuatorManager::default();
//! manager.push(wheel.clone()).unwrap();
//!
//! // First use freezes the layout.
//! manager.update_actions(&[0.75], &[]).unwrap();
//! manager.write_action_mask().unwrap();
//! manager.execute_actions().unwrap();
//!
//! assert_eq!(wheel.borrow().torque, 0.75);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): serialization for [`config::ManagerConfig`],
//!   [`spec::ActionSpec`] and [`observer::LayoutSnapshot`]
//!
//! ## Modules
//!
//! - [`manager`]: freeze, per-step update/mask/dispatch cycle
//! - [`collection`]: registration list and running totals
//! - [`mask`]: discrete action mask
//! - [`actuator`]: the actuator trait and the vector actuator adapter
//! - [`observer`]: read-only layout snapshots

#[path = "core/actuator.rs"]
pub mod actuator;

#[path = "core/buffers.rs"]
pub mod buffers;

#[path = "core/collection.rs"]
pub mod collection;

#[path = "core/config.rs"]
pub mod config;

#[path = "core/error.rs"]
pub mod error;

#[path = "core/manager.rs"]
pub mod manager;

#[path = "core/mask.rs"]
pub mod mask;

#[path = "core/prng.rs"]
pub mod prng;

#[path = "core/spec.rs"]
pub mod spec;

pub mod observer;

/// Prelude module for convenient imports.
///
/// ```
/// use actuate::prelude::*;
/// ```
pub mod prelude {
    pub use crate::actuator::{
        handle, ActionReceiver, Actuator, ActuatorHandle, HeuristicProvider, VectorActuator,
    };
    pub use crate::buffers::{ActionBuffers, ActionBuffersMut};
    pub use crate::collection::Lifecycle;
    pub use crate::config::ManagerConfig;
    pub use crate::error::{ActuatorError, BufferKind};
    pub use crate::manager::ActuatorManager;
    pub use crate::mask::{DiscreteActionMask, MaskWriter};
    pub use crate::observer::{LayoutAdapter, LayoutSnapshot};
    pub use crate::spec::ActionSpec;
}
