//! Ordered actuator registry with running action-space totals.
//!
//! The list is freely mutable until it is frozen. Freezing sorts it by name and
//! from then on every structural mutation is rejected with
//! [`ActuatorError::Frozen`], leaving the list untouched.

use std::rc::Rc;

use crate::actuator::ActuatorHandle;
use crate::error::{ActuatorError, Result};
use crate::spec::ActionSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Open,
    Frozen,
}

/// One registered actuator. Name and spec are captured once at registration.
#[derive(Clone)]
pub(crate) struct Registered {
    pub(crate) handle: ActuatorHandle,
    pub(crate) name: String,
    pub(crate) spec: ActionSpec,
}

impl Registered {
    fn capture(handle: ActuatorHandle, index: usize) -> Result<Self> {
        let (name, spec) = {
            let a = handle
                .try_borrow()
                .map_err(|_| ActuatorError::BusyAtRegistration { index })?;
            (a.name().to_string(), a.action_spec().clone())
        };
        Ok(Self { handle, name, spec })
    }
}

#[derive(Default)]
pub struct ActuatorList {
    entries: Vec<Registered>,
    lifecycle: Lifecycle,

    num_continuous_actions: usize,
    num_discrete_actions: usize,
    sum_of_discrete_branch_sizes: usize,
}

impl ActuatorList {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_frozen(&self) -> bool {
        self.lifecycle == Lifecycle::Frozen
    }

    pub fn push(&mut self, actuator: ActuatorHandle) -> Result<()> {
        self.ensure_open("add")?;
        let entry = Registered::capture(actuator, self.entries.len())?;
        self.add_totals(&entry.spec);
        self.entries.push(entry);
        Ok(())
    }

    pub fn insert(&mut self, index: usize, actuator: ActuatorHandle) -> Result<()> {
        self.ensure_open("insert")?;
        if index > self.entries.len() {
            return Err(ActuatorError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        let entry = Registered::capture(actuator, index)?;
        self.add_totals(&entry.spec);
        self.entries.insert(index, entry);
        Ok(())
    }

    /// Replace the actuator at `index`, returning the previous one.
    pub fn set(&mut self, index: usize, actuator: ActuatorHandle) -> Result<ActuatorHandle> {
        self.ensure_open("replace")?;
        self.check_index(index)?;
        let entry = Registered::capture(actuator, index)?;
        self.add_totals(&entry.spec);
        let old = std::mem::replace(&mut self.entries[index], entry);
        self.sub_totals(&old.spec);
        Ok(old.handle)
    }

    pub fn remove_at(&mut self, index: usize) -> Result<ActuatorHandle> {
        self.ensure_open("remove")?;
        self.check_index(index)?;
        let old = self.entries.remove(index);
        self.sub_totals(&old.spec);
        Ok(old.handle)
    }

    /// Remove by identity. Returns whether the actuator was registered.
    pub fn remove(&mut self, actuator: &ActuatorHandle) -> Result<bool> {
        self.ensure_open("remove")?;
        match self.index_of(actuator) {
            Some(i) => {
                let old = self.entries.remove(i);
                self.sub_totals(&old.spec);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn clear(&mut self) -> Result<()> {
        self.ensure_open("clear")?;
        self.entries.clear();
        self.num_continuous_actions = 0;
        self.num_discrete_actions = 0;
        self.sum_of_discrete_branch_sizes = 0;
        Ok(())
    }

    pub fn contains(&self, actuator: &ActuatorHandle) -> bool {
        self.index_of(actuator).is_some()
    }

    pub fn index_of(&self, actuator: &ActuatorHandle) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| Rc::ptr_eq(&e.handle, actuator))
    }

    pub fn get(&self, index: usize) -> Option<&ActuatorHandle> {
        self.entries.get(index).map(|e| &e.handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActuatorHandle> + '_ {
        self.entries.iter().map(|e| &e.handle)
    }

    /// Registered names in current order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn num_continuous_actions(&self) -> usize {
        self.num_continuous_actions
    }

    pub fn num_discrete_actions(&self) -> usize {
        self.num_discrete_actions
    }

    pub fn sum_of_discrete_branch_sizes(&self) -> usize {
        self.sum_of_discrete_branch_sizes
    }

    pub(crate) fn entries(&self) -> &[Registered] {
        &self.entries
    }

    /// Validate, sort by name and lock the list.
    ///
    /// Names must be unique and every actuator must agree on whether it has
    /// continuous actions. On failure the list stays open and keeps its order.
    pub(crate) fn freeze(&mut self) -> Result<()> {
        if self.is_frozen() {
            return Ok(());
        }

        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by(|&a, &b| self.entries[a].name.cmp(&self.entries[b].name));

        for pair in order.windows(2) {
            let (a, b) = (&self.entries[pair[0]], &self.entries[pair[1]]);
            if a.name == b.name {
                return Err(ActuatorError::DuplicateName {
                    name: a.name.clone(),
                });
            }
        }

        if let Some(&first) = order.first() {
            let first = &self.entries[first];
            let polarity = first.spec.has_continuous();
            if let Some(odd) = order
                .iter()
                .map(|&i| &self.entries[i])
                .find(|e| e.spec.has_continuous() != polarity)
            {
                return Err(ActuatorError::MixedActionPolarity {
                    first: first.name.clone(),
                    name: odd.name.clone(),
                    has_continuous: odd.spec.has_continuous(),
                });
            }
        }

        let mut slots: Vec<Option<Registered>> = self.entries.drain(..).map(Some).collect();
        self.entries = order.iter().filter_map(|&i| slots[i].take()).collect();

        self.lifecycle = Lifecycle::Frozen;
        Ok(())
    }

    fn ensure_open(&self, operation: &'static str) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Open => Ok(()),
            Lifecycle::Frozen => Err(ActuatorError::Frozen { operation }),
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(ActuatorError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
        }
    }

    fn add_totals(&mut self, spec: &ActionSpec) {
        self.num_continuous_actions += spec.num_continuous_actions();
        self.num_discrete_actions += spec.num_discrete_actions();
        self.sum_of_discrete_branch_sizes += spec.sum_of_discrete_branch_sizes();
    }

    fn sub_totals(&mut self, spec: &ActionSpec) {
        self.num_continuous_actions -= spec.num_continuous_actions();
        self.num_discrete_actions -= spec.num_discrete_actions();
        self.sum_of_discrete_branch_sizes -= spec.sum_of_discrete_branch_sizes();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::{handle, Actuator};
    use crate::buffers::ActionBuffers;

    struct Stub {
        name: String,
        spec: ActionSpec,
    }

    impl Actuator for Stub {
        fn name(&self) -> &str {
            &self.name
        }
        fn action_spec(&self) -> &ActionSpec {
            &self.spec
        }
        fn on_action_received(&mut self, _actions: ActionBuffers<'_>) {}
    }

    fn stub(name: &str, spec: ActionSpec) -> ActuatorHandle {
        handle(Stub {
            name: name.to_string(),
            spec,
        })
    }

    #[test]
    fn totals_track_every_mutation() {
        let mut list = ActuatorList::default();
        let a = stub("a", ActionSpec::make_discrete(&[3, 2]));
        let b = stub("b", ActionSpec::make_discrete(&[4]));

        list.push(a.clone()).unwrap();
        list.insert(0, b.clone()).unwrap();
        assert_eq!(list.num_discrete_actions(), 3);
        assert_eq!(list.sum_of_discrete_branch_sizes(), 9);

        let old = list.set(0, stub("c", ActionSpec::make_discrete(&[5]))).unwrap();
        assert!(Rc::ptr_eq(&old, &b));
        assert_eq!(list.sum_of_discrete_branch_sizes(), 10);

        assert!(list.remove(&a).unwrap());
        assert!(!list.remove(&a).unwrap());
        assert_eq!(list.num_discrete_actions(), 1);
        assert_eq!(list.sum_of_discrete_branch_sizes(), 5);

        list.remove_at(0).unwrap();
        assert!(list.is_empty());
        assert_eq!(list.num_discrete_actions(), 0);
        assert_eq!(list.sum_of_discrete_branch_sizes(), 0);
    }

    #[test]
    fn identity_lookups() {
        let mut list = ActuatorList::with_capacity(2);
        let a = stub("a", ActionSpec::make_continuous(1));
        let twin = stub("a", ActionSpec::make_continuous(1));
        list.push(a.clone()).unwrap();

        assert!(list.contains(&a));
        assert!(!list.contains(&twin));
        assert_eq!(list.index_of(&a), Some(0));
        assert!(list.get(0).is_some());
        assert!(list.get(1).is_none());
    }

    #[test]
    fn out_of_range_indices_are_errors() {
        let mut list = ActuatorList::default();
        let a = stub("a", ActionSpec::make_continuous(1));
        assert_eq!(
            list.insert(1, a.clone()),
            Err(ActuatorError::IndexOutOfRange { index: 1, len: 0 })
        );
        assert!(list.remove_at(0).is_err());
        assert!(list.set(0, a).is_err());
        assert_eq!(list.num_continuous_actions(), 0);
    }

    #[test]
    fn freeze_sorts_by_name() {
        let mut list = ActuatorList::default();
        for n in ["b", "C", "a", "B"] {
            list.push(stub(n, ActionSpec::make_continuous(1))).unwrap();
        }
        list.freeze().unwrap();
        // Ordinal: uppercase sorts before lowercase.
        assert_eq!(list.names().collect::<Vec<_>>(), ["B", "C", "a", "b"]);
        assert_eq!(list.lifecycle(), Lifecycle::Frozen);
    }

    #[test]
    fn frozen_list_rejects_mutation() {
        let mut list = ActuatorList::default();
        let a = stub("a", ActionSpec::make_continuous(2));
        list.push(a.clone()).unwrap();
        list.freeze().unwrap();

        let late = stub("z", ActionSpec::make_continuous(1));
        assert_eq!(
            list.push(late.clone()),
            Err(ActuatorError::Frozen { operation: "add" })
        );
        assert!(list.insert(0, late.clone()).is_err());
        assert!(list.set(0, late).is_err());
        assert!(list.remove(&a).is_err());
        assert!(list.remove_at(0).is_err());
        assert!(list.clear().is_err());

        assert_eq!(list.len(), 1);
        assert_eq!(list.num_continuous_actions(), 2);
    }

    #[test]
    fn duplicate_names_keep_list_open() {
        let mut list = ActuatorList::default();
        list.push(stub("b", ActionSpec::make_continuous(1))).unwrap();
        list.push(stub("a", ActionSpec::make_continuous(1))).unwrap();
        list.push(stub("b", ActionSpec::make_continuous(2))).unwrap();

        assert_eq!(
            list.freeze(),
            Err(ActuatorError::DuplicateName {
                name: "b".to_string()
            })
        );
        assert!(!list.is_frozen());
        assert_eq!(list.names().collect::<Vec<_>>(), ["b", "a", "b"]);
    }

    #[test]
    fn mixed_polarity_is_rejected() {
        let mut list = ActuatorList::default();
        list.push(stub("a", ActionSpec::make_continuous(1))).unwrap();
        list.push(stub("b", ActionSpec::make_discrete(&[2]))).unwrap();

        assert_eq!(
            list.freeze(),
            Err(ActuatorError::MixedActionPolarity {
                first: "a".to_string(),
                name: "b".to_string(),
                has_continuous: false,
            })
        );
        assert!(!list.is_frozen());
    }

    #[test]
    fn borrowed_actuator_cannot_register() {
        let mut list = ActuatorList::default();
        let a = stub("a", ActionSpec::make_continuous(1));
        let _guard = a.borrow_mut();
        assert_eq!(
            list.push(a.clone()),
            Err(ActuatorError::BusyAtRegistration { index: 0 })
        );
        assert!(list.is_empty());
    }
}
