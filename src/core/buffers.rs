//! Borrowed views of the flat action buffers.
//!
//! An actuator never sees the whole buffer, only the segment the manager carved
//! for it. The lifetimes tie each view to a single callback.

/// Read-only continuous and discrete segments handed to one actuator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionBuffers<'a> {
    pub continuous: &'a [f32],
    pub discrete: &'a [i32],
}

impl<'a> ActionBuffers<'a> {
    pub fn new(continuous: &'a [f32], discrete: &'a [i32]) -> Self {
        Self {
            continuous,
            discrete,
        }
    }

    pub fn empty() -> Self {
        Self {
            continuous: &[],
            discrete: &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.continuous.is_empty() && self.discrete.is_empty()
    }
}

/// Writable segments, used when actuators fill in heuristic actions.
#[derive(Debug)]
pub struct ActionBuffersMut<'a> {
    pub continuous: &'a mut [f32],
    pub discrete: &'a mut [i32],
}

impl<'a> ActionBuffersMut<'a> {
    pub fn new(continuous: &'a mut [f32], discrete: &'a mut [i32]) -> Self {
        Self {
            continuous,
            discrete,
        }
    }

    pub fn as_view(&self) -> ActionBuffers<'_> {
        ActionBuffers::new(&*self.continuous, &*self.discrete)
    }

    pub fn clear(&mut self) {
        self.continuous.fill(0.0);
        self.discrete.fill(0);
    }
}

/// Copy `source` into `dest`, or zero `dest` when `source` is empty.
///
/// Callers check lengths beforehand; a non-empty source must match exactly.
pub(crate) fn copy_or_zero<T: Copy + Default>(source: &[T], dest: &mut [T]) {
    if source.is_empty() {
        dest.fill(T::default());
    } else {
        dest.copy_from_slice(source);
    }
}
