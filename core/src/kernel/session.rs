use super::{GeometryKernel, KernelResult};
use std::ops::{Deref, DerefMut};
use tracing::debug;

/// Scoped ownership of a kernel's model for the duration of one run.
///
/// Opening the session initializes a fresh, empty model. Dropping it always
/// finalizes the kernel, including when a pipeline stage returns early with
/// an error, so no stale entities leak into the next run.
pub struct GeometrySession<K: GeometryKernel> {
    kernel: K,
    model: String,
}

impl<K: GeometryKernel> GeometrySession<K> {
    pub fn open(mut kernel: K, model: &str) -> KernelResult<Self> {
        kernel.initialize(model)?;
        debug!(model, "geometry session opened");
        Ok(Self {
            kernel,
            model: model.to_string(),
        })
    }

    /// Name of the model this session initialized.
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl<K: GeometryKernel> Deref for GeometrySession<K> {
    type Target = K;

    fn deref(&self) -> &K {
        &self.kernel
    }
}

impl<K: GeometryKernel> DerefMut for GeometrySession<K> {
    fn deref_mut(&mut self) -> &mut K {
        &mut self.kernel
    }
}

impl<K: GeometryKernel> Drop for GeometrySession<K> {
    fn drop(&mut self) {
        self.kernel.finalize();
        debug!(model = %self.model, "geometry session closed");
    }
}
