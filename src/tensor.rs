//! Shared-handle parameter tensor
//!
//! A `Tensor` is a cheap handle over reference-counted storage: cloning it
//! shares the underlying values and gradient. This is what lets an optimizer
//! hold the parameter list while the model mutates gradients through its own
//! handles — both sides observe the same storage.
//!
//! Borrow discipline: `data()` / `data_mut()` hand out `RefCell` guards, so
//! callers keep borrows short-lived and never hold one across a call that
//! might borrow the same tensor again.

use crate::device::Device;
use ndarray::Array1;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// One-dimensional parameter or activation tensor
#[derive(Clone)]
pub struct Tensor {
    data: Rc<RefCell<Array1<f32>>>,
    grad: Rc<RefCell<Option<Array1<f32>>>>,
    requires_grad: bool,
}

impl Tensor {
    /// Create a tensor from raw values
    pub fn from_vec(data: Vec<f32>, requires_grad: bool) -> Self {
        Self {
            data: Rc::new(RefCell::new(Array1::from_vec(data))),
            grad: Rc::new(RefCell::new(None)),
            requires_grad,
        }
    }

    /// Create a zero-filled tensor
    pub fn zeros(len: usize, requires_grad: bool) -> Self {
        Self::from_vec(vec![0.0; len], requires_grad)
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    /// Whether the tensor has no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the values
    pub fn data(&self) -> Ref<'_, Array1<f32>> {
        self.data.borrow()
    }

    /// Mutably borrow the values
    pub fn data_mut(&self) -> RefMut<'_, Array1<f32>> {
        self.data.borrow_mut()
    }

    /// Copy the values out
    pub fn to_vec(&self) -> Vec<f32> {
        self.data.borrow().to_vec()
    }

    /// Clone of the accumulated gradient, if any
    pub fn grad(&self) -> Option<Array1<f32>> {
        self.grad.borrow().clone()
    }

    /// Replace the gradient
    pub fn set_grad(&self, grad: Array1<f32>) {
        *self.grad.borrow_mut() = Some(grad);
    }

    /// Add into the gradient, initializing it if absent
    pub fn accumulate_grad(&self, delta: &Array1<f32>) {
        let mut slot = self.grad.borrow_mut();
        match slot.as_mut() {
            Some(grad) => *grad = &*grad + delta,
            None => *slot = Some(delta.clone()),
        }
    }

    /// Drop the accumulated gradient
    pub fn zero_grad(&self) {
        *self.grad.borrow_mut() = None;
    }

    /// Whether gradients are tracked for this tensor
    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    /// Move to a device
    ///
    /// CPU-only build: every placement is the identity, returning a handle
    /// to the same storage.
    pub fn to(&self, _device: Device) -> Tensor {
        self.clone()
    }

    /// Whether two handles share the same underlying storage
    pub fn shares_storage(&self, other: &Tensor) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("len", &self.len())
            .field("requires_grad", &self.requires_grad)
            .field("has_grad", &self.grad.borrow().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn test_clone_shares_storage() {
        let a = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);
        let b = a.clone();

        b.data_mut()[1] = 9.0;

        assert_eq!(a.to_vec(), vec![1.0, 9.0, 3.0]);
        assert!(a.shares_storage(&b));
    }

    #[test]
    fn test_separate_tensors_do_not_share() {
        let a = Tensor::from_vec(vec![1.0], true);
        let b = Tensor::from_vec(vec![1.0], true);
        assert!(!a.shares_storage(&b));
    }

    #[test]
    fn test_grad_accumulation() {
        let t = Tensor::zeros(2, true);
        assert!(t.grad().is_none());

        t.accumulate_grad(&arr1(&[1.0, 2.0]));
        t.accumulate_grad(&arr1(&[0.5, 0.5]));
        assert_eq!(t.grad().unwrap().to_vec(), vec![1.5, 2.5]);

        t.zero_grad();
        assert!(t.grad().is_none());
    }

    #[test]
    fn test_grad_shared_across_handles() {
        let a = Tensor::zeros(1, true);
        let b = a.clone();

        a.set_grad(arr1(&[3.0]));

        assert_eq!(b.grad().unwrap().to_vec(), vec![3.0]);
    }

    #[test]
    fn test_to_device_is_identity() {
        let t = Tensor::from_vec(vec![1.0, 2.0], false);
        let moved = t.to(Device::Cpu);
        assert!(t.shares_storage(&moved));
    }
}
