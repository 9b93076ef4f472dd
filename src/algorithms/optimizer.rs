use nalgebra::DVector;

pub trait Optimizer: Send + Sync {
    fn update(&mut self, params: &mut DVector<f32>, gradients: &DVector<f32>);
    fn reset(&mut self);
}

/// Plain stochastic gradient descent with a fixed step size; the update
/// rule the pairwise trainer assumes.
#[derive(Debug, Clone)]
pub struct Sgd {
    learning_rate: f32,
}

impl Sgd {
    pub fn new(learning_rate: f32) -> Self {
        Self { learning_rate }
    }
}

impl Optimizer for Sgd {
    fn update(&mut self, params: &mut DVector<f32>, gradients: &DVector<f32>) {
        *params -= gradients * self.learning_rate;
    }

    fn reset(&mut self) {
        // SGD doesn't maintain state
    }
}
