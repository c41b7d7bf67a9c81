//! Interface of neural networks used in the agent.
//!
//! A model only needs to be constructible from a [`VarBuilder`] so that the
//! online and target copies live in their own [`VarMap`]s. [`Mlp`] and [`Mlp2`]
//! are ready-made critic and policy networks.
//!
//! [`VarMap`]: candle_nn::VarMap
//! [`Mlp`]: crate::mlp::Mlp
//! [`Mlp2`]: crate::mlp::Mlp2
use anyhow::Result;
use candle_core::Tensor;
use candle_nn::VarBuilder;

/// Neural network with a single input, not owning its variables.
pub trait SubModel1: Sized {
    /// Configuration from which the model is constructed.
    type Config;

    /// Output of the model.
    type Output;

    /// Builds the model with [`VarBuilder`] and [`SubModel1::Config`].
    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self>;

    /// Forward computation on a batch of observations.
    fn forward(&self, xs: &Tensor) -> Result<Self::Output>;
}

/// Neural network taking observations and actions, not owning its variables.
///
/// Used for both critics and error networks.
pub trait SubModel2: Sized {
    /// Configuration from which the model is constructed.
    type Config;

    /// Builds the model with [`VarBuilder`] and [`SubModel2::Config`].
    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self>;

    /// Returns a tensor of shape `[batch_size, 1]`.
    fn forward(&self, obs: &Tensor, act: &Tensor) -> Result<Tensor>;
}
