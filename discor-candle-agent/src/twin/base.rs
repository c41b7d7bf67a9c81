//! Twin networks and their target copies.
use super::TwinEstimatorConfig;
use crate::{
    model::SubModel2,
    opt::Optimizer,
    util::{track, ParamScope},
};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor, D};
use candle_nn::{VarBuilder, VarMap};

/// Twin scalar estimators of `(state, action)` with target copies.
///
/// This is the capability DisCor consumes twice: once for the critics and
/// once for the error networks.
pub trait TwinEstimator {
    /// Evaluates the online networks.
    ///
    /// Each output has shape `[batch_size]`. If `with_gradients` is `false`,
    /// the outputs are detached from the computation graph.
    fn forward(&self, obs: &Tensor, act: &Tensor, with_gradients: bool) -> Result<(Tensor, Tensor)>;

    /// Evaluates the target networks. The outputs never carry gradients.
    fn forward_tgt(&self, obs: &Tensor, act: &Tensor) -> Result<(Tensor, Tensor)>;

    /// Backpropagates the loss and steps the optimizer of the online networks.
    fn backward_step(&mut self, loss: &Tensor) -> Result<()>;

    /// Blends the target variables in `scope` toward the online ones.
    ///
    /// `target = (1 - coef) * target + coef * online`.
    fn sync_target(&mut self, coef: f64, scope: &ParamScope) -> Result<()>;
}

/// Twin networks built from a [`SubModel2`].
///
/// Online variables are named `{prefix}0.*` and `{prefix}1.*`, target
/// variables `{prefix}_tgt0.*` and `{prefix}_tgt1.*`. The optimizer only
/// holds the online variables.
pub struct TwinNet<Q>
where
    Q: SubModel2,
{
    prefix: String,
    prefix_tgt: String,
    varmap: VarMap,
    varmap_tgt: VarMap,
    nets: [Q; 2],
    nets_tgt: [Q; 2],
    opt: Optimizer,
}

impl<Q> TwinNet<Q>
where
    Q: SubModel2,
    Q::Config: Clone,
{
    /// Constructs [`TwinNet`]. The targets start as exact copies.
    pub fn build(
        config: TwinEstimatorConfig<Q::Config>,
        prefix: &str,
        device: &Device,
    ) -> Result<Self> {
        let model_config = config.model_config.context("model_config is not set.")?;
        let prefix_tgt = format!("{}_tgt", prefix);

        let (varmap, nets) = Self::build_networks(&model_config, device, prefix)?;
        let (varmap_tgt, nets_tgt) = Self::build_networks(&model_config, device, &prefix_tgt)?;
        let opt = config.opt_config.build(varmap.all_vars())?;

        track(&varmap_tgt, &varmap, 1.0, (prefix, &prefix_tgt), &ParamScope::All)?;

        Ok(Self {
            prefix: prefix.to_string(),
            prefix_tgt,
            varmap,
            varmap_tgt,
            nets,
            nets_tgt,
            opt,
        })
    }

    fn build_networks(
        model_config: &Q::Config,
        device: &Device,
        prefix: &str,
    ) -> Result<(VarMap, [Q; 2])> {
        let varmap = VarMap::new();
        let build = |ix: usize| {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, device)
                .set_prefix(format!("{}{}", prefix, ix));
            Q::build(vb, model_config.clone())
        };
        let nets = [build(0)?, build(1)?];
        Ok((varmap, nets))
    }
}

impl<Q> TwinNet<Q>
where
    Q: SubModel2,
{
    fn eval(nets: &[Q; 2], obs: &Tensor, act: &Tensor) -> Result<(Tensor, Tensor)> {
        let v1 = nets[0].forward(obs, act)?.squeeze(D::Minus1)?;
        let v2 = nets[1].forward(obs, act)?.squeeze(D::Minus1)?;
        Ok((v1, v2))
    }

    /// Variables of the online networks.
    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Variables of the target networks.
    pub fn varmap_tgt(&self) -> &VarMap {
        &self.varmap_tgt
    }

    /// Prefix of the online variable names.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl<Q> TwinEstimator for TwinNet<Q>
where
    Q: SubModel2,
{
    fn forward(&self, obs: &Tensor, act: &Tensor, with_gradients: bool) -> Result<(Tensor, Tensor)> {
        let (v1, v2) = Self::eval(&self.nets, obs, act)?;
        match with_gradients {
            true => Ok((v1, v2)),
            false => Ok((v1.detach(), v2.detach())),
        }
    }

    fn forward_tgt(&self, obs: &Tensor, act: &Tensor) -> Result<(Tensor, Tensor)> {
        let (v1, v2) = Self::eval(&self.nets_tgt, obs, act)?;
        Ok((v1.detach(), v2.detach()))
    }

    fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        self.opt.backward_step(loss)
    }

    fn sync_target(&mut self, coef: f64, scope: &ParamScope) -> Result<()> {
        track(
            &self.varmap_tgt,
            &self.varmap,
            coef,
            (&self.prefix, &self.prefix_tgt),
            scope,
        )
    }
}
