//! Small models and fixed-output collaborators for unit tests.
use crate::{
    actor::StochasticPolicy,
    model::{SubModel1, SubModel2},
    twin::TwinEstimator,
    util::ParamScope,
};
use anyhow::Result;
use candle_core::{Device, Tensor, D};
use candle_nn::{linear, Linear, Module, VarBuilder, VarMap};
use discor_core::record::Record;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LinearConfig {
    pub obs_dim: usize,
    pub act_dim: usize,
}

impl LinearConfig {
    pub fn new(obs_dim: usize, act_dim: usize) -> Self {
        Self { obs_dim, act_dim }
    }
}

/// `q(s, a) = w^T [s; a] + b`.
pub struct LinearQ(Linear);

impl SubModel2 for LinearQ {
    type Config = LinearConfig;

    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self> {
        Ok(Self(linear(config.obs_dim + config.act_dim, 1, vb.pp("l"))?))
    }

    fn forward(&self, obs: &Tensor, act: &Tensor) -> Result<Tensor> {
        let xs = Tensor::cat(&[obs, act], D::Minus1)?;
        Ok(self.0.forward(&xs)?)
    }
}

/// Gaussian policy with linear mean and log std.
pub struct LinearPolicy {
    mean: Linear,
    lstd: Linear,
}

impl SubModel1 for LinearPolicy {
    type Config = LinearConfig;
    type Output = (Tensor, Tensor);

    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self> {
        Ok(Self {
            mean: linear(config.obs_dim, config.act_dim, vb.pp("mean"))?,
            lstd: linear(config.obs_dim, config.act_dim, vb.pp("lstd"))?,
        })
    }

    fn forward(&self, xs: &Tensor) -> Result<Self::Output> {
        Ok((self.mean.forward(xs)?, self.lstd.forward(xs)?))
    }
}

/// Twin estimator returning fixed values, recording what it is asked to do.
pub struct FixedTwin {
    pub online: (Vec<f32>, Vec<f32>),
    pub target: (Vec<f32>, Vec<f32>),
    pub losses: Vec<f32>,
    pub syncs: Vec<(f64, ParamScope)>,
}

impl FixedTwin {
    pub fn new(online: (Vec<f32>, Vec<f32>), target: (Vec<f32>, Vec<f32>)) -> Self {
        Self {
            online,
            target,
            losses: vec![],
            syncs: vec![],
        }
    }

    fn pair(v: &(Vec<f32>, Vec<f32>), obs: &Tensor) -> Result<(Tensor, Tensor)> {
        let n = v.0.len();
        Ok((
            Tensor::from_slice(&v.0[..], (n,), obs.device())?,
            Tensor::from_slice(&v.1[..], (n,), obs.device())?,
        ))
    }
}

impl TwinEstimator for FixedTwin {
    fn forward(&self, obs: &Tensor, _act: &Tensor, _with_gradients: bool) -> Result<(Tensor, Tensor)> {
        Self::pair(&self.online, obs)
    }

    fn forward_tgt(&self, obs: &Tensor, _act: &Tensor) -> Result<(Tensor, Tensor)> {
        Self::pair(&self.target, obs)
    }

    fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        self.losses.push(loss.to_scalar::<f32>()?);
        Ok(())
    }

    fn sync_target(&mut self, coef: f64, scope: &ParamScope) -> Result<()> {
        self.syncs.push((coef, scope.clone()));
        Ok(())
    }
}

/// Policy returning zero actions with a fixed log probability.
pub struct FixedPolicy {
    pub act_dim: usize,
    pub log_p: f32,
    pub alpha: f64,
    pub n_updates: usize,
}

impl FixedPolicy {
    pub fn new(act_dim: usize, log_p: f32, alpha: f64) -> Self {
        Self {
            act_dim,
            log_p,
            alpha,
            n_updates: 0,
        }
    }
}

impl StochasticPolicy for FixedPolicy {
    fn sample(&self, obs: &Tensor, _with_gradients: bool) -> Result<(Tensor, Tensor)> {
        let n = obs.dims()[0];
        let act = Tensor::zeros((n, self.act_dim), candle_core::DType::F32, obs.device())?;
        let log_p = Tensor::from_slice(&vec![self.log_p; n][..], (n,), obs.device())?;
        Ok((act, log_p))
    }

    fn alpha(&self) -> Result<f64> {
        Ok(self.alpha)
    }

    fn update<C: TwinEstimator>(&mut self, _obs: &Tensor, _critic: &C) -> Result<Record> {
        self.n_updates += 1;
        Ok(Record::from_scalar("loss_actor", 0.0))
    }
}

/// Asserts every target variable equals its online counterpart bit by bit.
pub fn assert_synced(online: &VarMap, target: &VarMap, prefix: &str, prefix_tgt: &str) -> Result<()> {
    let online = online.data().lock().unwrap();
    let target = target.data().lock().unwrap();
    assert_eq!(online.len(), target.len());
    for (k_tgt, v_tgt) in target.iter() {
        let k = k_tgt.replacen(prefix_tgt, prefix, 1);
        let v = online.get(&k).unwrap();
        let t_tgt = v_tgt.as_tensor().flatten_all()?.to_vec1::<f32>()?;
        let t = v.as_tensor().flatten_all()?.to_vec1::<f32>()?;
        let bits_tgt = t_tgt.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        let bits = t.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits, bits_tgt, "{} differs from {}", k_tgt, k);
    }
    Ok(())
}

/// `[batch_size, dim]` tensor filled with `v`.
pub fn filled(batch_size: usize, dim: usize, v: f32) -> Result<Tensor> {
    Ok(Tensor::from_slice(
        &vec![v; batch_size * dim][..],
        (batch_size, dim),
        &Device::Cpu,
    )?)
}
