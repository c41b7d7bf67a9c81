//! Utilities.
use anyhow::{anyhow, Context, Result};
use candle_core::{Device, Tensor};
use candle_nn::VarMap;
use log::trace;
use ndarray::{ArrayBase, Data, Dimension};
use serde::{Deserialize, Serialize};

/// Subset of variables touched by a soft update.
///
/// Variables are selected by a substring of their names in the target
/// network. This allows the parameters of a shared state encoder to be
/// tracked with a different coefficient from the rest of a network.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum ParamScope {
    /// All variables.
    All,

    /// Variables whose names contain the key.
    Matching(String),

    /// Variables whose names do not contain the key.
    Excluding(String),
}

impl ParamScope {
    /// Returns `true` if the variable of the given name is in the scope.
    pub fn contains(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Matching(key) => name.contains(key.as_str()),
            Self::Excluding(key) => !name.contains(key.as_str()),
        }
    }
}

/// Applies soft update on variables.
///
/// `dest = coef * src + (1.0 - coef) * dest`
///
/// A variable in `dest` is paired with the variable in `src` whose name is
/// obtained by replacing `ss_dest` with `ss_src`. When `coef == 1.0` the
/// values are copied, so the target becomes bit-identical to the source.
pub fn track(
    dest: &VarMap,
    src: &VarMap,
    coef: f64,
    (ss_src, ss_dest): (&str, &str),
    scope: &ParamScope,
) -> Result<()> {
    trace!("dest");
    let dest = dest
        .data()
        .lock()
        .map_err(|_| anyhow!("Lock of target variables is poisoned"))?;
    trace!("src");
    let src = src
        .data()
        .lock()
        .map_err(|_| anyhow!("Lock of source variables is poisoned"))?;

    for (k_dest, v_dest) in dest.iter().filter(|(k, _)| scope.contains(k)) {
        let k_src = k_dest.replacen(ss_dest, ss_src, 1);
        let v_src = src
            .get(&k_src)
            .with_context(|| format!("No source variable for {}", k_dest))?;
        if coef == 1.0 {
            v_dest.set(v_src.as_tensor())?;
        } else {
            let t_dest = ((coef * v_src.as_tensor())? + ((1.0 - coef) * v_dest.as_tensor())?)?;
            v_dest.set(&t_dest)?;
        }
    }

    Ok(())
}

/// Converts an f32 array into a tensor of the same shape.
pub fn array_to_tensor<S, D>(a: &ArrayBase<S, D>, device: &Device) -> Result<Tensor>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    let t = Tensor::from_iter(a.iter().copied(), device)?;
    Ok(t.reshape(a.shape())?)
}
