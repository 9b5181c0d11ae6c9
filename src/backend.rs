//! Backend selection for the pipeline binary.
//!
//! Exactly one backend is active at a time; `ndarray` is the default and is
//! superseded by `wgpu` or `tch` when those features are enabled.

use burn::tensor::backend::Backend;

#[cfg(all(feature = "ndarray", not(any(feature = "wgpu", feature = "tch"))))]
pub type MainBackend = burn::backend::NdArray<f32>;
#[cfg(feature = "wgpu")]
pub type MainBackend = burn::backend::Wgpu;
#[cfg(all(feature = "tch", not(feature = "wgpu")))]
pub type MainBackend = burn::backend::LibTorch<f32>;

#[cfg(not(any(feature = "ndarray", feature = "wgpu", feature = "tch")))]
std::compile_error!("No backend selected. Enable one of: ndarray (default), wgpu, tch.");

pub type MainAutoBackend = burn::backend::Autodiff<MainBackend>;

pub fn main_device() -> <MainBackend as Backend>::Device {
    Default::default()
}
