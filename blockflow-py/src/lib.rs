//! Python bindings for blockflow.
//!
//! Exposes `compute_flow` taking two 2D numpy arrays of any numeric dtype
//! (converted to `float32`) and returning `(vx, vy, reliability)` arrays.

use numpy::ndarray::Array2;
use numpy::{AllowTypeChange, IntoPyArray, PyArray2, PyArrayLike2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use blockflow::{
    compute_flow as rust_compute_flow, FlowConfig, FlowError, ImageView, OwnedImage,
};

type FlowArrays<'py> = (
    Bound<'py, PyArray2<f32>>,
    Bound<'py, PyArray2<f32>>,
    Bound<'py, PyArray2<f32>>,
);

/// Convert a FlowError to a Python exception.
fn to_py_err(err: FlowError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Copies a numpy array into a row-major buffer, returning `(data, width, height)`.
fn to_buffer(array: &PyArrayLike2<'_, f32, AllowTypeChange>) -> (Vec<f32>, usize, usize) {
    let view = array.as_array();
    let (height, width) = view.dim();
    (view.iter().copied().collect(), width, height)
}

fn to_numpy<'py>(py: Python<'py>, image: OwnedImage) -> PyResult<Bound<'py, PyArray2<f32>>> {
    let (width, height) = image.shape();
    let array = Array2::from_shape_vec((height, width), image.into_data())
        .map_err(|err| PyValueError::new_err(err.to_string()))?;
    Ok(array.into_pyarray(py))
}

/// Estimate dense optical flow from `i1` to `i2`.
///
/// Args:
///     i1: 2D numpy array (height x width), first frame
///     i2: 2D numpy array with the same shape, second frame
///     patch_r: Half-size of the matching patch
///     search_r: Maximum displacement searched along each axis
///     sigma: Gaussian pre-smoothing sigma, 0 disables it (default: 1.0)
///     thr: Relative reliability threshold (default: 0.001)
///     distance_penalty: Slope of the radial cost penalty (default: 0.01)
///     parallel: Process rows in parallel (default: False)
///
/// Returns:
///     Tuple (vx, vy, reliability) of float32 arrays shaped like the inputs
#[pyfunction]
#[pyo3(signature = (i1, i2, patch_r, search_r, sigma = 1.0, thr = 0.001, distance_penalty = 0.01, parallel = false))]
#[allow(clippy::too_many_arguments)]
fn compute_flow<'py>(
    py: Python<'py>,
    i1: PyArrayLike2<'py, f32, AllowTypeChange>,
    i2: PyArrayLike2<'py, f32, AllowTypeChange>,
    patch_r: usize,
    search_r: usize,
    sigma: f32,
    thr: f32,
    distance_penalty: f64,
    parallel: bool,
) -> PyResult<FlowArrays<'py>> {
    let (data1, width1, height1) = to_buffer(&i1);
    let (data2, width2, height2) = to_buffer(&i2);
    let view1 = ImageView::from_slice(&data1, width1, height1).map_err(to_py_err)?;
    let view2 = ImageView::from_slice(&data2, width2, height2).map_err(to_py_err)?;

    let cfg = FlowConfig {
        sigma,
        thr,
        distance_penalty,
        parallel,
        ..FlowConfig::new(patch_r, search_r)
    };
    let field = rust_compute_flow(view1, view2, &cfg).map_err(to_py_err)?;
    let (vx, vy, reliability) = field.into_parts();
    Ok((
        to_numpy(py, vx)?,
        to_numpy(py, vy)?,
        to_numpy(py, reliability)?,
    ))
}

/// Python module for blockflow dense optical flow.
#[pymodule]
fn _blockflow(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(compute_flow, m)?)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}
