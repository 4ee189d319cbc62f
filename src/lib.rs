//! Convomat
//!
//! A 3x3 convolution matrix filter stage for RGBA image pipelines, with
//! Python bindings via PyO3 and WASM bindings for JavaScript.
//!
//! ## Image Format
//!
//! Images are `(height, width, 4)` arrays of `u8`. All four channels run
//! through the same arithmetic; the fourth channel carries whatever
//! meaning the host assigns it.
//!
//! ## Stage Architecture
//!
//! The host pipeline configures a run entirely through string key/value
//! pairs (`kernel`, `divisor`, `channels`), receives row-granular
//! progress through a callback and gets back a freshly allocated
//! destination image. See [`filters::stage`] for the entry points and
//! [`filters::args`] for the argument grammar.

pub mod filters;

#[cfg(feature = "wasm")]
pub mod wasm;

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::filters::stage::process_parallel;

    /// Apply a configured 3x3 convolution to an RGBA u8 image.
    ///
    /// # Arguments
    /// * `image` - RGBA image (height, width, 4) as u8
    /// * `args` - Key/value argument pairs: `kernel` (9 comma-separated
    ///   integers), `divisor` (float) and `channels` (combination of
    ///   `R`, `G`, `B`, `A`)
    ///
    /// # Returns
    /// Filtered RGBA image with same dimensions
    #[pyfunction]
    pub fn convolution_rgba<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        args: Vec<(String, String)>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let input = image.as_array();
        let result = process_parallel(input, &args)
            .map_err(|err| PyValueError::new_err(err.to_string()))?;
        Ok(result.into_pyarray(py))
    }

    #[pymodule]
    pub fn convomat(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(convolution_rgba, m)?)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::convomat;
