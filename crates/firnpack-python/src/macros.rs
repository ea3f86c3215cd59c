/// Generate a frozen `#[pyclass]` struct where each field is a `Py<PyArray1<f64>>`.
///
/// Also generates a `from_profile()` method that moves the columns out of a
/// struct-of-arrays profile.
macro_rules! define_profile_result {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident from $core_type:ty {
            $($field:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[pyo3::pyclass(frozen)]
        $vis struct $name {
            $(
                #[pyo3(get)]
                pub $field: Py<numpy::PyArray1<f64>>,
            )+
        }

        impl $name {
            pub fn from_profile(py: pyo3::Python<'_>, profile: $core_type) -> Self {
                Self {
                    $(
                        $field: numpy::PyArray1::from_vec(py, profile.$field).unbind(),
                    )+
                }
            }
        }
    };
}

/// Generate a frozen `#[pyclass]` struct where each field is `f64`.
///
/// Also generates a `from_output()` method that copies values from the
/// corresponding Rust struct.
macro_rules! define_scalar_result {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident from $core_type:ty {
            $($field:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[pyo3::pyclass(frozen)]
        $vis struct $name {
            $(
                #[pyo3(get)]
                pub $field: f64,
            )+
        }

        impl $name {
            pub fn from_output(o: &$core_type) -> Self {
                Self {
                    $(
                        $field: o.$field,
                    )+
                }
            }
        }
    };
}

/// Build a `PyDict` of numpy arrays from named `Vec<f64>` columns.
macro_rules! columns_to_dict {
    ($py:expr, $($key:ident => $column:expr),+ $(,)?) => {{
        let dict = pyo3::types::PyDict::new($py);
        $(
            dict.set_item(stringify!($key), numpy::PyArray1::from_vec($py, $column))?;
        )+
        dict
    }};
}
