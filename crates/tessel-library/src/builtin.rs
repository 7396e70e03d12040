//! The reference leaves as a library.

use tessel_core::nodes::{Constant, Gain, Passthrough, Peak, Ramp, TableLookup};

use crate::library::StaticLibrary;

/// Name of the built-in library.
pub const BUILTIN_LIBRARY_NAME: &str = "builtin";

/// A library of the reference leaves shipped with `tessel-core`.
pub fn builtin_library() -> StaticLibrary {
    StaticLibrary::new(BUILTIN_LIBRARY_NAME)
        .register::<Passthrough>()
        .register::<Gain>()
        .register::<Constant>()
        .register::<Ramp>()
        .register::<Peak>()
        .register::<TableLookup>()
}
