//! Library side of the `medhx` command-line tool.

pub mod inspect;
pub mod load;
pub mod logging;
