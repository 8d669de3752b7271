//! Common data types used throughout the application

pub mod run;
pub mod sync;
pub mod upload;

pub use run::*;
pub use sync::*;
pub use upload::*;
