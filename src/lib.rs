pub use lease_core::*;
pub use lease_macros::*;
