mod blocking;
mod connection;
mod connector;
mod row_wrap;
mod value_wrap;

pub use blocking::*;
pub use connection::*;
pub use connector::*;
pub(crate) use row_wrap::*;
pub(crate) use value_wrap::*;
