mod config;
mod connection;
mod cursor;
mod error;
mod executor;
mod guard;
mod query;
mod util;
mod value;

pub use ::anyhow::Context;
pub use config::*;
pub use connection::*;
pub use cursor::*;
pub use error::*;
pub use executor::*;
pub use guard::*;
pub use query::*;
pub use util::*;
pub use value::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T, E = Error> = anyhow::Result<T, E>;
pub type Error = anyhow::Error;
