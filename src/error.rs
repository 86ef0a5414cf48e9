//! Binary Error Types
//!
//! Every kind here is fatal. The cause (configuration, inventory or catalog
//! error) is kept in the `exn` error tree and logged in full on exit.

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("invalid configuration")]
    Config,
    #[display("could not set up logging")]
    Logging,
    #[display("inventory database unavailable")]
    Database,
    #[display("catalog run aborted")]
    Catalog,
}
