pub mod error;
pub mod model;
pub mod session;
pub mod types;

use crate::error::GatewayError;

pub type GatewayResult<T> = Result<T, GatewayError>;
