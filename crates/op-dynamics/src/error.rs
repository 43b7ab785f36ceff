//! Error kinds surfaced by the dynamics component.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DynamicsError {
    #[error("gear {0} is out of range 1..={1}")]
    InvalidGear(i32, i32),

    #[error(transparent)]
    Component(#[from] op_component::ComponentError),
}

pub type DynamicsResult<T> = Result<T, DynamicsError>;
