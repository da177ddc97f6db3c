pub use self::activation::{Activation, SIGMOID, TANH};
pub use self::error::{NetworkError, ShapeError};
pub use self::network::{
    Network, NetworkRecord, DEFAULT_LEARNING_RATE, MUTATION_STANDARD_DEVIATION,
};

pub mod activation;
pub mod linear_algebra;
pub mod loss;

mod error;
mod network;
