use std::fmt;

use crate::linear_algebra::{Value, ValueType};

/// A named activation function paired with its derivative.
///
/// The derivative is expressed in terms of the function's *output*: for `y = f(x)`,
/// `derivative(y) == f'(x)`. Only the predefined statics exist; networks hold
/// `&'static` references to them and look them up by name when reconstructed.
pub struct Activation {
    name: &'static str,
    function: fn(Value) -> Value,
    derivative: fn(Value) -> Value,
}

pub static SIGMOID: Activation = Activation {
    name: "sigmoid",
    function: sigmoid,
    derivative: sigmoid_prime,
};

pub static TANH: Activation = Activation {
    name: "tanh",
    function: tanh,
    derivative: tanh_prime,
};

static ACTIVATIONS: [&Activation; 2] = [&SIGMOID, &TANH];

impl Activation {
    pub fn by_name(name: &str) -> Option<&'static Activation> {
        ACTIVATIONS
            .iter()
            .copied()
            .find(|activation| activation.name == name)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn apply(&self, x: Value) -> Value {
        (self.function)(x)
    }

    pub fn derivative(&self, y: Value) -> Value {
        (self.derivative)(y)
    }
}

impl PartialEq for Activation {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Debug for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Activation").field(&self.name).finish()
    }
}

pub fn sigmoid(x: Value) -> Value {
    Value::ONE / (Value::ONE + (-x).exp())
}

/// Takes `y = sigmoid(x)`.
pub fn sigmoid_prime(y: Value) -> Value {
    y * (Value::ONE - y)
}

pub fn tanh(x: Value) -> Value {
    x.tanh()
}

/// Takes `y = tanh(x)`.
pub fn tanh_prime(y: Value) -> Value {
    Value::ONE - y * y
}
