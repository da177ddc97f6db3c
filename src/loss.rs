use crate::error::ShapeError;
use crate::linear_algebra::{Value, ValueType};

/// Calculates the Mean Squared Error between a prediction and its target.
pub fn mse(outputs: &[Value], targets: &[Value]) -> Result<Value, ShapeError> {
    if outputs.len() != targets.len() {
        return Err(ShapeError::new(
            "mse",
            (outputs.len(), 1),
            (targets.len(), 1),
        ));
    }

    if outputs.is_empty() {
        return Ok(Value::ZERO);
    }

    let sum: Value = outputs
        .iter()
        .zip(targets)
        .map(|(o, t)| (t - o) * (t - o))
        .sum();

    Ok(sum / outputs.len() as Value)
}
