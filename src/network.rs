use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::activation::{Activation, SIGMOID};
use crate::error::{NetworkError, ShapeError};
use crate::linear_algebra::{Matrix, Value};

pub const DEFAULT_LEARNING_RATE: Value = 0.1;

/// The standard deviation of the Gaussian noise added by [`Network::mutate`].
pub const MUTATION_STANDARD_DEVIATION: Value = 0.1;

/// A fully connected network with one hidden layer.
///
/// Cloning produces an independent network: the weights and biases are deep copied, while the
/// activation, being a shared static, is not.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(into = "NetworkRecord", try_from = "NetworkRecord")]
pub struct Network {
    input_nodes: usize,
    hidden_nodes: usize,
    output_nodes: usize,
    /// `hidden x input`
    weights_ih: Matrix,
    /// `output x hidden`
    weights_ho: Matrix,
    bias_h: Matrix,
    bias_o: Matrix,
    learning_rate: Value,
    activation: &'static Activation,
}

/// The persisted form of a [`Network`].
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct NetworkRecord {
    pub input_nodes: usize,
    pub hidden_nodes: usize,
    pub output_nodes: usize,
    pub weights_ih: Matrix,
    pub weights_ho: Matrix,
    pub bias_h: Matrix,
    pub bias_o: Matrix,
    pub learning_rate: Value,
    pub activation_function: String,
}

impl Network {
    /// Creates a network whose weights and biases are drawn uniformly from `[-1, 1]`.
    pub fn new(
        input_nodes: usize,
        hidden_nodes: usize,
        output_nodes: usize,
        rng: &mut impl Rng,
    ) -> Self {
        debug!(input_nodes, hidden_nodes, output_nodes, "Creating network.");

        Self {
            input_nodes,
            hidden_nodes,
            output_nodes,
            weights_ih: Matrix::random(hidden_nodes, input_nodes, rng),
            weights_ho: Matrix::random(output_nodes, hidden_nodes, rng),
            bias_h: Matrix::random(hidden_nodes, 1, rng),
            bias_o: Matrix::random(output_nodes, 1, rng),
            learning_rate: DEFAULT_LEARNING_RATE,
            activation: &SIGMOID,
        }
    }

    pub fn input_nodes(&self) -> usize {
        self.input_nodes
    }

    pub fn hidden_nodes(&self) -> usize {
        self.hidden_nodes
    }

    pub fn output_nodes(&self) -> usize {
        self.output_nodes
    }

    pub fn weights_ih(&self) -> &Matrix {
        &self.weights_ih
    }

    pub fn weights_ho(&self) -> &Matrix {
        &self.weights_ho
    }

    pub fn bias_h(&self) -> &Matrix {
        &self.bias_h
    }

    pub fn bias_o(&self) -> &Matrix {
        &self.bias_o
    }

    pub fn learning_rate(&self) -> Value {
        self.learning_rate
    }

    /// No range is enforced.
    pub fn set_learning_rate(&mut self, learning_rate: Value) {
        self.learning_rate = learning_rate;
    }

    pub fn activation(&self) -> &'static Activation {
        self.activation
    }

    pub fn set_activation(&mut self, activation: &'static Activation) {
        self.activation = activation;
    }

    pub fn predict(&self, input: &[Value]) -> Result<Vec<Value>, ShapeError> {
        self.check_length("predict", input, self.input_nodes)?;

        let inputs = Matrix::from_column(input);
        let (_, outputs) = self.propagate_forward(&inputs)?;

        Ok(outputs.to_vec())
    }

    /// Runs one step of stochastic gradient descent on a single sample.
    pub fn train(&mut self, input: &[Value], target: &[Value]) -> Result<(), ShapeError> {
        self.check_length("train", input, self.input_nodes)?;
        self.check_length("train", target, self.output_nodes)?;

        let activation = self.activation;

        // Propagate forward ====================

        let inputs = Matrix::from_column(input);
        let (hidden, outputs) = self.propagate_forward(&inputs)?;

        // Propagate backward ===================

        let targets = Matrix::from_column(target);
        let output_errors = targets.subtract(&outputs)?;
        trace!(?output_errors, "Output errors");

        let mut output_gradients = outputs.map(|y| activation.derivative(y));
        output_gradients.multiply_in_place(&output_errors)?;
        output_gradients *= self.learning_rate;

        // Taken from the output weights before this step's update.
        let hidden_errors = self.weights_ho.transpose().multiply(&output_errors)?;

        let mut hidden_gradients = hidden.map(|y| activation.derivative(y));
        hidden_gradients.multiply_in_place(&hidden_errors)?;
        hidden_gradients *= self.learning_rate;

        let weight_ho_deltas = output_gradients.multiply(&hidden.transpose())?;
        let weight_ih_deltas = hidden_gradients.multiply(&inputs.transpose())?;

        // Descend gradients ====================

        self.weights_ho.add_in_place(&weight_ho_deltas)?;
        self.bias_o.add_in_place(&output_gradients)?;

        self.weights_ih.add_in_place(&weight_ih_deltas)?;
        self.bias_h.add_in_place(&hidden_gradients)?;

        Ok(())
    }

    /// Perturbs each weight and bias, with probability `rate`, by Gaussian noise of mean 0 and
    /// standard deviation [`MUTATION_STANDARD_DEVIATION`].
    pub fn mutate(&mut self, rate: Value, rng: &mut impl Rng) {
        let mut mutations = 0;

        for matrix in [
            &mut self.weights_ih,
            &mut self.weights_ho,
            &mut self.bias_h,
            &mut self.bias_o,
        ] {
            for x in matrix.values_mut() {
                if rng.gen::<Value>() < rate {
                    let noise: Value = rng.sample(StandardNormal);
                    *x += noise * MUTATION_STANDARD_DEVIATION;
                    mutations += 1;
                }
            }
        }

        debug!(rate, mutations, "Mutated network.");
    }

    pub fn to_record(&self) -> NetworkRecord {
        self.clone().into()
    }

    /// Rebuilds a network from its persisted form, resolving the activation by name.
    pub fn from_record(record: NetworkRecord) -> Result<Self, NetworkError> {
        let activation = Activation::by_name(&record.activation_function)
            .ok_or(NetworkError::UnknownActivation(record.activation_function))?;

        let (input_nodes, hidden_nodes, output_nodes) =
            (record.input_nodes, record.hidden_nodes, record.output_nodes);

        check_shape(&record.weights_ih, (hidden_nodes, input_nodes))?;
        check_shape(&record.weights_ho, (output_nodes, hidden_nodes))?;
        check_shape(&record.bias_h, (hidden_nodes, 1))?;
        check_shape(&record.bias_o, (output_nodes, 1))?;

        debug!(
            input_nodes,
            hidden_nodes,
            output_nodes,
            activation = activation.name(),
            "Restored network."
        );

        Ok(Self {
            input_nodes,
            hidden_nodes,
            output_nodes,
            weights_ih: record.weights_ih,
            weights_ho: record.weights_ho,
            bias_h: record.bias_h,
            bias_o: record.bias_o,
            learning_rate: record.learning_rate,
            activation,
        })
    }

    pub fn to_json(&self) -> Result<String, NetworkError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(data: &str) -> Result<Self, NetworkError> {
        let record: NetworkRecord = serde_json::from_str(data)?;
        Self::from_record(record)
    }

    fn propagate_forward(&self, inputs: &Matrix) -> Result<(Matrix, Matrix), ShapeError> {
        let mut hidden = self.weights_ih.multiply(inputs)?;
        hidden.add_in_place(&self.bias_h)?;
        hidden.map_in_place(|x| self.activation.apply(x));

        let mut outputs = self.weights_ho.multiply(&hidden)?;
        outputs.add_in_place(&self.bias_o)?;
        outputs.map_in_place(|x| self.activation.apply(x));

        Ok((hidden, outputs))
    }

    fn check_length(
        &self,
        operation: &'static str,
        values: &[Value],
        expected: usize,
    ) -> Result<(), ShapeError> {
        if values.len() == expected {
            Ok(())
        } else {
            Err(ShapeError::new(operation, (expected, 1), (values.len(), 1)))
        }
    }
}

fn check_shape(matrix: &Matrix, expected: (usize, usize)) -> Result<(), ShapeError> {
    if matrix.shape() == expected {
        Ok(())
    } else {
        Err(ShapeError::new("deserialize", expected, matrix.shape()))
    }
}

impl From<Network> for NetworkRecord {
    fn from(network: Network) -> Self {
        Self {
            input_nodes: network.input_nodes,
            hidden_nodes: network.hidden_nodes,
            output_nodes: network.output_nodes,
            weights_ih: network.weights_ih,
            weights_ho: network.weights_ho,
            bias_h: network.bias_h,
            bias_o: network.bias_o,
            learning_rate: network.learning_rate,
            activation_function: network.activation.name().to_owned(),
        }
    }
}

impl TryFrom<NetworkRecord> for Network {
    type Error = NetworkError;

    fn try_from(record: NetworkRecord) -> Result<Self, Self::Error> {
        Self::from_record(record)
    }
}
