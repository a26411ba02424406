//! Jump-decision network: 3 inputs → 4 hidden (ReLU) → 1 output (sigmoid).
//! Stack-allocated, no heap. 21 parameters total.
//!
//! Inputs:  gap-midpoint offset, horizontal offset, altitude = 3
//! Outputs: jump probability = 1

use crate::params::{NetworkParams, ParamsError};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use tracing::{debug, warn};

pub const INPUT_SIZE: usize = 3;
pub const HIDDEN_SIZE: usize = 4;
pub const OUTPUT_SIZE: usize = 1;

/// Pre-activations are clamped to this magnitude before `exp` so the sigmoid never overflows.
pub const SIGMOID_CLAMP: f64 = 700.0;

pub fn relu(x: f64) -> f64 {
    x.max(0.0)
}

pub fn sigmoid(x: f64) -> f64 {
    let x = x.clamp(-SIGMOID_CLAMP, SIGMOID_CLAMP);
    1.0 / (1.0 + (-x).exp())
}

#[derive(Clone, Debug, PartialEq)]
pub struct DecisionNetwork {
    // weights1 (3×4) + biases1 (4) + weights2 (4×1) + biases2 (1) = 21 parameters
    weights1: [[f64; HIDDEN_SIZE]; INPUT_SIZE],
    biases1: [f64; HIDDEN_SIZE],
    weights2: [[f64; OUTPUT_SIZE]; HIDDEN_SIZE],
    biases2: [f64; OUTPUT_SIZE],
}

impl DecisionNetwork {
    pub const INPUT_SIZE: usize = INPUT_SIZE;
    pub const HIDDEN_SIZE: usize = HIDDEN_SIZE;
    pub const OUTPUT_SIZE: usize = OUTPUT_SIZE;

    pub const WEIGHT_COUNT: usize =
        INPUT_SIZE * HIDDEN_SIZE + HIDDEN_SIZE + HIDDEN_SIZE * OUTPUT_SIZE + OUTPUT_SIZE;

    /// Every weight and bias drawn independently from N(0, 1).
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut draw = || -> f64 { StandardNormal.sample(&mut *rng) };

        let mut weights1 = [[0.0; HIDDEN_SIZE]; INPUT_SIZE];
        for row in &mut weights1 {
            for w in row.iter_mut() {
                *w = draw();
            }
        }
        let mut weights2 = [[0.0; OUTPUT_SIZE]; HIDDEN_SIZE];
        for row in &mut weights2 {
            for w in row.iter_mut() {
                *w = draw();
            }
        }
        let mut biases1 = [0.0; HIDDEN_SIZE];
        for b in &mut biases1 {
            *b = draw();
        }
        let mut biases2 = [0.0; OUTPUT_SIZE];
        for b in &mut biases2 {
            *b = draw();
        }

        Self {
            weights1,
            biases1,
            weights2,
            biases2,
        }
    }

    pub fn from_arrays(
        weights1: [[f64; HIDDEN_SIZE]; INPUT_SIZE],
        biases1: [f64; HIDDEN_SIZE],
        weights2: [[f64; OUTPUT_SIZE]; HIDDEN_SIZE],
        biases2: [f64; OUTPUT_SIZE],
    ) -> Self {
        Self {
            weights1,
            biases1,
            weights2,
            biases2,
        }
    }

    /// Rebuild a network from the flat layout produced by [`Self::to_weight_vec`].
    pub fn from_weight_slice(weights: &[f64]) -> Result<Self, ParamsError> {
        if weights.len() != Self::WEIGHT_COUNT {
            return Err(ParamsError::WeightCount {
                expected: Self::WEIGHT_COUNT,
                actual: weights.len(),
            });
        }
        let mut values = weights.iter().copied();
        // Length checked above, so the iterator never runs dry.
        let mut next = || values.next().unwrap_or_default();

        let mut weights1 = [[0.0; HIDDEN_SIZE]; INPUT_SIZE];
        for row in &mut weights1 {
            for w in row.iter_mut() {
                *w = next();
            }
        }

        let mut biases1 = [0.0; HIDDEN_SIZE];
        for b in &mut biases1 {
            *b = next();
        }

        let mut weights2 = [[0.0; OUTPUT_SIZE]; HIDDEN_SIZE];
        for row in &mut weights2 {
            for w in row.iter_mut() {
                *w = next();
            }
        }

        let mut biases2 = [0.0; OUTPUT_SIZE];
        for b in &mut biases2 {
            *b = next();
        }

        Ok(Self {
            weights1,
            biases1,
            weights2,
            biases2,
        })
    }

    /// Flatten parameters as weights1 (row-major), biases1, weights2 (row-major), biases2.
    pub fn to_weight_vec(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(Self::WEIGHT_COUNT);
        for row in &self.weights1 {
            out.extend_from_slice(row);
        }
        out.extend_from_slice(&self.biases1);
        for row in &self.weights2 {
            out.extend_from_slice(row);
        }
        out.extend_from_slice(&self.biases2);
        out
    }

    pub fn weights1(&self) -> &[[f64; HIDDEN_SIZE]; INPUT_SIZE] {
        &self.weights1
    }

    pub fn biases1(&self) -> &[f64; HIDDEN_SIZE] {
        &self.biases1
    }

    pub fn weights2(&self) -> &[[f64; OUTPUT_SIZE]; HIDDEN_SIZE] {
        &self.weights2
    }

    pub fn biases2(&self) -> &[f64; OUTPUT_SIZE] {
        &self.biases2
    }

    /// Hidden layer after ReLU.
    pub fn hidden_activations(&self, input: &[f64; INPUT_SIZE]) -> [f64; HIDDEN_SIZE] {
        let mut hidden = self.biases1;
        for (i, &x) in input.iter().enumerate() {
            for (j, h) in hidden.iter_mut().enumerate() {
                *h += x * self.weights1[i][j];
            }
        }
        for h in &mut hidden {
            *h = relu(*h);
        }
        hidden
    }

    /// Forward pass. Returns the jump probability in [0, 1].
    pub fn forward(&self, input: &[f64; INPUT_SIZE]) -> f64 {
        let hidden = self.hidden_activations(input);

        let mut output = self.biases2;
        for (i, &h) in hidden.iter().enumerate() {
            for (j, o) in output.iter_mut().enumerate() {
                *o += h * self.weights2[i][j];
            }
        }

        sigmoid(output[0])
    }

    /// Replace all four parameter arrays with `params`.
    ///
    /// Every shape is checked before anything is written; on error `self` is untouched.
    pub fn load_params(&mut self, params: &NetworkParams) -> Result<(), ParamsError> {
        match Self::try_from(params) {
            Ok(replacement) => {
                *self = replacement;
                debug!("decision network parameters replaced");
                Ok(())
            }
            Err(err) => {
                warn!(%err, "rejected network parameters");
                Err(err)
            }
        }
    }

    pub fn to_params(&self) -> NetworkParams {
        NetworkParams {
            schema_version: NetworkParams::SCHEMA_VERSION,
            weights1: self.weights1.iter().map(|row| row.to_vec()).collect(),
            weights2: self.weights2.iter().map(|row| row.to_vec()).collect(),
            biases1: self.biases1.to_vec(),
            biases2: self.biases2.to_vec(),
        }
    }
}

fn matrix<const R: usize, const C: usize>(
    name: &'static str,
    rows: &[Vec<f64>],
) -> Result<[[f64; C]; R], ParamsError> {
    let mismatch = || ParamsError::ShapeMismatch {
        array: name,
        expected: vec![R, C],
        actual: match rows.iter().find(|row| row.len() != C) {
            Some(row) if rows.len() == R => vec![R, row.len()],
            _ => vec![rows.len(), rows.first().map_or(0, Vec::len)],
        },
    };
    if rows.len() != R || rows.iter().any(|row| row.len() != C) {
        return Err(mismatch());
    }
    let mut out = [[0.0; C]; R];
    for (dst, src) in out.iter_mut().zip(rows) {
        dst.copy_from_slice(src);
    }
    Ok(out)
}

fn vector<const N: usize>(name: &'static str, values: &[f64]) -> Result<[f64; N], ParamsError> {
    values.try_into().map_err(|_| ParamsError::ShapeMismatch {
        array: name,
        expected: vec![N],
        actual: vec![values.len()],
    })
}

impl TryFrom<&NetworkParams> for DecisionNetwork {
    type Error = ParamsError;

    fn try_from(params: &NetworkParams) -> Result<Self, Self::Error> {
        params.check_version()?;
        Ok(Self {
            weights1: matrix::<INPUT_SIZE, HIDDEN_SIZE>("weights1", &params.weights1)?,
            biases1: vector::<HIDDEN_SIZE>("biases1", &params.biases1)?,
            weights2: matrix::<HIDDEN_SIZE, OUTPUT_SIZE>("weights2", &params.weights2)?,
            biases2: vector::<OUTPUT_SIZE>("biases2", &params.biases2)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn seeded(seed: u64) -> DecisionNetwork {
        DecisionNetwork::random(&mut ChaCha12Rng::seed_from_u64(seed))
    }

    #[test]
    fn weight_count_matches_dimensions() {
        assert_eq!(DecisionNetwork::WEIGHT_COUNT, 3 * 4 + 4 + 4 + 1);
        assert_eq!(DecisionNetwork::WEIGHT_COUNT, 21);
    }

    #[test]
    fn random_init_is_deterministic_for_fixed_seed() {
        assert_eq!(seeded(7), seeded(7));
        assert_ne!(seeded(7), seeded(8));
    }

    #[test]
    fn random_init_looks_standard_normal() {
        let mut rng = ChaCha12Rng::seed_from_u64(2024);
        let values: Vec<f64> = (0..2000)
            .flat_map(|_| DecisionNetwork::random(&mut rng).to_weight_vec())
            .collect();
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 0.05, "mean {mean} too far from 0");
        assert!((var - 1.0).abs() < 0.05, "variance {var} too far from 1");
    }

    #[test]
    fn zero_weights_give_half() {
        let nn = DecisionNetwork::from_weight_slice(&[0.0; 21]).unwrap();
        assert_eq!(nn.forward(&[5.0, -3.0, 250.0]), 0.5);
    }

    #[test]
    fn forward_matches_hand_computation() {
        let nn = DecisionNetwork::from_arrays(
            [
                [1.0, -1.0, 0.0, 0.5],
                [0.0, 2.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
            ],
            [0.0, 0.0, -1.0, 0.0],
            [[1.0], [0.5], [-1.0], [2.0]],
            [-1.0],
        );
        let input = [2.0, 1.0, 0.5];
        // pre = [2, 0, -0.5, 1] → relu = [2, 0, 0, 1]
        assert_eq!(nn.hidden_activations(&input), [2.0, 0.0, 0.0, 1.0]);
        // out = 2*1 + 1*2 - 1 = 3
        let expected = 1.0 / (1.0 + (-3.0f64).exp());
        assert!((nn.forward(&input) - expected).abs() < 1e-15);
    }

    #[test]
    fn sigmoid_clamp_saturates_without_overflow() {
        assert_eq!(sigmoid(f64::MAX), sigmoid(SIGMOID_CLAMP));
        assert_eq!(sigmoid(f64::MIN), sigmoid(-SIGMOID_CLAMP));
        assert!(sigmoid(-SIGMOID_CLAMP) > 0.0);
        assert!(sigmoid(-SIGMOID_CLAMP) < 1e-300);
        assert!((sigmoid(SIGMOID_CLAMP) - 1.0).abs() < f64::EPSILON);
        assert_eq!(sigmoid(0.0), 0.5);
    }

    #[test]
    fn forward_is_deterministic() {
        let nn = seeded(11);
        let input = [-12.5, 140.0, 250.0];
        let first = nn.forward(&input);
        for _ in 0..10 {
            assert_eq!(nn.forward(&input).to_bits(), first.to_bits());
        }
    }

    #[test]
    fn weight_vec_round_trip_preserves_forward() {
        let nn = seeded(3);
        let rebuilt = DecisionNetwork::from_weight_slice(&nn.to_weight_vec()).unwrap();
        assert_eq!(nn, rebuilt);
        let input = [0.25, -40.0, 300.0];
        assert_eq!(nn.forward(&input), rebuilt.forward(&input));
    }

    #[test]
    fn from_weight_slice_rejects_wrong_length() {
        let err = DecisionNetwork::from_weight_slice(&[0.0; 10]).unwrap_err();
        assert!(matches!(
            err,
            ParamsError::WeightCount {
                expected: 21,
                actual: 10
            }
        ));
    }

    #[test]
    fn load_params_swaps_everything() {
        let mut nn = seeded(1);
        let donor = seeded(2);
        nn.load_params(&donor.to_params()).unwrap();
        assert_eq!(nn, donor);
    }

    #[test]
    fn mismatched_load_leaves_params_bit_identical() {
        let mut nn = seeded(5);
        let before: Vec<u64> = nn.to_weight_vec().iter().map(|v| v.to_bits()).collect();

        let mut bad = seeded(6).to_params();
        bad.biases1.push(0.0);
        let err = nn.load_params(&bad).unwrap_err();
        assert!(matches!(
            err,
            ParamsError::ShapeMismatch {
                array: "biases1",
                ..
            }
        ));

        let mut bad = seeded(6).to_params();
        bad.weights2[3] = vec![1.0, 2.0];
        let err = nn.load_params(&bad).unwrap_err();
        match err {
            ParamsError::ShapeMismatch {
                array,
                expected,
                actual,
            } => {
                assert_eq!(array, "weights2");
                assert_eq!(expected, vec![4, 1]);
                assert_eq!(actual, vec![4, 2]);
            }
            other => panic!("unexpected error {other:?}"),
        }

        let after: Vec<u64> = nn.to_weight_vec().iter().map(|v| v.to_bits()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn transposed_weights_are_rejected() {
        let mut nn = seeded(9);
        let mut bad = seeded(10).to_params();
        // 4×3 instead of 3×4
        bad.weights1 = vec![vec![0.0; 3]; 4];
        let err = nn.load_params(&bad).unwrap_err();
        match err {
            ParamsError::ShapeMismatch {
                array,
                expected,
                actual,
            } => {
                assert_eq!(array, "weights1");
                assert_eq!(expected, vec![3, 4]);
                assert_eq!(actual, vec![4, 3]);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(nn, seeded(9));
    }

    proptest! {
        #[test]
        fn proptest_forward_stays_in_unit_interval(
            seed in any::<u64>(),
            inputs in proptest::array::uniform3(-1e10f64..1e10f64),
        ) {
            let nn = seeded(seed);
            let out = nn.forward(&inputs);
            prop_assert!(!out.is_nan());
            prop_assert!((0.0..=1.0).contains(&out));
        }

        #[test]
        fn proptest_forward_bounded_for_extreme_weights(
            weights in proptest::collection::vec(-1e6f64..1e6f64, DecisionNetwork::WEIGHT_COUNT),
            inputs in proptest::array::uniform3(-1e10f64..1e10f64),
        ) {
            let nn = DecisionNetwork::from_weight_slice(&weights).unwrap();
            let out = nn.forward(&inputs);
            prop_assert!(out.is_finite() && (0.0..=1.0).contains(&out));
        }

        #[test]
        fn proptest_sigmoid_symmetry(x in -SIGMOID_CLAMP..SIGMOID_CLAMP) {
            prop_assert!((sigmoid(x) + sigmoid(-x) - 1.0).abs() < 1e-12);
        }

        #[test]
        fn proptest_hidden_activations_never_negative(
            seed in any::<u64>(),
            inputs in proptest::array::uniform3(-1e6f64..1e6f64),
        ) {
            let nn = seeded(seed);
            prop_assert!(nn.hidden_activations(&inputs).iter().all(|h| *h >= 0.0));
        }
    }
}
