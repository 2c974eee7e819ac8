use phynet_core::{ErrorInfo, Network, PhyError, RngHandle};
use serde::{Deserialize, Serialize};

/// Hidden-layer nonlinearity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Activation {
    /// Hyperbolic tangent.
    #[default]
    Tanh,
    /// Rectified linear unit.
    Relu,
}

impl Activation {
    fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Tanh => x.tanh(),
            Activation::Relu => x.max(0.0),
        }
    }

    /// Derivative expressed through the activated value `y = f(x)`.
    fn derivative(self, y: f64) -> f64 {
        match self {
            Activation::Tanh => 1.0 - y * y,
            Activation::Relu => {
                if y > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

fn default_hidden() -> Vec<usize> {
    vec![32, 32]
}

fn default_normalize() -> bool {
    true
}

fn default_init_scale() -> f64 {
    1.0
}

/// Architecture of a dense feed-forward learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlpConfig {
    /// Widths of the hidden layers.
    #[serde(default = "default_hidden")]
    pub hidden: Vec<usize>,
    /// Hidden-layer nonlinearity.
    #[serde(default)]
    pub activation: Activation,
    /// Project the output onto the unit sphere.
    #[serde(default = "default_normalize")]
    pub normalize_output: bool,
    /// Multiplier applied to the `1/sqrt(fan_in)` weight scale.
    #[serde(default = "default_init_scale")]
    pub init_scale: f64,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            hidden: default_hidden(),
            activation: Activation::default(),
            normalize_output: default_normalize(),
            init_scale: default_init_scale(),
        }
    }
}

/// Dense feed-forward network with a linear output layer.
///
/// Parameters are stored layer by layer, each layer as a row-major
/// `out x in` weight block followed by `out` biases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mlp {
    sizes: Vec<usize>,
    activation: Activation,
    normalize_output: bool,
    init_scale: f64,
    params: Vec<f64>,
}

struct Trace {
    /// Post-activation values per layer; `layers[0]` is the input.
    layers: Vec<Vec<f64>>,
}

impl Mlp {
    /// Builds a network mapping `input_len` values to `output_len` values and
    /// initialises it from `rng`.
    pub fn new(
        input_len: usize,
        output_len: usize,
        config: &MlpConfig,
        rng: &mut RngHandle,
    ) -> Result<Self, PhyError> {
        if input_len == 0 || output_len == 0 || config.hidden.iter().any(|&w| w == 0) {
            return Err(PhyError::Config(
                ErrorInfo::new("mlp-shape", "layer widths must be positive")
                    .with_context("input", input_len.to_string())
                    .with_context("output", output_len.to_string()),
            ));
        }
        let mut sizes = Vec::with_capacity(config.hidden.len() + 2);
        sizes.push(input_len);
        sizes.extend_from_slice(&config.hidden);
        sizes.push(output_len);
        let count = sizes.windows(2).map(|w| w[1] * w[0] + w[1]).sum();
        let mut network = Self {
            sizes,
            activation: config.activation,
            normalize_output: config.normalize_output,
            init_scale: config.init_scale,
            params: vec![0.0; count],
        };
        network.initialize(rng);
        Ok(network)
    }

    /// Layer widths including input and output.
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    fn layer_offsets(&self) -> Vec<usize> {
        let mut offsets = Vec::with_capacity(self.sizes.len());
        let mut offset = 0;
        offsets.push(0);
        for w in self.sizes.windows(2) {
            offset += w[1] * w[0] + w[1];
            offsets.push(offset);
        }
        offsets
    }

    fn run(&self, input: &[f64]) -> Trace {
        let offsets = self.layer_offsets();
        let last = self.sizes.len() - 2;
        let mut layers = Vec::with_capacity(self.sizes.len());
        layers.push(input.to_vec());
        for (l, w) in self.sizes.windows(2).enumerate() {
            let (fan_in, fan_out) = (w[0], w[1]);
            let block = &self.params[offsets[l]..offsets[l + 1]];
            let (weights, biases) = block.split_at(fan_out * fan_in);
            let previous = &layers[l];
            let next: Vec<f64> = (0..fan_out)
                .map(|o| {
                    let row = &weights[o * fan_in..(o + 1) * fan_in];
                    let z = biases[o] + row.iter().zip(previous).map(|(a, b)| a * b).sum::<f64>();
                    if l == last {
                        z
                    } else {
                        self.activation.apply(z)
                    }
                })
                .collect();
            layers.push(next);
        }
        Trace { layers }
    }

    fn output_norm(raw: &[f64]) -> f64 {
        raw.iter().map(|v| v * v).sum::<f64>().sqrt()
    }
}

impl Network for Mlp {
    fn input_len(&self) -> usize {
        self.sizes[0]
    }

    fn output_len(&self) -> usize {
        self.sizes[self.sizes.len() - 1]
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        let mut trace = self.run(input);
        let mut out = trace.layers.pop().unwrap_or_default();
        if self.normalize_output {
            let norm = Self::output_norm(&out);
            if norm > f64::EPSILON {
                out.iter_mut().for_each(|v| *v /= norm);
            }
        }
        out
    }

    fn backward(&self, input: &[f64], output_grad: &[f64]) -> Vec<f64> {
        let trace = self.run(input);
        let offsets = self.layer_offsets();
        let mut grads = vec![0.0; self.params.len()];
        let raw = &trace.layers[trace.layers.len() - 1];

        // dL/d(raw output), undoing the normalisation projection when present.
        let mut delta: Vec<f64> = if self.normalize_output {
            let norm = Self::output_norm(raw);
            if norm > f64::EPSILON {
                let psi: Vec<f64> = raw.iter().map(|v| v / norm).collect();
                let radial: f64 = psi.iter().zip(output_grad).map(|(p, g)| p * g).sum();
                output_grad
                    .iter()
                    .zip(&psi)
                    .map(|(g, p)| (g - p * radial) / norm)
                    .collect()
            } else {
                output_grad.to_vec()
            }
        } else {
            output_grad.to_vec()
        };

        for l in (0..self.sizes.len() - 1).rev() {
            let (fan_in, fan_out) = (self.sizes[l], self.sizes[l + 1]);
            let start = offsets[l];
            let previous = &trace.layers[l];
            for o in 0..fan_out {
                let row = start + o * fan_in;
                for i in 0..fan_in {
                    grads[row + i] = delta[o] * previous[i];
                }
                grads[start + fan_out * fan_in + o] = delta[o];
            }
            if l == 0 {
                break;
            }
            let weights = &self.params[start..start + fan_out * fan_in];
            delta = (0..fan_in)
                .map(|i| {
                    let back: f64 = (0..fan_out).map(|o| weights[o * fan_in + i] * delta[o]).sum();
                    back * self.activation.derivative(previous[i])
                })
                .collect();
        }
        grads
    }

    fn parameters(&self) -> &[f64] {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut [f64] {
        &mut self.params
    }

    fn initialize(&mut self, rng: &mut RngHandle) {
        let offsets = self.layer_offsets();
        for (l, w) in self.sizes.windows(2).enumerate() {
            let (fan_in, fan_out) = (w[0], w[1]);
            let scale = self.init_scale / (fan_in as f64).sqrt();
            let block = &mut self.params[offsets[l]..offsets[l + 1]];
            let (weights, biases) = block.split_at_mut(fan_out * fan_in);
            weights
                .iter_mut()
                .for_each(|weight| *weight = rng.standard_normal() * scale);
            biases.iter_mut().for_each(|bias| *bias = 0.0);
        }
    }
}
