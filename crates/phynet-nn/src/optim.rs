use phynet_core::Optimizer;
use serde::{Deserialize, Serialize};

/// Stochastic gradient descent with classical momentum.
#[derive(Debug, Clone, PartialEq)]
pub struct Sgd {
    learning_rate: f64,
    momentum: f64,
    velocity: Vec<f64>,
}

impl Sgd {
    /// Creates an optimizer; `momentum = 0` gives plain gradient descent.
    pub fn new(learning_rate: f64, momentum: f64) -> Self {
        Self {
            learning_rate,
            momentum,
            velocity: Vec::new(),
        }
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, params: &mut [f64], grads: &[f64]) {
        if self.velocity.len() != params.len() {
            self.velocity = vec![0.0; params.len()];
        }
        for ((param, grad), velocity) in params.iter_mut().zip(grads).zip(&mut self.velocity) {
            *velocity = self.momentum * *velocity - self.learning_rate * grad;
            *param += *velocity;
        }
    }

    fn reset(&mut self) {
        self.velocity.clear();
    }
}

/// Adam with bias-corrected first and second moments.
#[derive(Debug, Clone, PartialEq)]
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    first: Vec<f64>,
    second: Vec<f64>,
    steps: i32,
}

impl Adam {
    /// Creates an optimizer with the usual `(0.9, 0.999, 1e-8)` constants.
    pub fn new(learning_rate: f64) -> Self {
        Self::with_betas(learning_rate, 0.9, 0.999)
    }

    /// Creates an optimizer with explicit decay rates.
    pub fn with_betas(learning_rate: f64, beta1: f64, beta2: f64) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon: 1e-8,
            first: Vec::new(),
            second: Vec::new(),
            steps: 0,
        }
    }
}

impl Optimizer for Adam {
    fn step(&mut self, params: &mut [f64], grads: &[f64]) {
        if self.first.len() != params.len() {
            self.first = vec![0.0; params.len()];
            self.second = vec![0.0; params.len()];
            self.steps = 0;
        }
        self.steps = self.steps.saturating_add(1);
        let correction1 = 1.0 - self.beta1.powi(self.steps);
        let correction2 = 1.0 - self.beta2.powi(self.steps);
        for (idx, (param, grad)) in params.iter_mut().zip(grads).enumerate() {
            self.first[idx] = self.beta1 * self.first[idx] + (1.0 - self.beta1) * grad;
            self.second[idx] = self.beta2 * self.second[idx] + (1.0 - self.beta2) * grad * grad;
            let m_hat = self.first[idx] / correction1;
            let v_hat = self.second[idx] / correction2;
            *param -= self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);
        }
    }

    fn reset(&mut self) {
        self.first.clear();
        self.second.clear();
        self.steps = 0;
    }
}

fn default_learning_rate() -> f64 {
    1e-2
}

/// Serializable optimizer selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum OptimizerSpec {
    /// [`Sgd`] with optional momentum.
    Sgd {
        /// Step size.
        #[serde(default = "default_learning_rate")]
        learning_rate: f64,
        /// Momentum coefficient.
        #[serde(default)]
        momentum: f64,
    },
    /// [`Adam`].
    Adam {
        /// Step size.
        #[serde(default = "default_learning_rate")]
        learning_rate: f64,
    },
}

impl Default for OptimizerSpec {
    fn default() -> Self {
        OptimizerSpec::Adam {
            learning_rate: default_learning_rate(),
        }
    }
}

impl OptimizerSpec {
    /// Instantiates the selected optimizer.
    pub fn build(&self) -> AnyOptimizer {
        match *self {
            OptimizerSpec::Sgd {
                learning_rate,
                momentum,
            } => AnyOptimizer::Sgd(Sgd::new(learning_rate, momentum)),
            OptimizerSpec::Adam { learning_rate } => AnyOptimizer::Adam(Adam::new(learning_rate)),
        }
    }
}

/// Optimizer chosen at runtime from an [`OptimizerSpec`].
#[derive(Debug, Clone, PartialEq)]
pub enum AnyOptimizer {
    /// Momentum SGD.
    Sgd(Sgd),
    /// Adam.
    Adam(Adam),
}

impl Optimizer for AnyOptimizer {
    fn step(&mut self, params: &mut [f64], grads: &[f64]) {
        match self {
            AnyOptimizer::Sgd(opt) => opt.step(params, grads),
            AnyOptimizer::Adam(opt) => opt.step(params, grads),
        }
    }

    fn reset(&mut self) {
        match self {
            AnyOptimizer::Sgd(opt) => opt.reset(),
            AnyOptimizer::Adam(opt) => opt.reset(),
        }
    }
}
