//! Autoencoder model seam
//!
//! The training loops never see a concrete architecture: they talk to
//! [`Autoencoder`], which owns its parameters (as shared [`Tensor`] handles),
//! its train/eval mode, and its own gradient computation. Parameters are
//! mutated only by the optimizer step inside the per-batch update; the model
//! only accumulates gradients into them.

use crate::Tensor;
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::Rng;
use std::cell::Cell;

/// Output of a forward pass: reconstruction plus optional latent code
pub struct Reconstruction {
    /// Reconstructed input
    pub output: Tensor,
    /// Latent representation, when the model exposes one
    pub latent: Option<Tensor>,
}

/// Model capability set consumed by the training loops
pub trait Autoencoder {
    /// Reconstruct `input` (flattened batch)
    fn forward(&self, input: &Tensor) -> Reconstruction;

    /// Accumulate parameter gradients for `input` given dL/d(output)
    fn backward(&self, input: &Tensor, grad_output: &Array1<f32>);

    /// Trainable parameters as shared handles
    ///
    /// Cloned handles share storage with the model, so an optimizer holding
    /// them updates the model in place.
    fn parameters(&self) -> Vec<Tensor>;

    /// Switch to training mode
    fn set_train(&self);

    /// Switch to evaluation mode
    fn set_eval(&self);

    /// Named encoder parameters, for checkpointing
    fn encoder_state(&self) -> Vec<(String, Tensor)>;

    /// Named decoder parameters, for checkpointing
    fn decoder_state(&self) -> Vec<(String, Tensor)>;

    /// Clear all parameter gradients
    fn zero_grad(&self) {
        for param in self.parameters() {
            param.zero_grad();
        }
    }

    /// Total number of trainable scalars
    fn num_parameters(&self) -> usize {
        self.parameters().iter().map(Tensor::len).sum()
    }
}

/// Single-layer linear autoencoder
///
/// Encoder z = W_e x + b_e, decoder y = W_d z + b_d, with manually derived
/// gradients. Small enough for tests and the CLI demo while exercising every
/// part of the [`Autoencoder`] contract.
pub struct LinearAutoencoder {
    in_dim: usize,
    latent_dim: usize,
    w_enc: Tensor, // latent_dim x in_dim, row-major
    b_enc: Tensor, // latent_dim
    w_dec: Tensor, // in_dim x latent_dim, row-major
    b_dec: Tensor, // in_dim
    training: Cell<bool>,
}

impl LinearAutoencoder {
    /// Create a model with uniform ±1/√in_dim initialization
    pub fn new(in_dim: usize, latent_dim: usize, rng: &mut StdRng) -> Self {
        let bound = 1.0 / (in_dim as f32).sqrt();
        let mut init = |len: usize| {
            let data: Vec<f32> = (0..len).map(|_| rng.gen_range(-bound..bound)).collect();
            Tensor::from_vec(data, true)
        };
        Self {
            in_dim,
            latent_dim,
            w_enc: init(latent_dim * in_dim),
            b_enc: init(latent_dim),
            w_dec: init(in_dim * latent_dim),
            b_dec: init(in_dim),
            training: Cell::new(false),
        }
    }

    /// Input feature dimension
    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    /// Latent dimension
    pub fn latent_dim(&self) -> usize {
        self.latent_dim
    }

    /// Whether the model is in training mode
    pub fn is_training(&self) -> bool {
        self.training.get()
    }

    fn encode_sample(&self, x: &[f32]) -> Vec<f32> {
        let w = self.w_enc.data();
        let b = self.b_enc.data();
        let mut z = vec![0.0f32; self.latent_dim];
        for (i, zi) in z.iter_mut().enumerate() {
            let mut acc = b[i];
            for j in 0..self.in_dim {
                acc += w[i * self.in_dim + j] * x[j];
            }
            *zi = acc;
        }
        z
    }

    fn decode_sample(&self, z: &[f32]) -> Vec<f32> {
        let w = self.w_dec.data();
        let b = self.b_dec.data();
        let mut y = vec![0.0f32; self.in_dim];
        for (i, yi) in y.iter_mut().enumerate() {
            let mut acc = b[i];
            for j in 0..self.latent_dim {
                acc += w[i * self.latent_dim + j] * z[j];
            }
            *yi = acc;
        }
        y
    }
}

impl Autoencoder for LinearAutoencoder {
    fn forward(&self, input: &Tensor) -> Reconstruction {
        let x = input.to_vec();
        assert!(
            x.len() % self.in_dim == 0,
            "input length {} is not a multiple of in_dim {}",
            x.len(),
            self.in_dim
        );
        let n = x.len() / self.in_dim;

        let mut output = Vec::with_capacity(x.len());
        let mut latent = Vec::with_capacity(n * self.latent_dim);
        for s in 0..n {
            let sample = &x[s * self.in_dim..(s + 1) * self.in_dim];
            let z = self.encode_sample(sample);
            output.extend(self.decode_sample(&z));
            latent.extend(z);
        }

        Reconstruction {
            output: Tensor::from_vec(output, false),
            latent: Some(Tensor::from_vec(latent, false)),
        }
    }

    fn backward(&self, input: &Tensor, grad_output: &Array1<f32>) {
        let x = input.to_vec();
        let n = x.len() / self.in_dim.max(1);
        assert_eq!(grad_output.len(), x.len(), "grad_output shape mismatch");

        let mut g_w_enc = Array1::zeros(self.latent_dim * self.in_dim);
        let mut g_b_enc = Array1::zeros(self.latent_dim);
        let mut g_w_dec = Array1::zeros(self.in_dim * self.latent_dim);
        let mut g_b_dec = Array1::zeros(self.in_dim);

        for s in 0..n {
            let sample = &x[s * self.in_dim..(s + 1) * self.in_dim];
            let z = self.encode_sample(sample);
            let gy = &grad_output.as_slice().unwrap_or(&[])[s * self.in_dim..(s + 1) * self.in_dim];

            // Decoder: dW_d[i][j] = gy_i * z_j, db_d = gy, dz = W_dᵀ gy
            let mut gz = vec![0.0f32; self.latent_dim];
            {
                let w_dec = self.w_dec.data();
                for i in 0..self.in_dim {
                    g_b_dec[i] += gy[i];
                    for j in 0..self.latent_dim {
                        g_w_dec[i * self.latent_dim + j] += gy[i] * z[j];
                        gz[j] += w_dec[i * self.latent_dim + j] * gy[i];
                    }
                }
            }

            // Encoder: dW_e[i][j] = gz_i * x_j, db_e = gz
            for i in 0..self.latent_dim {
                g_b_enc[i] += gz[i];
                for j in 0..self.in_dim {
                    g_w_enc[i * self.in_dim + j] += gz[i] * sample[j];
                }
            }
        }

        self.w_enc.accumulate_grad(&g_w_enc);
        self.b_enc.accumulate_grad(&g_b_enc);
        self.w_dec.accumulate_grad(&g_w_dec);
        self.b_dec.accumulate_grad(&g_b_dec);
    }

    fn parameters(&self) -> Vec<Tensor> {
        vec![
            self.w_enc.clone(),
            self.b_enc.clone(),
            self.w_dec.clone(),
            self.b_dec.clone(),
        ]
    }

    fn set_train(&self) {
        self.training.set(true);
    }

    fn set_eval(&self) {
        self.training.set(false);
    }

    fn encoder_state(&self) -> Vec<(String, Tensor)> {
        vec![
            ("encoder.weight".to_string(), self.w_enc.clone()),
            ("encoder.bias".to_string(), self.b_enc.clone()),
        ]
    }

    fn decoder_state(&self) -> Vec<(String, Tensor)> {
        vec![
            ("decoder.weight".to_string(), self.w_dec.clone()),
            ("decoder.bias".to_string(), self.b_dec.clone()),
        ]
    }
}
