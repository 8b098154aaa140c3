//! Epoch-level training: first-order and closure-based variants
//!
//! Both trainers run one pass over the data source, keep exactly one
//! [`AverageMeter`] live for the epoch, and report the size-weighted mean
//! loss. They differ only in how a batch turns into a parameter update:
//! the first-order trainer performs one optimizer step per batch, the
//! closure trainer hands a forward+backward closure to a line-search
//! optimizer that may evaluate it several times.

use crate::config::TrainConfig;
use crate::data::DataSource;
use crate::device::Device;
use crate::error::{Error, Result};
use crate::model::Autoencoder;
use crate::optim::{ClosureOptimizer, LRScheduler, Optimizer};
use crate::telemetry::TelemetrySink;
use crate::train::{AverageMeter, Criterion};

/// Summary of one trained epoch
#[derive(Debug, Clone)]
pub struct EpochReport {
    /// Epoch index (0-based)
    pub epoch: usize,
    /// Number of batches processed
    pub num_batches: usize,
    /// Size-weighted mean loss (`0.0` for an empty data source)
    pub mean_loss: f32,
    /// Learning rate in effect, for first-order epochs
    pub lr: Option<f32>,
}

fn ensure_finite(loss: f32, epoch: usize, batch: usize) -> Result<f32> {
    if loss.is_finite() {
        Ok(loss)
    } else {
        Err(Error::Numerical(format!(
            "non-finite loss {loss} at epoch {} batch {batch}",
            epoch + 1
        )))
    }
}

/// Run one epoch with a first-order optimizer: one update per batch
///
/// The loss is self-supervised — computed between the reconstruction and the
/// *input*; the target label only matters for visualization elsewhere. After
/// the pass, the scheduler advances by one step and its rate is re-applied
/// to the optimizer.
#[allow(clippy::too_many_arguments)]
pub fn train_epoch_first_order(
    config: &TrainConfig,
    model: &dyn Autoencoder,
    data: &dyn DataSource,
    epoch_id: usize,
    device: Device,
    criterion: &dyn Criterion,
    optimizer: &mut dyn Optimizer,
    scheduler: &mut dyn LRScheduler,
    mut telemetry: Option<&mut (dyn TelemetrySink + 'static)>,
) -> Result<EpochReport> {
    let mut losses = AverageMeter::new();
    let lr = scheduler.get_lr();

    println!(
        "\nTraining Epoch: [{} | {}] LR: {}",
        epoch_id + 1,
        config.epochs,
        lr
    );

    let mut params = model.parameters();
    let total_batches = data.len();
    let mut last_batch = 0;

    for (batch_idx, batch) in data.batches().enumerate() {
        let inputs = batch.inputs.to(device);

        model.set_train();

        let reconstruction = model.forward(&inputs);
        let loss = {
            let pred = reconstruction.output.data();
            let target = inputs.data();
            criterion.loss(&pred, &target)
        };
        let loss = ensure_finite(loss, epoch_id, batch_idx)?;

        optimizer.zero_grad(&mut params);
        let grad_output = {
            let pred = reconstruction.output.data();
            let target = inputs.data();
            criterion.grad(&pred, &target)
        };
        model.backward(&inputs, &grad_output);
        optimizer.step(&mut params);

        model.set_eval();
        losses.update(loss, batch.size());
        last_batch = batch_idx + 1;
    }

    println!(
        "[epoch: {}] ({}/{}) | Loss: {:.4} |",
        epoch_id + 1,
        last_batch,
        total_batches,
        losses.avg()
    );

    if let Some(sink) = telemetry.take() {
        sink.log_scalars(
            epoch_id,
            &[("losses.avg", f64::from(losses.avg())), ("LR", f64::from(lr))],
        );
    }

    scheduler.step();
    scheduler.apply(optimizer);

    Ok(EpochReport {
        epoch: epoch_id,
        num_batches: last_batch,
        mean_loss: losses.avg(),
        lr: Some(lr),
    })
}

/// Run one epoch with a closure-driven line-search optimizer
///
/// Per batch, the forward+loss+backward computation is wrapped in a
/// zero-argument closure that clears gradients on every invocation; the
/// optimizer may call it any number of times. The recorded loss comes from
/// one fresh eval-mode re-evaluation after the step, never from the
/// closure's internal (possibly stale or multiply-evaluated) value. No
/// scheduler is involved.
#[allow(clippy::too_many_arguments)]
pub fn train_epoch_closure(
    config: &TrainConfig,
    model: &dyn Autoencoder,
    data: &dyn DataSource,
    epoch_id: usize,
    device: Device,
    criterion: &dyn Criterion,
    optimizer: &mut dyn ClosureOptimizer,
    mut telemetry: Option<&mut (dyn TelemetrySink + 'static)>,
) -> Result<EpochReport> {
    let mut losses = AverageMeter::new();

    println!("\nTraining Epoch: [{} | {}]", epoch_id + 1, config.epochs);

    let mut params = model.parameters();
    let total_batches = data.len();
    let mut last_batch = 0;

    for (batch_idx, batch) in data.batches().enumerate() {
        let inputs = batch.inputs.to(device);

        model.set_train();

        {
            let mut closure = || -> f32 {
                model.zero_grad();
                let reconstruction = model.forward(&inputs);
                let (loss, grad_output) = {
                    let pred = reconstruction.output.data();
                    let target = inputs.data();
                    (criterion.loss(&pred, &target), criterion.grad(&pred, &target))
                };
                model.backward(&inputs, &grad_output);
                loss
            };
            optimizer.step(&mut params, &mut closure);
        }

        // Fresh post-step evaluation for reporting; the closure's own loss
        // value is never reused.
        model.set_eval();
        let reconstruction = model.forward(&inputs);
        let loss = {
            let pred = reconstruction.output.data();
            let target = inputs.data();
            criterion.loss(&pred, &target)
        };
        let loss = ensure_finite(loss, epoch_id, batch_idx)?;

        losses.update(loss, batch.size());
        last_batch = batch_idx + 1;
    }

    println!(
        "[epoch: {}] ({}/{}) | Loss: {:.4} |",
        epoch_id + 1,
        last_batch,
        total_batches,
        losses.avg()
    );

    if let Some(sink) = telemetry.take() {
        sink.log_scalars(epoch_id, &[("losses.avg", f64::from(losses.avg()))]);
    }

    Ok(EpochReport {
        epoch: epoch_id,
        num_batches: last_batch,
        mean_loss: losses.avg(),
        lr: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::InMemoryDataset;
    use crate::model::LinearAutoencoder;
    use crate::optim::{Sgd, StepDecayLr};
    use crate::telemetry::MemorySink;
    use crate::train::MseLoss;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn model() -> LinearAutoencoder {
        let mut rng = StdRng::seed_from_u64(13);
        LinearAutoencoder::new(2, 1, &mut rng)
    }

    fn dataset(samples: usize) -> InMemoryDataset {
        let features = (0..samples).map(|i| vec![i as f32 * 0.1, 0.5]).collect();
        let labels = (0..samples).map(|i| i as f32).collect();
        InMemoryDataset::new(features, labels, 4)
    }

    #[test]
    fn test_first_order_epoch_updates_params() {
        let config = TrainConfig::new();
        let model = model();
        let data = dataset(10);
        let mut optimizer = Sgd::new(0.01, 0.0, 0.0);
        let mut scheduler = StepDecayLr::new(0.01, 0.1, 30);

        let before: Vec<Vec<f32>> = model.parameters().iter().map(|p| p.to_vec()).collect();

        let report = train_epoch_first_order(
            &config,
            &model,
            &data,
            0,
            Device::Cpu,
            &MseLoss,
            &mut optimizer,
            &mut scheduler,
            None,
        )
        .unwrap();

        assert_eq!(report.num_batches, 3);
        assert!(report.mean_loss.is_finite());
        assert_eq!(report.lr, Some(0.01));

        let after: Vec<Vec<f32>> = model.parameters().iter().map(|p| p.to_vec()).collect();
        assert_ne!(before, after, "parameters did not change");
    }

    #[test]
    fn test_first_order_empty_data_source() {
        let config = TrainConfig::new();
        let model = model();
        let data = InMemoryDataset::new(vec![], vec![], 4);
        let mut optimizer = Sgd::new(0.01, 0.0, 0.0);
        let mut scheduler = StepDecayLr::new(0.01, 0.1, 30);

        let before: Vec<Vec<f32>> = model.parameters().iter().map(|p| p.to_vec()).collect();

        let report = train_epoch_first_order(
            &config,
            &model,
            &data,
            0,
            Device::Cpu,
            &MseLoss,
            &mut optimizer,
            &mut scheduler,
            None,
        )
        .unwrap();

        assert_eq!(report.num_batches, 0);
        assert_eq!(report.mean_loss, 0.0);

        let after: Vec<Vec<f32>> = model.parameters().iter().map(|p| p.to_vec()).collect();
        assert_eq!(before, after, "parameters changed on an empty epoch");
    }

    #[test]
    fn test_first_order_telemetry_has_lr() {
        let config = TrainConfig::new();
        let model = model();
        let data = dataset(4);
        let mut optimizer = Sgd::new(0.01, 0.0, 0.0);
        let mut scheduler = StepDecayLr::new(0.01, 0.1, 30);
        let mut sink = MemorySink::new();

        train_epoch_first_order(
            &config,
            &model,
            &data,
            0,
            Device::Cpu,
            &MseLoss,
            &mut optimizer,
            &mut scheduler,
            Some(&mut sink),
        )
        .unwrap();

        assert_eq!(sink.metric("losses.avg").len(), 1);
        assert_eq!(sink.metric("LR"), vec![0.01]);
    }

    #[test]
    fn test_closure_telemetry_has_no_lr() {
        let config = TrainConfig::new();
        let model = model();
        let data = dataset(4);
        let mut optimizer = crate::optim::Lbfgs::default_params(0.1);
        let mut sink = MemorySink::new();

        train_epoch_closure(
            &config,
            &model,
            &data,
            0,
            Device::Cpu,
            &MseLoss,
            &mut optimizer,
            Some(&mut sink),
        )
        .unwrap();

        assert_eq!(sink.metric("losses.avg").len(), 1);
        assert!(sink.metric("LR").is_empty());
    }

    /// Stub optimizer that invokes the closure a fixed number of times and
    /// reports a bogus loss, to prove the meter uses the fresh re-evaluation
    struct MultiEvalStub {
        invocations: usize,
    }

    impl ClosureOptimizer for MultiEvalStub {
        fn step(
            &mut self,
            _params: &mut [crate::Tensor],
            closure: &mut dyn FnMut() -> f32,
        ) -> f32 {
            let mut last = 0.0;
            for _ in 0..3 {
                last = closure();
                self.invocations += 1;
            }
            // Deliberately corrupt the returned value; callers must not use it
            last + 1000.0
        }

        fn lr(&self) -> f32 {
            1.0
        }
    }

    #[test]
    fn test_closure_report_uses_fresh_eval_not_closure_loss() {
        let config = TrainConfig::new();
        let model = model();
        let data = dataset(4);
        let mut optimizer = MultiEvalStub { invocations: 0 };

        let report = train_epoch_closure(
            &config,
            &model,
            &data,
            0,
            Device::Cpu,
            &MseLoss,
            &mut optimizer,
            None,
        )
        .unwrap();

        assert_eq!(optimizer.invocations, 3);
        // The stub's poisoned +1000 return value must not leak into the meter
        assert!(report.mean_loss < 100.0, "mean loss {}", report.mean_loss);
    }

    #[test]
    fn test_ensure_finite_rejects_nan() {
        assert!(ensure_finite(1.0, 0, 0).is_ok());
        let err = ensure_finite(f32::NAN, 2, 5).unwrap_err();
        assert!(matches!(err, Error::Numerical(_)));
    }
}
