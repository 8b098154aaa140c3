//! Epoch training loops, batches, losses and running metrics

mod batch;
mod epoch;
mod loss;
mod meter;

pub use batch::Batch;
pub use epoch::{train_epoch_closure, train_epoch_first_order, EpochReport};
pub use loss::{BceLoss, Criterion, MseLoss};
pub use meter::AverageMeter;
