//! Operators producing new observables from existing ones.
//!
//! Every operator is an inherent method on [`Observable`](crate::Observable):
//! it subscribes to its source with a child of the downstream subscription, so
//! disposing or terminating downstream tears the source down as well.

mod buffer_count;
mod collect;
mod first;
mod publish;
mod take;
mod take_for;
mod take_last;
