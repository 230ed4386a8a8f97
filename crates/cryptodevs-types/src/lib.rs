//! Sale-phase types and pure decision logic for the Crypto Devs mint client.
//! No I/O; the async client mirrors contract state into these types.

mod error;
mod sale;

pub use error::FailureKind;
pub use sale::{SaleSnapshot, SaleState, derive_ui_state, minted_label, presale_has_ended};
