//! Structs representing the components within Zcash transactions.

pub mod orchard;
pub mod sapling;
pub mod sprout;
pub mod transparent;

pub use self::{
    orchard::OrchardSummary,
    sapling::SaplingSummary,
    sprout::JoinSplit,
    transparent::{OutPoint, Script, TxIn, TxOut},
};
