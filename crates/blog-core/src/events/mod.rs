//! Domain events - notifications published when client-side state changes

mod tally_changed;

pub use tally_changed::{TallyChanged, TallyPhase};
