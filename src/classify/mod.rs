pub mod classify_consensus;
pub mod classify_samples;
pub mod typing;

pub use classify_consensus::{classify, classify_consensus, identity_percent, verdict};
pub use classify_samples::type_consensuses;
pub use typing::{clean_type_name, type_consensus};
