pub mod elo;
pub mod pairing;
pub mod phrases;
pub mod protocol;
pub mod similarity;

pub use elo::{update_elo, INITIAL_ELO};
pub use pairing::{select_pair, PairError};
pub use protocol::{ClientMessage, ServerMessage};
pub use similarity::{NeighborLookup, SimilarityIndex};
