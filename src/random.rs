//! Deterministic random number streams.
//!
//! Every colony slot draws from its own [`ChaCha8Rng`] stream derived from a
//! single master seed, so a run is reproducible no matter in which order (or
//! on which thread) the slots are processed.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Random number generator used throughout the crate.
pub type AbcRng = ChaCha8Rng;

/// Creates a generator on the default stream of `seed`.
pub fn create_rng(seed: u64) -> AbcRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Creates a generator on stream `stream` of `seed`.
///
/// Distinct stream ids under the same seed produce independent sequences.
pub fn stream_rng(seed: u64, stream: u64) -> AbcRng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(stream);
    rng
}

/// The full set of streams used by one run.
///
/// Stream ids are laid out as:
/// - `0..n`: search stream of slot `i` (initialization, employed moves, scouting)
/// - `n..2n`: opposition stream of slot `i` (EOBL gating and reflection)
/// - `2n`: onlooker stream (roulette draws and onlooker moves)
#[derive(Debug, Clone)]
pub struct RngStreams {
    pub search: Vec<AbcRng>,
    pub opposition: Vec<AbcRng>,
    pub onlooker: AbcRng,
}

impl RngStreams {
    /// Derives all streams for a colony of `slots` solutions.
    pub fn new(seed: u64, slots: usize) -> Self {
        let n = slots as u64;
        Self {
            search: (0..n).map(|i| stream_rng(seed, i)).collect(),
            opposition: (0..n).map(|i| stream_rng(seed, n + i)).collect(),
            onlooker: stream_rng(seed, 2 * n),
        }
    }
}
