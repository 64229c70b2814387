//! Oracle index sources.
//!
//! Index assignment only has to be unpredictable enough to shard reporters;
//! it is not a security boundary. The source is injected so tests can
//! script exact indexes.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::collections::VecDeque;
use std::fmt;
use surety_types::{Address, Wei};

/// Inputs mixed into every draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawContext {
    pub caller: Address,
    pub value: Wei,
    pub height: u64,
}

/// Produces indexes in `0..space`.
pub trait IndexSource: Send + fmt::Debug {
    fn draw(&mut self, ctx: &DrawContext, space: u8) -> u8;
}

/// Seeded pseudo-random source mixing the draw context into a keyed hash.
pub struct SeededIndexSource {
    rng: StdRng,
    salt: [u8; 32],
    nonce: u64,
}

impl SeededIndexSource {
    const DOMAIN: &'static str = "flight-surety-index-v1";

    pub fn new(seed: u64) -> Self {
        let salt = *blake3::hash(&seed.to_le_bytes()).as_bytes();
        Self {
            rng: StdRng::seed_from_u64(seed),
            salt,
            nonce: 0,
        }
    }
}

impl fmt::Debug for SeededIndexSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeededIndexSource")
            .field("nonce", &self.nonce)
            .finish()
    }
}

impl IndexSource for SeededIndexSource {
    fn draw(&mut self, ctx: &DrawContext, space: u8) -> u8 {
        if space <= 1 {
            return 0;
        }
        self.nonce = self.nonce.wrapping_add(1);

        let mut hasher = blake3::Hasher::new_keyed(&self.salt);
        hasher.update(Self::DOMAIN.as_bytes());
        hasher.update(ctx.caller.as_bytes());
        hasher.update(&ctx.value.as_u128().to_le_bytes());
        hasher.update(&ctx.height.to_le_bytes());
        hasher.update(&self.nonce.to_le_bytes());
        hasher.update(&self.rng.next_u64().to_le_bytes());

        let digest = hasher.finalize();
        let mut word = [0u8; 8];
        word.copy_from_slice(&digest.as_bytes()[..8]);
        (u64::from_le_bytes(word) % u64::from(space)) as u8
    }
}

/// Replays a fixed sequence of indexes, cycling when exhausted.
///
/// Values are reduced modulo the requested space so a script written for
/// the default space stays valid under a smaller one.
#[derive(Clone, Debug, Default)]
pub struct ScriptedIndexSource {
    script: VecDeque<u8>,
    played: Vec<u8>,
}

impl ScriptedIndexSource {
    pub fn new(script: impl IntoIterator<Item = u8>) -> Self {
        Self {
            script: script.into_iter().collect(),
            played: Vec::new(),
        }
    }

    /// Every index always resolves to `index`.
    pub fn constant(index: u8) -> Self {
        Self::new([index])
    }

    pub fn played(&self) -> &[u8] {
        &self.played
    }
}

impl IndexSource for ScriptedIndexSource {
    fn draw(&mut self, _ctx: &DrawContext, space: u8) -> u8 {
        let raw = match self.script.pop_front() {
            Some(value) => {
                self.script.push_back(value);
                value
            }
            None => 0,
        };
        let index = if space == 0 { 0 } else { raw % space };
        self.played.push(index);
        index
    }
}

/// Draw the three indexes of a newly registered oracle.
///
/// Repeats are allowed; an oracle holding the same index twice simply
/// covers fewer distinct requests.
pub fn assign_indexes(source: &mut dyn IndexSource, ctx: &DrawContext, space: u8) -> [u8; 3] {
    let first = source.draw(ctx, space);
    let second = source.draw(ctx, space);
    let third = source.draw(ctx, space);
    [first, second, third]
}
