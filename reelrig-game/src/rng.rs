//! Seeded random streams for a slot session.
//!
//! Every consumer draws from its own stream so that, for example, an extra
//! re-rig request never shifts the reward engine's random-symbol resolution.
use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use sha2::Sha256;
use std::cell::{RefCell, RefMut};

/// Independent RNG streams derived from one user-visible seed.
#[derive(Debug)]
pub struct RngBundle {
    seed: u64,
    strip: RefCell<CountingRng<SmallRng>>,
    rig: RefCell<CountingRng<SmallRng>>,
    reward: RefCell<CountingRng<SmallRng>>,
    cards: RefCell<CountingRng<SmallRng>>,
}

impl RngBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            seed,
            strip: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"strip"))),
            rig: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"rig"))),
            reward: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"reward"))),
            cards: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"cards"))),
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Stream used for the initial strips of a spin.
    #[must_use]
    pub fn strip(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.strip.borrow_mut()
    }

    /// Stream used for re-rig requests.
    #[must_use]
    pub fn rig(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.rig.borrow_mut()
    }

    /// Stream used to resolve random symbols at settlement.
    #[must_use]
    pub fn reward(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.reward.borrow_mut()
    }

    /// Stream used for card draws.
    #[must_use]
    pub fn cards(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.cards.borrow_mut()
    }
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<SmallRng> {
    fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: rand::RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()).expect("64-bit seed is valid key");
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let seed_bytes: [u8; 8] = digest[..8].try_into().expect("digest slice length");
    u64::from_le_bytes(seed_bytes)
}
