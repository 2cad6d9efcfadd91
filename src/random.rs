//! Random number streams.
//!
//! Every sampler owns a [`RandomStream`]: a PCG generator that remembers where it started, so it
//! can be rewound, and that can be switched to produce antithetic variates $1 - u$. Streams are
//! handed out by a [`StreamProvider`], which assigns each of them its own PCG stream number.
use rand::distributions::Open01;
use rand::Rng;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

/// The seed used by [`StreamProvider::default`].
pub const DEFAULT_SEED: u128 = 0xcafe_f00d_d15e_a5e5;

/// Number of draws between the starts of two consecutive substreams.
const SUBSTREAM_LENGTH: u128 = 1 << 64;

/// A repeatable stream of uniform random numbers on the open interval $(0, 1)$.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RandomStream {
    stream_start: Pcg64,
    substream_start: Pcg64,
    rng: Pcg64,
    antithetic: bool,
}

impl RandomStream {
    /// Create the stream with number `stream` for the given `seed`.
    pub fn new(seed: u128, stream: u128) -> Self {
        let rng = Pcg64::new(seed, stream);

        Self {
            stream_start: rng.clone(),
            substream_start: rng.clone(),
            rng,
            antithetic: false,
        }
    }

    /// Draw the next uniform random number. Antithetic streams return $1 - u$ instead of $u$.
    pub fn next_u01(&mut self) -> f64 {
        let u: f64 = self.rng.sample(Open01);

        if self.antithetic {
            1.0 - u
        } else {
            u
        }
    }

    /// Rewind to the position the stream was created at.
    pub fn reset_start_stream(&mut self) {
        self.rng = self.stream_start.clone();
        self.substream_start = self.stream_start.clone();
    }

    /// Rewind to the start of the current substream.
    pub fn reset_start_substream(&mut self) {
        self.rng = self.substream_start.clone();
    }

    /// Jump to the start of the next substream.
    pub fn advance_to_next_substream(&mut self) {
        self.substream_start.advance(SUBSTREAM_LENGTH);
        self.rng = self.substream_start.clone();
    }

    /// Returns whether this stream produces antithetic variates.
    pub const fn antithetic(&self) -> bool {
        self.antithetic
    }

    /// Switch between regular and antithetic variates.
    pub fn set_antithetic(&mut self, antithetic: bool) {
        self.antithetic = antithetic;
    }

    /// Returns a copy of this stream at the same position, with start and substream positions
    /// shared, that produces the antithetic counterpart of every number this stream produces.
    pub fn new_antithetic_instance(&self) -> Self {
        let mut instance = self.clone();
        instance.antithetic = !self.antithetic;
        instance
    }
}

/// Hands out independent random number streams derived from a single seed.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StreamProvider {
    seed: u128,
    next: u128,
}

impl Default for StreamProvider {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl StreamProvider {
    /// Constructor.
    pub const fn new(seed: u128) -> Self {
        Self { seed, next: 0 }
    }

    /// Returns the stream following the last one handed out.
    pub fn next_stream(&mut self) -> RandomStream {
        let stream = self.stream(self.next);
        self.next += 1;
        stream
    }

    /// Returns the stream with the given number, in its start position.
    pub fn stream(&self, number: u128) -> RandomStream {
        RandomStream::new(self.seed, number)
    }

    /// Returns how many streams [`next_stream`](Self::next_stream) has handed out.
    pub const fn streams_provided(&self) -> u128 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn assert_eq_stream(lhs: &RandomStream, rhs: &RandomStream) {
        assert_eq!(
            serde_json::to_string(lhs).unwrap(),
            serde_json::to_string(rhs).unwrap()
        );
    }

    fn draw(stream: &mut RandomStream, n: usize) -> Vec<f64> {
        (0..n).map(|_| stream.next_u01()).collect()
    }

    #[test]
    fn test_open_unit_interval() {
        let mut stream = StreamProvider::default().next_stream();

        for u in draw(&mut stream, 10_000) {
            assert!(u > 0.0 && u < 1.0);
        }
    }

    #[test]
    fn test_reset_start_stream() {
        let mut stream = StreamProvider::new(7).next_stream();
        let start = stream.clone();
        let first = draw(&mut stream, 100);

        stream.reset_start_stream();
        assert_eq_stream(&stream, &start);
        assert_eq!(draw(&mut stream, 100), first);
    }

    #[test]
    fn test_antithetic_instance_mirrors_draws() {
        let mut stream = StreamProvider::default().next_stream();
        // the antithetic copy starts at the current position
        draw(&mut stream, 13);
        let mut antithetic = stream.new_antithetic_instance();

        assert!(!stream.antithetic());
        assert!(antithetic.antithetic());

        for (u, v) in draw(&mut stream, 100).into_iter().zip(draw(&mut antithetic, 100)) {
            assert_approx_eq!(u + v, 1.0, 1e-15);
        }

        // both rewind to the same start
        stream.reset_start_stream();
        antithetic.reset_start_stream();
        assert_approx_eq!(stream.next_u01() + antithetic.next_u01(), 1.0, 1e-15);
    }

    #[test]
    fn test_substreams() {
        let mut stream = StreamProvider::default().next_stream();
        let first = draw(&mut stream, 10);

        stream.advance_to_next_substream();
        let second = draw(&mut stream, 10);
        assert_ne!(first, second);

        stream.reset_start_substream();
        assert_eq!(draw(&mut stream, 10), second);

        stream.reset_start_stream();
        assert_eq!(draw(&mut stream, 10), first);
    }

    #[test]
    fn test_provider_streams_are_distinct_and_repeatable() {
        let mut provider = StreamProvider::new(42);
        let mut a = provider.next_stream();
        let mut b = provider.next_stream();

        assert_eq!(provider.streams_provided(), 2);
        assert_ne!(draw(&mut a, 10), draw(&mut b, 10));

        let mut again = StreamProvider::new(42).stream(1);
        b.reset_start_stream();
        assert_eq!(draw(&mut again, 10), draw(&mut b, 10));
    }

    #[test]
    fn test_serialization() {
        let mut stream = StreamProvider::default().next_stream();
        draw(&mut stream, 5);

        let json = serde_json::to_string(&stream).unwrap();
        let mut restored: RandomStream = serde_json::from_str(&json).unwrap();

        assert_eq!(draw(&mut restored, 10), draw(&mut stream, 10));
    }
}
