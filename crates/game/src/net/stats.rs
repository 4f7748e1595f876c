use rand::Rng;
use serde::{Deserialize, Serialize};

// Latency model for an in-memory reliable link. Delivery order is kept, so
// jitter only ever delays a message behind the one sent before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinkSimulation {
    pub min_latency_ms: u32,
    pub max_latency_ms: u32,
    pub jitter_ms: u32,
}

impl LinkSimulation {
    pub fn fixed(latency_ms: u32) -> Self {
        Self {
            min_latency_ms: latency_ms,
            max_latency_ms: latency_ms,
            jitter_ms: 0,
        }
    }

    pub fn delay_ms<R: Rng>(&self, rng: &mut R) -> u32 {
        let base = self.min_latency_ms;
        let range = self.max_latency_ms.saturating_sub(self.min_latency_ms);
        let spread = if range > 0 { rng.gen_range(0..=range) } else { 0 };
        let jitter = if self.jitter_ms > 0 {
            rng.gen_range(0..=self.jitter_ms)
        } else {
            0
        };
        base + spread + jitter
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStats {
    pub messages_sent: u64,
    pub messages_received: u64,
    pub messages_dropped: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

impl LinkStats {
    pub fn record_sent(&mut self, len: usize) {
        self.messages_sent += 1;
        self.bytes_sent += len as u64;
    }

    pub fn record_received(&mut self, len: usize) {
        self.messages_received += 1;
        self.bytes_received += len as u64;
    }

    pub fn record_dropped(&mut self, len: usize) {
        self.messages_dropped += 1;
        self.bytes_received += len as u64;
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn delay_stays_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let sim = LinkSimulation {
            min_latency_ms: 20,
            max_latency_ms: 40,
            jitter_ms: 5,
        };
        for _ in 0..500 {
            let d = sim.delay_ms(&mut rng);
            assert!((20..=45).contains(&d), "{d}");
        }
        assert_eq!(LinkSimulation::fixed(30).delay_ms(&mut rng), 30);
        assert_eq!(LinkSimulation::default().delay_ms(&mut rng), 0);
    }
}
