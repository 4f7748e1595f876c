use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use rally::{LinkSimulation, Side};

// Shared virtual clock. Engines only ever compare their own timestamps, so
// running both devices off one scaled clock is enough to speed a match up.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    start: Instant,
    speed: u32,
}

impl Clock {
    pub fn new(speed: u32) -> Self {
        Self {
            start: Instant::now(),
            speed: speed.max(1),
        }
    }

    pub fn now_ms(&self) -> i64 {
        self.start.elapsed().as_millis() as i64 * self.speed as i64
    }

    pub fn real(&self, virtual_ms: u32) -> Duration {
        Duration::from_millis(virtual_ms as u64) / self.speed
    }
}

#[derive(Debug)]
pub struct Packet {
    pub sent_at: Instant,
    pub payload: Vec<u8>,
}

impl Packet {
    pub fn new(payload: Vec<u8>) -> Self {
        Self {
            sent_at: Instant::now(),
            payload,
        }
    }
}

// Delivers packets from one device to the other after the simulated delay.
// A packet is never released before the one sent ahead of it.
pub fn spawn_link(
    from: Side,
    sim: LinkSimulation,
    clock: Clock,
    seed: u64,
    mut rx: mpsc::UnboundedReceiver<Packet>,
    tx: mpsc::UnboundedSender<Vec<u8>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut last_due = Instant::now();
        while let Some(packet) = rx.recv().await {
            let due = (packet.sent_at + clock.real(sim.delay_ms(&mut rng))).max(last_due);
            last_due = due;
            time::sleep_until(due).await;
            if tx.send(packet.payload).is_err() {
                log::debug!("link from {from} closed on the far side");
                break;
            }
        }
    })
}
