use anyhow::Result;
use serde::Serialize;
use tokio::sync::mpsc;

use rally::{GameMode, MatchSettings, Role};

use crate::config::HostConfig;
use crate::device::Device;
use crate::events::{describe, DeviceReport, HostEvent};
use crate::link::{spawn_link, Clock};

#[derive(Debug, Clone, Serialize)]
pub struct MatchSummary {
    pub settings: MatchSettings,
    pub devices: Vec<DeviceReport>,
    pub events: usize,
    pub consistent: bool,
}

pub async fn run_match(config: HostConfig) -> Result<MatchSummary> {
    let clock = Clock::new(config.speed);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let mut host = Device::new(Role::Host, &config, clock, event_tx.clone());
    let mut tasks = Vec::new();

    if config.settings.game_mode == GameMode::Solo {
        log::info!("solo match, one device");
        tasks.push(tokio::spawn(host.run()));
    } else {
        let mut guest = Device::new(Role::Guest, &config, clock, event_tx.clone());
        let (host_out, host_link) = mpsc::unbounded_channel();
        let (guest_out, guest_link) = mpsc::unbounded_channel();
        let (to_host, host_in) = mpsc::unbounded_channel();
        let (to_guest, guest_in) = mpsc::unbounded_channel();

        host.connect(host_out, host_in);
        guest.connect(guest_out, guest_in);

        log::info!(
            "link latency {}-{} ms, jitter {} ms",
            config.link.min_latency_ms,
            config.link.max_latency_ms,
            config.link.jitter_ms
        );
        tasks.push(spawn_link(
            Role::Host.side(),
            config.link,
            clock,
            config.seed ^ 0x11,
            host_link,
            to_guest,
        ));
        tasks.push(spawn_link(
            Role::Guest.side(),
            config.link,
            clock,
            config.seed ^ 0x22,
            guest_link,
            to_host,
        ));
        tasks.push(tokio::spawn(host.run()));
        tasks.push(tokio::spawn(guest.run()));
    }
    drop(event_tx);

    let mut devices = Vec::new();
    let mut events = 0;
    while let Some(event) = event_rx.recv().await {
        match event {
            HostEvent::Match { side, at_ms, event } => {
                events += 1;
                match describe(side, &event) {
                    Some(line) => log::info!("{line}"),
                    None => log::debug!("[{side}] {at_ms} {event:?}"),
                }
            }
            HostEvent::Finished(report) => devices.push(report),
        }
    }

    for task in tasks {
        task.await?;
    }

    devices.sort_by_key(|report| report.side.index());
    let consistent = devices.windows(2).all(|pair| {
        pair[0].scores == pair[1].scores
            && pair[0].rally_score == pair[1].rally_score
            && pair[0].lives == pair[1].lives
    });
    if !consistent {
        log::warn!("devices disagree on the final score");
    }

    Ok(MatchSummary {
        settings: config.settings,
        devices,
        events,
        consistent,
    })
}
