//! A complete host/device session over a loopback pair.
//!
//! The device polls on its own thread while the host walks through PING,
//! START_STREAM, STOP_STREAM and an unknown command, recording every event
//! it observes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use linkproto_frame::Address;
use linkproto_peer::{CommandId, Device, EventSummary, Host, HostEvent, PeerError};
use linkproto_transport::{pair, BitFlip, LoopbackLink, TransportError};
use serde::Serialize;

/// Command byte the demo uses to exercise the unknown-command path.
pub const UNKNOWN_COMMAND: u8 = 0x99;

/// Errors that abort a demo session.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error("host failed: {0}")]
    Host(#[source] PeerError),

    #[error("device failed: {0}")]
    Device(#[source] PeerError),

    #[error("fault injection setup failed: {0}")]
    Setup(#[from] TransportError),

    #[error("device thread panicked")]
    DevicePanicked,
}

/// Session parameters.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub host_address: Address,
    pub device_address: Address,
    /// Host steps after each command. Every step drains all pending frames.
    pub ping_steps: usize,
    pub stream_steps: usize,
    pub stop_steps: usize,
    pub unknown_steps: usize,
    /// Sleep between host steps.
    pub host_interval: Duration,
    /// Sleep between device polls.
    pub device_interval: Duration,
    /// Corrupt one bit of every device frame, seeded for reproducibility.
    pub fault_seed: Option<u64>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            host_address: Address::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]),
            device_address: Address::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]),
            ping_steps: 20,
            stream_steps: 100,
            stop_steps: 20,
            unknown_steps: 20,
            host_interval: Duration::from_millis(10),
            device_interval: Duration::from_millis(1),
            fault_seed: None,
        }
    }
}

/// Which command the host had most recently issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Ping,
    StartStream,
    StopStream,
    UnknownCommand,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::Ping => "ping",
            Phase::StartStream => "start_stream",
            Phase::StopStream => "stop_stream",
            Phase::UnknownCommand => "unknown_command",
        }
    }

    fn command(self) -> CommandId {
        match self {
            Phase::Ping => CommandId::Ping,
            Phase::StartStream => CommandId::StartStream,
            Phase::StopStream => CommandId::StopStream,
            Phase::UnknownCommand => CommandId::from(UNKNOWN_COMMAND),
        }
    }
}

/// One host observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemoEvent {
    pub phase: Phase,
    #[serde(flatten)]
    pub summary: EventSummary,
    #[serde(skip)]
    pub event: HostEvent,
}

/// Everything the host saw during a session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DemoReport {
    pub events: Vec<DemoEvent>,
    /// Frames the host discarded because they failed validation.
    pub dropped: usize,
}

impl DemoReport {
    pub fn telemetry(&self) -> impl Iterator<Item = u32> + '_ {
        self.events.iter().filter_map(|e| match e.event {
            HostEvent::Telemetry { counter } => Some(counter),
            _ => None,
        })
    }
}

/// Run a full session and return what the host observed.
pub fn run(config: &DemoConfig) -> Result<DemoReport, DemoError> {
    let (host_link, device_link) = pair(config.host_address, config.device_address);
    if let Some(seed) = config.fault_seed {
        device_link.set_fault_injection(Some(Box::new(BitFlip::seeded(seed))))?;
    }

    let running = AtomicBool::new(true);
    thread::scope(|s| {
        let device = s.spawn(|| device_loop(&device_link, &running, config.device_interval));

        let host_result = {
            let _stop = StopOnDrop(&running);
            host_session(&host_link, config)
        };

        let device_result = device.join().map_err(|_| DemoError::DevicePanicked)?;
        device_result.map_err(DemoError::Device)?;
        host_result
    })
}

/// Clears the device loop flag when dropped, including while unwinding.
struct StopOnDrop<'a>(&'a AtomicBool);

impl Drop for StopOnDrop<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn device_loop(
    link: &LoopbackLink,
    running: &AtomicBool,
    interval: Duration,
) -> Result<(), PeerError> {
    let mut device = Device::new(link);
    while running.load(Ordering::SeqCst) {
        if let Err(err) = device.poll() {
            if !err.is_recoverable() {
                return Err(err);
            }
            tracing::warn!(
                error = %err,
                category = ?err.category(),
                "device dropped inbound frame"
            );
        }
        thread::sleep(interval);
    }
    Ok(())
}

fn host_session(link: &LoopbackLink, config: &DemoConfig) -> Result<DemoReport, DemoError> {
    let host = Host::new(link);
    let mut report = DemoReport::default();

    let phases = [
        (Phase::Ping, config.ping_steps),
        (Phase::StartStream, config.stream_steps),
        (Phase::StopStream, config.stop_steps),
        (Phase::UnknownCommand, config.unknown_steps),
    ];

    for (phase, steps) in phases {
        tracing::info!(phase = phase.name(), steps, "sending command");
        host.send_command(phase.command(), &[]).map_err(DemoError::Host)?;

        for _ in 0..steps {
            drain(&host, phase, &mut report)?;
            thread::sleep(config.host_interval);
        }
    }

    Ok(report)
}

/// Consume every frame currently queued for the host.
fn drain(
    host: &Host<'_, LoopbackLink>,
    phase: Phase,
    report: &mut DemoReport,
) -> Result<(), DemoError> {
    loop {
        match host.poll() {
            Ok(Some(event)) => report.events.push(DemoEvent {
                phase,
                summary: event.summary(),
                event,
            }),
            Ok(None) => return Ok(()),
            Err(err) if err.is_recoverable() => {
                tracing::warn!(
                    error = %err,
                    category = ?err.category(),
                    "host dropped inbound frame"
                );
                report.dropped += 1;
            }
            Err(err) => return Err(DemoError::Host(err)),
        }
    }
}
