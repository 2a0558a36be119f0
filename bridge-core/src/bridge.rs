//! RadioBridge: polls a controller and forwards its state over the radio.

use crate::input::{ControllerError, ControllerSource};
use crate::nrf24::TransmissionOutcome;
use crate::output::{RadioError, TelemetrySink};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use link_proto::TelemetryFrame;

/// Phase the bridge is in, or was in when the last cycle ended early.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleState {
    Polling,
    Transmitting,
    FaultCheck,
}

/// Loop pacing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BridgeTiming {
    /// Wait at the end of every cycle, successful or not.
    pub cycle_delay_ms: u32,
}

impl Default for BridgeTiming {
    fn default() -> Self {
        Self { cycle_delay_ms: 20 }
    }
}

/// What one completed cycle did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    /// Frame handed to the radio.
    pub frame: TelemetryFrame,
    /// Whether the controller answered with the 0x5A ready marker.
    pub controller_ready: bool,
    /// Delivery state sampled after sending.
    pub outcome: TransmissionOutcome,
    /// Whether a retry-exhaustion fault was cleared this cycle.
    pub recovered: bool,
}

/// Error type for bridge operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeError {
    /// Error from the controller.
    Input(ControllerError),
    /// Error from the radio.
    Output(RadioError),
}

impl From<ControllerError> for BridgeError {
    fn from(err: ControllerError) -> Self {
        BridgeError::Input(err)
    }
}

impl From<RadioError> for BridgeError {
    fn from(err: RadioError) -> Self {
        BridgeError::Output(err)
    }
}

/// Fixed-rate, best-effort forwarder from a controller to a telemetry sink.
///
/// Each cycle polls once, sends once and checks once. A frame that was not
/// acknowledged is not resent; the next cycle simply carries fresher state.
///
/// # Fault Handling
///
/// When the sink reports that all retries were spent, the fault indicator
/// is raised, the latched flag is cleared and the indicator is lowered
/// again, all before the next poll. The indicator is lowered even if
/// clearing fails.
pub struct RadioBridge<I, O, LED, D> {
    input: I,
    output: O,
    indicator: LED,
    delay: D,
    timing: BridgeTiming,
    state: CycleState,
}

impl<I, O, LED, D> RadioBridge<I, O, LED, D>
where
    I: ControllerSource,
    O: TelemetrySink,
    LED: OutputPin,
    D: DelayNs,
{
    /// Create a bridge from an initialised controller and radio.
    pub fn new(input: I, output: O, indicator: LED, delay: D) -> Self {
        Self {
            input,
            output,
            indicator,
            delay,
            timing: BridgeTiming::default(),
            state: CycleState::Polling,
        }
    }

    #[must_use]
    pub fn with_timing(mut self, timing: BridgeTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Current phase.
    pub fn state(&self) -> CycleState {
        self.state
    }

    /// Forward controller state indefinitely.
    ///
    /// Errors are logged and the loop carries on with the next cycle.
    pub fn run(&mut self) -> ! {
        loop {
            if let Err(_e) = self.run_cycle() {
                #[cfg(feature = "defmt")]
                defmt::error!("bridge cycle failed in {:?}: {:?}", self.state, _e);
            }
        }
    }

    /// Run one poll, send and check cycle, then wait out the cycle delay.
    ///
    /// The wait is observed whether or not the cycle succeeded.
    pub fn run_cycle(&mut self) -> Result<CycleReport, BridgeError> {
        let result = self.cycle();
        self.delay.delay_ms(self.timing.cycle_delay_ms);
        result
    }

    fn cycle(&mut self) -> Result<CycleReport, BridgeError> {
        self.state = CycleState::Polling;
        let controller = self.input.read_frame()?;
        let controller_ready = controller.identity_matches();
        if !controller_ready {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "controller not ready: id {=u8:#04x}, marker {=u8:#04x}",
                controller.id,
                controller.ready
            );
        }

        self.state = CycleState::Transmitting;
        let frame = TelemetryFrame::from(&controller);
        self.output.send_frame(&frame)?;

        self.state = CycleState::FaultCheck;
        let outcome = self.output.transmission_status()?.outcome();
        let recovered = if outcome == TransmissionOutcome::MaxRetriesExceeded {
            self.recover()?;
            true
        } else {
            false
        };

        self.state = CycleState::Polling;
        Ok(CycleReport {
            frame,
            controller_ready,
            outcome,
            recovered,
        })
    }

    fn recover(&mut self) -> Result<(), RadioError> {
        let _ = self.indicator.set_high();

        #[cfg(feature = "defmt")]
        if let Ok(stats) = self.output.retransmit_stats() {
            defmt::warn!(
                "no ack after {} retries, {} packets lost",
                stats.retries(),
                stats.lost_packets()
            );
        }

        let cleared = self.output.clear_fault();
        let _ = self.indicator.set_low();
        cleared
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Decompose the bridge into its parts.
    pub fn into_parts(self) -> (I, O, LED, D) {
        (self.input, self.output, self.indicator, self.delay)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::mock::{shared, Event, MockDelay, MockPin, RegisterFile, ScriptedReplies, Shared, Timeline};
    use crate::nrf24::{Nrf24, ObserveTx, RadioConfig, Status};
    use crate::psx::{PsxController, POLL_COMMAND};
    use link_proto::{AnalogStick, Buttons, ControllerFrame};
    use std::collections::VecDeque;
    use std::vec;
    use std::vec::Vec;

    const NOTHING: u8 = 0x0E;
    const DELIVERED: u8 = 0x2E;
    const EXHAUSTED: u8 = 0x1E;

    struct MockInput {
        frames: VecDeque<Result<ControllerFrame, ControllerError>>,
        log: Shared<Vec<Event>>,
    }

    impl ControllerSource for MockInput {
        fn read_frame(&mut self) -> Result<ControllerFrame, ControllerError> {
            self.log.lock().unwrap().push(Event::Pin("poll", true));
            self.frames
                .pop_front()
                .unwrap_or(Ok(ControllerFrame::released()))
        }
    }

    #[derive(Default)]
    struct SinkState {
        sent: Vec<TelemetryFrame>,
        statuses: VecDeque<u8>,
        status: u8,
        clears: usize,
        fail_send: bool,
        fail_clear: bool,
    }

    struct MockSink {
        state: Shared<SinkState>,
        log: Shared<Vec<Event>>,
    }

    impl TelemetrySink for MockSink {
        fn send_frame(&mut self, frame: &TelemetryFrame) -> Result<(), RadioError> {
            let mut state = self.state.lock().unwrap();
            if state.fail_send {
                return Err(RadioError::Pin);
            }
            state.sent.push(*frame);
            state.status = state.statuses.pop_front().unwrap_or(NOTHING);
            Ok(())
        }

        fn transmission_status(&mut self) -> Result<Status, RadioError> {
            Ok(Status(self.state.lock().unwrap().status))
        }

        fn clear_fault(&mut self) -> Result<(), RadioError> {
            self.log.lock().unwrap().push(Event::Pin("clear", true));
            let mut state = self.state.lock().unwrap();
            if state.fail_clear {
                return Err(RadioError::Pin);
            }
            state.clears += 1;
            state.status &= !0x70;
            Ok(())
        }

        fn retransmit_stats(&mut self) -> Result<ObserveTx, RadioError> {
            Ok(ObserveTx(0x1F))
        }
    }

    struct Rig {
        timeline: Timeline,
        sink: Shared<SinkState>,
        bridge: RadioBridge<MockInput, MockSink, MockPin, MockDelay>,
    }

    fn rig(frames: Vec<Result<ControllerFrame, ControllerError>>, statuses: &[u8]) -> Rig {
        let timeline = Timeline::new();
        let log = shared(Vec::new());
        let sink = shared(SinkState {
            statuses: statuses.iter().copied().collect(),
            ..SinkState::default()
        });
        let input = MockInput {
            frames: frames.into(),
            log: log.clone(),
        };
        let output = MockSink {
            state: sink.clone(),
            log,
        };
        let bridge = RadioBridge::new(input, output, timeline.pin("led"), timeline.delay());
        Rig {
            timeline,
            sink,
            bridge,
        }
    }

    fn pressed(buttons: Buttons, x: u8, y: u8) -> ControllerFrame {
        ControllerFrame {
            buttons,
            left_stick: AnalogStick::new(x, y),
            right_stick: AnalogStick::new(0x11, 0x22),
            ..ControllerFrame::released()
        }
    }

    #[test]
    fn test_cycle_packs_and_sends_frame() {
        let mut rig = rig(vec![Ok(pressed(Buttons::CROSS | Buttons::START, 0x80, 0x7F))], &[DELIVERED]);

        let report = rig.bridge.run_cycle().unwrap();

        assert_eq!(report.frame.to_bytes(), [0x40, 0x08, 0x80, 0x7F, 0x00]);
        assert_eq!(report.outcome, TransmissionOutcome::Success);
        assert!(!report.recovered);
        assert_eq!(rig.sink.lock().unwrap().sent, vec![report.frame]);
        assert_eq!(rig.bridge.state(), CycleState::Polling);
    }

    #[test]
    fn test_healthy_pad_reports_ready() {
        let timeline = Timeline::new();
        let analog = [0xFF, 0x73, 0x5A, 0xFF, 0xFF, 0x7F, 0x7F, 0x7F, 0x7F];
        let pad = PsxController::new(timeline.spi(ScriptedReplies::new(&analog)));
        let sink = MockSink {
            state: shared(SinkState {
                statuses: [DELIVERED].into_iter().collect(),
                ..SinkState::default()
            }),
            log: shared(Vec::new()),
        };

        let mut bridge = RadioBridge::new(pad, sink, timeline.pin("led"), timeline.delay());
        let report = bridge.run_cycle().unwrap();

        assert!(report.controller_ready);
        assert_eq!(report.outcome, TransmissionOutcome::Success);
    }

    #[test]
    fn test_unready_controller_still_sent() {
        let frame = ControllerFrame {
            ready: 0xFF,
            ..pressed(Buttons::CIRCLE, 0x10, 0x20)
        };
        let mut rig = rig(vec![Ok(frame)], &[DELIVERED]);

        let report = rig.bridge.run_cycle().unwrap();

        assert!(!report.controller_ready);
        assert_eq!(rig.sink.lock().unwrap().sent, vec![TelemetryFrame::from(&frame)]);
    }

    #[test]
    fn test_two_cycles_send_two_frames_in_order() {
        let first = pressed(Buttons::UP, 0x00, 0xFF);
        let second = pressed(Buttons::DOWN, 0xFF, 0x00);
        let mut rig = rig(vec![Ok(first), Ok(second)], &[]);

        rig.bridge.run_cycle().unwrap();
        rig.bridge.run_cycle().unwrap();

        let sent = rig.sink.lock().unwrap().sent.clone();
        assert_eq!(
            sent,
            vec![TelemetryFrame::from(&first), TelemetryFrame::from(&second)]
        );
    }

    #[test]
    fn test_max_retries_clears_once_and_pulses_led() {
        let mut rig = rig(vec![], &[EXHAUSTED, DELIVERED]);

        let report = rig.bridge.run_cycle().unwrap();
        assert_eq!(report.outcome, TransmissionOutcome::MaxRetriesExceeded);
        assert!(report.recovered);
        assert_eq!(rig.sink.lock().unwrap().clears, 1);
        assert_eq!(
            rig.timeline.events(),
            vec![
                Event::Pin("led", true),
                Event::Pin("led", false),
                Event::Delay(20_000_000),
            ]
        );

        let report = rig.bridge.run_cycle().unwrap();
        assert!(!report.recovered);
        assert_eq!(rig.sink.lock().unwrap().clears, 1);
    }

    #[test]
    fn test_clear_happens_before_next_poll() {
        let mut rig = rig(vec![], &[EXHAUSTED]);
        let log = rig.bridge.output_mut().log.clone();

        rig.bridge.run_cycle().unwrap();
        rig.bridge.run_cycle().unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                Event::Pin("poll", true),
                Event::Pin("clear", true),
                Event::Pin("poll", true),
            ]
        );
    }

    #[test]
    fn test_led_cleared_even_if_reset_fails() {
        let mut rig = rig(vec![], &[EXHAUSTED]);
        rig.sink.lock().unwrap().fail_clear = true;

        let result = rig.bridge.run_cycle();

        assert_eq!(result, Err(BridgeError::Output(RadioError::Pin)));
        assert_eq!(rig.bridge.state(), CycleState::FaultCheck);
        assert_eq!(rig.timeline.edges("led", true), 1);
        assert_eq!(rig.timeline.edges("led", false), 1);
    }

    #[test]
    fn test_input_error_skips_send_but_keeps_pacing() {
        let mut rig = rig(
            vec![Err(ControllerError::Bus(embedded_hal::spi::ErrorKind::Other))],
            &[],
        );

        let result = rig.bridge.run_cycle();

        assert!(matches!(result, Err(BridgeError::Input(_))));
        assert_eq!(rig.bridge.state(), CycleState::Polling);
        assert!(rig.sink.lock().unwrap().sent.is_empty());
        assert_eq!(rig.timeline.events(), vec![Event::Delay(20_000_000)]);
    }

    #[test]
    fn test_send_error_reports_phase() {
        let mut rig = rig(vec![], &[]);
        rig.sink.lock().unwrap().fail_send = true;

        let result = rig.bridge.run_cycle();

        assert_eq!(result, Err(BridgeError::Output(RadioError::Pin)));
        assert_eq!(rig.bridge.state(), CycleState::Transmitting);

        rig.sink.lock().unwrap().fail_send = false;
        assert!(rig.bridge.run_cycle().is_ok());
    }

    #[test]
    fn test_custom_cycle_delay() {
        let mut rig = rig(vec![], &[]);
        rig.bridge = rig.bridge.with_timing(BridgeTiming { cycle_delay_ms: 5 });

        rig.bridge.run_cycle().unwrap();

        assert_eq!(rig.timeline.events(), vec![Event::Delay(5_000_000)]);
    }

    #[test]
    fn test_real_drivers_on_shared_timeline() {
        let timeline = Timeline::new();
        let pad_replies = [0xFF, 0x73, 0x5A, 0xFF, 0xFE, 0x7F, 0x7F, 0x00, 0xFF];
        let pad = PsxController::new(timeline.spi(ScriptedReplies::new(&pad_replies)));

        let chip = shared(RegisterFile::new());
        let mut radio = Nrf24::new(timeline.spi(chip.clone()), timeline.pin("ce"), timeline.delay());
        radio.init(&RadioConfig::transmitter()).unwrap();
        chip.lock().unwrap().raise(0x10);
        timeline.clear();

        let mut bridge = RadioBridge::new(pad, radio, timeline.pin("led"), timeline.delay());
        let report = bridge.run_cycle().unwrap();

        assert!(report.recovered);
        assert!(report.controller_ready);
        assert_eq!(report.frame.to_bytes(), [0x01, 0x00, 0xFF, 0x00, 0x00]);

        let chip = chip.lock().unwrap();
        assert_eq!(chip.tx_fifo(), vec![0x01, 0x00, 0xFF, 0x00, 0x00]);
        assert_eq!(chip.status_writes(), 1);
        assert_eq!(chip.status() & 0x70, 0);

        let sent = timeline.transactions();
        assert_eq!(sent[0], POLL_COMMAND.to_vec());
        assert_eq!(sent[1], vec![0xE1]);
        assert_eq!(sent[2], vec![0xA0, 0x01, 0x00, 0xFF, 0x00, 0x00]);
        assert_eq!(sent[3], vec![0x07, 0xFF]);
        assert_eq!(sent.last(), Some(&vec![0x27, 0x70]));
        assert_eq!(timeline.events().last(), Some(&Event::Delay(20_000_000)));
    }
}
