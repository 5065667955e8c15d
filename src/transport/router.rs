//! OSC address routing
//!
//! Each inbound message is classified by address and either updates the
//! timecode, switches transport mode, or is ignored. Senders in the wild
//! emit unrelated addresses and send toggle-style `/play 0`, so
//! transport commands are gated on their first argument.

use crate::protocol::{OscArg, OutgoingEvent, TransportState};
use crate::timecode::{self, Timecode};
use crate::transport::ShowState;

/// Addresses carrying playhead time (REAPER and Max aliases)
pub const TIME_ADDRESSES: [&str; 5] = [
    "/time",
    "/time/str",
    "/transport/time",
    "/stopwatch/time",
    "/bigclock",
];

/// Recognized OSC command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Time,
    Play,
    Stop,
    Pause,
    /// `/reset` or `/rewind`
    Reset,
}

impl Command {
    /// Classify an address, case-insensitively.
    ///
    /// Whitespace is significant: `" /play"` is not `/play`.
    pub fn parse(address: &str) -> Option<Self> {
        let address = address.to_lowercase();
        match address.as_str() {
            a if TIME_ADDRESSES.contains(&a) => Some(Self::Time),
            "/play" => Some(Self::Play),
            "/stop" => Some(Self::Stop),
            "/pause" => Some(Self::Pause),
            "/reset" | "/rewind" => Some(Self::Reset),
            _ => None,
        }
    }
}

/// Outcome of routing one message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterAction {
    TimeUpdated(Timecode),
    /// `reset` is set when a stop also rewound the timecode
    StateChanged { state: TransportState, reset: bool },
    Ignored,
}

impl RouterAction {
    /// Viewer messages for this action, in broadcast order.
    ///
    /// A stop with reset sends the zeroed time before the state so viewers
    /// never render a stale time next to "stopped".
    pub fn events(&self) -> Vec<OutgoingEvent> {
        match *self {
            Self::TimeUpdated(tc) => vec![OutgoingEvent::Time(tc)],
            Self::StateChanged { state, reset: true } => vec![
                OutgoingEvent::Time(Timecode::ZERO),
                OutgoingEvent::State(state),
            ],
            Self::StateChanged { state, reset: false } => vec![OutgoingEvent::State(state)],
            Self::Ignored => Vec::new(),
        }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }
}

/// Truthiness of a transport command's first argument.
///
/// Zero, `false`, and blank or `"0"` strings are off. A missing argument
/// is a bang and counts as on, as does a non-scalar such as nil.
pub fn is_on(arg: Option<&OscArg>) -> bool {
    match arg {
        None | Some(OscArg::Other) => true,
        Some(OscArg::Number(n)) => *n != 0.0,
        Some(OscArg::Boolean(b)) => *b,
        Some(OscArg::Text(s)) => {
            let s = s.trim();
            !s.is_empty() && s != "0"
        }
    }
}

/// Applies OSC commands to a [`ShowState`]
#[derive(Debug, Clone, Default)]
pub struct CommandRouter {
    reset_on_stop: bool,
}

impl CommandRouter {
    pub fn new(reset_on_stop: bool) -> Self {
        Self { reset_on_stop }
    }

    pub fn reset_on_stop(&self) -> bool {
        self.reset_on_stop
    }

    /// Route one message, mutating `state` in place
    pub fn route(&self, state: &mut ShowState, address: &str, args: &[OscArg]) -> RouterAction {
        let Some(command) = Command::parse(address) else {
            return RouterAction::Ignored;
        };

        match command {
            Command::Time => match timecode::normalize(args) {
                Some(tc) => {
                    state.set_timecode(tc);
                    RouterAction::TimeUpdated(tc)
                }
                None => RouterAction::Ignored,
            },
            Command::Play => self.transition(state, TransportState::Playing, args),
            Command::Stop => self.transition(state, TransportState::Stopped, args),
            Command::Pause => self.transition(state, TransportState::Paused, args),
            Command::Reset => {
                state.reset_timecode();
                RouterAction::TimeUpdated(Timecode::ZERO)
            }
        }
    }

    fn transition(
        &self,
        state: &mut ShowState,
        target: TransportState,
        args: &[OscArg],
    ) -> RouterAction {
        if !is_on(args.first()) {
            return RouterAction::Ignored;
        }

        let reset = target == TransportState::Stopped && self.reset_on_stop;
        if reset {
            state.reset_timecode();
        }
        state.set_transport(target);

        RouterAction::StateChanged { state: target, reset }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_on_truth_table() {
        assert!(!is_on(Some(&OscArg::from(0))));
        assert!(is_on(Some(&OscArg::from(1))));
        assert!(is_on(Some(&OscArg::from(-0.5))));
        assert!(!is_on(Some(&OscArg::from(""))));
        assert!(!is_on(Some(&OscArg::from("0"))));
        assert!(!is_on(Some(&OscArg::from("  "))));
        assert!(!is_on(Some(&OscArg::from(" 0 "))));
        assert!(is_on(Some(&OscArg::from("x"))));
        assert!(is_on(None));
        assert!(!is_on(Some(&OscArg::from(false))));
        assert!(is_on(Some(&OscArg::from(true))));
        assert!(is_on(Some(&OscArg::Other)));
    }

    #[test]
    fn test_gate_reads_first_position() {
        let router = CommandRouter::default();
        let mut state = ShowState::new();

        // nil in front of a zero is still the first argument
        let args = OscArg::collect(&[rosc::OscType::Nil, rosc::OscType::Int(0)]);
        router.route(&mut state, "/play", &args);
        assert_eq!(state.transport, TransportState::Playing);
    }

    #[test]
    fn test_pause_and_stop_gated_off() {
        let router = CommandRouter::new(true);
        let mut state = ShowState::new();
        router.route(&mut state, "/time", &[OscArg::from(100)]);
        router.route(&mut state, "/play", &[]);
        let before = state;

        assert!(router.route(&mut state, "/pause", &[OscArg::from(0)]).is_ignored());
        assert_eq!(state, before);

        // the gate is checked before reset-on-stop rewinds anything
        assert!(router.route(&mut state, "/stop", &[OscArg::from(0)]).is_ignored());
        assert!(router.route(&mut state, "/stop", &[OscArg::from("0")]).is_ignored());
        assert!(router.route(&mut state, "/stop", &[OscArg::from(false)]).is_ignored());
        assert_eq!(state, before);
        assert_eq!(state.timecode, Timecode::from_seconds(100));
        assert_eq!(state.transport, TransportState::Playing);
    }

    #[test]
    fn test_address_classification() {
        for addr in TIME_ADDRESSES {
            assert_eq!(Command::parse(addr), Some(Command::Time));
        }
        assert_eq!(Command::parse("/TIME/STR"), Some(Command::Time));
        assert_eq!(Command::parse("/Play"), Some(Command::Play));
        assert_eq!(Command::parse("/rewind"), Some(Command::Reset));
        assert_eq!(Command::parse(" /play"), None);
        assert_eq!(Command::parse("/play "), None);
        assert_eq!(Command::parse("/foo"), None);
    }

    #[test]
    fn test_time_update() {
        let router = CommandRouter::default();
        let mut state = ShowState::new();

        let action = router.route(&mut state, "/time", &[OscArg::from("01:02:03")]);
        assert_eq!(action.events().len(), 1);
        assert_eq!(state.timecode.to_string(), "01:02:03");

        router.route(&mut state, "/bigclock", &[OscArg::from(3725)]);
        assert_eq!(state.timecode.to_string(), "01:02:05");
    }

    #[test]
    fn test_unparseable_time_keeps_state() {
        let router = CommandRouter::default();
        let mut state = ShowState::new();
        router.route(&mut state, "/time", &[OscArg::from(42)]);

        for args in [vec![], vec![OscArg::from("abc")], vec![OscArg::from(true)]] {
            let action = router.route(&mut state, "/time", &args);
            assert!(action.is_ignored());
            assert_eq!(state.timecode, Timecode::from_seconds(42));
        }
    }

    #[test]
    fn test_play_gated_on_argument() {
        let router = CommandRouter::default();
        let mut state = ShowState::new();

        assert!(router.route(&mut state, "/play", &[OscArg::from(0)]).is_ignored());
        assert_eq!(state.transport, TransportState::Stopped);

        let action = router.route(&mut state, "/play", &[OscArg::from(1)]);
        assert_eq!(
            action,
            RouterAction::StateChanged { state: TransportState::Playing, reset: false }
        );
        assert_eq!(state.transport, TransportState::Playing);
    }

    #[test]
    fn test_repeated_play_still_emits() {
        let router = CommandRouter::default();
        let mut state = ShowState::new();

        let first = router.route(&mut state, "/play", &[]);
        let second = router.route(&mut state, "/play", &[]);
        assert_eq!(first.events(), second.events());
        assert_eq!(second.events().len(), 1);
    }

    #[test]
    fn test_stop_without_reset() {
        let router = CommandRouter::new(false);
        let mut state = ShowState::new();
        router.route(&mut state, "/time", &[OscArg::from(100)]);
        router.route(&mut state, "/play", &[]);

        let action = router.route(&mut state, "/stop", &[]);
        assert_eq!(action.events(), vec![OutgoingEvent::State(TransportState::Stopped)]);
        assert_eq!(state.timecode, Timecode::from_seconds(100));
    }

    #[test]
    fn test_stop_with_reset_sends_time_first() {
        let router = CommandRouter::new(true);
        let mut state = ShowState::new();
        router.route(&mut state, "/time", &[OscArg::from(100)]);
        router.route(&mut state, "/play", &[]);

        let action = router.route(&mut state, "/stop", &[]);
        assert_eq!(
            action.events(),
            vec![
                OutgoingEvent::Time(Timecode::ZERO),
                OutgoingEvent::State(TransportState::Stopped),
            ]
        );
        assert_eq!(state.timecode, Timecode::ZERO);
        assert_eq!(state.transport, TransportState::Stopped);
    }

    #[test]
    fn test_reset_ignores_arguments() {
        let router = CommandRouter::default();
        let mut state = ShowState::new();
        router.route(&mut state, "/time", &[OscArg::from(100)]);

        let action = router.route(&mut state, "/REWIND", &[OscArg::from(0)]);
        assert_eq!(action, RouterAction::TimeUpdated(Timecode::ZERO));
        assert!(state.timecode.is_zero());
    }

    #[test]
    fn test_pause_and_unknown() {
        let router = CommandRouter::default();
        let mut state = ShowState::new();

        router.route(&mut state, "/pause", &[OscArg::from("1")]);
        assert_eq!(state.transport, TransportState::Paused);

        let before = state;
        assert!(router.route(&mut state, "/foo", &[OscArg::from(1)]).is_ignored());
        assert_eq!(state, before);
    }
}
