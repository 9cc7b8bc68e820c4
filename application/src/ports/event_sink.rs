//! Event sink port
//!
//! Output port for the turn orchestrator's progress stream. Emission is
//! synchronous and non-fallible: a consumer that has gone away must not
//! disturb the pipeline, so delivery failures are silently dropped.

use council_domain::{CouncilEvent, TurnId};
use tokio::sync::mpsc;

/// Receives the ordered event stream of a running turn
pub trait EventSink: Send + Sync {
    fn emit(&self, turn: TurnId, event: CouncilEvent);
}

/// No-op sink for non-streaming callers and tests
pub struct NoSink;

impl EventSink for NoSink {
    fn emit(&self, _turn: TurnId, _event: CouncilEvent) {}
}

/// An event tagged with the turn it belongs to
#[derive(Debug, Clone)]
pub struct TurnEnvelope {
    pub turn: TurnId,
    pub event: CouncilEvent,
}

/// Sink that forwards events over an unbounded channel
///
/// The orchestrator never blocks on the consumer; if the receiver is
/// dropped (turn abandoned), events are discarded.
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<TurnEnvelope>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TurnEnvelope>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, turn: TurnId, event: CouncilEvent) {
        let _ = self.sender.send(TurnEnvelope { turn, event });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_sink_delivers_in_order() {
        let (sink, mut rx) = ChannelSink::new();
        let turn = TurnId::next();
        sink.emit(turn, CouncilEvent::Stage3Start);
        sink.emit(turn, CouncilEvent::Complete);

        assert_eq!(rx.try_recv().unwrap().event.event_type(), "stage3_start");
        assert_eq!(rx.try_recv().unwrap().event.event_type(), "complete");
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        // Must not panic
        sink.emit(TurnId::next(), CouncilEvent::Complete);
    }
}
