//! Tag presence tracking
//!
//! ID-x readers keep re-sending the identifier of a tag for as long as it stays
//! on the antenna, and say nothing when it leaves. With a reset line the reader
//! is reset after every read: if the tag is still there it gets read again shortly
//! after the reset, if the reader stays silent for `removal_wait` the tag is gone.
//!
//! Only the last identifier is remembered. When a tag is swapped for another one
//! inside the removal window, the remove event carries the identifier of the
//! second tag.

use std::time::Duration;

use log::{debug, info};

use crate::dispatch::EventDispatcher;
use crate::transport::ResetPin;
use crate::types::{PresenceState, TagEvent, TagId};

enum Strategy<P> {
    /// No reset line: every frame is a read, removals are never seen
    Passive,
    /// Reset the reader after each read and time the silence that follows
    ResetAssisted { pin: P, deadline_ms: u64 },
}

pub struct Presence<P> {
    strategy: Strategy<P>,
    state: PresenceState,
    last_tag: Option<TagId>,
    removal_wait: Duration,
}

impl<P: ResetPin> Presence<P> {
    pub fn passive(removal_wait: Duration) -> Self {
        Self::with_strategy(Strategy::Passive, removal_wait)
    }

    pub fn reset_assisted(pin: P, removal_wait: Duration) -> Self {
        Self::with_strategy(Strategy::ResetAssisted { pin, deadline_ms: 0 }, removal_wait)
    }

    fn with_strategy(strategy: Strategy<P>, removal_wait: Duration) -> Self {
        Self {
            strategy,
            state: PresenceState::Idle,
            last_tag: None,
            removal_wait,
        }
    }

    pub fn state(&self) -> PresenceState {
        self.state
    }

    pub fn last_tag(&self) -> Option<TagId> {
        self.last_tag
    }

    pub fn removal_wait(&self) -> Duration {
        self.removal_wait
    }

    /// Takes effect from the next reset pulse on
    pub fn set_removal_wait(&mut self, removal_wait: Duration) {
        self.removal_wait = removal_wait;
    }

    pub fn is_reset_capable(&self) -> bool {
        matches!(self.strategy, Strategy::ResetAssisted { .. })
    }

    /// Pulse the reset line without touching the presence state
    pub fn pulse(&mut self) -> Option<Result<(), P::Error>> {
        match &mut self.strategy {
            Strategy::Passive => None,
            Strategy::ResetAssisted { pin, .. } => Some(pin.pulse()),
        }
    }

    /// A frame with a valid checksum was decoded during this poll cycle.
    ///
    /// Returns the event that was dispatched, if any. With a reset line, repeated
    /// reads of the same tag only re-arm the removal timer.
    pub fn on_tag_decoded(
        &mut self,
        tag: TagId,
        now_ms: u64,
        dispatcher: &mut EventDispatcher,
    ) -> Result<Option<TagEvent>, P::Error> {
        match self.last_tag {
            Some(previous) if previous != tag && self.state != PresenceState::Idle => {
                debug!("Tag changed from {} to {} without removal", previous, tag);
            }
            _ => {}
        }
        self.last_tag = Some(tag);

        match &mut self.strategy {
            Strategy::Passive => {
                self.state = PresenceState::TagSettled;
                info!("Tag read: {}", tag);
                dispatcher.dispatch(TagEvent::Read, &tag);
                Ok(Some(TagEvent::Read))
            }
            Strategy::ResetAssisted { pin, deadline_ms } => {
                let event = if self.state == PresenceState::AwaitingRemovalConfirmation {
                    None
                } else {
                    info!("Tag read: {}", tag);
                    dispatcher.dispatch(TagEvent::Read, &tag);
                    Some(TagEvent::Read)
                };

                self.state = PresenceState::AwaitingRemovalConfirmation;
                let wait_ms = u64::try_from(self.removal_wait.as_millis()).unwrap_or(u64::MAX);
                *deadline_ms = now_ms.saturating_add(wait_ms);
                debug!("Resetting reader, removal deadline at {} ms", deadline_ms);
                pin.pulse()?;

                Ok(event)
            }
        }
    }

    /// No valid frame was decoded during this poll cycle.
    ///
    /// Reports the last tag as removed once the reader stayed silent past the deadline.
    pub fn on_no_tag(&mut self, now_ms: u64, dispatcher: &mut EventDispatcher) -> Option<TagEvent> {
        let Strategy::ResetAssisted { deadline_ms, .. } = &self.strategy else {
            return None;
        };

        if self.state != PresenceState::AwaitingRemovalConfirmation || now_ms < *deadline_ms {
            return None;
        }

        self.state = PresenceState::Idle;
        let tag = self.last_tag?;
        info!("Tag removed: {}", tag);
        dispatcher.dispatch(TagEvent::Remove, &tag);
        Some(TagEvent::Remove)
    }
}
