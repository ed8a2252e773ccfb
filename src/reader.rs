use log::{debug, error};
use std::time::Duration;

use crate::decoder::FrameDecoder;
use crate::dispatch::{EventDispatcher, TagHandler};
use crate::presence::Presence;
use crate::transport::{Clock, NoResetPin, ResetPin, RfidTransport, SystemClock};
use crate::types::{DecoderStats, IdxError, PresenceState, ReaderConfig, TagEvent, TagId};

/// ID-x series reader (ID-2, ID-12, ID-20, ...) connected over a serial line
pub struct IdxReader<T: RfidTransport, P: ResetPin = NoResetPin, C: Clock = SystemClock> {
    transport: T,
    decoder: FrameDecoder,
    presence: Presence<P>,
    dispatcher: EventDispatcher,
    clock: C,
    max_bytes_per_poll: usize,
}

impl<T: RfidTransport> IdxReader<T> {
    /// Create a reader without a reset line.
    ///
    /// Every frame from the reader is reported as a read and removals are never detected.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            decoder: FrameDecoder::new(),
            presence: Presence::passive(ReaderConfig::DEFAULT_REMOVAL_WAIT),
            dispatcher: EventDispatcher::new(),
            clock: SystemClock::new(),
            max_bytes_per_poll: ReaderConfig::DEFAULT_MAX_BYTES_PER_POLL,
        }
    }
}

impl<T: RfidTransport, P: ResetPin> IdxReader<T, P> {
    /// Create a reader whose reset line is wired to `reset_pin`.
    ///
    /// The reader is reset after each read to find out when the tag is taken away.
    pub fn with_reset_pin(transport: T, reset_pin: P) -> Result<Self, IdxError> {
        Self::with_config(
            transport,
            Some(reset_pin),
            SystemClock::new(),
            ReaderConfig::default(),
        )
    }
}

impl<T: RfidTransport, P: ResetPin, C: Clock> IdxReader<T, P, C> {
    /// Create a reader with an explicit clock and configuration.
    ///
    /// Passing `None` for the pin selects the mode without removal detection.
    pub fn with_config(
        transport: T,
        reset_pin: Option<P>,
        clock: C,
        config: ReaderConfig,
    ) -> Result<Self, IdxError> {
        if config.max_bytes_per_poll == 0 {
            return Err(IdxError::InvalidParameter(
                "max_bytes_per_poll must be at least 1".into(),
            ));
        }

        let presence = match reset_pin {
            Some(mut pin) => {
                pin.release()
                    .map_err(|e| IdxError::Reset(format!("{:?}", e)))?;
                Presence::reset_assisted(pin, config.removal_wait)
            }
            None => Presence::passive(config.removal_wait),
        };

        Ok(Self {
            transport,
            decoder: FrameDecoder::new(),
            presence,
            dispatcher: EventDispatcher::new(),
            clock,
            max_bytes_per_poll: config.max_bytes_per_poll,
        })
    }

    /// Process pending serial data and update tag presence.
    ///
    /// Call this frequently from the main loop. Handlers run inline, and the time
    /// between two calls adds to the delay before a removal can be noticed.
    ///
    /// # Returns
    /// The event raised during this cycle, if any
    pub fn update(&mut self) -> Result<Option<TagEvent>, IdxError> {
        let mut decoded = None;
        let drained = self.drain(&mut decoded);
        let now_ms = self.clock.now_ms();

        // A frame completed before a transport failure still counts for this cycle
        match (decoded, drained) {
            (Some(tag), drained) => {
                let event = self
                    .presence
                    .on_tag_decoded(tag, now_ms, &mut self.dispatcher)
                    .map_err(|e| {
                        error!("Reset pulse failed: {:?}", e);
                        IdxError::Reset(format!("{:?}", e))
                    })?;
                drained.map(|()| event)
            }
            (None, Err(e)) => Err(e),
            (None, Ok(())) => Ok(self.presence.on_no_tag(now_ms, &mut self.dispatcher)),
        }
    }

    /// Register a handler for an event, replacing the previous one
    pub fn attach<F>(&mut self, event: TagEvent, handler: F)
    where
        F: FnMut(&TagId) + 'static,
    {
        self.dispatcher.attach(event, handler);
    }

    /// Remove the handler for an event
    pub fn detach(&mut self, event: TagEvent) {
        self.dispatcher.detach(event);
    }

    /// Register or clear the handler for an event
    pub fn set_handler(&mut self, event: TagEvent, handler: Option<TagHandler>) {
        self.dispatcher.set_handler(event, handler);
    }

    /// Time to wait after a reset before a silent reader means the tag is gone.
    ///
    /// Increase it when the main loop takes long between two `update` calls.
    pub fn set_removal_wait(&mut self, removal_wait: Duration) {
        self.presence.set_removal_wait(removal_wait);
    }

    pub fn removal_wait(&self) -> Duration {
        self.presence.removal_wait()
    }

    /// Pulse the reset line by hand
    pub fn reset_reader(&mut self) -> Result<(), IdxError> {
        match self.presence.pulse() {
            Some(result) => {
                debug!("Manual reader reset");
                result.map_err(|e| IdxError::Reset(format!("{:?}", e)))
            }
            None => Err(IdxError::NoResetPin),
        }
    }

    /// Whether removals can be detected (a reset pin is configured)
    pub fn detects_removal(&self) -> bool {
        self.presence.is_reset_capable()
    }

    /// Identifier of the most recently decoded tag
    pub fn last_tag(&self) -> Option<TagId> {
        self.presence.last_tag()
    }

    pub fn state(&self) -> PresenceState {
        self.presence.state()
    }

    /// Frame decoding counters, including the frames dropped for bad checksums
    pub fn decoder_stats(&self) -> DecoderStats {
        self.decoder.stats()
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Give back the transport
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Feed pending bytes to the decoder, keeping the last tag decoded in `decoded`
    fn drain(&mut self, decoded: &mut Option<TagId>) -> Result<(), IdxError> {
        for _ in 0..self.max_bytes_per_poll {
            let available = self
                .transport
                .available()
                .map_err(|e| IdxError::Transport(format!("{:?}", e)))?;
            if available == 0 {
                break;
            }

            let byte = self.transport.read_byte().map_err(|e| {
                error!("Read error: {:?}", e);
                IdxError::Transport(format!("{:?}", e))
            })?;

            if let Some(tag) = self.decoder.feed(byte) {
                *decoded = Some(tag);
            }
        }

        Ok(())
    }
}
