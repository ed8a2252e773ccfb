use log::debug;

use crate::types::{TagEvent, TagId};

/// Callback invoked with the tag an event refers to
pub type TagHandler = Box<dyn FnMut(&TagId)>;

/// Routes read/remove events to the handlers registered by the application.
///
/// Handlers run synchronously inside `update`, so a slow handler delays the
/// next poll and with it the removal detection.
#[derive(Default)]
pub struct EventDispatcher {
    on_read: Option<TagHandler>,
    on_remove: Option<TagHandler>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (`Some`) or clear (`None`) the handler for an event, replacing any previous one
    pub fn set_handler(&mut self, event: TagEvent, handler: Option<TagHandler>) {
        *self.slot(event) = handler;
    }

    pub fn attach<F>(&mut self, event: TagEvent, handler: F)
    where
        F: FnMut(&TagId) + 'static,
    {
        self.set_handler(event, Some(Box::new(handler)));
    }

    pub fn detach(&mut self, event: TagEvent) {
        self.set_handler(event, None);
    }

    pub fn has_handler(&self, event: TagEvent) -> bool {
        match event {
            TagEvent::Read => self.on_read.is_some(),
            TagEvent::Remove => self.on_remove.is_some(),
        }
    }

    /// Call the handler registered for `event`, if any
    pub fn dispatch(&mut self, event: TagEvent, tag: &TagId) {
        match self.slot(event) {
            Some(handler) => handler(tag),
            None => debug!("No handler for {:?} of tag {}", event, tag),
        }
    }

    fn slot(&mut self, event: TagEvent) -> &mut Option<TagHandler> {
        match event {
            TagEvent::Read => &mut self.on_read,
            TagEvent::Remove => &mut self.on_remove,
        }
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("on_read", &self.on_read.is_some())
            .field("on_remove", &self.on_remove.is_some())
            .finish()
    }
}
