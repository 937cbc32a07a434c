
use crate::evdev::InputEvent;
use super::Result;

/// Identifies what an event is about: its category and the code within it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EventTarget {
    type_: u32,
    code: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Event {
    target: EventTarget,
    value: i32,
}

impl EventTarget {
    pub fn new(type_: u32, code: u32) -> Self {
        Self { type_, code }
    }

    pub fn type_(&self) -> u32 {
        self.type_
    }

    pub fn code(&self) -> u32 {
        self.code
    }
}

impl Event {
    pub fn new(type_: u32, code: u32, value: i32) -> Self {
        Self {
            target: EventTarget::new(type_, code),
            value,
        }
    }

    pub fn target(&self) -> EventTarget {
        self.target
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn with_code(self, code: u32) -> Self {
        Self::new(self.target.type_, code, self.value)
    }
}

impl From<&InputEvent> for Event {
    fn from(ev: &InputEvent) -> Self {
        Event::new(ev.type_(), ev.code(), ev.value())
    }
}

/// Something events can be pulled from without blocking.
pub trait EventSource {
    /// `Ok(None)` means nothing is available right now.
    fn read_event(&mut self) -> Result<Option<Event>>;
}

pub trait EventSink {
    fn write_event(&mut self, event: &Event) -> Result<()>;
}
