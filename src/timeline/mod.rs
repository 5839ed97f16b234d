mod bus;
mod events;

pub use bus::TimelineBus;
pub use events::TimelineEvent;
