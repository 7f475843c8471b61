// Messaging module - lock-free hand-off from the control surface to the
// audio thread

pub mod channels;
pub mod command;

pub use channels::{CommandConsumer, CommandProducer, create_command_channel};
pub use command::{Command, ConfigChange};
