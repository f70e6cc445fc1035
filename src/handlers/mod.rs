mod affirmation;
mod callback;
mod command;
mod messages;

pub use affirmation::*;
pub use callback::*;
pub use command::*;
pub use messages::*;
