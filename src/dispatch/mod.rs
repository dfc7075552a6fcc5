mod dispatcher;
pub mod intent;

pub use dispatcher::Dispatcher;
pub use intent::{Intent, IntentKind};
