//! Event notification
//!
//! A synchronous observer registry plus a property wrapper that announces
//! reads, writes and deletes through it:
//! - `Observable` - named, ordered handler lists with `on`/`once`/`off`/`trigger`
//! - `ObservableProperty` - emits `before_*`/`after_*` events around access

pub mod error;
pub mod handler;
pub mod observable;
pub mod property;

pub use error::{EventError, PropertyError};
pub use handler::{EventArgs, Handler, HandlerId};
pub use observable::{Observable, Registrar};
pub use property::{Locator, ObservableOwner, ObservableProperty, PropertyPreset};
