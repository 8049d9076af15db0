//! Router module - token parsing, view descriptors and the navigation
//! state machine that ties the catalog and user state together.

pub mod navigation;
pub mod token;
pub mod view;

pub use navigation::NavigationRouter;
pub use token::{ListSource, Token};
pub use view::{Notice, ReminderLine, Transition, ViewDescriptor};
