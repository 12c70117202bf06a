pub mod popup_service;
pub mod signals;

pub use popup_service::{PopupService, ServiceHandle};
pub use signals::{SignalHandler, SignalType};
