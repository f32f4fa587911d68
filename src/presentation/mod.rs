// Presentation layer - HTTP surface for the widget
pub mod app_state;
pub mod handlers;
pub mod page;
