// Change detection and notification fan-out

pub mod detector;
pub mod dispatcher;

pub use detector::is_novel_listing;
pub use dispatcher::AlertDispatcher;
