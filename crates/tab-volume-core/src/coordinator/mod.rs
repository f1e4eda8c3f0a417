#[allow(clippy::module_inception)]
mod coordinator;
mod coordinator_parts;
mod ui_request;

pub use {coordinator::Coordinator, coordinator_parts::CoordinatorParts, ui_request::UiRequest};
