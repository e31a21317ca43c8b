use switchboard_core::{HandlerError, HandlerResult, Label};
use tracing::info;

use crate::router::Dispatcher;

pub fn booking_handler(request: &str) -> Result<HandlerResult, HandlerError> {
    info!(handler = "booking", "delegating to booking handler");
    Ok(format!(
        "Booking Handler processed request: '{request}'. Result: Simulated booking action."
    ))
}

pub fn info_handler(request: &str) -> Result<HandlerResult, HandlerError> {
    info!(handler = "info", "delegating to info handler");
    Ok(format!(
        "Info Handler processed request: '{request}'. Result: Simulated information retrieval."
    ))
}

pub fn unclear_handler(request: &str) -> Result<HandlerResult, HandlerError> {
    info!(handler = "unclear", "handling unclear request");
    Ok(format!(
        "Coordinator could not delegate request: '{request}'. Please clarify."
    ))
}

pub fn simulated_dispatcher() -> Dispatcher {
    Dispatcher::new(unclear_handler)
        .bind(Label::Booking, booking_handler)
        .bind(Label::Info, info_handler)
}
