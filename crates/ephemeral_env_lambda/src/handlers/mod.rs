pub mod age;
pub mod audit;
pub mod authorizer;
pub mod cleanup;
pub mod response;
pub mod sweep;

use std::any::Any;

/// Renders a caught panic payload the way `std` prints it.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
