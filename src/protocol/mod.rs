//! Cross-environment message protocol.
//!
//! The background environment owns a [`Coordinator`] answering three message
//! types. Page adapters and the popup talk to it through a [`ProtocolClient`],
//! which times out, retries once and finally reads the store directly when
//! the background is gone.
//!
//! ## Handler convention
//!
//! Handler modules export a `MESSAGE` constant, a `guard` function and an
//! async `handle` function, and are registered with [`register_handlers!`]:
//!
//! ```ignore
//! let coordinator = register_handlers!(
//!     Coordinator::new(adapter),
//!     handlers::request_contexts,
//!     handlers::touch_context,
//! );
//! ```

mod client;
mod context;
mod coordinator;
mod error;
pub mod handlers;
pub mod message;
mod transport;

pub use client::{Listing, ProtocolClient, Source};
pub use context::HandlerContext;
pub use coordinator::{Coordinator, InstallReason, SAMPLE_BODY, SAMPLE_TITLE};
pub use error::{ChannelError, ClientError, HandlerError};
pub use message::{Ack, ErrorPayload, Request};
pub use transport::{spawn_background, BackgroundHandle, Channel, RuntimeChannel, TransportStats};

/// Register handler modules that follow the `MESSAGE` / `guard` / `handle`
/// convention on a coordinator.
#[macro_export]
macro_rules! register_handlers {
    ($coordinator:expr, $( $($seg:ident)::+ ),+ $(,)?) => {
        $coordinator
        $(
            .handler_guarded(
                $($seg)::+::MESSAGE,
                $($seg)::+::guard,
                $($seg)::+::handle,
            )
        )+
    };
}
