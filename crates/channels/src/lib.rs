//! Channel router and transports.
//!
//! Every connected input/output session (terminal, one HTTP request, one
//! serial link) is a channel. The router reads lines from a channel,
//! resolves them through the intent parser into the executor or the code
//! agent, and delivers exactly one result back to the issuing channel.
//! Sessions are independent tokio tasks: one channel blocking on a
//! subprocess never stalls another.

pub mod http;
pub mod router;
pub mod serial;
pub mod terminal;
pub mod traits;

pub use router::Router;
pub use terminal::TerminalChannel;
pub use traits::Channel;
