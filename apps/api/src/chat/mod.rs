// Chat sidebar backend: session registry plus a thin proxy to the agent service.
// The agent does all the content work; this layer only routes turns to threads.

pub mod handlers;
pub mod proxy;
pub mod sessions;

pub use sessions::SessionRegistry;
