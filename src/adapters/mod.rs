//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the notification domain to external systems:
//! - `realtime` - Transports, the realtime client and connection sharing
//! - `navigation` - Route-based `Navigator` for the chat view

pub mod navigation;
pub mod realtime;

pub use navigation::ChatRouteNavigator;
pub use realtime::{
    ClientOptions, ConnectionManager, ConnectionState, HttpTransportConfig, HttpTransportFactory,
    InMemoryTransport, InMemoryTransportFactory, RealtimeClient, Subscription,
};
