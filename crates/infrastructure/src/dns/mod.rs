pub mod forwarding;
pub mod nameserver_query;
pub mod transport;

pub use nameserver_query::UdpNameserverQuery;
