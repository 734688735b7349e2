mod nameserver_query;

pub use nameserver_query::{NameserverQuery, QueryMode};
