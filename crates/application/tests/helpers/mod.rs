#![allow(dead_code)]

mod mock_nameservers;
mod world;

pub use mock_nameservers::{Behavior, MockNameservers, RecordedQuery};
pub use world::{
    address, authoritative_ns, no_cut, referral, referral_without_glue, tracer_config, World,
    GLUE_RESOLVER, ROOT_ADDR,
};
