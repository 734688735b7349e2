use super::node::TraceNode;

/// Zone names of the visited levels, root first. Joining them for display is
/// up to the caller.
pub fn build_chain(trace: &[TraceNode]) -> Vec<String> {
    trace.iter().map(|node| node.zone.clone()).collect()
}
