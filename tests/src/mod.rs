#[cfg(test)]
pub mod http_surface_tests;
#[cfg(test)]
pub mod rpc_failover_tests;
#[cfg(test)]
pub mod utils;
