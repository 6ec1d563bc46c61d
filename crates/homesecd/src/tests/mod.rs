//! Test suites for the home-security daemon.

mod dispatch_behaviour;
pub(crate) mod support;
