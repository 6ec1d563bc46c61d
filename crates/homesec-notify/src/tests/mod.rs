//! Shared fixtures and behavioural suites for the notification crate.

pub(crate) mod support;
