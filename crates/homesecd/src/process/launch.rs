//! Launch sequencing for the control plane.

use std::sync::Arc;

use tracing::info;

use homesec_config::Config;

use crate::bootstrap::{
    ConfigLoader, HttpTransportProvider, StaticConfigLoader, TransportProvider, bootstrap_with,
};
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::transport::SocketListener;

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Collaborators required to launch the daemon runtime.
pub(crate) struct LaunchPlan<L, P, S> {
    pub(crate) loader: L,
    pub(crate) reporter: Arc<dyn HealthReporter>,
    pub(crate) provider: P,
    pub(crate) shutdown: S,
}

/// Runs the daemon with `config` until a termination signal arrives.
///
/// # Errors
///
/// Returns [`LaunchError`] when bootstrap fails, the endpoint cannot be
/// bound, or signal handlers cannot be installed.
pub fn run_daemon(config: Config) -> Result<(), LaunchError> {
    run_daemon_with(LaunchPlan {
        loader: StaticConfigLoader::new(config),
        reporter: Arc::new(StructuredHealthReporter::new()),
        provider: HttpTransportProvider,
        shutdown: SystemShutdownSignal,
    })
}

/// Runs the daemon with injected collaborators.
pub(crate) fn run_daemon_with<L, P, S>(plan: LaunchPlan<L, P, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    P: TransportProvider,
    S: ShutdownSignal,
{
    let LaunchPlan {
        loader,
        reporter,
        provider,
        shutdown,
    } = plan;

    let daemon = bootstrap_with(&loader, reporter.as_ref(), &provider)?;
    let endpoint = daemon.config().listen_endpoint();
    info!(
        target: PROCESS_TARGET,
        endpoint = %endpoint,
        "starting control plane"
    );

    let listener = SocketListener::bind(&endpoint)?;
    let handle = listener.start(Arc::new(daemon.connection_handler()))?;
    reporter.listener_ready(handle.local_addr());

    let waited = shutdown.wait();
    handle.stop()?;
    reporter.listener_stopped();
    waited?;

    info!(target: PROCESS_TARGET, "shutdown sequence completed");
    Ok(())
}
