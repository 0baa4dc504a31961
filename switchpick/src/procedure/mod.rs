//! Procedure library.
//!
//! Each procedure is one operator-facing operation composed from
//! navigation, command steps and verification. Procedures borrow the
//! session; they never hold state of their own, so an interrupted
//! procedure leaves a session that is still usable after
//! [`Session::reset`].

mod configure;
mod logs;
mod power;
mod wipe;

pub use configure::load_config;
pub use logs::collect_logs;
pub use power::{power_off, reboot};
pub use wipe::{WipeEntry, WipeFollowUp, wipe};

use std::future::Future;

use log::{error, warn};

use crate::driver::Session;
use crate::error::{DriverError, Result};
use crate::transport::Transport;

/// Run `procedure` until it finishes or `interrupt` fires.
///
/// On interrupt the procedure future is dropped at its current await
/// point. Whatever the device was doing keeps going; the caller should
/// [`reset`](Session::reset) the session before reusing it.
///
/// # Example
///
/// ```rust,no_run
/// use switchpick::driver::SessionBuilder;
/// use switchpick::procedure::{interrupt_on, interruptible, power_off};
///
/// # async fn example() -> Result<(), switchpick::Error> {
/// let mut session = SessionBuilder::new().connect().await?;
/// let interrupt = interrupt_on(tokio::signal::ctrl_c());
/// if interruptible(power_off(&mut session), interrupt).await.is_err() {
///     session.reset();
/// }
/// # Ok(())
/// # }
/// ```
pub async fn interruptible<R>(
    procedure: impl Future<Output = Result<R>>,
    interrupt: impl Future<Output = ()>,
) -> Result<R> {
    tokio::select! {
        result = procedure => result,
        _ = interrupt => {
            warn!("Process interrupted, returning to caller");
            Err(DriverError::Interrupted.into())
        }
    }
}

/// Resolve when `signal` fires.
///
/// A signal that fails to install never fires; the error is logged and
/// the procedure runs uninterruptible.
pub async fn interrupt_on(signal: impl Future<Output = std::io::Result<()>>) {
    if let Err(e) = signal.await {
        error!("Cannot listen for interrupts: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Fresh login, ending at the operational CLI.
///
/// A silent line fails fast with `NoResponse` before any navigation.
async fn login_to_cli<T: Transport>(session: &mut Session<T>) -> Result<()> {
    session.check_liveness().await?;
    session.reach_login().await?;
    session.authenticate().await?;
    session.enter_cli().await
}
