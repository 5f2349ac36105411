//! Running the lint server.

#[cfg(not(unix))] use std::future::pending;
use std::sync::Arc;
use log::{debug, error};
#[cfg(unix)] use tokio::signal::unix::{Signal, SignalKind, signal};
use crate::error::{ExitError, Failed};
use crate::http::{LintService, http_listener};
use crate::lint::Analyzer;
use crate::process::Process;


//------------ Server --------------------------------------------------------

/// The lint server.
pub struct Server;

impl Server {
    /// Runs the server with the given analysis engine.
    ///
    /// Switches logging to the configured target, binds the listening
    /// socket and then serves requests until the process is terminated
    /// or the HTTP server fails.
    pub fn run(
        process: Process, analyzer: impl Analyzer
    ) -> Result<(), ExitError> {
        process.switch_logging()?;
        debug!("Effective configuration:\n{}", process.config());

        let service = Arc::new(
            LintService::from_config(analyzer, process.config())
        );
        let http = http_listener(service, process.config())?;
        let runtime = process.runtime()?;

        let res: Result<(), Failed> = runtime.block_on(async move {
            let mut http = tokio::spawn(http);
            let mut signal = SignalListener::new()?;
            loop {
                tokio::select! {
                    sig = signal.next() => match sig {
                        UserSignal::RotateLog => process.rotate_log()?,
                    },
                    _ = &mut http => {
                        error!("HTTP server stopped. Exiting.");
                        return Err(Failed)
                    }
                }
            }
        });
        res.map_err(Into::into)
    }
}


//------------ SignalListener ------------------------------------------------

/// Something the user asked us to do.
enum UserSignal {
    /// Re-open the log file.
    RotateLog,
}

/// Waits for signals from the user.
#[cfg(unix)]
struct SignalListener {
    usr2: Signal,
}

#[cfg(unix)]
impl SignalListener {
    pub fn new() -> Result<Self, Failed> {
        Ok(SignalListener {
            usr2: match signal(SignalKind::user_defined2()) {
                Ok(usr2) => usr2,
                Err(err) => {
                    error!("Attaching to signal USR2 failed: {err}");
                    return Err(Failed)
                }
            },
        })
    }

    /// Waits for the next thing to do.
    pub async fn next(&mut self) -> UserSignal {
        self.usr2.recv().await;
        UserSignal::RotateLog
    }
}

#[cfg(not(unix))]
struct SignalListener;

#[cfg(not(unix))]
impl SignalListener {
    pub fn new() -> Result<Self, Failed> {
        Ok(SignalListener)
    }

    /// Waits for the next thing to do.
    pub async fn next(&mut self) -> UserSignal {
        pending().await
    }
}
