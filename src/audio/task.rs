use super::analysis::SpectralAnalyzer;
use super::types::{AnalysisConfig, AudioError, ExecutionMode, FundamentalFrequencyResult};
use std::io;
use std::thread;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// Longest wait a single poll may be configured with. The presentation
/// loop polls once per frame and must keep drawing.
pub const MAX_POLL_WAIT: Duration = Duration::from_millis(100);

/// Outcome of a readiness check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Pending,
    Ready,
}

/// One spectral analysis running off the caller's thread.
///
/// The task owns the samples it was launched with and the result until
/// [`AnalysisTask::take`] moves it out. There is no cancellation; dropping
/// an unfinished task abandons the worker.
///
/// Polling drives a private runtime with `block_on`, so the task must be
/// used from synchronous code, not from inside another tokio runtime.
pub struct AnalysisTask {
    state: TaskState,
    mode: ExecutionMode,
    poll_wait: Duration,
}

enum TaskState {
    Running(Worker),
    Finished(FundamentalFrequencyResult),
    /// The worker went away without sending a result.
    Lost,
}

struct Worker {
    runtime: Option<Runtime>,
    receiver: oneshot::Receiver<FundamentalFrequencyResult>,
}

impl Worker {
    /// Runs `job` on the blocking pool of a dedicated single-worker runtime.
    fn spawn<F>(job: F) -> io::Result<Self>
    where
        F: FnOnce() -> FundamentalFrequencyResult + Send + 'static,
    {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("spectral-analysis")
            .enable_time()
            .build()?;
        let (sender, receiver) = oneshot::channel();

        runtime.spawn_blocking(move || {
            if sender.send(job()).is_err() {
                debug!("analysis task dropped before its result arrived");
            }
        });

        Ok(Worker {
            runtime: Some(runtime),
            receiver,
        })
    }

    /// Waits up to `wait` for the result. `None` means still running.
    fn wait(
        &mut self,
        wait: Duration,
    ) -> Option<Result<FundamentalFrequencyResult, oneshot::error::RecvError>> {
        let runtime = self.runtime.as_ref()?;
        let receiver = &mut self.receiver;
        // The timer has to be created inside the runtime
        runtime
            .block_on(async move { tokio::time::timeout(wait, receiver).await })
            .ok()
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl AnalysisTask {
    /// Starts analyzing `samples` according to `config.mode`.
    ///
    /// `Inline` runs the analysis before returning, so the task is ready
    /// immediately. `Background` hands the samples to a dedicated worker.
    ///
    /// # Arguments
    /// * `samples` - Raw samples to analyze; the task takes ownership
    /// * `sample_rate` - Sample rate of `samples` in Hz
    /// * `config` - Window size, execution mode and poll wait
    ///
    /// # Returns
    /// A task to [`poll`](Self::poll) until it reports [`Readiness::Ready`]
    ///
    /// # Errors
    /// * `AudioError::InvalidParams` if `config.poll_wait` exceeds [`MAX_POLL_WAIT`]
    ///   or the window exceeds [`MAX_WINDOW_SIZE`](super::types::MAX_WINDOW_SIZE)
    /// * `AudioError::Io` if the worker runtime cannot be started
    pub fn launch(
        samples: Vec<f32>,
        sample_rate: u32,
        config: AnalysisConfig,
    ) -> Result<Self, AudioError> {
        if config.poll_wait > MAX_POLL_WAIT {
            return Err(AudioError::InvalidParams(format!(
                "poll wait of {:?} exceeds the maximum of {:?}",
                config.poll_wait, MAX_POLL_WAIT
            )));
        }
        config.checked_window_size(sample_rate)?;

        let mode = config.mode;
        let poll_wait = config.poll_wait;
        let analyzer = SpectralAnalyzer::new(config);

        let state = match mode {
            ExecutionMode::Inline => TaskState::Finished(analyzer.analyze(&samples, sample_rate)),
            ExecutionMode::Background => {
                info!(samples = samples.len(), sample_rate, "launching background analysis");
                TaskState::Running(Worker::spawn(move || {
                    analyzer.analyze(&samples, sample_rate)
                })?)
            }
        };

        Ok(AnalysisTask {
            state,
            mode,
            poll_wait,
        })
    }

    /// Where this task's analysis runs.
    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// True once the worker has gone away without a result. Such a task
    /// stays [`Readiness::Pending`] forever.
    pub fn is_lost(&self) -> bool {
        matches!(self.state, TaskState::Lost)
    }

    /// Checks for the result, waiting at most the configured poll wait.
    pub fn poll(&mut self) -> Readiness {
        self.poll_for(self.poll_wait)
    }

    /// Checks for the result without waiting.
    pub fn try_poll(&mut self) -> Readiness {
        self.poll_for(Duration::ZERO)
    }

    fn poll_for(&mut self, wait: Duration) -> Readiness {
        let received = match &mut self.state {
            TaskState::Finished(_) => return Readiness::Ready,
            TaskState::Lost => {
                // Keep the per-poll wait so frame loops do not spin
                thread::sleep(wait);
                return Readiness::Pending;
            }
            TaskState::Running(worker) => match worker.wait(wait) {
                Some(received) => received,
                None => return Readiness::Pending,
            },
        };

        match received {
            Ok(result) => {
                self.state = TaskState::Finished(result);
                Readiness::Ready
            }
            Err(_) => {
                warn!("analysis worker exited without a result");
                self.state = TaskState::Lost;
                Readiness::Pending
            }
        }
    }

    /// Moves the result out once [`poll`](Self::poll) has reported
    /// [`Readiness::Ready`]. Before that the task is handed back unchanged.
    pub fn take(self) -> Result<FundamentalFrequencyResult, AnalysisTask> {
        match self.state {
            TaskState::Finished(result) => Ok(result),
            state => Err(AnalysisTask { state, ..self }),
        }
    }
}
