use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// How long an error stays visible before the session reads as idle again.
pub const ERROR_DISPLAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Generating,
    Analyzing,
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Idle => "IDLE",
            Status::Generating => "GENERATING",
            Status::Analyzing => "ANALYZING",
            Status::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// Current activity of a session.
#[derive(Debug)]
pub struct StatusTracker {
    status: Status,
    failed_at: Option<Instant>,
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self {
            status: Status::Idle,
            failed_at: None,
        }
    }
}

impl StatusTracker {
    pub fn begin(&mut self, status: Status) {
        self.status = status;
        self.failed_at = None;
    }

    /// Ends the current activity, as `Idle` on success or `Error` on failure.
    pub fn finish<T>(&mut self, result: &anyhow::Result<T>) {
        match result {
            Ok(_) => self.begin(Status::Idle),
            Err(_) => {
                self.status = Status::Error;
                self.failed_at = Some(Instant::now());
            }
        }
    }

    /// An error reads as `Idle` once [`ERROR_DISPLAY`] has passed.
    pub fn current(&self) -> Status {
        match (self.status, self.failed_at) {
            (Status::Error, Some(at)) if at.elapsed() >= ERROR_DISPLAY => Status::Idle,
            (status, _) => status,
        }
    }
}
