use colored::Colorize;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::form::SelectOption;
use crate::synchronizer::{ChangeOutcome, RestoreReason, SyncEvent};

/// Verbosity levels for console output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum VerbosityLevel {
    /// Only show errors
    Quiet = 0,
    /// Normal output (default)
    #[default]
    Normal = 1,
    /// Verbose output with per-change diagnostics
    Verbose = 2,
    /// Debug output with request details
    Debug = 3,
}

impl fmt::Display for VerbosityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerbosityLevel::Quiet => write!(f, "quiet"),
            VerbosityLevel::Normal => write!(f, "normal"),
            VerbosityLevel::Verbose => write!(f, "verbose"),
            VerbosityLevel::Debug => write!(f, "debug"),
        }
    }
}

impl VerbosityLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "quiet" => Some(VerbosityLevel::Quiet),
            "normal" => Some(VerbosityLevel::Normal),
            "verbose" => Some(VerbosityLevel::Verbose),
            "debug" => Some(VerbosityLevel::Debug),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Console {
    verbosity: VerbosityLevel,
}

impl Console {
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self { verbosity }
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    fn should_show(&self, level: VerbosityLevel) -> bool {
        self.verbosity >= level
    }

    pub fn error(&self, message: &str) {
        if self.verbosity > VerbosityLevel::Quiet {
            eprintln!("❌ {}", message);
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show(VerbosityLevel::Normal) {
            println!("⚠️  {}", message);
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show(VerbosityLevel::Normal) {
            println!("ℹ️  {}", message);
        }
    }

    pub fn success(&self, message: &str) {
        if self.should_show(VerbosityLevel::Normal) {
            println!("✅ {}", message);
        }
    }

    pub fn verbose(&self, message: &str) {
        if self.should_show(VerbosityLevel::Verbose) {
            println!("{}", message);
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show(VerbosityLevel::Debug) {
            println!("🐛 DEBUG: {}", message);
        }
    }

    pub fn plain(&self, message: &str) {
        if self.should_show(VerbosityLevel::Normal) {
            println!("{}", message);
        }
    }

    pub fn newline(&self) {
        if self.should_show(VerbosityLevel::Normal) {
            println!();
        }
    }

    /// Render one synchronizer diagnostic.
    pub fn sync_event(&self, event: &SyncEvent) {
        match event {
            SyncEvent::InitFailed(error) => {
                self.error(&format!("Cascading filter not bound: {}", error));
            }
            SyncEvent::FieldsReady { attempts } => {
                self.debug(&format!("form fields ready after {} poll(s)", attempts));
            }
            SyncEvent::SnapshotsCaptured { counts } => {
                self.verbose(&format!(
                    "{} snapshots captured (attractions: {}, restaurants: {}, hotels: {})",
                    "•".dimmed(),
                    counts.attractions,
                    counts.restaurants,
                    counts.hotels
                ));
            }
            SyncEvent::ChangeStarted { sequence, scope } => {
                let scope = scope.as_deref().unwrap_or("<none>");
                self.verbose(&format!(
                    "{} scope changed to {} {}",
                    "↘".dimmed(),
                    scope.cyan(),
                    format!("(#{})", sequence).dimmed()
                ));
            }
            SyncEvent::RequestSent { sequence, url } => {
                self.debug(&format!("#{} GET {}", sequence, url));
            }
            SyncEvent::OptionsApplied { sequence, counts } => {
                self.verbose(&format!(
                    "{} #{} applied attractions: {}, restaurants: {}, hotels: {}",
                    "⎿".dimmed(),
                    sequence,
                    counts.attractions,
                    counts.restaurants,
                    counts.hotels
                ));
            }
            SyncEvent::Restored { sequence, reason } => match reason {
                RestoreReason::ScopeCleared => {
                    self.verbose(&format!(
                        "{} #{} scope cleared, original options restored",
                        "⎿".dimmed(),
                        sequence
                    ));
                }
                RestoreReason::FetchFailed(message) => {
                    self.warning(&format!(
                        "#{} request failed ({}), original options restored",
                        sequence, message
                    ));
                }
            },
            SyncEvent::Superseded { sequence, latest } => {
                self.verbose(&format!(
                    "{} #{} discarded, superseded by #{}",
                    "⎿".dimmed(),
                    sequence,
                    latest
                ));
            }
        }
    }

    pub fn change_outcome(&self, outcome: &ChangeOutcome) {
        match outcome {
            ChangeOutcome::Applied(counts) => self.success(&format!(
                "Options updated (attractions: {}, restaurants: {}, hotels: {})",
                counts.attractions, counts.restaurants, counts.hotels
            )),
            ChangeOutcome::Restored => self.info("Scope cleared, original options restored"),
            ChangeOutcome::RestoredAfterFailure => {
                self.warning("Request failed, original options restored")
            }
            ChangeOutcome::Superseded => self.info("Change superseded by a newer one"),
        }
    }

    pub fn selector(&self, name: &str, options: &[SelectOption]) {
        if !self.should_show(VerbosityLevel::Normal) {
            return;
        }
        println!("{} {}", name.green(), format!("({})", options.len()).dimmed());
        for option in options {
            if option.is_placeholder() {
                println!("  {} {}", "⎿".dimmed(), option.label.dimmed());
            } else {
                println!(
                    "  {} {} {}",
                    "⎿".dimmed(),
                    option.label,
                    format!("[{}]", option.value).dimmed()
                );
            }
        }
    }
}

static GLOBAL_CONSOLE: OnceLock<Arc<Console>> = OnceLock::new();

pub fn init_console(verbosity: VerbosityLevel) {
    let _ = GLOBAL_CONSOLE.set(Arc::new(Console::new(verbosity)));
}

/// Process-wide console. Falls back to the default level when
/// `init_console` was never called.
pub fn console() -> Arc<Console> {
    GLOBAL_CONSOLE
        .get_or_init(|| Arc::new(Console::default()))
        .clone()
}

impl Default for Console {
    fn default() -> Self {
        Self {
            verbosity: VerbosityLevel::Normal,
        }
    }
}
