//! Control messages for the collector service.

/// Commands that can be sent to a running collector to drive it at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCommand {
    /// Drop the published artifact and re-run the auction for every known slot.
    ClearAndRefresh,
    /// Graceful shutdown.
    Shutdown,
}
