//! Inbound commands to the control service.
//!
//! These represent actions requested by the outside world (remote settings
//! link, local operator panel) that the
//! [`ControlService`](super::service::ControlService) interprets and acts
//! upon.

/// Commands that external adapters can send into the control core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Apply a named setting received over the settings link
    /// (`name:value` payload, already de-framed by the transport).
    ApplySetting {
        action: heapless::String<16>,
        value: i16,
    },

    /// Acknowledge a latched interlock fault. Succeeds only once the
    /// offending contact has closed again.
    AcknowledgeFault,

    /// Emit a telemetry snapshot immediately.
    RequestTelemetry,
}
