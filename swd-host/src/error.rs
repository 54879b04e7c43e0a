use core::fmt;

/// Host-side error taxonomy (§4.G — errors are surfaced verbatim, never
/// silently retried).
#[derive(Debug)]
pub enum HostError {
    /// No adaptor matching the expected VID/PID/identity strings was
    /// found.
    DeviceNotFound,
    /// The underlying USB transport reported an error.
    Usb(rusb::Error),
    /// A control transfer returned fewer or more bytes than the wire
    /// layout requires.
    Protocol(&'static str),
    /// The adaptor STALLed a control transfer (queue full, slot busy, or
    /// malformed request).
    Stall,
    /// A `wait_for_result` deadline elapsed before the slot completed.
    Timeout,
    /// No free result slot was available in this session's pool.
    SlotsExhausted,
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::DeviceNotFound => write!(f, "no SWD adaptor found"),
            HostError::Usb(e) => write!(f, "USB error: {e}"),
            HostError::Protocol(msg) => write!(f, "protocol error: {msg}"),
            HostError::Stall => write!(f, "adaptor rejected the request (STALL)"),
            HostError::Timeout => write!(f, "timed out waiting for result"),
            HostError::SlotsExhausted => write!(f, "no free result slot available"),
        }
    }
}

impl std::error::Error for HostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HostError::Usb(e) => Some(e),
            _ => None,
        }
    }
}

impl From<rusb::Error> for HostError {
    fn from(e: rusb::Error) -> Self {
        match e {
            rusb::Error::Pipe => HostError::Stall,
            rusb::Error::Timeout => HostError::Timeout,
            other => HostError::Usb(other),
        }
    }
}
