//! Core DoIP types and constants.

/// DoIP protocol version (ISO 13400-2:2012, always 0x02).
pub const PROTOCOL_VERSION: u8 = 0x02;

/// Logical address used for functional (broadcast-style) addressing.
pub const FUNCTIONAL_TARGET_ADDRESS: u16 = 0xFFFF;

/// UDS TesterPresent service identifier.
pub const UDS_TESTER_PRESENT: u8 = 0x3E;

/// TesterPresent sub-function with the suppress-positive-response bit set.
pub const UDS_SUPPRESS_POS_RSP: u8 = 0x80;

/// DoIP payload types handled by this client.
///
/// Frames carrying any other payload type value are not rejected; they are
/// returned to the caller as opaque frames with the raw `u16` preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum PayloadType {
    /// Tester requests activation of its logical address.
    RoutingActivationRequest = 0x0005,
    /// Gateway's answer to a routing activation request.
    RoutingActivationResponse = 0x0006,
    /// Diagnostic (UDS) message, tester to ECU or ECU to tester.
    DiagnosticMessage = 0x8001,
    /// Positive acknowledgement of a diagnostic message.
    DiagnosticMessageAck = 0x8002,
    /// Negative acknowledgement of a diagnostic message.
    DiagnosticMessageNack = 0x8003,
}

impl PayloadType {
    /// Create a PayloadType from a raw wire value.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x0005 => Some(Self::RoutingActivationRequest),
            0x0006 => Some(Self::RoutingActivationResponse),
            0x8001 => Some(Self::DiagnosticMessage),
            0x8002 => Some(Self::DiagnosticMessageAck),
            0x8003 => Some(Self::DiagnosticMessageNack),
            _ => None,
        }
    }

    /// Check if this payload type expects a paired reply from the gateway.
    pub fn expects_response(&self) -> bool {
        matches!(
            self,
            Self::RoutingActivationRequest | Self::DiagnosticMessage
        )
    }
}

/// Logical address of a diagnostic tester (source) or ECU/gateway (target).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LogicalAddress(pub u16);

impl LogicalAddress {
    /// The reserved functional (broadcast) target address.
    pub const FUNCTIONAL: Self = Self(FUNCTIONAL_TARGET_ADDRESS);

    /// Check if this is the functional target address.
    pub fn is_functional(&self) -> bool {
        self.0 == FUNCTIONAL_TARGET_ADDRESS
    }
}

impl std::fmt::Display for LogicalAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

impl From<u16> for LogicalAddress {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

/// Addressing mode for TesterPresent keep-alive messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TesterPresentMode {
    /// Broadcast to all ECUs behind the gateway (target 0xFFFF,
    /// suppress-positive-response set so nothing answers).
    Functional,
    /// Unicast to one configured ECU address.
    Physical,
}

impl TesterPresentMode {
    /// The fixed 2-byte UDS body for this mode.
    pub fn uds_body(&self) -> [u8; 2] {
        match self {
            Self::Functional => [UDS_TESTER_PRESENT, UDS_SUPPRESS_POS_RSP],
            Self::Physical => [UDS_TESTER_PRESENT, 0x00],
        }
    }

    /// Resolve the wire target address for this mode.
    pub fn resolve_target(&self, physical_target: LogicalAddress) -> LogicalAddress {
        match self {
            Self::Functional => LogicalAddress::FUNCTIONAL,
            Self::Physical => physical_target,
        }
    }
}

impl std::fmt::Display for TesterPresentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Functional => write!(f, "Functional"),
            Self::Physical => write!(f, "Physical"),
        }
    }
}
