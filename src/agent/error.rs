//! The error taxonomy the core threads through every fallible call, per lagopus's
//! `lagopus_result_t` kinds plus the wire-level `ofp_error_t` (type, code, offending bytes).

use std::fmt;

/// Maximum number of octets of the offending request a `OFPT_ERROR` may echo back.
pub const MAX_OFFENDING_LEN: usize = 64;

/// `ofp_error_type` / `ofp_error_code` pairs this core is able to raise. Only the codes actually
/// reachable from the handlers in this crate are named; everything else flows through as a
/// generic `(type, code)` pair via `OfpErrorDetail::new`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfpErrorKind {
    HelloIncompatible,
    BadRequestBadVersion,
    BadRequestBadLen,
    BadRequestBadType,
    BadRequestIsSlave,
    BadRequestBadExperimenter,
    BadRequestBufferUnknown,
    BadRequestBadPort,
    BadActionBadType,
    BadActionBadLen,
    BadInstructionUnknownInst,
    BadInstructionUnsupInst,
    BadInstructionBadLen,
    BadMatchBadType,
    BadMatchBadLen,
    FlowModFailedBadCommand,
    FlowModFailedBadFlags,
    GroupModFailedBadCommand,
    GroupModFailedBadType,
    GroupModFailedLoop,
    MeterModFailedBadFlags,
    MeterModFailedInvalidMeter,
    MeterModFailedBadBand,
    TableModFailedBadConfig,
    QueueOpFailedBadPort,
    SwitchConfigFailedBadFlags,
    RoleRequestFailedStale,
}

impl OfpErrorKind {
    /// `(ofp_error_type, ofp_error_code)` as they appear on the wire. Mirrors the
    /// `Kind`/`*Code` pairing in `packets::error` exactly; kept as plain numbers here so the
    /// wire encoder in `agent::dispatch` doesn't need a `packets::error` round trip to build an
    /// `OFPT_ERROR` body.
    pub fn type_code(&self) -> (u16, u16) {
        use self::OfpErrorKind::*;
        match *self {
            HelloIncompatible => (0, 0),
            BadRequestBadVersion => (1, 0),
            BadRequestBadLen => (1, 6),
            BadRequestBadType => (1, 1),
            BadRequestBadExperimenter => (1, 3),
            BadRequestBufferUnknown => (1, 8),
            BadRequestBadPort => (1, 11),
            BadRequestIsSlave => (1, 10),
            BadActionBadType => (2, 0),
            BadActionBadLen => (2, 1),
            BadInstructionUnknownInst => (3, 0),
            BadInstructionUnsupInst => (3, 1),
            BadInstructionBadLen => (3, 7),
            BadMatchBadType => (4, 0),
            BadMatchBadLen => (4, 1),
            FlowModFailedBadCommand => (5, 6),
            FlowModFailedBadFlags => (5, 7),
            GroupModFailedBadCommand => (6, 11),
            GroupModFailedBadType => (6, 10),
            GroupModFailedLoop => (6, 7),
            MeterModFailedInvalidMeter => (12, 2),
            MeterModFailedBadBand => (12, 8),
            MeterModFailedBadFlags => (12, 5),
            TableModFailedBadConfig => (8, 1),
            QueueOpFailedBadPort => (9, 0),
            SwitchConfigFailedBadFlags => (10, 0),
            RoleRequestFailedStale => (11, 0),
        }
    }
}

/// A wire-ready `(type, code, offending request)` triple, ready to be folded into an
/// `OFPT_ERROR` body by a handler's caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfpErrorDetail {
    pub error_type: u16,
    pub code: u16,
    pub offending: Vec<u8>,
}

impl OfpErrorDetail {
    pub fn new(kind: OfpErrorKind, offending_request: &[u8]) -> Self {
        let (error_type, code) = kind.type_code();
        let len = offending_request.len().min(MAX_OFFENDING_LEN);
        OfpErrorDetail {
            error_type,
            code,
            offending: offending_request[..len].to_vec(),
        }
    }
}

/// The full error taxonomy threaded through the agent core.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("invalid arguments")]
    InvalidArgs,
    #[error("resource exhausted")]
    NoMemory,
    #[error("value out of range")]
    OutOfRange,
    #[error("already exists")]
    AlreadyExists,
    #[error("not found")]
    NotFound,
    #[error("not defined")]
    NotDefined,
    #[error("busy")]
    Busy,
    #[error("invalid object")]
    InvalidObject,
    #[error("not operational")]
    NotOperational,
    #[error("timed out")]
    TimedOut,
    #[error("OFPT_ERROR type={} code={}", .0.error_type, .0.code)]
    Ofp(OfpErrorDetail),
    #[error("{0}")]
    AnyFailure(String),
}

impl AgentError {
    pub fn ofp(kind: OfpErrorKind, offending_request: &[u8]) -> Self {
        AgentError::Ofp(OfpErrorDetail::new(kind, offending_request))
    }

    /// Translate a codec-level decode failure into the `OFPT_ERROR` it must surface as,
    /// echoing the bytes that failed to parse.
    pub fn from_codec(err: ::Error, offending_request: &[u8]) -> Self {
        use self::OfpErrorKind::*;
        let kind = match err {
            ::Error::Exhausted | ::Error::Truncated => BadRequestBadLen,
            ::Error::Unrecognized | ::Error::Malformed => BadRequestBadLen,
            ::Error::BadOxmClass
            | ::Error::UnsupportedOxmClass
            | ::Error::BadOxmField
            | ::Error::BadMatchType => BadMatchBadType,
            ::Error::BadActionType => BadActionBadType,
            ::Error::BadActionLen => BadActionBadLen,
            ::Error::BadExperimenterAction => BadRequestBadExperimenter,
            ::Error::BadInstructionType => BadInstructionUnknownInst,
            ::Error::BadInstructionLen => BadInstructionBadLen,
            ::Error::UnsupportedInstruction => BadInstructionUnsupInst,
            ::Error::__Nonexhaustive => BadRequestBadLen,
        };
        AgentError::ofp(kind, offending_request)
    }
}

pub type Result<T> = ::std::result::Result<T, AgentError>;

impl fmt::Display for OfpErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
