use std::fmt;

/// Machine-readable error codes surfaced by the CLI and JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    MarketParseError,
    ConfigParseError,
    InvalidRate,
    InvalidLength,
    InvalidRoot,
    GraphDisconnected,
    DimensionMismatch,
    RouteBroken,
    InternalInconsistency,
}

impl ErrorCode {
    /// Every code, in table order.
    pub const ALL: [Self; 9] = [
        Self::MarketParseError,
        Self::ConfigParseError,
        Self::InvalidRate,
        Self::InvalidLength,
        Self::InvalidRoot,
        Self::GraphDisconnected,
        Self::DimensionMismatch,
        Self::RouteBroken,
        Self::InternalInconsistency,
    ];

    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::MarketParseError => "E1001",
            Self::ConfigParseError => "E1002",
            Self::InvalidRate => "E1003",
            Self::InvalidLength => "E1004",
            Self::InvalidRoot => "E2001",
            Self::GraphDisconnected => "E2002",
            Self::DimensionMismatch => "E2003",
            Self::RouteBroken => "E2004",
            Self::InternalInconsistency => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::MarketParseError => "Market file parse error",
            Self::ConfigParseError => "Config file parse error",
            Self::InvalidRate => "Exchange rate must be positive and finite",
            Self::InvalidLength => "Pool length must be non-negative and finite",
            Self::InvalidRoot => "Root asset is not part of the market",
            Self::GraphDisconnected => "Market graph is not connected",
            Self::DimensionMismatch => "Per-edge vector has the wrong length",
            Self::RouteBroken => "Cycle cannot be arranged into a closed route",
            Self::InternalInconsistency => "Internal inconsistency during decomposition",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::MarketParseError => {
                Some("Check the market file is valid TOML or JSON with a `pools` list.")
            }
            Self::ConfigParseError => Some("Fix syntax in the engine config file and retry."),
            Self::InvalidRate => Some("Remove pools with zero, negative, or missing rates."),
            Self::InvalidLength => {
                Some("Use a non-negative `length` or omit it (defaults to 1.0).")
            }
            Self::InvalidRoot => Some("Pass `--root` with an asset that appears in some pool."),
            Self::GraphDisconnected => {
                Some("Add pools linking every asset group, or split the market.")
            }
            Self::DimensionMismatch => Some("Provide exactly one weight and one length per edge."),
            Self::RouteBroken => None,
            Self::InternalInconsistency => Some("Report a bug with the market file attached."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors an error type can map onto a stable [`ErrorCode`].
pub trait Coded {
    fn error_code(&self) -> ErrorCode;
}
