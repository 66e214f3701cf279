//! LDAP result codes (RFC 4511 section 4.1.9 and later extensions)

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! result_codes {
    ($($variant:ident = $code:expr, $name:expr;)*) => {
        /// LDAP result code carried by every `LDAPResult`
        ///
        /// Codes this crate does not know are kept verbatim in
        /// [`ResultCode::Unknown`] so that they survive a decode/encode cycle.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum ResultCode {
            $($variant,)*
            Unknown(i32),
        }

        impl ResultCode {
            /// Get result code from its wire value
            pub fn from_i32(code: i32) -> Self {
                match code {
                    $($code => ResultCode::$variant,)*
                    other => ResultCode::Unknown(other),
                }
            }

            /// Wire value of the result code
            pub fn to_i32(self) -> i32 {
                match self {
                    $(ResultCode::$variant => $code,)*
                    ResultCode::Unknown(code) => code,
                }
            }

            /// Name used by RFC 4511 for this code
            pub fn name(self) -> &'static str {
                match self {
                    $(ResultCode::$variant => $name,)*
                    ResultCode::Unknown(_) => "unknown",
                }
            }
        }
    };
}

result_codes! {
    Success = 0, "success";
    OperationsError = 1, "operationsError";
    ProtocolError = 2, "protocolError";
    TimeLimitExceeded = 3, "timeLimitExceeded";
    SizeLimitExceeded = 4, "sizeLimitExceeded";
    CompareFalse = 5, "compareFalse";
    CompareTrue = 6, "compareTrue";
    AuthMethodNotSupported = 7, "authMethodNotSupported";
    StrongerAuthRequired = 8, "strongerAuthRequired";
    Referral = 10, "referral";
    AdminLimitExceeded = 11, "adminLimitExceeded";
    UnavailableCriticalExtension = 12, "unavailableCriticalExtension";
    ConfidentialityRequired = 13, "confidentialityRequired";
    SaslBindInProgress = 14, "saslBindInProgress";
    NoSuchAttribute = 16, "noSuchAttribute";
    UndefinedAttributeType = 17, "undefinedAttributeType";
    InappropriateMatching = 18, "inappropriateMatching";
    ConstraintViolation = 19, "constraintViolation";
    AttributeOrValueExists = 20, "attributeOrValueExists";
    InvalidAttributeSyntax = 21, "invalidAttributeSyntax";
    NoSuchObject = 32, "noSuchObject";
    AliasProblem = 33, "aliasProblem";
    InvalidDnSyntax = 34, "invalidDNSyntax";
    AliasDereferencingProblem = 36, "aliasDereferencingProblem";
    InappropriateAuthentication = 48, "inappropriateAuthentication";
    InvalidCredentials = 49, "invalidCredentials";
    InsufficientAccessRights = 50, "insufficientAccessRights";
    Busy = 51, "busy";
    Unavailable = 52, "unavailable";
    UnwillingToPerform = 53, "unwillingToPerform";
    LoopDetect = 54, "loopDetect";
    NamingViolation = 64, "namingViolation";
    ObjectClassViolation = 65, "objectClassViolation";
    NotAllowedOnNonLeaf = 66, "notAllowedOnNonLeaf";
    NotAllowedOnRdn = 67, "notAllowedOnRDN";
    EntryAlreadyExists = 68, "entryAlreadyExists";
    ObjectClassModsProhibited = 69, "objectClassModsProhibited";
    AffectsMultipleDsas = 71, "affectsMultipleDSAs";
    Other = 80, "other";
    Canceled = 118, "canceled";
    NoSuchOperation = 119, "noSuchOperation";
    TooLate = 120, "tooLate";
    CannotCancel = 121, "cannotCancel";
    AssertionFailed = 122, "assertionFailed";
    AuthorizationDenied = 123, "authorizationDenied";
    ESyncRefreshRequired = 4096, "e-syncRefreshRequired";
}

impl Default for ResultCode {
    fn default() -> Self {
        ResultCode::Success
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.to_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(ResultCode::from_i32(0), ResultCode::Success);
        assert_eq!(ResultCode::from_i32(34), ResultCode::InvalidDnSyntax);
        assert_eq!(ResultCode::InvalidAttributeSyntax.to_i32(), 21);
        assert_eq!(ResultCode::ESyncRefreshRequired.to_i32(), 4096);
    }

    #[test]
    fn test_unknown_code_is_preserved() {
        let code = ResultCode::from_i32(9999);
        assert_eq!(code, ResultCode::Unknown(9999));
        assert_eq!(code.to_i32(), 9999);
    }

    #[test]
    fn test_display() {
        assert_eq!(ResultCode::ProtocolError.to_string(), "protocolError (2)");
    }
}
