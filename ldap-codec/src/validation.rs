//! Syntax checks applied by the grammar actions
//!
//! Only the string syntax is checked here: a DN accepted by
//! [`is_valid_dn`] may still name nothing, an attribute description may
//! still be unknown to the schema.

use once_cell::sync::Lazy;
use regex::Regex;

const NUMERIC_OID: &str = r"(?:0|[1-9][0-9]*)(?:\.(?:0|[1-9][0-9]*))+";
const DESCR: &str = r"[A-Za-z][A-Za-z0-9-]*";

// RFC 4514 attribute value: hex string or characters with the special ones
// escaped.
const DN_VALUE: &str =
    r##"(?:#(?:[0-9A-Fa-f]{2})+|(?:[^,+"\\<>;]|\\[0-9A-Fa-f]{2}|\\[ "#+,;<=>\\])*)"##;

static OID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^{}$", NUMERIC_OID)).unwrap());

static ATTRIBUTE_DESCRIPTION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        "^(?:{}|{})(?:;[A-Za-z0-9-]+)*$",
        DESCR, NUMERIC_OID
    ))
    .unwrap()
});

static RDN_PATTERN: Lazy<String> = Lazy::new(|| {
    let attribute_type = format!(r"(?:{}|[0-9]+(?:\.[0-9]+)*)", DESCR);
    let ava = format!(r"\s*{}\s*=\s*{}", attribute_type, DN_VALUE);
    format!(r"{ava}(?:\+{ava})*", ava = ava)
});

static DN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        "^(?:{rdn}(?:[,;]{rdn})*)?$",
        rdn = RDN_PATTERN.as_str()
    ))
    .unwrap()
});

static RDN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^{}$", RDN_PATTERN.as_str())).unwrap());

/// Whether `oid` is a numeric OID (`LDAPOID`)
pub fn is_valid_oid(oid: &str) -> bool {
    OID_REGEX.is_match(oid)
}

/// Whether `description` is an attribute description: a descriptor or a
/// numeric OID followed by options
pub fn is_valid_attribute_description(description: &str) -> bool {
    ATTRIBUTE_DESCRIPTION_REGEX.is_match(description)
}

/// Whether `dn` is a syntactically valid distinguished name; the empty DN is
pub fn is_valid_dn(dn: &str) -> bool {
    DN_REGEX.is_match(dn)
}

/// Whether `rdn` is a single, non empty relative distinguished name
pub fn is_valid_rdn(rdn: &str) -> bool {
    RDN_REGEX.is_match(rdn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oid() {
        assert!(is_valid_oid("1.2.840.113556.1.4.319"));
        assert!(is_valid_oid("2.16.840.1.113730.3.4.2"));
        assert!(!is_valid_oid("1"));
        assert!(!is_valid_oid("1..2"));
        assert!(!is_valid_oid("1.02"));
        assert!(!is_valid_oid("cn"));
        assert!(!is_valid_oid(""));
    }

    #[test]
    fn test_attribute_description() {
        assert!(is_valid_attribute_description("cn"));
        assert!(is_valid_attribute_description("userCertificate;binary"));
        assert!(is_valid_attribute_description("2.5.4.3"));
        assert!(is_valid_attribute_description("cn;lang-en;x-foo"));
        assert!(!is_valid_attribute_description("1cn"));
        assert!(!is_valid_attribute_description("cn;"));
        assert!(!is_valid_attribute_description("c n"));
        assert!(!is_valid_attribute_description(""));
    }

    #[test]
    fn test_dn() {
        assert!(is_valid_dn(""));
        assert!(is_valid_dn("cn=test,dc=example,dc=com"));
        assert!(is_valid_dn("cn=John Doe+uid=jdoe, ou=People, dc=example, dc=com"));
        assert!(is_valid_dn(r"cn=Smith\, John,dc=example,dc=com"));
        assert!(is_valid_dn("2.5.4.3=#04024869"));
        assert!(!is_valid_dn("cn"));
        assert!(!is_valid_dn("cn=a,"));
        assert!(!is_valid_dn("=a"));
        assert!(!is_valid_dn("cn=a<b"));
    }

    #[test]
    fn test_rdn() {
        assert!(is_valid_rdn("cn=new"));
        assert!(is_valid_rdn("cn=a+sn=b"));
        assert!(!is_valid_rdn(""));
        assert!(!is_valid_rdn("cn=a,dc=b"));
    }
}
