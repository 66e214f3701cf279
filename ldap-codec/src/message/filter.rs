//! Search filters (RFC 4511 section 4.5.1.7)

use serde::{Deserialize, Serialize};
use std::fmt;

/// `AttributeValueAssertion`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttributeValueAssertion {
    pub attribute_desc: String,
    #[serde(with = "serde_bytes")]
    pub assertion_value: Vec<u8>,
}

impl AttributeValueAssertion {
    pub fn new(attribute_desc: impl Into<String>, assertion_value: impl Into<Vec<u8>>) -> Self {
        Self {
            attribute_desc: attribute_desc.into(),
            assertion_value: assertion_value.into(),
        }
    }
}

/// `SubstringFilter`
///
/// At least one of `initial`, `any` and `final_` is present.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubstringFilter {
    pub attribute_type: String,
    #[serde(with = "serde_bytes")]
    pub initial: Option<Vec<u8>>,
    pub any: Vec<Vec<u8>>,
    #[serde(with = "serde_bytes")]
    pub final_: Option<Vec<u8>>,
}

/// `MatchingRuleAssertion` of an extensible match
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatchingRuleAssertion {
    pub matching_rule: Option<String>,
    pub attribute_type: Option<String>,
    #[serde(with = "serde_bytes")]
    pub match_value: Vec<u8>,
    pub dn_attributes: bool,
}

/// Search filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Filter {
    /// An empty `and` is the absolute true filter (RFC 4526)
    And(Vec<Filter>),
    /// An empty `or` is the absolute false filter (RFC 4526)
    Or(Vec<Filter>),
    Not(Box<Filter>),
    EqualityMatch(AttributeValueAssertion),
    Substrings(SubstringFilter),
    GreaterOrEqual(AttributeValueAssertion),
    LessOrEqual(AttributeValueAssertion),
    Present(String),
    ApproxMatch(AttributeValueAssertion),
    ExtensibleMatch(MatchingRuleAssertion),
}

impl Default for Filter {
    /// `(objectClass=*)`
    fn default() -> Self {
        Filter::Present("objectClass".to_string())
    }
}

impl Filter {
    /// Nesting depth: 1 for an item, plus one per enclosing and/or/not
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut pending = vec![(self, 1usize)];
        while let Some((filter, depth)) = pending.pop() {
            max = max.max(depth);
            match filter {
                Filter::And(children) | Filter::Or(children) => {
                    pending.extend(children.iter().map(|child| (child, depth + 1)));
                }
                Filter::Not(child) => pending.push((child.as_ref(), depth + 1)),
                _ => {}
            }
        }
        max
    }
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &[u8]) -> fmt::Result {
    for &byte in value {
        match byte {
            b'*' | b'(' | b')' | b'\\' | 0 => write!(f, "\\{:02x}", byte)?,
            0x20..=0x7E => write!(f, "{}", byte as char)?,
            _ => write!(f, "\\{:02x}", byte)?,
        }
    }
    Ok(())
}

/// RFC 4515 string representation
impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::And(children) | Filter::Or(children) => {
                let op = if matches!(self, Filter::And(_)) { '&' } else { '|' };
                write!(f, "({}", op)?;
                for child in children {
                    write!(f, "{}", child)?;
                }
                write!(f, ")")
            }
            Filter::Not(child) => write!(f, "(!{})", child),
            Filter::EqualityMatch(ava) => {
                write!(f, "({}=", ava.attribute_desc)?;
                write_value(f, &ava.assertion_value)?;
                write!(f, ")")
            }
            Filter::GreaterOrEqual(ava) => {
                write!(f, "({}>=", ava.attribute_desc)?;
                write_value(f, &ava.assertion_value)?;
                write!(f, ")")
            }
            Filter::LessOrEqual(ava) => {
                write!(f, "({}<=", ava.attribute_desc)?;
                write_value(f, &ava.assertion_value)?;
                write!(f, ")")
            }
            Filter::ApproxMatch(ava) => {
                write!(f, "({}~=", ava.attribute_desc)?;
                write_value(f, &ava.assertion_value)?;
                write!(f, ")")
            }
            Filter::Present(attribute) => write!(f, "({}=*)", attribute),
            Filter::Substrings(substrings) => {
                write!(f, "({}=", substrings.attribute_type)?;
                if let Some(initial) = &substrings.initial {
                    write_value(f, initial)?;
                }
                write!(f, "*")?;
                for any in &substrings.any {
                    write_value(f, any)?;
                    write!(f, "*")?;
                }
                if let Some(final_) = &substrings.final_ {
                    write_value(f, final_)?;
                }
                write!(f, ")")
            }
            Filter::ExtensibleMatch(mra) => {
                write!(f, "(")?;
                if let Some(attribute) = &mra.attribute_type {
                    write!(f, "{}", attribute)?;
                }
                if mra.dn_attributes {
                    write!(f, ":dn")?;
                }
                if let Some(rule) = &mra.matching_rule {
                    write!(f, ":{}", rule)?;
                }
                write!(f, ":=")?;
                write_value(f, &mra.match_value)?;
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let filter = Filter::And(vec![
            Filter::EqualityMatch(AttributeValueAssertion::new("cn", "a*b")),
            Filter::Not(Box::new(Filter::Present("mail".to_string()))),
            Filter::Substrings(SubstringFilter {
                attribute_type: "sn".to_string(),
                initial: Some(b"sm".to_vec()),
                any: vec![b"i".to_vec()],
                final_: Some(b"th".to_vec()),
            }),
        ]);
        assert_eq!(filter.to_string(), "(&(cn=a\\2ab)(!(mail=*))(sn=sm*i*th))");
    }

    #[test]
    fn test_display_extensible() {
        let filter = Filter::ExtensibleMatch(MatchingRuleAssertion {
            matching_rule: Some("2.5.13.2".to_string()),
            attribute_type: Some("cn".to_string()),
            match_value: b"Fred".to_vec(),
            dn_attributes: true,
        });
        assert_eq!(filter.to_string(), "(cn:dn:2.5.13.2:=Fred)");
    }

    #[test]
    fn test_depth() {
        assert_eq!(Filter::default().depth(), 1);
        let filter = Filter::Or(vec![
            Filter::default(),
            Filter::Not(Box::new(Filter::And(vec![]))),
        ]);
        assert_eq!(filter.depth(), 3);
    }
}
