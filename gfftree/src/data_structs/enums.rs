use std::fmt::Display;
use std::str::FromStr;

use serde::{
    Deserialize,
    Serialize,
};

use crate::error::FeatureTreeError;

/// Strand of a feature, as written in the seventh GFF3 column.
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord, Default)]
pub enum Strand {
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `.`, the feature is not stranded.
    #[default]
    NotStranded,
    /// `?`, stranded but the strand is unknown.
    Unknown,
}

impl FromStr for Strand {
    type Err = FeatureTreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Plus),
            "-" => Ok(Strand::Minus),
            "." => Ok(Strand::NotStranded),
            "?" => Ok(Strand::Unknown),
            other => {
                Err(FeatureTreeError::invalid(format!(
                    "'{other}' is not a strand, expected one of + - . ?"
                )))
            },
        }
    }
}

impl From<Strand> for char {
    fn from(value: Strand) -> Self {
        match value {
            Strand::Plus => '+',
            Strand::Minus => '-',
            Strand::NotStranded => '.',
            Strand::Unknown => '?',
        }
    }
}

impl From<Strand> for Option<bool> {
    fn from(value: Strand) -> Option<bool> {
        match value {
            Strand::Plus => Some(true),
            Strand::Minus => Some(false),
            Strand::NotStranded | Strand::Unknown => None,
        }
    }
}

impl Display for Strand {
    #[cfg_attr(coverage_nightly, coverage(off))]
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}

impl Serialize for Strand {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer, {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Strand {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>, {
        let s = String::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Reading frame of a coding range, eighth GFF3 column.
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord, Default)]
pub enum Phase {
    Zero,
    One,
    Two,
    /// `.`
    #[default]
    Unspecified,
}

impl Phase {
    pub fn is_specified(&self) -> bool {
        !matches!(self, Phase::Unspecified)
    }
}

impl FromStr for Phase {
    type Err = FeatureTreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" => Ok(Phase::Zero),
            "1" => Ok(Phase::One),
            "2" => Ok(Phase::Two),
            "." => Ok(Phase::Unspecified),
            other => {
                Err(FeatureTreeError::invalid(format!(
                    "'{other}' is not a phase, expected one of 0 1 2 ."
                )))
            },
        }
    }
}

impl From<Phase> for Option<u8> {
    fn from(value: Phase) -> Self {
        match value {
            Phase::Zero => Some(0),
            Phase::One => Some(1),
            Phase::Two => Some(2),
            Phase::Unspecified => None,
        }
    }
}

impl Display for Phase {
    #[cfg_attr(coverage_nightly, coverage(off))]
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match Option::<u8>::from(*self) {
            Some(value) => write!(f, "{value}"),
            None => write!(f, "."),
        }
    }
}

impl Serialize for Phase {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer, {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Phase {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>, {
        let s = String::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::data_structs::typedef::Span;

    #[rstest]
    #[case::plus("+", Strand::Plus)]
    #[case::minus("-", Strand::Minus)]
    #[case::unstranded(".", Strand::NotStranded)]
    #[case::unknown("?", Strand::Unknown)]
    fn strand_column(
        #[case] text: &str,
        #[case] strand: Strand,
    ) -> anyhow::Result<()> {
        assert_eq!(Strand::from_str(text)?, strand);
        assert_eq!(strand.to_string(), text);
        assert_eq!(serde_json::to_string(&strand)?, format!("\"{text}\""));
        Ok(())
    }

    #[rstest]
    #[case::zero("0", Phase::Zero)]
    #[case::one("1", Phase::One)]
    #[case::two("2", Phase::Two)]
    #[case::unspecified(".", Phase::Unspecified)]
    fn phase_column(
        #[case] text: &str,
        #[case] phase: Phase,
    ) -> anyhow::Result<()> {
        assert_eq!(Phase::from_str(text)?, phase);
        assert_eq!(phase.to_string(), text);
        let parsed: Phase = serde_json::from_str(&format!("\"{text}\""))?;
        assert_eq!(parsed, phase);
        Ok(())
    }

    #[test]
    fn rejects_unknown_symbols() {
        assert!(Strand::from_str("*").is_err());
        assert!(Phase::from_str("3").is_err());
        assert!(serde_json::from_str::<Phase>("\"x\"").is_err());
    }

    #[test]
    fn span_serializes_as_object() -> anyhow::Result<()> {
        let span = Span::new(10, 20);
        assert_eq!(serde_json::to_string(&span)?, r#"{"start":10,"end":20}"#);
        assert_eq!(span.length(), 11);
        assert_eq!(Span::new(5, 4).length(), 0);
        Ok(())
    }
}
