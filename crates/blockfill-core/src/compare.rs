//! Multi-criteria ordering of candidate sets.
//!
//! # Overview
//!
//! A [`ChainCompare`] is an ordered list of [`Criterion`]s. Two candidates
//! are compared criterion by criterion and the first non-equal verdict wins.
//! `Ordering::Less` means "select first".
//!
//! | Chain | Criteria |
//! |---|---|
//! | `fee-rate` | agg-fee-rate, rep-txid |
//! | `fee-rate-and-fee` | agg-fee-rate, agg-fee, rep-txid |
//! | `fee-rate-and-weight` | agg-fee-rate, agg-weight, rep-txid |
//!
//! Every named chain ends with `rep-txid`, so two candidates with distinct
//! representatives never compare equal.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::set::cmp_fee_rate;

/// The aggregate view of a candidate set that criteria look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    /// Identity of the representative transaction.
    pub rep: &'a str,
    /// Fee of the representative plus all of its ancestors.
    pub agg_fee: i64,
    /// Weight of the representative plus all of its ancestors.
    pub agg_weight: u64,
}

/// Signature of a caller-supplied criterion.
pub type CriterionFn = fn(&Candidate<'_>, &Candidate<'_>) -> Ordering;

/// One tie-breaking step of a [`ChainCompare`].
#[derive(Clone, Copy)]
pub enum Criterion {
    /// Higher aggregate fee per weight first. Compared exactly.
    AggFeeRate,
    /// Higher aggregate fee first.
    AggFee,
    /// Lower aggregate weight first.
    AggWeight,
    /// Byte-wise smaller representative identity first.
    RepTxid,
    /// Named caller-supplied criterion.
    Custom(&'static str, CriterionFn),
}

impl Criterion {
    /// Compare two candidates under this criterion alone.
    #[must_use]
    pub fn compare(&self, a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
        match self {
            Self::AggFeeRate => {
                cmp_fee_rate(a.agg_fee, a.agg_weight, b.agg_fee, b.agg_weight).reverse()
            }
            Self::AggFee => b.agg_fee.cmp(&a.agg_fee),
            Self::AggWeight => a.agg_weight.cmp(&b.agg_weight),
            Self::RepTxid => a.rep.cmp(b.rep),
            Self::Custom(_, f) => f(a, b),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AggFeeRate => "agg-fee-rate",
            Self::AggFee => "agg-fee",
            Self::AggWeight => "agg-weight",
            Self::RepTxid => "rep-txid",
            Self::Custom(name, _) => *name,
        }
    }
}

impl fmt::Debug for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an unrecognised criterion or chain name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown comparator '{0}' (expected fee-rate, fee-rate-and-fee, fee-rate-and-weight or a comma-separated list of criteria)")]
pub struct UnknownComparator(pub String);

impl FromStr for Criterion {
    type Err = UnknownComparator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "agg-fee-rate" => Ok(Self::AggFeeRate),
            "agg-fee" => Ok(Self::AggFee),
            "agg-weight" => Ok(Self::AggWeight),
            "rep-txid" => Ok(Self::RepTxid),
            other => Err(UnknownComparator(other.to_string())),
        }
    }
}

/// Ordered criteria; the first non-equal verdict decides.
#[derive(Clone)]
pub struct ChainCompare {
    name: Option<&'static str>,
    criteria: Vec<Criterion>,
}

impl ChainCompare {
    /// An unnamed chain over `criteria`.
    #[must_use]
    pub const fn new(criteria: Vec<Criterion>) -> Self {
        Self {
            name: None,
            criteria,
        }
    }

    /// Fee rate, then identity.
    #[must_use]
    pub fn fee_rate() -> Self {
        Self {
            name: Some("fee-rate"),
            criteria: vec![Criterion::AggFeeRate, Criterion::RepTxid],
        }
    }

    /// Fee rate, then absolute fee, then identity.
    #[must_use]
    pub fn fee_rate_and_fee() -> Self {
        Self {
            name: Some("fee-rate-and-fee"),
            criteria: vec![Criterion::AggFeeRate, Criterion::AggFee, Criterion::RepTxid],
        }
    }

    /// Fee rate, then the lighter set, then identity.
    #[must_use]
    pub fn fee_rate_and_weight() -> Self {
        Self {
            name: Some("fee-rate-and-weight"),
            criteria: vec![
                Criterion::AggFeeRate,
                Criterion::AggWeight,
                Criterion::RepTxid,
            ],
        }
    }

    /// Look up one of the named chains.
    #[must_use]
    pub fn named(name: &str) -> Option<Self> {
        match name {
            "fee-rate" => Some(Self::fee_rate()),
            "fee-rate-and-fee" => Some(Self::fee_rate_and_fee()),
            "fee-rate-and-weight" => Some(Self::fee_rate_and_weight()),
            _ => None,
        }
    }

    #[must_use]
    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    /// Compare `a` and `b`; `Less` means `a` is selected first.
    #[must_use]
    pub fn apply(&self, a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
        self.criteria
            .iter()
            .map(|c| c.compare(a, b))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Every criterion's individual verdict, in chain order.
    #[must_use]
    pub fn eval(&self, a: &Candidate<'_>, b: &Candidate<'_>) -> Vec<(Criterion, Ordering)> {
        self.criteria.iter().map(|c| (*c, c.compare(a, b))).collect()
    }
}

impl Default for ChainCompare {
    fn default() -> Self {
        Self::fee_rate_and_fee()
    }
}

impl fmt::Display for ChainCompare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.name {
            return f.write_str(name);
        }
        let names: Vec<&str> = self.criteria.iter().map(Criterion::name).collect();
        f.write_str(&names.join(","))
    }
}

impl fmt::Debug for ChainCompare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainCompare")
            .field("name", &self.name)
            .field("criteria", &self.criteria)
            .finish()
    }
}

/// Accepts a named chain or a comma-separated list of criteria.
impl FromStr for ChainCompare {
    type Err = UnknownComparator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(chain) = Self::named(s) {
            return Ok(chain);
        }
        if s.is_empty() {
            return Err(UnknownComparator(String::new()));
        }
        let criteria = s
            .split(',')
            .map(str::parse)
            .collect::<Result<Vec<Criterion>, _>>()?;
        Ok(Self::new(criteria))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn cand(rep: &str, agg_fee: i64, agg_weight: u64) -> Candidate<'_> {
        Candidate {
            rep,
            agg_fee,
            agg_weight,
        }
    }

    #[test]
    fn identity_breaks_full_ties() {
        // {x, y} vs {w, a}: both rate 1 and fee 2.
        let set_a = cand("x", 2, 2);
        let set_b = cand("w", 2, 2);
        let cmp = ChainCompare::fee_rate_and_fee();

        assert_eq!(cmp.apply(&set_b, &set_a), Ordering::Less);
        assert_eq!(cmp.apply(&set_a, &set_b), Ordering::Greater);

        let verdicts = cmp.eval(&set_a, &set_b);
        let orders: Vec<Ordering> = verdicts.iter().map(|(_, o)| *o).collect();
        assert_eq!(
            orders,
            [Ordering::Equal, Ordering::Equal, Ordering::Greater]
        );
    }

    #[test]
    fn higher_rate_wins_before_anything_else() {
        let dense = cand("z", 10, 2);
        let heavy = cand("a", 100, 100);
        let cmp = ChainCompare::fee_rate_and_fee();
        assert_eq!(cmp.apply(&dense, &heavy), Ordering::Less);
    }

    #[test]
    fn second_criterion_separates_equal_rates() {
        let small = cand("b", 2, 1);
        let big = cand("c", 4, 2);

        assert_eq!(ChainCompare::fee_rate_and_fee().apply(&big, &small), Ordering::Less);
        assert_eq!(ChainCompare::fee_rate_and_weight().apply(&small, &big), Ordering::Less);
        // Identity alone decides under plain fee-rate.
        assert_eq!(ChainCompare::fee_rate().apply(&small, &big), Ordering::Less);
    }

    #[test]
    fn custom_criterion_participates() {
        fn longest_id(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
            b.rep.len().cmp(&a.rep.len())
        }
        let cmp = ChainCompare::new(vec![
            Criterion::Custom("longest-id", longest_id),
            Criterion::RepTxid,
        ]);
        assert_eq!(cmp.apply(&cand("bb", 0, 1), &cand("a", 9, 1)), Ordering::Less);
        assert_eq!(cmp.to_string(), "longest-id,rep-txid");
    }

    #[test]
    fn parses_named_chains_and_lists() {
        let named: ChainCompare = "fee-rate".parse().expect("named chain");
        assert_eq!(named.to_string(), "fee-rate");
        assert_eq!(named.criteria().len(), 2);

        let listed: ChainCompare = "agg-fee, rep-txid".parse().expect("criteria list");
        assert_eq!(listed.to_string(), "agg-fee,rep-txid");

        let err = "agg-fee,bogus".parse::<ChainCompare>().expect_err("should fail");
        assert_eq!(err, UnknownComparator("bogus".to_string()));
        assert!("".parse::<ChainCompare>().is_err());
    }

    #[test]
    fn default_chain_is_fee_rate_and_fee() {
        assert_eq!(ChainCompare::default().to_string(), "fee-rate-and-fee");
    }
}
