//! # Attribute Algebra
//!
//! Queries are trees of attributes. Leaves carry one constraint each (an event
//! type, a time range, `fl_goescls > M1`); the combinators join them:
//!
//! | Node | Meaning |
//! |------|---------|
//! | `Dummy` | Identity element, combining with it yields the other operand |
//! | `Leaf` | A domain constraint (`L` is the domain's leaf enum) |
//! | `Not` | Negation of a single child |
//! | `And` | All children must hold |
//! | `Or` | Any child may hold |
//!
//! Trees are immutable values: [`Attr::and`] and [`Attr::or`] consume their
//! operands and return a new node.
//!
//! ## Normal form
//!
//! Combination keeps trees in disjunctive normal form. `And` flattens nested
//! `And` nodes, `Or` flattens nested `Or` nodes, and AND-ing with an `Or`
//! distributes over its branches:
//!
//! ```text
//! (a | b) & c  =>  (a & c) | (b & c)
//! ```
//!
//! So a compiled query is always an `Or` of `And`s of leaves, which is what
//! the [`walker`] needs to fan out one request per branch.
//!
//! ## Collisions
//!
//! A leaf kind can declare itself mutually exclusive with others through
//! [`Leaf::collides`]. AND-ing two colliding leaves fails immediately with
//! [`SolarnetError::IncompatibleAttrs`]; OR-ing them is always allowed.
//!
//! ```ignore
//! let q = HekQuery::from(EventType::new("FL")).and(Time::parse(t0, t1)?.into())?;
//! let either = HekQuery::from(AR) | HekQuery::from(CE); // folds to EventType("ar,ce")
//! ```

mod param;
pub mod walker;

pub use param::{NumberParam, Op, ParamAttr, StringParam};
pub use walker::{Params, Walker};

use crate::error::{Result, SolarnetError};
use std::fmt;

/// A domain's leaf constraint.
pub trait Leaf: Clone + fmt::Debug + PartialEq {
    /// Kind name used by walkers to look up creators and appliers.
    fn kind(&self) -> &'static str;

    /// Whether `self` and `other` may not appear together under AND.
    fn collides(&self, _other: &Self) -> bool {
        false
    }

    /// Merge `self | other` into a single leaf, if the kind supports it.
    fn fold_or(&self, _other: &Self) -> Option<Self> {
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Attr<L> {
    Dummy,
    Leaf(L),
    Not(Box<Attr<L>>),
    And(Vec<Attr<L>>),
    Or(Vec<Attr<L>>),
}

impl<L: Leaf> Attr<L> {
    pub fn kind(&self) -> &'static str {
        match self {
            Attr::Dummy => "dummy",
            Attr::Leaf(leaf) => leaf.kind(),
            Attr::Not(_) => "not",
            Attr::And(_) => "and",
            Attr::Or(_) => "or",
        }
    }

    pub fn is_dummy(&self) -> bool {
        matches!(self, Attr::Dummy)
    }

    /// Child nodes of `And`/`Or`; empty for everything else.
    pub fn children(&self) -> &[Attr<L>] {
        match self {
            Attr::And(children) | Attr::Or(children) => children,
            _ => &[],
        }
    }

    /// Conjunction. Fails if two colliding leaves end up in the same `And`.
    pub fn and(self, other: Attr<L>) -> Result<Attr<L>> {
        match (self, other) {
            (Attr::Dummy, other) => Ok(other),
            (this, Attr::Dummy) => Ok(this),
            (Attr::Or(branches), other) => branches
                .into_iter()
                .try_fold(Attr::Dummy, |acc, branch| {
                    Ok(acc.or(branch.and(other.clone())?))
                }),
            (this, Attr::Or(branches)) => branches
                .into_iter()
                .try_fold(Attr::Dummy, |acc, branch| {
                    Ok(acc.or(this.clone().and(branch)?))
                }),
            (Attr::And(mut left), Attr::And(right)) => {
                for attr in &right {
                    check_collision(&left, attr)?;
                }
                left.extend(right);
                Ok(Attr::And(left))
            }
            (Attr::And(mut left), other) => {
                check_collision(&left, &other)?;
                left.push(other);
                Ok(Attr::And(left))
            }
            (this, Attr::And(right)) => {
                check_collision(&right, &this)?;
                let mut children = Vec::with_capacity(right.len() + 1);
                children.push(this);
                children.extend(right);
                Ok(Attr::And(children))
            }
            (this, other) => {
                check_collision(std::slice::from_ref(&this), &other)?;
                Ok(Attr::And(vec![this, other]))
            }
        }
    }

    /// Disjunction. Never fails; colliding leaves are fine under OR.
    pub fn or(self, other: Attr<L>) -> Attr<L> {
        match (self, other) {
            (Attr::Dummy, other) => other,
            (this, Attr::Dummy) => this,
            (Attr::Leaf(a), Attr::Leaf(b)) => match a.fold_or(&b) {
                Some(folded) => Attr::Leaf(folded),
                None => Attr::Or(vec![Attr::Leaf(a), Attr::Leaf(b)]),
            },
            (Attr::Or(mut left), Attr::Or(right)) => {
                left.extend(right);
                Attr::Or(left)
            }
            (Attr::Or(mut left), other) => {
                left.push(other);
                Attr::Or(left)
            }
            (this, Attr::Or(right)) => {
                let mut children = Vec::with_capacity(right.len() + 1);
                children.push(this);
                children.extend(right);
                Attr::Or(children)
            }
            (this, other) => Attr::Or(vec![this, other]),
        }
    }

    /// Logical negation. Double negation cancels and the dummy stays neutral.
    pub fn negate(self) -> Attr<L> {
        match self {
            Attr::Dummy => Attr::Dummy,
            Attr::Not(inner) => *inner,
            other => Attr::Not(Box::new(other)),
        }
    }

    /// AND together every attribute, starting from the dummy element.
    pub fn and_all<I>(attrs: I) -> Result<Attr<L>>
    where
        I: IntoIterator<Item = Attr<L>>,
    {
        attrs
            .into_iter()
            .try_fold(Attr::Dummy, |acc, attr| acc.and(attr))
    }

    /// OR together every attribute, starting from the dummy element.
    pub fn or_all<I>(attrs: I) -> Attr<L>
    where
        I: IntoIterator<Item = Attr<L>>,
    {
        attrs.into_iter().fold(Attr::Dummy, |acc, attr| acc.or(attr))
    }
}

fn check_collision<L: Leaf>(existing: &[Attr<L>], incoming: &Attr<L>) -> Result<()> {
    let Attr::Leaf(new_leaf) = incoming else {
        return Ok(());
    };
    for attr in existing {
        if let Attr::Leaf(leaf) = attr {
            if leaf.collides(new_leaf) || new_leaf.collides(leaf) {
                return Err(SolarnetError::IncompatibleAttrs {
                    left: format!("{:?}", leaf),
                    right: format!("{:?}", new_leaf),
                });
            }
        }
    }
    Ok(())
}

impl<L> From<L> for Attr<L> {
    fn from(leaf: L) -> Self {
        Attr::Leaf(leaf)
    }
}

impl<L: Leaf> std::ops::BitOr for Attr<L> {
    type Output = Attr<L>;

    fn bitor(self, rhs: Attr<L>) -> Attr<L> {
        self.or(rhs)
    }
}

impl<L: Leaf> std::ops::Not for Attr<L> {
    type Output = Attr<L>;

    fn not(self) -> Attr<L> {
        self.negate()
    }
}
