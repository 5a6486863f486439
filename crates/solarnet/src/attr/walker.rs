//! Compiles attribute trees into request parameter mappings.
//!
//! A [`Walker`] is a per-domain registry keyed by [`Attr::kind`]. Each kind
//! has a *creator*, which turns a node into a list of mappings, and an
//! *applier*, which writes a node into an existing mapping. The boolean rules
//! are the same for every domain:
//!
//! - `and` creates one mapping by applying every child into it
//! - `or` creates each branch from a fresh copy of the state and concatenates
//!   the results, so one branch becomes one request
//! - leaves create a single mapping by applying themselves
//!
//! The walker state `S` carries whatever must thread through one mapping, such
//! as the running index for `paramN` keys. Kinds without a registered handler
//! (including `dummy`) fail with [`SolarnetError::NoCreator`] or
//! [`SolarnetError::NoApplier`].

use super::{Attr, Leaf};
use crate::error::{Result, SolarnetError};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// One set of request parameters.
pub type Params = BTreeMap<String, String>;

pub type Creator<L, S> =
    Arc<dyn Fn(&Walker<L, S>, &Attr<L>, &mut S) -> Result<Vec<Params>> + Send + Sync>;

pub type Applier<L, S> =
    Arc<dyn Fn(&Walker<L, S>, &Attr<L>, &mut S, &mut Params) -> Result<()> + Send + Sync>;

pub struct Walker<L, S> {
    creators: HashMap<&'static str, Creator<L, S>>,
    appliers: HashMap<&'static str, Applier<L, S>>,
}

impl<L: Leaf, S: Clone> Default for Walker<L, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Leaf, S: Clone> Walker<L, S> {
    /// An empty walker. Nothing, not even `and`/`or`, is registered.
    pub fn new() -> Self {
        Self {
            creators: HashMap::new(),
            appliers: HashMap::new(),
        }
    }

    /// A walker with the `and`/`or` rules already registered.
    pub fn with_boolean_rules() -> Self {
        let mut walker = Self::new();
        walker
            .add_creator(&["and"], |walker, attr, state| {
                let mut params = Params::new();
                walker.apply(attr, state, &mut params)?;
                Ok(vec![params])
            })
            .add_applier(&["and"], |walker, attr, state, params| {
                for child in attr.children() {
                    walker.apply(child, state, params)?;
                }
                Ok(())
            })
            .add_creator(&["or"], |walker, attr, state| {
                let mut blocks = Vec::new();
                for child in attr.children() {
                    let mut branch_state = state.clone();
                    blocks.extend(walker.create(child, &mut branch_state)?);
                }
                Ok(blocks)
            });
        walker
    }

    pub fn add_creator<F>(&mut self, kinds: &[&'static str], creator: F) -> &mut Self
    where
        F: Fn(&Walker<L, S>, &Attr<L>, &mut S) -> Result<Vec<Params>> + Send + Sync + 'static,
    {
        let creator: Creator<L, S> = Arc::new(creator);
        for kind in kinds {
            self.creators.insert(*kind, creator.clone());
        }
        self
    }

    pub fn add_applier<F>(&mut self, kinds: &[&'static str], applier: F) -> &mut Self
    where
        F: Fn(&Walker<L, S>, &Attr<L>, &mut S, &mut Params) -> Result<()> + Send + Sync + 'static,
    {
        let applier: Applier<L, S> = Arc::new(applier);
        for kind in kinds {
            self.appliers.insert(*kind, applier.clone());
        }
        self
    }

    /// Register leaf kinds whose creator yields exactly one mapping built by
    /// their applier.
    pub fn add_applying_creator(&mut self, kinds: &[&'static str]) -> &mut Self {
        self.add_creator(kinds, |walker, attr, state| {
            let mut params = Params::new();
            walker.apply(attr, state, &mut params)?;
            Ok(vec![params])
        })
    }

    pub fn create(&self, attr: &Attr<L>, state: &mut S) -> Result<Vec<Params>> {
        let kind = attr.kind();
        let creator = self
            .creators
            .get(kind)
            .ok_or_else(|| SolarnetError::NoCreator(kind.to_string()))?;
        let blocks = creator(self, attr, state)?;
        tracing::trace!(kind, blocks = blocks.len(), "created parameter blocks");
        Ok(blocks)
    }

    pub fn apply(&self, attr: &Attr<L>, state: &mut S, params: &mut Params) -> Result<()> {
        let kind = attr.kind();
        let applier = self
            .appliers
            .get(kind)
            .ok_or_else(|| SolarnetError::NoApplier(kind.to_string()))?;
        applier(self, attr, state, params)
    }

    pub fn handles(&self, kind: &str) -> bool {
        self.creators.contains_key(kind) && self.appliers.contains_key(kind)
    }
}
