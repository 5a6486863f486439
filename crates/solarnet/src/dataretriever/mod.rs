//! # Data Retriever
//!
//! Locates data files from "simple" web sources, HTTP or FTP servers whose
//! file names follow a date pattern.
//!
//! [`Fido`] is the unified entry point. It holds a [`ConditionalDispatch`]
//! table with one guarded entry per registered [`GenericClient`], guarded by
//! that client's [`GenericClient::can_handle_query`]. A search compiles the
//! query with the data walker (one block per OR branch) and dispatches each
//! block; the first client that claims it resolves its URLs.
//!
//! ```ignore
//! let query = DataQuery::from(DataAttr::time(TimeRange::parse("2012-01-01", "2012-01-02")?))
//!     .and(DataAttr::instrument("eve").into())?;
//! for block in &Fido::new()?.search(&query)? {
//!     println!("{} {}", block.client, block.url);
//! }
//! ```

mod client;
pub mod sources;

pub use client::{GenericClient, QueryResponse, QueryResponseBlock};

use crate::attr::Params;
use crate::dispatch::{ArgType, Args, Condition, ConditionalDispatch, Handler, Kind, Signature, Value};
use crate::error::Result;
use crate::vso::{self, DataQuery};
use std::collections::BTreeMap;
use std::sync::Arc;

type Search = Result<Vec<QueryResponseBlock>>;

#[derive(Clone)]
pub struct Fido {
    registry: ConditionalDispatch<Search>,
    clients: Vec<Arc<GenericClient>>,
}

impl Fido {
    /// A factory with every built-in client registered.
    pub fn new() -> Result<Self> {
        let mut fido = Self::empty();
        for client in sources::all() {
            fido.register(client)?;
        }
        Ok(fido)
    }

    /// A factory with no clients.
    pub fn empty() -> Self {
        Self {
            registry: ConditionalDispatch::new(),
            clients: Vec::new(),
        }
    }

    pub fn register(&mut self, client: GenericClient) -> Result<()> {
        let client = Arc::new(client);
        let signature = Signature::new().param("query");

        let guard = client.clone();
        let condition = Condition::new(signature.clone(), move |bound| {
            bound
                .get("query")
                .map(|q| guard.can_handle_query(&to_params(q)))
                .unwrap_or(false)
        });

        let worker = client.clone();
        let handler = Handler::new(client.name(), signature, move |bound| {
            let params = bound.get("query").map(to_params).unwrap_or_default();
            worker.search(&params)
        });

        self.registry
            .when(condition)
            .types(vec![ArgType::Is(Kind::Map)])
            .then(handler)?;
        self.clients.push(client);
        Ok(())
    }

    pub fn clients(&self) -> impl Iterator<Item = &GenericClient> {
        self.clients.iter().map(|c| c.as_ref())
    }

    /// Resolve every block of `query` to downloadable files.
    pub fn search(&self, query: &DataQuery) -> Result<QueryResponse> {
        let blocks = vso::walker().create(query, &mut ())?;
        tracing::debug!(blocks = blocks.len(), "compiled data query");

        let mut response = QueryResponse::default();
        for block in blocks {
            let args = Args::new().arg(to_value(&block));
            response.extend(self.registry.invoke(&args)??);
        }
        Ok(response)
    }
}

fn to_value(params: &Params) -> Value {
    Value::Map(
        params
            .iter()
            .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
            .collect::<BTreeMap<_, _>>(),
    )
}

fn to_params(value: &Value) -> Params {
    value
        .as_map()
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolarnetError;
    use crate::time::TimeRange;
    use crate::vso::DataAttr;

    fn day(instrument: &str) -> DataQuery {
        DataQuery::from(DataAttr::time(
            TimeRange::parse("2012-01-01", "2012-01-01 23:00").unwrap(),
        ))
        .and(DataAttr::instrument(instrument).into())
        .unwrap()
    }

    #[test]
    fn routes_to_matching_client() {
        let response = Fido::new().unwrap().search(&day("EVE")).unwrap();
        assert_eq!(response.len(), 1);
        let block = response.iter().next().unwrap();
        assert_eq!(block.client, "EVE");
        assert!(block.url.ends_with("20120101_EVE_L0CS_DIODES_1m.txt"));
    }

    #[test]
    fn rhessi_observing_summaries_are_listed() {
        let fido = Fido::new().unwrap();
        let rhessi = fido.clients().find(|c| c.name() == "RHESSI").unwrap();
        assert_eq!(rhessi.instruments(), &["rhessi".to_string()]);
        assert!(rhessi.template().contains("hsi_obssumm_%Y%m%d"));

        let response = fido.search(&day("rhessi")).unwrap();
        assert_eq!(
            response.urls(),
            vec!["https://hesperia.gsfc.nasa.gov/hessidata/metadata/catalog/hsi_obssumm_20120101_v01.fits"]
        );
    }

    #[test]
    fn aliases_reach_the_same_client() {
        let response = Fido::new().unwrap().search(&day("goes")).unwrap();
        assert_eq!(response.urls(), vec!["https://umbra.nascom.nasa.gov/goes/fits/2012/go15120101.fits"]);
    }

    #[test]
    fn or_blocks_are_dispatched_separately() {
        let time = DataQuery::from(DataAttr::time(
            TimeRange::parse("2012-01-01", "2012-01-01").unwrap(),
        ));
        let either = DataQuery::from(DataAttr::instrument("lyra")) | DataAttr::instrument("norh").into();
        let response = Fido::new().unwrap().search(&time.and(either).unwrap()).unwrap();
        let clients: Vec<&str> = response.iter().map(|b| b.client.as_str()).collect();
        assert_eq!(clients, vec!["LYRA", "NoRH"]);
    }

    #[test]
    fn unclaimed_block_is_a_dispatch_miss() {
        let err = Fido::new().unwrap().search(&day("aia")).unwrap_err();
        assert!(matches!(err, SolarnetError::NoMatchingCondition));
    }

    #[test]
    fn empty_factory_has_no_clients() {
        let fido = Fido::empty();
        assert_eq!(fido.clients().count(), 0);
        assert!(fido.search(&day("eve")).unwrap_err().is_dispatch_miss());
    }

    #[test]
    fn custom_client_can_be_registered() {
        let mut fido = Fido::empty();
        fido.register(GenericClient::new("Mine", "mine", "http://x.test/%Y%m%d"))
            .unwrap();
        let response = fido.search(&day("mine")).unwrap();
        assert_eq!(response.urls(), vec!["http://x.test/20120101"]);
        assert_eq!(Fido::new().unwrap().clients().count(), 8);
    }
}
