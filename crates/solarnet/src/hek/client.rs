use super::attrs::{self, HekQuery, HekState, SpatialRegion};
use super::table::{HekRow, HekTable};
use super::transport::{HttpTransport, Transport};
use crate::attr::{Attr, Params};
use crate::config::SolarnetConfig;
use crate::error::{Result, SolarnetError};
use serde_json::Value;

/// Searches the Heliophysics Event Knowledgebase.
pub struct HekClient<T = HttpTransport> {
    url: String,
    transport: T,
    defaults: Params,
}

impl HekClient<HttpTransport> {
    /// An HTTP client for the configured endpoint.
    pub fn from_config(config: &SolarnetConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout())?;
        let mut client = HekClient::new(config.hek_url.clone(), transport)?;
        if let Some(limit) = config.result_limit {
            client = client.with_result_limit(limit);
        }
        Ok(client)
    }
}

impl<T: Transport> HekClient<T> {
    /// Every request starts from `cmd=search`, `type=column`, `cosec=2`,
    /// `event_type=**` and the full-disk region.
    pub fn new(url: impl Into<String>, transport: T) -> Result<Self> {
        let mut defaults = Params::from([
            ("cosec".to_string(), "2".to_string()),
            ("cmd".to_string(), "search".to_string()),
            ("type".to_string(), "column".to_string()),
            ("event_type".to_string(), "**".to_string()),
        ]);
        attrs::walker().apply(
            &SpatialRegion::default().into(),
            &mut HekState::default(),
            &mut defaults,
        )?;
        Ok(Self {
            url: url.into(),
            transport,
            defaults,
        })
    }

    /// Ask for at most `limit` rows per page.
    pub fn with_result_limit(mut self, limit: u32) -> Self {
        self.defaults
            .insert("result_limit".to_string(), limit.to_string());
        self
    }

    /// Only return the given columns.
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = columns
            .into_iter()
            .map(|c| c.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        if !joined.is_empty() {
            self.defaults.insert("return".to_string(), joined);
        }
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn defaults(&self) -> &Params {
        &self.defaults
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// AND the attributes together and compile them into request mappings,
    /// each merged over the client defaults.
    pub fn compile<I>(&self, query: I) -> Result<Vec<Params>>
    where
        I: IntoIterator<Item = HekQuery>,
    {
        let query = Attr::and_all(query)?;
        let blocks = attrs::walker().create(&query, &mut HekState::default())?;
        tracing::debug!(mappings = blocks.len(), "compiled HEK query");
        Ok(blocks
            .into_iter()
            .map(|block| {
                let mut merged = self.defaults.clone();
                merged.extend(block);
                merged
            })
            .collect())
    }

    /// Run a search. Several attributes are joined with AND; OR branches are
    /// fetched one after another and their rows deduplicated.
    pub fn search<I>(&self, query: I) -> Result<HekTable>
    where
        I: IntoIterator<Item = HekQuery>,
    {
        let mut mappings = self.compile(query)?;
        if mappings.len() == 1 {
            return self.download(mappings.remove(0));
        }
        let tables = mappings
            .into_iter()
            .map(|params| self.download(params))
            .collect::<Result<Vec<_>>>()?;
        Ok(HekTable::merge(tables))
    }

    /// Fetch every page for one mapping.
    pub fn download(&self, mut params: Params) -> Result<HekTable> {
        let mut rows = Vec::new();
        let mut page = 1u32;
        loop {
            params.insert("page".to_string(), page.to_string());
            let payload = self.transport.fetch(&self.url, &params)?;
            let batch = page_rows(&payload)?;
            tracing::debug!(page, rows = batch.len(), "fetched HEK page");
            rows.extend(batch);

            if !payload.get("overmax").and_then(Value::as_bool).unwrap_or(false) {
                return Ok(HekTable::new(rows));
            }
            page += 1;
        }
    }

    /// The VOEvent XML document for `row`.
    pub fn voevent(&self, row: &HekRow) -> Result<String> {
        self.transport.fetch_raw(&self.url, &row.voevent_params()?)
    }
}

fn page_rows(payload: &Value) -> Result<Vec<HekRow>> {
    let Some(result) = payload.get("result").and_then(Value::as_array) else {
        return Err(SolarnetError::Transport(
            "response has no 'result' list".to_string(),
        ));
    };
    result
        .iter()
        .map(|row| match row {
            Value::Object(map) => Ok(HekRow::new(map.clone())),
            other => Err(SolarnetError::Row(format!("expected object, got {}", other))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hek::attrs::{fields, FL};
    use crate::hek::transport::MemoryTransport;
    use crate::time::TimeRange;
    use serde_json::json;

    fn client() -> HekClient<MemoryTransport> {
        HekClient::new("http://hek.test/her", MemoryTransport::new()).unwrap()
    }

    #[test]
    fn defaults_include_full_disk() {
        let c = client();
        let d = c.defaults();
        assert_eq!(d["cmd"], "search");
        assert_eq!(d["cosec"], "2");
        assert_eq!(d["type"], "column");
        assert_eq!(d["event_type"], "**");
        assert_eq!(d["x1"], "-1200");
        assert_eq!(d["event_coordsys"], "helioprojective");
    }

    #[test]
    fn compile_merges_over_defaults() {
        let c = client().with_result_limit(10).with_columns(["fl_goescls", "frm_name"]);
        let range = TimeRange::parse("2011-08-09", "2011-08-10").unwrap();
        let blocks = c.compile([HekQuery::from(FL), range.into()]).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0]["event_type"], "fl");
        assert_eq!(blocks[0]["cmd"], "search");
        assert_eq!(blocks[0]["result_limit"], "10");
        assert_eq!(blocks[0]["return"], "fl_goescls,frm_name");
    }

    #[test]
    fn download_walks_pages() {
        let c = client();
        c.transport()
            .push_page(vec![json!({"id": 1}), json!({"id": 2})], true)
            .push_page(vec![json!({"id": 3})], false);

        let table = c.download(Params::new()).unwrap();
        assert_eq!(table.len(), 3);
        let pages: Vec<String> = c
            .transport()
            .requests()
            .into_iter()
            .map(|r| r.params["page"].clone())
            .collect();
        assert_eq!(pages, vec!["1", "2"]);
    }

    #[test]
    fn missing_result_aborts() {
        let c = client();
        c.transport().push_raw("{\"overmax\": false}");
        assert!(matches!(
            c.search([HekQuery::from(FL)]).unwrap_err(),
            SolarnetError::Transport(_)
        ));
    }

    #[test]
    fn compile_errors_happen_before_network() {
        let c = client();
        let err = c.search([!HekQuery::from(FL)]).unwrap_err();
        assert!(matches!(err, SolarnetError::UnsupportedNegation(_)));
        assert!(c.transport().requests().is_empty());
    }

    #[test]
    fn voevent_uses_archive_id() {
        let c = client();
        c.transport().push_raw("<voe:VOEvent/>");
        let row: HekRow = serde_json::from_value(json!({"kb_archivid": "ivo://x"})).unwrap();
        assert_eq!(c.voevent(&row).unwrap(), "<voe:VOEvent/>");
        let sent = &c.transport().requests()[0];
        assert_eq!(sent.params["cmd"], "export-voevent");
        assert_eq!(sent.params["ivorn"], "ivo://x");
    }

    #[test]
    fn negated_filter_reaches_the_wire() {
        let c = client();
        c.transport().push_page(vec![], false);
        c.search([HekQuery::from(FL), !HekQuery::from(fields::goes_class().eq("C1"))])
            .unwrap();
        let sent = &c.transport().requests()[0];
        assert_eq!(sent.params["op0"], "!=");
    }
}
