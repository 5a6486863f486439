//! URL-template clients.
//!
//! A [`GenericClient`] serves files whose URLs follow a date pattern. The
//! template is rendered once per day of the query range: `{level}` and
//! `{satellite}` are substituted first, then strftime directives (`%Y`, `%m`,
//! `%d`, `%y`, ...). Days that render to the same URL (monthly or static
//! files) produce one block.

use crate::attr::Params;
use crate::error::{Result, SolarnetError};
use crate::hek::unique;
use crate::time::{parse_time, TimeRange};
use crate::vso::keys;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq)]
pub struct GenericClient {
    name: String,
    instruments: Vec<String>,
    template: String,
    default_level: Option<String>,
    default_satellite: Option<u32>,
}

impl GenericClient {
    pub fn new(
        name: impl Into<String>,
        instrument: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            instruments: vec![instrument.into().to_lowercase()],
            template: template.into(),
            default_level: None,
            default_satellite: None,
        }
    }

    /// Another instrument name this client answers to.
    pub fn alias(mut self, instrument: impl Into<String>) -> Self {
        self.instruments.push(instrument.into().to_lowercase());
        self
    }

    pub fn default_level(mut self, level: impl Into<String>) -> Self {
        self.default_level = Some(level.into());
        self
    }

    pub fn default_satellite(mut self, number: u32) -> Self {
        self.default_satellite = Some(number);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instruments(&self) -> &[String] {
        &self.instruments
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    fn accepts_key(&self, key: &str) -> bool {
        match key {
            keys::START | keys::END | keys::INSTRUMENT => true,
            keys::LEVEL => self.template.contains("{level}"),
            keys::SATELLITE => self.template.contains("{satellite}"),
            _ => false,
        }
    }

    /// Whether a compiled query block is fully served by this client: it
    /// names one of our instruments, has a time range and uses no other keys
    /// than the ones the template understands.
    pub fn can_handle_query(&self, params: &Params) -> bool {
        let Some(instrument) = params.get(keys::INSTRUMENT) else {
            return false;
        };
        self.instruments.iter().any(|i| i == instrument)
            && params.contains_key(keys::START)
            && params.contains_key(keys::END)
            && params.keys().all(|k| self.accepts_key(k))
    }

    /// One block per distinct URL in the query's time range.
    pub fn search(&self, params: &Params) -> Result<Vec<QueryResponseBlock>> {
        let range = block_range(params)?;
        let template = self.substitute(params)?;
        let items: Vec<Item<'_>> = StrftimeItems::new(&template).collect();
        if items.iter().any(|item| matches!(item, Item::Error)) {
            return Err(SolarnetError::Transport(format!(
                "invalid URL template '{}'",
                self.template
            )));
        }

        let blocks = range
            .days()
            .into_iter()
            .map(|day| self.block_for(day, &range, &items))
            .collect::<Result<Vec<_>>>()?;
        let blocks = unique(blocks, |block| block.url.clone());
        tracing::debug!(client = %self.name, blocks = blocks.len(), "resolved URLs");
        Ok(blocks)
    }

    fn substitute(&self, params: &Params) -> Result<String> {
        let mut template = self.template.clone();
        if template.contains("{level}") {
            let level = params
                .get(keys::LEVEL)
                .cloned()
                .or_else(|| self.default_level.clone())
                .ok_or_else(|| missing(&self.name, "level"))?;
            template = template.replace("{level}", &escape(&level));
        }
        if template.contains("{satellite}") {
            let satellite = params
                .get(keys::SATELLITE)
                .cloned()
                .or_else(|| self.default_satellite.map(|n| n.to_string()))
                .ok_or_else(|| missing(&self.name, "satellite number"))?;
            template = template.replace("{satellite}", &escape(&satellite));
        }
        Ok(template)
    }

    fn block_for(
        &self,
        day: NaiveDate,
        range: &TimeRange,
        items: &[Item<'_>],
    ) -> Result<QueryResponseBlock> {
        let midnight = day.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
        let mut url = String::new();
        write!(url, "{}", midnight.format_with_items(items.iter())).map_err(|_| {
            SolarnetError::Transport(format!("cannot render '{}' for {}", self.template, day))
        })?;

        let day_end = midnight + Duration::days(1) - Duration::seconds(1);
        Ok(QueryResponseBlock {
            client: self.name.clone(),
            url,
            start: midnight.max(range.start),
            end: day_end.min(range.end),
        })
    }
}

fn missing(client: &str, what: &str) -> SolarnetError {
    SolarnetError::Transport(format!("{} needs a {}", client, what))
}

/// Keep substituted values from being read as strftime directives.
fn escape(value: &str) -> String {
    value.replace('%', "%%")
}

fn block_range(params: &Params) -> Result<TimeRange> {
    let start = params
        .get(keys::START)
        .ok_or_else(|| SolarnetError::Time("query has no start time".into()))?;
    let end = params
        .get(keys::END)
        .ok_or_else(|| SolarnetError::Time("query has no end time".into()))?;
    TimeRange::new(parse_time(start)?, parse_time(end)?)
}

/// One downloadable file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponseBlock {
    pub client: String,
    pub url: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Everything a search resolved to, in block order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct QueryResponse {
    blocks: Vec<QueryResponseBlock>,
}

impl QueryResponse {
    pub fn new(blocks: Vec<QueryResponseBlock>) -> Self {
        Self { blocks }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QueryResponseBlock> {
        self.blocks.iter()
    }

    pub fn urls(&self) -> Vec<&str> {
        self.blocks.iter().map(|b| b.url.as_str()).collect()
    }

    pub fn extend(&mut self, blocks: impl IntoIterator<Item = QueryResponseBlock>) {
        self.blocks.extend(blocks);
    }
}

impl<'a> IntoIterator for &'a QueryResponse {
    type Item = &'a QueryResponseBlock;
    type IntoIter = std::slice::Iter<'a, QueryResponseBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn daily() -> GenericClient {
        GenericClient::new("Daily", "inst", "http://x.test/%Y/%Y%m%d_lev{level}.txt").default_level("1")
    }

    #[test]
    fn renders_one_url_per_day() {
        let q = params(&[
            ("instrument", "inst"),
            ("start", "2012-01-01T12:00:00"),
            ("end", "2012-01-03T06:00:00"),
        ]);
        let blocks = daily().search(&q).unwrap();
        let urls: Vec<&str> = blocks.iter().map(|b| b.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "http://x.test/2012/20120101_lev1.txt",
                "http://x.test/2012/20120102_lev1.txt",
                "http://x.test/2012/20120103_lev1.txt",
            ]
        );
        assert_eq!(blocks[0].start, parse_time("2012-01-01T12:00:00").unwrap());
        assert_eq!(blocks[2].end, parse_time("2012-01-03T06:00:00").unwrap());
    }

    #[test]
    fn explicit_level_wins_and_is_escaped() {
        let q = params(&[
            ("instrument", "inst"),
            ("start", "2012-01-01"),
            ("end", "2012-01-01"),
            ("level", "2%"),
        ]);
        let blocks = daily().search(&q).unwrap();
        assert_eq!(blocks[0].url, "http://x.test/2012/20120101_lev2%.txt");
    }

    #[test]
    fn static_urls_collapse() {
        let client = GenericClient::new("Static", "idx", "ftp://x.test/RecentIndices.txt");
        let q = params(&[("instrument", "idx"), ("start", "2012-01-01"), ("end", "2012-01-09")]);
        assert_eq!(client.search(&q).unwrap().len(), 1);
    }

    #[test]
    fn can_handle_checks_instrument_and_keys() {
        let client = daily().alias("other");
        let base = [("start", "2012-01-01"), ("end", "2012-01-02")];

        let mut q = params(&base);
        assert!(!client.can_handle_query(&q));
        q.insert("instrument".into(), "other".into());
        assert!(client.can_handle_query(&q));
        q.insert("level".into(), "2".into());
        assert!(client.can_handle_query(&q));
        q.insert("satellitenumber".into(), "15".into());
        assert!(!client.can_handle_query(&q));
    }

    #[test]
    fn missing_placeholder_value_fails() {
        let client = GenericClient::new("Goes", "xrs", "http://x.test/go{satellite}%y%m%d.fits");
        let q = params(&[("instrument", "xrs"), ("start", "2012-01-01"), ("end", "2012-01-01")]);
        assert!(client.search(&q).is_err());

        let ok = client.default_satellite(15).search(&q).unwrap();
        assert_eq!(ok[0].url, "http://x.test/go15120101.fits");
    }

    #[test]
    fn bad_template_is_reported() {
        let client = GenericClient::new("Bad", "bad", "http://x.test/%Q");
        let q = params(&[("instrument", "bad"), ("start", "2012-01-01"), ("end", "2012-01-01")]);
        assert!(client.search(&q).is_err());
    }
}
