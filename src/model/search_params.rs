//! Search parameters.

use std::fmt;

/// Ordered search parameters. Names may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    params: Vec<(String, String)>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: append a parameter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(name, value);
        self
    }

    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.push((name.into(), value.into()));
    }

    /// Parse `name=value`. A missing `=` gives an empty value.
    pub fn add_pair(&mut self, pair: &str) {
        match pair.split_once('=') {
            Some((name, value)) => self.add(name.trim(), value.trim()),
            None => self.add(pair.trim(), ""),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Form-encoded query string, without a leading `?`.
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for SearchParams {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut params = SearchParams::new();
        for (name, value) in iter {
            params.add(name, value);
        }
        params
    }
}

impl fmt::Display for SearchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_keeps_order_and_repeats() {
        let params = SearchParams::new()
            .with("name", "smith")
            .with("date", "ge2020-01-01")
            .with("date", "le2020-12-31");
        assert_eq!(params.to_query_string(), "name=smith&date=ge2020-01-01&date=le2020-12-31");
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_values_are_encoded() {
        let params: SearchParams = [("code", "http://loinc.org|1234-5")].into_iter().collect();
        assert_eq!(params.to_query_string(), "code=http%3A%2F%2Floinc.org%7C1234-5");
    }

    #[test]
    fn test_add_pair() {
        let mut params = SearchParams::new();
        params.add_pair("name=smith");
        params.add_pair("_summary");
        assert_eq!(params.iter().collect::<Vec<_>>(), vec![("name", "smith"), ("_summary", "")]);
    }
}
