use url::form_urlencoded;

/// Query parameters of a request.
///
/// Values are optional: an item whose value is `None` is dropped before the
/// query string is built, so endpoint wrappers can pass their optional
/// parameters straight through. Present values are rendered with their
/// `ToString` form, which is lossless for the strings and integers used by
/// the Web API. Insertion order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryItems {
    items: Vec<(String, Option<String>)>,
}

impl QueryItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<K, V>(mut self, key: K, value: Option<V>) -> Self
    where
        K: Into<String>,
        V: ToString,
    {
        self.push(key, value);
        self
    }

    pub fn push<K, V>(&mut self, key: K, value: Option<V>)
    where
        K: Into<String>,
        V: ToString,
    {
        self.items
            .push((key.into(), value.map(|value| value.to_string())));
    }

    /// The items that survive `None` removal.
    pub fn present(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items
            .iter()
            .filter_map(|(key, value)| value.as_deref().map(|value| (key.as_str(), value)))
    }

    pub fn is_empty(&self) -> bool {
        self.present().next().is_none()
    }

    /// `application/x-www-form-urlencoded` serialization of the present items.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.present())
            .finish()
    }
}

impl<K, V> FromIterator<(K, Option<V>)> for QueryItems
where
    K: Into<String>,
    V: ToString,
{
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        let mut items = QueryItems::new();
        for (key, value) in iter {
            items.push(key, value);
        }
        items
    }
}
