use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A page of results that links to the page after it.
pub trait Paginated: DeserializeOwned + Send + 'static {
    type Item: Send + 'static;

    fn items(&self) -> &[Self::Item];

    fn into_items(self) -> Vec<Self::Item>;

    /// The url of the next page, or `None` on the last page.
    fn next_href(&self) -> Option<&str>;
}

/// Offset based paging object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub href: String,
    pub items: Vec<T>,
    pub limit: u32,
    #[serde(default)]
    pub next: Option<String>,
    pub offset: u32,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub total: Option<u32>,
}

impl<T> Paginated for Page<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Item = T;

    fn items(&self) -> &[T] {
        &self.items
    }

    fn into_items(self) -> Vec<T> {
        self.items
    }

    fn next_href(&self) -> Option<&str> {
        self.next.as_deref()
    }
}

/// Cursor based paging object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPage<T> {
    pub href: String,
    pub items: Vec<T>,
    pub limit: u32,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub cursors: Option<Cursors>,
    #[serde(default)]
    pub total: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursors {
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub after: Option<String>,
}

impl<T> Paginated for CursorPage<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Item = T;

    fn items(&self) -> &[T] {
        &self.items
    }

    fn into_items(self) -> Vec<T> {
        self.items
    }

    fn next_href(&self) -> Option<&str> {
        self.next.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_page_has_no_next() {
        let page: Page<u32> = serde_json::from_str(
            r#"{"href": "https://api.spotify.com/v1/x?offset=50&limit=50", "items": [1, 2],
                "limit": 50, "next": null, "offset": 50, "previous": "https://api.spotify.com/v1/x?offset=0&limit=50",
                "total": 52}"#,
        )
        .unwrap();
        assert_eq!(page.next_href(), None);
        assert_eq!(page.items(), &[1, 2]);
    }

    #[test]
    fn test_cursor_page() {
        let page: CursorPage<u32> = serde_json::from_str(
            r#"{"href": "https://api.spotify.com/v1/me/player/recently-played?limit=1",
                "items": [7], "limit": 1,
                "next": "https://api.spotify.com/v1/me/player/recently-played?before=1484811043508&limit=1",
                "cursors": {"after": "1484811043508", "before": "1484811043508"}}"#,
        )
        .unwrap();
        assert!(page.next_href().unwrap().contains("before=1484811043508"));
        assert_eq!(page.cursors.unwrap().after.as_deref(), Some("1484811043508"));
        assert_eq!(page.total, None);
    }
}
