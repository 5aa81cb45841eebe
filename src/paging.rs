use std::collections::BTreeSet;

use futures::Stream;

use crate::api::SpotifyApi;
use crate::auth::AuthorizationManager;
use crate::error::SpotifyError;
use crate::model::Paginated;
use crate::scope::Scope;
use crate::transport::Transport;

/// Walks the pages of a paginated response, one request per page.
///
/// Pages are only fetched when asked for, through the same pipeline and with
/// the same scopes as the request that produced the first page.
pub struct PageWalker<'a, A: ?Sized, T, P> {
    api: &'a SpotifyApi<A, T>,
    scopes: BTreeSet<Scope>,
    current: P,
}

impl<'a, A, T, P> PageWalker<'a, A, T, P>
where
    A: AuthorizationManager + ?Sized,
    T: Transport,
    P: Paginated,
{
    pub fn new(api: &'a SpotifyApi<A, T>, first: P, scopes: BTreeSet<Scope>) -> Self {
        Self {
            api,
            scopes,
            current: first,
        }
    }

    pub fn current(&self) -> &P {
        &self.current
    }

    /// The items of the current page, in the order the API returned them.
    pub fn items(&self) -> &[P::Item] {
        self.current.items()
    }

    /// Fetch the page after the current one and make it current.
    ///
    /// Returns `Ok(None)` without a request once the current page has no
    /// continuation link, and keeps doing so on later calls. On error the
    /// current page is unchanged.
    pub async fn next(&mut self) -> Result<Option<&P>, SpotifyError> {
        let Some(href) = self.current.next_href().map(str::to_string) else {
            return Ok(None);
        };
        tracing::debug!("Fetching next page: {}", href);
        self.current = self.api.get_href::<P>(&href, &self.scopes).await?;
        Ok(Some(&self.current))
    }

    /// Every item from the current page onwards, fetching each following page
    /// only once the items before it have been consumed.
    ///
    /// The stream ends after the first error.
    pub fn into_item_stream(self) -> impl Stream<Item = Result<P::Item, SpotifyError>> {
        let PageWalker {
            api,
            scopes,
            current,
        } = self;

        async_stream::try_stream! {
            let mut page = current;
            loop {
                let next = page.next_href().map(str::to_string);
                for item in page.into_items() {
                    yield item;
                }
                match next {
                    Some(href) => {
                        tracing::debug!("Fetching next page: {}", href);
                        page = api.get_href::<P>(&href, &scopes).await?;
                    }
                    None => break,
                }
            }
        }
    }
}

impl<A, T> SpotifyApi<A, T>
where
    A: AuthorizationManager + ?Sized,
    T: Transport,
{
    /// Walk the pages following `first`, requiring `scopes` for every fetch.
    pub fn pages<P: Paginated>(&self, first: P, scopes: BTreeSet<Scope>) -> PageWalker<'_, A, T, P> {
        PageWalker::new(self, first, scopes)
    }
}
