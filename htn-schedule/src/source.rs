use std::future::Future;

use crate::{error::FetchError, Event, EventId};

/// Where the schedule comes from. Implementations fetch whole records and
/// never resolve related events on their own.
pub trait EventSource {
    fn all_events(&self) -> impl Future<Output = Result<Vec<Event>, FetchError>> + Send;

    fn event_by_id(&self, id: EventId) -> impl Future<Output = Result<Event, FetchError>> + Send;
}

#[cfg(feature = "http")]
pub use self::http::{HttpEventSource, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use log::debug;
    use reqwest::Client;

    use super::EventSource;
    use crate::{error::FetchError, Event, EventId};

    pub const DEFAULT_BASE_URL: &str = "https://api.hackthenorth.com/v3";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    #[derive(Debug, Clone)]
    pub struct HttpEventSource {
        client: Client,
        base_url: String,
    }

    impl HttpEventSource {
        pub fn new<S: Into<String>>(base_url: S, timeout: Duration) -> reqwest::Result<Self> {
            let client = Client::builder().timeout(timeout).build()?;
            let base_url = base_url.into().trim_end_matches('/').to_string();

            Ok(Self { client, base_url })
        }

        #[must_use]
        pub fn base_url(&self) -> &str {
            &self.base_url
        }

        async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> reqwest::Result<T> {
            debug!("Sending HTTP request to {url}");
            self.client
                .get(url)
                .send()
                .await?
                .error_for_status()?
                .json::<T>()
                .await
        }
    }

    impl EventSource for HttpEventSource {
        async fn all_events(&self) -> Result<Vec<Event>, FetchError> {
            let url = format!("{}/events", self.base_url);
            self.get_json(&url)
                .await
                .map_err(|err| FetchError::Events(Box::new(err)))
        }

        async fn event_by_id(&self, id: EventId) -> Result<Event, FetchError> {
            let url = format!("{}/events/{id}", self.base_url);
            self.get_json(&url)
                .await
                .map_err(|err| FetchError::Event {
                    id,
                    source: Box::new(err),
                })
        }
    }
}
