use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::Client;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::logger;
use crate::models::settings::Settings;
use crate::utils::errors::ImageFetchError;

/// A fetched image. Cheap to clone, the bytes are shared.
#[derive(Clone)]
pub struct ImageHandle {
    id: Uuid,
    bytes: Arc<[u8]>,
}

impl ImageHandle {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            bytes: bytes.into(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    #[cfg(test)]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Debug for ImageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageHandle")
            .field("id", &self.id)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Supplies the images cards are decorated with.
pub trait ImageSource {
    /// Starts every fetch. Returns immediately.
    fn fetch_all(&self);

    /// True once every fetch has settled, whether or not it produced an image.
    async fn is_fully_supplied(&self) -> bool;

    async fn random_item<R: Rng>(&self, rng: &mut R) -> Option<ImageHandle>;
}

/// Results of the fetches issued so far.
#[derive(Debug, Default)]
pub struct ImagePool {
    expected: usize,
    failed: usize,
    images: Vec<ImageHandle>,
}

impl ImagePool {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            ..Self::default()
        }
    }

    pub fn record(&mut self, result: Result<ImageHandle, ImageFetchError>) {
        match result {
            Ok(image) => self.images.push(image),
            Err(error) => {
                logger!(ERROR, "[IMAGES] Giving up on an image ({error})");
                self.failed += 1;
            }
        }

        if self.is_settled() {
            if self.failed > 0 {
                logger!(
                    WARN,
                    "[IMAGES] {} of {} images failed, continuing with {}",
                    self.failed,
                    self.expected,
                    self.images.len()
                );
            } else {
                logger!(INFO, "[IMAGES] All {} images fetched", self.expected);
            }
        }
    }

    pub fn is_settled(&self) -> bool {
        self.images.len() + self.failed >= self.expected
    }

    #[cfg(test)]
    pub fn failed(&self) -> usize {
        self.failed
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn random<R: Rng>(&self, rng: &mut R) -> Option<ImageHandle> {
        self.images.choose(rng).cloned()
    }
}

/// Fetches `count` independent images from an HTTP host.
pub struct RemoteImageSource {
    url: String,
    count: usize,
    retries: u32,
    backoff: Duration,
    client: Client,
    pool: Arc<RwLock<ImagePool>>,
}

impl RemoteImageSource {
    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_client(
            Client::new(),
            settings.image_url(),
            settings.image_count,
            settings.fetch_retries,
            settings.fetch_backoff(),
        )
    }

    pub fn with_client(
        client: Client,
        url: String,
        count: usize,
        retries: u32,
        backoff: Duration,
    ) -> Self {
        Self {
            url,
            count,
            retries,
            backoff,
            client,
            pool: Arc::new(RwLock::new(ImagePool::new(count))),
        }
    }

    #[cfg(test)]
    pub fn pool(&self) -> Arc<RwLock<ImagePool>> {
        Arc::clone(&self.pool)
    }

    /// Requests a single image, without retrying.
    async fn fetch_image(client: &Client, url: &str) -> Result<ImageHandle, ImageFetchError> {
        match client.get(url).send().await {
            Err(error) => Err(ImageFetchError::Transport(error.to_string())),
            Ok(response) => match response.status() {
                status if status.is_success() => {
                    let bytes = response
                        .bytes()
                        .await
                        .map_err(|e| ImageFetchError::Transport(e.to_string()))?;
                    if bytes.is_empty() {
                        return Err(ImageFetchError::EmptyBody);
                    }
                    Ok(ImageHandle::new(bytes.to_vec()))
                }
                status => Err(ImageFetchError::UnexpectedStatus(status.as_u16())),
            },
        }
    }

    /// Requests an image, retrying with a doubling backoff.
    async fn fetch_with_retry(
        client: &Client,
        url: &str,
        retries: u32,
        backoff: Duration,
    ) -> Result<ImageHandle, ImageFetchError> {
        let mut delay = backoff;
        let mut attempt = 0;
        loop {
            match RemoteImageSource::fetch_image(client, url).await {
                Ok(image) => return Ok(image),
                Err(error) if attempt < retries => {
                    attempt += 1;
                    logger!(
                        WARN,
                        "[IMAGES] Fetch failed ({error}), retry {attempt}/{retries} in {}ms",
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

impl ImageSource for RemoteImageSource {
    fn fetch_all(&self) {
        logger!(INFO, "[IMAGES] Fetching {} images from `{}`", self.count, self.url);
        for _ in 0..self.count {
            tokio::spawn({
                let client = self.client.clone();
                let url = self.url.clone();
                let pool = Arc::clone(&self.pool);
                let (retries, backoff) = (self.retries, self.backoff);
                async move {
                    let result =
                        RemoteImageSource::fetch_with_retry(&client, &url, retries, backoff).await;
                    pool.write().await.record(result);
                }
            });
        }
    }

    async fn is_fully_supplied(&self) -> bool {
        self.pool.read().await.is_settled()
    }

    async fn random_item<R: Rng>(&self, rng: &mut R) -> Option<ImageHandle> {
        self.pool.read().await.random(rng)
    }
}

/// Hands out images that are already in memory.
#[cfg(test)]
pub struct StaticImageSource {
    pub images: Vec<ImageHandle>,
}

#[cfg(test)]
impl ImageSource for StaticImageSource {
    fn fetch_all(&self) {}

    async fn is_fully_supplied(&self) -> bool {
        true
    }

    async fn random_item<R: Rng>(&self, rng: &mut R) -> Option<ImageHandle> {
        self.images.choose(rng).cloned()
    }
}
