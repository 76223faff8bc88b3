use std::sync::Arc;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::fallback;

use super::cooldown::CooldownTracker;
use super::providers::{Provider, ProviderList, SearchOutcome, SearchQuery};

/// Resolves free text into a best effort image url by walking the
/// provider chain in random order. Resolution has no error path, callers
/// always get an image back even if it has to come from the fallback
/// pool.
pub struct ImageResolver {
    providers: ProviderList,
    cooldowns: CooldownTracker,
}

impl ImageResolver {
    pub fn new(providers: ProviderList, cooldowns: CooldownTracker) -> Self {
        Self {
            providers,
            cooldowns,
        }
    }

    /// Resolves one image for the query
    pub async fn resolve(&self, query: &SearchQuery) -> String {
        self.resolve_with(query, &mut StdRng::from_entropy()).await
    }

    /// Same as [`resolve`](Self::resolve) with an injected random source
    /// so tests get a deterministic provider order and fallback pick
    pub async fn resolve_with<R: Rng>(&self, query: &SearchQuery, rng: &mut R) -> String {
        let candidates = self.shuffled_candidates(rng);
        let first = self
            .first_hits(candidates, query)
            .await
            .and_then(|urls| urls.into_iter().next());
        match first {
            Some(url) => url,
            None => {
                info!("No provider had an image for \"{}\"", query.text);
                fallback::random_fallback_with(rng)
            }
        }
    }

    /// Resolves a full page of images, used by the gallery endpoint.
    /// Exhaustion degrades to the fixed gallery pool instead of a single
    /// placeholder
    pub async fn resolve_gallery(&self, query: &SearchQuery) -> Vec<String> {
        self.resolve_gallery_with(query, &mut StdRng::from_entropy())
            .await
    }

    pub async fn resolve_gallery_with<R: Rng>(
        &self,
        query: &SearchQuery,
        rng: &mut R,
    ) -> Vec<String> {
        let candidates = self.shuffled_candidates(rng);
        match self.first_hits(candidates, query).await {
            Some(urls) => urls,
            None => {
                info!("No provider had a gallery for \"{}\"", query.text);
                fallback::gallery_fallback()
            }
        }
    }

    /// Configured providers that aren't benched, in a fresh random order.
    /// Shuffling spreads traffic across providers so the same one isn't
    /// always the first to burn through its quota
    fn shuffled_candidates<R: Rng>(&self, rng: &mut R) -> Vec<Arc<dyn Provider>> {
        let mut eligible = self
            .providers
            .iter()
            .filter(|provider| {
                provider.configured() && !self.cooldowns.cooling_down(provider.id())
            })
            .cloned()
            .collect::<Vec<_>>();
        eligible.shuffle(rng);
        eligible
    }

    /// Walks the candidates one at a time and keeps the first batch of
    /// hits. Providers are never raced against each other, a parallel
    /// fan-out would spend quota on results that get thrown away
    async fn first_hits(
        &self,
        candidates: Vec<Arc<dyn Provider>>,
        query: &SearchQuery,
    ) -> Option<Vec<String>> {
        for provider in candidates {
            match provider.search(query).await {
                Ok(SearchOutcome::Hits(urls)) => {
                    debug!("{} resolved \"{}\"", provider.id(), query.text);
                    return Some(urls);
                }
                Ok(SearchOutcome::Empty) => {
                    debug!("{} had no results for \"{}\"", provider.id(), query.text);
                }
                Ok(SearchOutcome::RateLimited) => {
                    let window = provider.cooldown_window();
                    warn!(
                        "{} is rate limited, benching it for {} minutes",
                        provider.id(),
                        window.num_minutes()
                    );
                    self.cooldowns.begin(provider.id(), window);
                }
                Err(err) => {
                    debug!("{} failed searching \"{}\": {}", provider.id(), query.text, err);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::Duration;
    use futures::future::join_all;

    use crate::fallback::{gallery_fallback, FALLBACK_IMAGES};
    use crate::resolver::cooldown::testing::ManualClock;
    use crate::resolver::cooldown::{Clock, CooldownTracker};
    use crate::resolver::providers::{
        AllProviders, Provider, ProviderFailure, ProviderInput, SearchOutcome, SearchQuery,
        SearchUrl,
    };

    use super::ImageResolver;

    enum Script {
        Hits(Vec<&'static str>),
        Empty,
        RateLimited,
        Fail,
    }

    struct ScriptedProvider {
        id: AllProviders,
        configured: bool,
        script: Script,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(id: AllProviders, script: Script) -> Arc<Self> {
            Arc::new(Self {
                id,
                configured: true,
                script,
                calls: AtomicUsize::new(0),
            })
        }

        fn unconfigured(id: AllProviders) -> Arc<Self> {
            Arc::new(Self {
                id,
                configured: false,
                script: Script::Empty,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn new(_input: ProviderInput) -> Self
        where
            Self: Sized,
        {
            unreachable!("scripted providers are built directly")
        }
        fn id(&self) -> AllProviders {
            self.id
        }
        fn configured(&self) -> bool {
            self.configured
        }
        fn search_url(&self, _query: &SearchQuery) -> Result<SearchUrl, ProviderFailure> {
            Err(ProviderFailure::Url)
        }
        async fn search(&self, _query: &SearchQuery) -> Result<SearchOutcome, ProviderFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.script {
                Script::Hits(urls) => Ok(SearchOutcome::Hits(
                    urls.iter().map(|url| (*url).to_owned()).collect(),
                )),
                Script::Empty => Ok(SearchOutcome::Empty),
                Script::RateLimited => Ok(SearchOutcome::RateLimited),
                Script::Fail => Err(ProviderFailure::Url),
            }
        }
    }

    fn resolver_of(
        providers: Vec<Arc<ScriptedProvider>>,
        cooldowns: CooldownTracker,
    ) -> ImageResolver {
        let list = providers
            .into_iter()
            .map(|provider| provider as Arc<dyn Provider>)
            .collect();
        ImageResolver::new(list, cooldowns)
    }

    fn query() -> SearchQuery {
        SearchQuery::single("Tokyo Japan landmark travel")
    }

    #[tokio::test]
    async fn unconfigured_chain_serves_fallbacks() {
        let unsplash = ScriptedProvider::unconfigured(AllProviders::UnsplashSearch);
        let pexels = ScriptedProvider::unconfigured(AllProviders::PexelsSearch);
        let resolver = resolver_of(
            vec![Arc::clone(&unsplash), Arc::clone(&pexels)],
            CooldownTracker::default(),
        );

        for _ in 0..20 {
            let url = resolver.resolve(&query()).await;
            assert!(FALLBACK_IMAGES.contains(&url.as_str()));
        }
        assert_eq!(unsplash.calls(), 0);
        assert_eq!(pexels.calls(), 0);
    }

    #[tokio::test]
    async fn first_success_stops_the_chain() {
        let a = ScriptedProvider::new(
            AllProviders::UnsplashSearch,
            Script::Hits(vec!["https://a/1.jpg"]),
        );
        let b = ScriptedProvider::new(
            AllProviders::PexelsSearch,
            Script::Hits(vec!["https://b/1.jpg"]),
        );
        let resolver = resolver_of(
            vec![Arc::clone(&a), Arc::clone(&b)],
            CooldownTracker::default(),
        );

        let url = resolver.resolve(&query()).await;
        // whichever provider the shuffle put first is the only one called
        assert_eq!(a.calls() + b.calls(), 1);
        let expected = if a.calls() == 1 {
            "https://a/1.jpg"
        } else {
            "https://b/1.jpg"
        };
        assert_eq!(url, expected);
    }

    #[tokio::test]
    async fn provider_hit_is_returned_verbatim() {
        let provider = ScriptedProvider::new(
            AllProviders::PexelsSearch,
            Script::Hits(vec!["https://x/y.jpg"]),
        );
        let resolver = resolver_of(vec![provider], CooldownTracker::default());

        let url = resolver.resolve(&query()).await;
        assert_eq!(url, "https://x/y.jpg");
        assert!(url::Url::parse(&url).is_ok());
    }

    #[tokio::test]
    async fn rate_limited_provider_is_benched_for_the_window() {
        let clock = Arc::new(ManualClock::starting_now());
        let provider = ScriptedProvider::new(AllProviders::UnsplashSearch, Script::RateLimited);
        let resolver = resolver_of(
            vec![Arc::clone(&provider)],
            CooldownTracker::new(Arc::clone(&clock) as Arc<dyn Clock>),
        );

        let url = resolver.resolve(&query()).await;
        assert!(FALLBACK_IMAGES.contains(&url.as_str()));
        assert_eq!(provider.calls(), 1);

        // inside the window the provider must not see another request
        resolver.resolve(&query()).await;
        assert_eq!(provider.calls(), 1);

        clock.advance(Duration::minutes(61));
        resolver.resolve(&query()).await;
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn transient_failures_do_not_bench_providers() {
        let provider = ScriptedProvider::new(AllProviders::PixabaySearch, Script::Empty);
        let resolver = resolver_of(vec![Arc::clone(&provider)], CooldownTracker::default());

        resolver.resolve(&query()).await;
        resolver.resolve(&query()).await;
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn exhausted_chain_serves_fallbacks() {
        let empty = ScriptedProvider::new(AllProviders::UnsplashSearch, Script::Empty);
        let failing = ScriptedProvider::new(AllProviders::PexelsSearch, Script::Fail);
        let resolver = resolver_of(
            vec![Arc::clone(&empty), Arc::clone(&failing)],
            CooldownTracker::default(),
        );

        let url = resolver.resolve(&query()).await;
        assert!(FALLBACK_IMAGES.contains(&url.as_str()));
        assert!(url::Url::parse(&url).is_ok());
        assert_eq!(empty.calls(), 1);
        assert_eq!(failing.calls(), 1);
    }

    #[tokio::test]
    async fn seeded_resolutions_are_deterministic() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let build = || {
            resolver_of(
                vec![
                    ScriptedProvider::new(
                        AllProviders::UnsplashSearch,
                        Script::Hits(vec!["https://a/1.jpg"]),
                    ),
                    ScriptedProvider::new(
                        AllProviders::PexelsSearch,
                        Script::Hits(vec!["https://b/1.jpg"]),
                    ),
                ],
                CooldownTracker::default(),
            )
        };

        let first = build()
            .resolve_with(&query(), &mut StdRng::seed_from_u64(7))
            .await;
        let second = build()
            .resolve_with(&query(), &mut StdRng::seed_from_u64(7))
            .await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn gallery_returns_every_hit_from_one_provider() {
        let provider = ScriptedProvider::new(
            AllProviders::UnsplashSearch,
            Script::Hits(vec![
                "https://x/1.jpg",
                "https://x/2.jpg",
                "https://x/3.jpg",
            ]),
        );
        let resolver = resolver_of(vec![provider], CooldownTracker::default());

        let images = resolver
            .resolve_gallery(&SearchQuery::gallery("Kyoto temples"))
            .await;
        assert_eq!(
            images,
            vec!["https://x/1.jpg", "https://x/2.jpg", "https://x/3.jpg"]
        );
    }

    #[tokio::test]
    async fn gallery_exhaustion_uses_the_gallery_pool() {
        let resolver = resolver_of(
            vec![ScriptedProvider::unconfigured(AllProviders::UnsplashSearch)],
            CooldownTracker::default(),
        );

        let images = resolver
            .resolve_gallery(&SearchQuery::gallery("Kyoto temples"))
            .await;
        assert_eq!(images, gallery_fallback());
    }

    #[tokio::test]
    async fn concurrent_resolutions_share_cooldown_state() {
        let clock = Arc::new(ManualClock::starting_now());
        let provider = ScriptedProvider::new(AllProviders::PexelsSearch, Script::RateLimited);
        let resolver = Arc::new(resolver_of(
            vec![Arc::clone(&provider)],
            CooldownTracker::new(clock as Arc<dyn Clock>),
        ));

        let tasks = (0..8).map(|_| {
            let resolver = Arc::clone(&resolver);
            tokio::spawn(async move { resolver.resolve(&query()).await })
        });
        for result in join_all(tasks).await {
            let url = result.unwrap();
            assert!(FALLBACK_IMAGES.contains(&url.as_str()));
        }

        // once the racing writes settle the provider stays benched
        let settled = provider.calls();
        resolver.resolve(&query()).await;
        assert_eq!(provider.calls(), settled);
    }
}
