use rand::Rng;

/// Curated travel shots that are always safe to show when no provider
/// can produce an on-topic result. Served straight from the unsplash CDN
/// without an API key so they keep working when every key is missing.
pub const FALLBACK_IMAGES: [&str; 10] = [
    "https://images.unsplash.com/photo-1477959858617-67f85cf4f1df?w=400",
    "https://images.unsplash.com/photo-1488646953014-85cb44e25828?w=400",
    "https://images.unsplash.com/photo-1469854523086-cc02fe5d8800?w=400",
    "https://images.unsplash.com/photo-1476514525535-07fb3b4ae5f1?w=400",
    "https://images.unsplash.com/photo-1502602898657-3e91760cbb34?w=400",
    "https://images.unsplash.com/photo-1499856871940-a09627c6dcf6?w=400",
    "https://images.unsplash.com/photo-1496442226666-8d4d0e62e6e9?w=400",
    "https://images.unsplash.com/photo-1500835556837-99ac94a94552?w=400",
    "https://images.unsplash.com/photo-1516483638261-f4dbaf036963?w=400",
    "https://images.unsplash.com/photo-1523906834658-6e24ef2386f9?w=400",
];

/// Smaller pool used by the gallery endpoint so an unconfigured instance
/// still renders a believable grid
pub const GALLERY_FALLBACK_IMAGES: [&str; 6] = [
    "https://images.unsplash.com/photo-1477959858617-67f85cf4f1df?w=400",
    "https://images.unsplash.com/photo-1488646953014-85cb44e25828?w=400",
    "https://images.unsplash.com/photo-1469854523086-cc02fe5d8800?w=400",
    "https://images.unsplash.com/photo-1502602898657-3e91760cbb34?w=400",
    "https://images.unsplash.com/photo-1499856871940-a09627c6dcf6?w=400",
    "https://images.unsplash.com/photo-1496442226666-8d4d0e62e6e9?w=400",
];

/// Picks one member of [`FALLBACK_IMAGES`] uniformly at random.
///
/// Exposed on its own because some callers want a placeholder without
/// paying for a provider round trip first.
pub fn random_fallback() -> String {
    random_fallback_with(&mut rand::thread_rng())
}

pub fn random_fallback_with<R: Rng>(rng: &mut R) -> String {
    FALLBACK_IMAGES[rng.gen_range(0..FALLBACK_IMAGES.len())].to_owned()
}

pub fn gallery_fallback() -> Vec<String> {
    GALLERY_FALLBACK_IMAGES
        .iter()
        .map(|image| (*image).to_owned())
        .collect()
}
