pub mod cooldown;
mod providers;
pub use providers::{
    get_provider_list, AllProviders, Orientation, Provider, ProviderFailure, ProviderInput,
    ProviderList, SearchOutcome, SearchQuery, SearchUrl,
};
pub mod resolver;

pub use resolver::ImageResolver;
