/// Network adapters for external API calls
mod caching_vulnerability_feed;
mod osv_client;

pub use caching_vulnerability_feed::CachingVulnerabilityFeed;
pub use osv_client::OsvClient;
