pub mod catalog;
pub mod config;
pub mod extractor;
pub mod fetcher;
pub mod library;
pub mod metadata;
pub mod notify;
pub mod orchestrator;
pub mod searcher;
pub mod testing;

pub use catalog::{
    CatalogError, EpisodeRecord, MediaCatalog, MovieRecord, SeasonNumber, SqliteCatalog,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use extractor::{extract_archive, ArchiveFormat, ExtractError};
pub use fetcher::{AssetFetcher, FetchError, HttpAssetFetcher};
pub use library::{PackageError, SubtitleLibrary};
pub use metadata::{
    MetadataError, MetadataProvider, MovieMatch, SeriesMatch, TmdbClient, TmdbConfig,
};
pub use notify::{Notifier, TracingNotifier};
pub use orchestrator::{
    AcquireError, EpisodeStatus, MovieSummary, SeasonListing, SeriesOverview,
    SubtitleOrchestrator, UpdateOutcome,
};
pub use searcher::{BaiscopeSearcher, EpisodeHit, MovieHit, SearchError, SiteSearcher};
