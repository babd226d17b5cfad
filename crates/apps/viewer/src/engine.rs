use std::sync::Arc;

use catalog::{Dataset, DatasetEntry};
use foundation::time::Time;
use story::{StoryError, builtin_story};
use streaming::{HttpTopologyFetcher, TopologyLoadError, TopologySource, TopologyState};

use crate::config::{ConfigError, EngineConfig};
use crate::map_view::WorldMapView;
use crate::mini_map::MiniMap;
use crate::story_view::StoryView;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    Config(ConfigError),
    Topology(TopologyLoadError),
    Story(StoryError),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Config(err) => write!(f, "{err}"),
            EngineError::Topology(err) => write!(f, "{err}"),
            EngineError::Story(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Config(err) => Some(err),
            EngineError::Topology(err) => Some(err),
            EngineError::Story(err) => Some(err),
        }
    }
}

impl From<ConfigError> for EngineError {
    fn from(err: ConfigError) -> Self {
        EngineError::Config(err)
    }
}

impl From<TopologyLoadError> for EngineError {
    fn from(err: TopologyLoadError) -> Self {
        EngineError::Topology(err)
    }
}

impl From<StoryError> for EngineError {
    fn from(err: StoryError) -> Self {
        EngineError::Story(err)
    }
}

/// Session root: configuration plus the one shared topology source every
/// view draws its boundaries from.
pub struct Engine {
    config: EngineConfig,
    topology: Arc<TopologySource>,
}

impl Engine {
    /// Fetches boundaries over HTTP from `config.topology_url`.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let fetcher = HttpTopologyFetcher::with_timeout(
            config.topology_url.clone(),
            config.fetch_timeout()?,
        )?;
        let source = TopologySource::new(fetcher).with_object_name(config.topology_object.clone());
        Ok(Self::with_source(config, source))
    }

    pub fn from_env() -> Result<Self, EngineError> {
        Self::new(EngineConfig::from_env()?)
    }

    pub fn with_source(config: EngineConfig, source: TopologySource) -> Self {
        Self {
            config,
            topology: Arc::new(source),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn topology(&self) -> &Arc<TopologySource> {
        &self.topology
    }

    /// Resolves the shared fetch. Later calls return the cached outcome.
    pub async fn load_topology(&self) -> TopologyState {
        let _ = self.topology.load().await;
        self.topology.state()
    }

    pub fn world_map(&self, catalog: Dataset) -> WorldMapView {
        let mut view = WorldMapView::new(&self.config, catalog);
        view.attach_topology(self.topology.state());
        view
    }

    pub fn story_view(
        &self,
        story_id: &str,
        catalog: &Dataset,
        now: Time,
    ) -> Result<StoryView, EngineError> {
        let story = builtin_story(story_id)?;
        let mut view = StoryView::new(&self.config, story, catalog, now);
        view.attach_topology(self.topology.state());
        Ok(view)
    }

    pub fn mini_map(&self, entry: &DatasetEntry) -> MiniMap {
        let mut map = MiniMap::new(&self.config, entry);
        map.attach_topology(self.topology.state());
        map
    }
}
