//! Mission definition resolution.
//!
//! A mission id resolves through three tiers: the loader's cache of
//! definitions it already handed out, the resident [`DefinitionStore`], and
//! finally a [`DefinitionSource`] read on tokio's blocking pool. Every
//! resolution, including cache and store hits, is delivered as a
//! [`LoadCompletion`] on the same queue, so the engine consumes resident and
//! freshly loaded definitions through one path on its own thread.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, error, warn};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::mission::definition::MissionDefinition;
use crate::mission::errors::MissionError;
use crate::mission::tag::Tag;

/// Somewhere mission definitions can be read from by id.
///
/// Called from a blocking worker thread when the loader runs asynchronously.
pub trait DefinitionSource: Send + Sync {
    fn load(&self, mission_id: &Tag) -> Result<MissionDefinition, MissionError>;
}

/// Parse and validate one mission definition from JSON text.
pub fn parse_definition(json: &str) -> Result<MissionDefinition, MissionError> {
    let definition: MissionDefinition = serde_json::from_str(json)?;
    definition.validate()?;
    Ok(definition)
}

/// Reads `<root>/<mission-id>.json`.
#[derive(Debug, Clone)]
pub struct JsonDirectorySource {
    root: PathBuf,
}

impl JsonDirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, mission_id: &Tag) -> PathBuf {
        self.root.join(format!("{}.json", mission_id.as_str()))
    }
}

impl DefinitionSource for JsonDirectorySource {
    fn load(&self, mission_id: &Tag) -> Result<MissionDefinition, MissionError> {
        let path = self.path_for(mission_id);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MissionError::NotFound(format!(
                    "mission definition: {}",
                    path.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let definition: MissionDefinition = serde_json::from_str(&contents).map_err(|e| {
            MissionError::definition(
                mission_id,
                format!("Failed to parse {}: {}", path.display(), e),
            )
        })?;
        if &definition.id != mission_id {
            return Err(MissionError::definition(
                mission_id,
                format!("{} declares id '{}'", path.display(), definition.id),
            ));
        }
        definition.validate()?;
        Ok(definition)
    }
}

/// Definitions already in memory, keyed by mission id.
#[derive(Debug, Default, Clone)]
pub struct DefinitionStore {
    definitions: HashMap<Tag, Arc<MissionDefinition>>,
}

impl DefinitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and insert, replacing any previous definition with that id.
    pub fn insert(&mut self, definition: MissionDefinition) -> Result<(), MissionError> {
        definition.validate()?;
        self.definitions
            .insert(definition.id.clone(), Arc::new(definition));
        Ok(())
    }

    pub fn get(&self, mission_id: &Tag) -> Option<Arc<MissionDefinition>> {
        self.definitions.get(mission_id).cloned()
    }

    pub fn contains(&self, mission_id: &Tag) -> bool {
        self.definitions.contains_key(mission_id)
    }

    pub fn remove(&mut self, mission_id: &Tag) -> Option<Arc<MissionDefinition>> {
        self.definitions.remove(mission_id)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Outcome of one resolution request.
#[derive(Debug)]
pub struct LoadCompletion {
    pub mission_id: Tag,
    pub result: Result<Arc<MissionDefinition>, MissionError>,
}

pub struct DefinitionLoader {
    cache: HashMap<Tag, Arc<MissionDefinition>>,
    store: DefinitionStore,
    source: Option<Arc<dyn DefinitionSource>>,
    runtime: Option<Handle>,
    in_flight: HashSet<Tag>,
    tx: UnboundedSender<LoadCompletion>,
    rx: UnboundedReceiver<LoadCompletion>,
}

impl DefinitionLoader {
    /// Loader backed by resident definitions only.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            cache: HashMap::new(),
            store: DefinitionStore::new(),
            source: None,
            runtime: None,
            in_flight: HashSet::new(),
            tx,
            rx,
        }
    }

    pub fn with_store(mut self, store: DefinitionStore) -> Self {
        self.store = store;
        self
    }

    pub fn with_source(mut self, source: impl DefinitionSource + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Run source reads on this runtime's blocking pool. Without a handle
    /// they run inline on the caller's thread.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn store(&self) -> &DefinitionStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut DefinitionStore {
        &mut self.store
    }

    pub fn is_async(&self) -> bool {
        self.runtime.is_some()
    }

    /// Cache or store hit, without touching the source.
    pub fn resident(&mut self, mission_id: &Tag) -> Option<Arc<MissionDefinition>> {
        if let Some(definition) = self.cache.get(mission_id) {
            return Some(definition.clone());
        }
        let definition = self.store.get(mission_id)?;
        self.cache.insert(mission_id.clone(), definition.clone());
        Some(definition)
    }

    /// Ask for a definition. The answer always arrives through
    /// [`try_next`](Self::try_next) or [`next`](Self::next); a request for an
    /// id already being loaded is folded into the pending one.
    pub fn request(&mut self, mission_id: &Tag) {
        if let Some(definition) = self.resident(mission_id) {
            self.deliver(mission_id.clone(), Ok(definition));
            return;
        }
        let Some(source) = self.source.clone() else {
            self.deliver(
                mission_id.clone(),
                Err(MissionError::NotFound(format!("mission definition: {}", mission_id))),
            );
            return;
        };
        if !self.in_flight.insert(mission_id.clone()) {
            debug!("load of {} already in flight", mission_id);
            return;
        }

        let id = mission_id.clone();
        match &self.runtime {
            Some(handle) => {
                let tx = self.tx.clone();
                debug!("loading {} in background", id);
                handle.spawn_blocking(move || {
                    let result = source.load(&id).map(Arc::new);
                    if tx.send(LoadCompletion { mission_id: id, result }).is_err() {
                        warn!("definition loader dropped before load finished");
                    }
                });
            }
            None => {
                let result = source.load(&id).map(Arc::new);
                self.deliver(id, result);
            }
        }
    }

    /// Resolve synchronously through all three tiers.
    pub fn resolve_now(&mut self, mission_id: &Tag) -> Result<Arc<MissionDefinition>, MissionError> {
        if let Some(definition) = self.resident(mission_id) {
            return Ok(definition);
        }
        let Some(source) = self.source.as_ref() else {
            return Err(MissionError::NotFound(format!(
                "mission definition: {}",
                mission_id
            )));
        };
        let definition = Arc::new(source.load(mission_id)?);
        self.cache.insert(mission_id.clone(), definition.clone());
        Ok(definition)
    }

    fn deliver(&self, mission_id: Tag, result: Result<Arc<MissionDefinition>, MissionError>) {
        // The receiver lives in `self`, so the send cannot fail here.
        let _ = self.tx.send(LoadCompletion { mission_id, result });
    }

    fn accept(&mut self, completion: LoadCompletion) -> LoadCompletion {
        self.in_flight.remove(&completion.mission_id);
        match &completion.result {
            Ok(definition) => {
                self.cache
                    .insert(completion.mission_id.clone(), definition.clone());
            }
            Err(e) => error!("failed to load mission {}: {}", completion.mission_id, e),
        }
        completion
    }

    /// Next finished resolution, if one is ready.
    pub fn try_next(&mut self) -> Option<LoadCompletion> {
        let completion = self.rx.try_recv().ok()?;
        Some(self.accept(completion))
    }

    /// Wait for the next finished resolution.
    pub async fn next(&mut self) -> Option<LoadCompletion> {
        let completion = self.rx.recv().await?;
        Some(self.accept(completion))
    }

    pub fn is_cached(&self, mission_id: &Tag) -> bool {
        self.cache.contains_key(mission_id)
    }

    pub fn is_in_flight(&self, mission_id: &Tag) -> bool {
        self.in_flight.contains(mission_id)
    }

    /// Forget the cache. Resident store entries stay.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Forget in-flight bookkeeping; late completions still arrive and are
    /// then discarded by the engine.
    pub fn forget_in_flight(&mut self) {
        self.in_flight.clear();
    }
}

impl Default for DefinitionLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::definition::ObjectiveDefinition;
    use crate::mission::rules::SimpleRule;
    use tempfile::TempDir;

    fn tag(s: &str) -> Tag {
        Tag::parse(s).unwrap()
    }

    fn mission(id: &str) -> MissionDefinition {
        MissionDefinition::new(tag(id)).with_objective(
            ObjectiveDefinition::new(tag("Obj.Only"), SimpleRule::new(tag("Done"))).auto_start(),
        )
    }

    #[test]
    fn resident_hits_go_through_the_queue() {
        let mut loader = DefinitionLoader::new();
        loader.store_mut().insert(mission("Mission.A")).unwrap();
        assert!(loader.try_next().is_none());

        loader.request(&tag("Mission.A"));
        let done = loader.try_next().unwrap();
        assert_eq!(done.mission_id, tag("Mission.A"));
        assert!(done.result.is_ok());
        assert!(loader.is_cached(&tag("Mission.A")));

        loader.request(&tag("Mission.Missing"));
        let missing = loader.try_next().unwrap();
        assert!(matches!(missing.result, Err(MissionError::NotFound(_))));
    }

    #[test]
    fn json_directory_source_validates_files() {
        let dir = TempDir::new().unwrap();
        let good = serde_json::to_string(&mission("Mission.Good")).unwrap();
        std::fs::write(dir.path().join("Mission.Good.json"), good).unwrap();
        let wrong_id = serde_json::to_string(&mission("Mission.Other")).unwrap();
        std::fs::write(dir.path().join("Mission.Liar.json"), wrong_id).unwrap();
        std::fs::write(dir.path().join("Mission.Broken.json"), "{ not json").unwrap();

        let source = JsonDirectorySource::new(dir.path());
        assert!(source.load(&tag("Mission.Good")).is_ok());
        assert!(matches!(
            source.load(&tag("Mission.Liar")),
            Err(MissionError::Definition { .. })
        ));
        match source.load(&tag("Mission.Broken")) {
            Err(MissionError::Definition { reason, .. }) => {
                assert!(reason.contains("Mission.Broken.json"));
            }
            other => panic!("expected a definition error, got {:?}", other),
        }
        assert!(matches!(source.load(&tag("Mission.None")), Err(MissionError::NotFound(_))));

        let mut loader = DefinitionLoader::new().with_source(source);
        assert!(loader.resolve_now(&tag("Mission.Good")).is_ok());
        assert!(loader.is_cached(&tag("Mission.Good")));
    }

    #[test]
    fn store_rejects_invalid_definitions() {
        let mut store = DefinitionStore::new();
        let bad = mission("Mission.Bad")
            .with_objective(ObjectiveDefinition::manual(tag("Obj.Only")));
        assert!(store.insert(bad).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn parse_definition_reports_json_errors() {
        assert!(matches!(parse_definition("[]"), Err(MissionError::Json(_))));
    }
}
