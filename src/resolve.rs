use std::{collections::BTreeMap, path::Path, rc::Rc};
use tracing::debug;

use crate::{
    debug::{DebugSink, SharedSink},
    deps::DepEntry,
    error::Result,
    lazy::Lazy,
    require::Loader,
};

pub type Transform<M> = Rc<dyn Fn(M) -> M>;
pub type SharedLoader<M> = Rc<dyn Loader<M>>;

/// Turns resolution entries into module slots, loading now or on first read.
pub struct ModuleResolver<M> {
    loader: SharedLoader<M>,
    base_dir: Rc<Path>,
    transforms: BTreeMap<String, Transform<M>>,
    sink: SharedSink,
    lazy: bool,
}

impl<M: 'static> ModuleResolver<M> {
    pub fn new(loader: SharedLoader<M>, base_dir: &Path, sink: SharedSink, lazy: bool) -> Self {
        Self {
            loader,
            base_dir: Rc::from(base_dir),
            transforms: BTreeMap::new(),
            sink,
            lazy,
        }
    }

    pub fn with_transforms(mut self, transforms: BTreeMap<String, Transform<M>>) -> Self {
        self.transforms = transforms;
        self
    }

    /// Transforms are looked up by dotted path first ("myco.testPlugin"),
    /// then by bare key ("testPlugin").
    fn transform_for(&self, entry: &DepEntry) -> Option<Transform<M>> {
        self.transforms
            .get(&entry.path())
            .or_else(|| self.transforms.get(&entry.key))
            .cloned()
    }

    pub fn resolve(&self, entry: &DepEntry) -> Result<Lazy<M>> {
        let transform = self.transform_for(entry);

        if !self.lazy {
            debug!("requiring {}", entry.original_name);
            let module = load_one(
                self.loader.as_ref(),
                &self.base_dir,
                entry,
                transform.as_ref(),
                self.sink.as_ref(),
            )?;
            return Ok(Lazy::ready(module));
        }

        debug!("lazyload: adding property {}", entry.path());
        let loader = Rc::clone(&self.loader);
        let base_dir = Rc::clone(&self.base_dir);
        let sink = Rc::clone(&self.sink);
        let entry = entry.clone();

        Ok(Lazy::deferred(move || {
            debug!("lazyload: requiring {}", entry.original_name);
            load_one(
                loader.as_ref(),
                &base_dir,
                &entry,
                transform.as_ref(),
                sink.as_ref(),
            )
        }))
    }
}

fn load_one<M>(
    loader: &dyn Loader<M>,
    base_dir: &Path,
    entry: &DepEntry,
    transform: Option<&Transform<M>>,
    sink: &dyn DebugSink,
) -> Result<M> {
    let module = loader.load(&entry.original_name, base_dir)?;
    sink.line(&format!("loading {}", entry.original_name));

    Ok(match transform {
        Some(t) => {
            debug!("transforming {}", entry.path());
            t(module)
        }
        None => module,
    })
}
