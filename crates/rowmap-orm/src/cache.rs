//! Process-wide descriptor cache keyed by descriptor type.
//!
//! Descriptors are pure functions of static metadata, so concurrent misses
//! may each build one; the first to publish wins and the others adopt it.
//! Failed builds are never stored.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::error::OrmError;

type Slot = Arc<dyn Any + Send + Sync>;

fn registry() -> &'static RwLock<HashMap<TypeId, Slot>> {
    static REGISTRY: OnceLock<RwLock<HashMap<TypeId, Slot>>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Returns the cached `D`, calling `build` on a miss.
pub(crate) fn get_or_build<D, F>(build: F) -> Result<Arc<D>, OrmError>
where
    D: Any + Send + Sync,
    F: FnOnce() -> Result<D, OrmError>,
{
    let key = TypeId::of::<D>();

    let cached = registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
        .cloned();

    let slot = match cached {
        Some(slot) => slot,
        None => {
            let built: Slot = Arc::new(build()?);
            registry()
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(key)
                .or_insert(built)
                .clone()
        }
    };

    slot.downcast::<D>().map_err(|_| OrmError::InvalidMetadata {
        type_name: type_name::<D>(),
        reason: "descriptor cache slot holds a different type".to_string(),
    })
}

