#[cfg(feature = "tune")]
pub use serde_json;
pub use {
    anyhow,
    indexmap,
    itertools,
    log,
    ndarray,
    polars,
    rayon,
    serde,
    sprs,
};
