use std::path::PathBuf;

/// Fatal error kinds a render can surface, mirroring `spec.md` §7's
/// error table. Numerical edge cases (`|d·N|<ε`, discriminant<0,
/// `|dir|<ε`) are never represented here — they are recovered locally
/// as a miss in the hot intersection/shading loops, exactly as `spec.md`
/// mandates those loops stay free of `Result` plumbing. Grounded on
/// `doxxx-raytracer`'s use of `expect()` at its own I/O boundaries
/// (`main.rs`'s scene-file open/parse), generalized into a proper
/// `thiserror` enum since this crate surfaces these as `Result`s instead
/// of panicking at the CLI boundary.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The `--demo`/scene-file argument named something that could not
    /// be found or opened. `SceneError` itself (`spec.md` §7: scene
    /// file parsing) is out of this crate's scope — parsing is the
    /// out-of-scope out-of-scope boundary `SPEC_FULL.md` §6 describes —
    /// so only the "could not even locate the input" case is
    /// represented here.
    #[error("scene file not found: {}", .0.display())]
    SceneFileNotFound(PathBuf),

    /// A triangle mesh's index tables referenced a vertex/normal/
    /// texcoord index outside their bounds, or a face had fewer than
    /// three vertices.
    #[error("malformed mesh: {0}")]
    MalformedMesh(String),

    /// The photon emitter could not deposit a single photon after
    /// `max_attempts` emitted rays (`photon::emission`'s safety valve).
    /// Recovered internally — the map is simply left at whatever it
    /// holds and a `log::warn!` is emitted — but represented here so a
    /// caller that wants to treat an empty map as fatal can do so
    /// explicitly.
    #[error("photon array exhausted after {attempts} emitted rays ({stored} stored)")]
    PhotonArrayExhausted { attempts: u64, stored: usize },

    /// A worker thread panicked while rendering a tile. Rayon itself
    /// re-raises the panic on the calling thread; this variant exists
    /// so a `catch_unwind` boundary around a tile task can log a
    /// structured event before letting the panic continue to propagate
    /// (`SPEC_FULL.md` §7).
    #[error("worker panicked while rendering tile {tile_index}: {message}")]
    WorkerPanic { tile_index: usize, message: String },

    /// Failed to write a PNG or photon-dump output file.
    #[error("failed to write output file {}: {source}", .path.display())]
    OutputWrite { path: PathBuf, #[source] source: std::io::Error },
}

/// The boundary contract an out-of-scope scene-file parser would
/// implement to hand a finished `Scene` to this crate without either
/// crate depending on the other's internals (`SPEC_FULL.md` §1: "defined
/// only as a trait contract so that a future parser crate can produce
/// `photonray` scene graphs without touching this crate's internals").
/// No implementation ships in this crate; `src/demos.rs` plays the
/// equivalent role for the built-in scenarios instead of implementing
/// this trait, since it builds scenes directly rather than from a file.
pub trait SceneSource {
    fn load(&self, path: &std::path::Path) -> Result<crate::scene::Scene, RenderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_human_readable() {
        let err = RenderError::SceneFileNotFound(PathBuf::from("missing.scene"));
        assert_eq!(err.to_string(), "scene file not found: missing.scene");

        let err = RenderError::WorkerPanic { tile_index: 3, message: "boom".to_string() };
        assert!(err.to_string().contains("tile 3"));
    }
}
