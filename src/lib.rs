//! `ufbx`: a reader for Autodesk FBX scene files (legacy ASCII grammar and
//! the length-prefixed binary container) producing a fully resolved,
//! strongly-typed in-memory scene graph.
//!
//! The public entry points cover three source kinds — [`load_memory`],
//! [`load_file`], [`load_from_reader`] — each returning a
//! [`LoadResult`] pairing the resolved [`Scene`] with any non-fatal
//! [`Warning`]s collected along the way (spec §7, `SPEC_FULL` §1
//! "Logging").
//!
//! ```no_run
//! let result = ufbx::load_file("model.fbx", ufbx::LoadOpts::default())?;
//! println!("{} nodes", result.scene.nodes.len());
//! # Ok::<(), ufbx::Error>(())
//! ```

pub mod connect;
pub mod error;
pub mod evaluate;
pub mod finalize;
pub mod hash;
pub mod import;
pub mod inflate;
pub mod options;
pub mod reader;
pub mod readers;
pub mod strings;
pub mod strtod;
pub mod templates;
pub mod toplevel;
pub mod triangulate;

mod parser;

use std::path::Path;

pub use error::{Error, Result, Warning, Warnings};
pub use options::{LoadOpts, ValidationStrategy};

/// The resolved scene graph (spec §3 "Scene elements"). A thin alias
/// rather than a newtype: every field the loader produces already lives
/// on [`ufbx_data::Root`], and the loader crate has nothing to add on top
/// of it once a load completes.
pub type Scene = ufbx_data::Root;

/// A successful [`load_memory`]/[`load_file`]/[`load_from_reader`] result:
/// the resolved scene plus any non-fatal diagnostics (spec §7, `SPEC_FULL`
/// §1 "Logging" — the source has no runtime warning channel; this is the
/// equivalent a safe-Rust port can give callers for free).
#[derive(Debug)]
pub struct LoadResult {
    pub scene: Scene,
    pub warnings: Warnings,
}

const BINARY_MAGIC_LEN: usize = parser::binary::MAGIC.len();

/// Peeks the first bytes of `data` to choose the binary or ASCII front
/// end (spec §2 "format dispatcher ... peeks the magic bytes").
fn is_binary(data: &[u8]) -> bool {
    data.len() >= BINARY_MAGIC_LEN && &data[..BINARY_MAGIC_LEN] == parser::binary::MAGIC.as_slice()
}

/// Runs the full pipeline (spec §2) over an already-buffered byte slice:
/// format dispatch, parse into the generic [`ufbx_data::DomNode`] tree,
/// schedule the toplevel sections, resolve connections, then finalize.
fn load_bytes(data: &[u8], opts: &LoadOpts) -> Result<LoadResult> {
    let mut strings = strings::StringPool::new(opts.max_string_length, opts.max_strings);

    let (version, ascii, top_nodes) = if is_binary(data) {
        let mut cache = inflate::InflateCache::new();
        let (version, nodes) = parser::binary::parse(data, &mut strings, &mut cache, opts)?;
        (version, false, nodes)
    } else {
        let text = std::str::from_utf8(data)
            .map_err(|e| Error::new(ufbx_data::error::ErrorKind::BadString, "load_bytes", line!(), format!("ASCII FBX is not valid UTF-8: {e}")))?;
        let (version, nodes) = parser::ascii::parse(text, &mut strings, opts)?;
        (version, true, nodes)
    };

    let top = toplevel::TopLevel::new(&top_nodes);
    let creator = top.creator().unwrap_or("").to_string();
    let warnings = connect::collect_warnings(&top);

    let mut scene = connect::build_root(&top, version, ascii, &creator, opts);
    finalize::finalize(&mut scene, opts)?;

    if !matches!(opts.validation, ValidationStrategy::Skip) {
        validate(&scene, opts)?;
    }

    Ok(LoadResult { scene, warnings })
}

/// Runs [`ufbx_data::validation::Validate`] over the finalized scene
/// per [`ValidationStrategy`] (`SPEC_FULL` §1 "Configuration"), collecting
/// every failure into one [`Error::Validation`] rather than stopping at
/// the first.
fn validate(scene: &Scene, opts: &LoadOpts) -> Result<()> {
    use ufbx_data::validation::Validate;
    let mut errors = Vec::new();
    let mut report = |path: &dyn Fn() -> ufbx_data::Path, err: ufbx_data::validation::Error| {
        errors.push((path(), err));
    };
    scene.validate_minimally(scene, ufbx_data::Path::new, &mut report);
    if matches!(opts.validation, ValidationStrategy::Complete) {
        scene.validate_completely(scene, ufbx_data::Path::new, &mut report);
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(errors))
    }
}

/// Loads an in-memory FBX byte buffer (spec §6 "a memory span").
pub fn load_memory(data: &[u8], opts: LoadOpts) -> Result<LoadResult> {
    load_bytes(data, &opts)
}

/// Loads an FBX file from disk (spec §6 "a file path (opened internally)").
pub fn load_file(path: impl AsRef<Path>, opts: LoadOpts) -> Result<LoadResult> {
    let data = std::fs::read(path.as_ref())?;
    load_bytes(&data, &opts)
}

/// Loads from a caller-supplied pull callback (spec §4.1, §6 "a user
/// callback `read(user, dst, max) -> bytes_read`"). `read` returns `0` at
/// end-of-stream; the whole stream is buffered up front since format
/// dispatch must see the (up to 23-byte) magic before either front end can
/// start (spec §2 "peeks the magic bytes and selects binary or ASCII
/// mode").
pub fn load_from_reader(read: impl FnMut(&mut [u8]) -> usize, opts: LoadOpts) -> Result<LoadResult> {
    let data = import::Source::from_reader(read).read_all()?;
    load_bytes(&data, &opts)
}

pub use evaluate::{evaluate_curve, evaluate_scene, evaluate_transform};
pub use triangulate::triangulate;

#[cfg(test)]
mod tests {
    use super::*;

    fn ascii_cube_source() -> &'static str {
        r#"; FBX 7.4.0 project file
FBXHeaderExtension:  {
    Creator: "test-suite"
}
Objects:  {
    Model: 1000, "Model::Cube", "Mesh" {
        Properties70:  {
        }
    }
    Geometry: 2000, "Geometry::Cube", "Mesh" {
        Vertices: *24 {
            a: 0,0,0, 1,0,0, 1,1,0, 0,1,0, 0,0,1, 1,0,1, 1,1,1, 0,1,1
        }
        PolygonVertexIndex: *16 {
            a: 0,1,2,-4, 4,5,6,-8, 0,1,5,-5
        }
    }
}
Connections:  {
    C: "OO",2000,1000
}
"#
    }

    #[test]
    fn loads_minimal_ascii_scene() {
        let result = load_memory(ascii_cube_source().as_bytes(), LoadOpts::default()).expect("load should succeed");
        assert!(result.scene.metadata.ascii);
        assert_eq!(7400, result.scene.metadata.version);
        assert_eq!(1, result.scene.nodes.len());
        assert_eq!(1, result.scene.meshes.len());
        assert_eq!(8, result.scene.meshes[0].num_vertices);
        assert_eq!(3, result.scene.meshes[0].faces.len());
    }

    #[test]
    fn rejects_truncated_binary_magic() {
        let mut data = parser::binary::MAGIC.to_vec();
        data.truncate(10);
        let err = load_memory(&data, LoadOpts::default()).unwrap_err();
        assert!(matches!(err, Error::Load(_)));
    }

    #[test]
    fn load_from_reader_matches_load_memory() {
        let bytes = ascii_cube_source().as_bytes();
        let mut cursor = 0usize;
        let result = load_from_reader(
            |dst| {
                let remaining = bytes.len() - cursor;
                let n = remaining.min(dst.len());
                dst[..n].copy_from_slice(&bytes[cursor..cursor + n]);
                cursor += n;
                n
            },
            LoadOpts::default(),
        )
        .expect("load should succeed");
        assert_eq!(1, result.scene.meshes.len());
    }
}
