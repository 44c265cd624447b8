//! Bootstrap loading of the authoritative TRC.
//!
//! At process start, before the service accepts network traffic, the
//! operator's configuration directory is scanned for TRC files of the local
//! domain (`ISD{isd}-V{version}.trc`, JSON) and each is inserted into the
//! trust database. Insertion is idempotent, so re-running bootstrap over an
//! already-seeded store is harmless.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use tfab_types::{Isd, Trc};

use crate::ctx::OpCtx;
use crate::error::{TrustDbError, TrustDbResult};
use crate::traits::TrustDb;

/// Canonical file name for a TRC on disk.
pub fn trc_file_name(isd: Isd, version: u64) -> String {
    format!("ISD{isd}-V{version}.trc")
}

/// Read and structurally parse a single TRC file.
pub fn load_trc_file(path: &Path) -> TrustDbResult<Trc> {
    let raw = fs::read(path)?;
    Ok(Trc::from_json_bytes(&raw)?)
}

/// Load every TRC of `isd` from `dir` into the store and return the one
/// with the highest version.
///
/// Files that fail to parse, or that belong to a different domain, are
/// skipped with a warning; discovery is by the `ISD{isd}-V*.trc` naming
/// convention but the payload's own identity is authoritative. Fails with
/// [`TrustDbError::MissingAuthoritativeTrc`] if no usable TRC is found.
pub async fn load_authoritative_trc(
    ctx: &OpCtx,
    db: &impl TrustDb,
    dir: &Path,
    isd: Isd,
) -> TrustDbResult<Trc> {
    let prefix = format!("ISD{isd}-V");
    let mut authoritative: Option<Trc> = None;

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => continue,
        };
        if !name.starts_with(&prefix) || !name.ends_with(".trc") {
            continue;
        }
        let trc = match load_trc_file(&path) {
            Ok(trc) => trc,
            Err(e) => {
                warn!("skipping unreadable TRC file {:?}: {}", path, e);
                continue;
            }
        };
        if trc.isd != isd {
            warn!(
                "skipping TRC file {:?}: payload names ISD {}, expected {}",
                path, trc.isd, isd
            );
            continue;
        }
        db.insert_trc(ctx, &trc).await?;
        info!(isd = %trc.isd, version = trc.version, "loaded TRC from {:?}", path);
        if authoritative
            .as_ref()
            .map_or(true, |best| trc.version > best.version)
        {
            authoritative = Some(trc);
        }
    }

    authoritative.ok_or_else(|| TrustDbError::MissingAuthoritativeTrc(isd, dir.to_path_buf()))
}
