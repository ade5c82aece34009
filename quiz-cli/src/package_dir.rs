//! A package materialised as a plain directory tree
//!
//! Blob paths always use `/`, whatever the platform separator is.

use quiz_babel::{Asset, Package};
use std::fs;
use std::io;
use std::path::Path;

/// Read every file under `root` into a package
pub fn read_package(root: &Path) -> io::Result<Package> {
    let mut package = Package::new();
    read_into(root, "", &mut package)?;
    tracing::debug!(root = %root.display(), blobs = package.len(), "read package directory");
    Ok(package)
}

fn read_into(dir: &Path, prefix: &str, package: &mut Package) -> io::Result<()> {
    let mut entries = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|entry| entry.file_name());
    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        let blob_path = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };
        if entry.file_type()?.is_dir() {
            read_into(&entry.path(), &blob_path, package)?;
        } else {
            package.insert(blob_path, fs::read(entry.path())?);
        }
    }
    Ok(())
}

/// Write every blob of `package` below `root`, creating directories as needed
pub fn write_package(root: &Path, package: &Package) -> io::Result<()> {
    for (blob_path, bytes) in package.iter() {
        let target = blob_path
            .split('/')
            .fold(root.to_path_buf(), |path, part| path.join(part));
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, bytes)?;
    }
    Ok(())
}

/// Every regular file directly inside `dir`, as an asset named after the file
pub fn read_assets(dir: &Path) -> io::Result<Vec<Asset>> {
    let mut assets = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            let name = entry.file_name().to_string_lossy().into_owned();
            assets.push(Asset::new(name, fs::read(entry.path())?));
        }
    }
    assets.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(assets)
}

/// Write assets into `dir`, one file each
pub fn write_assets(dir: &Path, assets: &[Asset]) -> io::Result<()> {
    for asset in assets {
        let target = dir.join(&asset.name);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(target, &asset.bytes)?;
    }
    Ok(())
}
