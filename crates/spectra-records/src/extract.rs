use crate::errors::Result;
use log::{debug, warn};
use std::fs;
use std::path::Path;
use zip::ZipArchive;

/// Unpack a downloaded file into `dest`.
///
/// Zip archives are extracted; anything else is copied as-is.
pub fn extract_into(file_path: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest)?;
    if is_zip(file_path) {
        unzip_into(file_path, dest)
    } else {
        let name = file_path.file_name().unwrap_or_default();
        fs::copy(file_path, dest.join(name))?;
        Ok(())
    }
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("zip"))
        .unwrap_or(false)
}

pub fn unzip_into(zip_path: &Path, dest: &Path) -> Result<()> {
    let f = fs::File::open(zip_path)?;
    let mut archive = ZipArchive::new(f)?;
    fs::create_dir_all(dest)?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let Some(relative) = file.enclosed_name().map(|p| p.to_path_buf()) else {
            warn!(
                "skipping unsafe entry {:?} in {}",
                file.name(),
                zip_path.display()
            );
            continue;
        };
        let outpath = dest.join(relative);
        if file.is_dir() {
            fs::create_dir_all(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = fs::File::create(&outpath)?;
            std::io::copy(&mut file, &mut out)?;
            debug!("extracted {}", outpath.display());
        }
    }
    Ok(())
}
