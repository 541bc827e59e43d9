use crate::error::{RestoreError, RestoreResult};
use lazy_static::lazy_static;
use regex::Regex;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tar::Archive;
use xz2::read::XzDecoder;

lazy_static! {
    static ref FILE_NAME_RE: Regex =
        Regex::new(r"^(.+?)-([^-]+-[^-]+)-([^-]+)\.pkg\.tar\.xz$").unwrap();
}

const DESCRIPTOR_NAME: &str = ".PKGINFO";

/// One cached package file, identified from its file name alone. The
/// embedded descriptor is only read when `read_metadata` is called.
#[derive(Debug, Clone)]
pub struct ArchiveRecord {
    pub path: PathBuf,
    pub name: String,
    pub version: String,
    pub architecture: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveMetadata {
    pub dependencies: Vec<String>,
    pub architecture: Option<String>,
    pub license: Option<String>,
}

impl ArchiveRecord {
    pub fn from_path(path: &Path) -> RestoreResult<Self> {
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        let caps = FILE_NAME_RE.captures(file_name).ok_or_else(|| {
            RestoreError::InvalidPackageFormat(path.display().to_string())
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            name: caps[1].to_string(),
            version: caps[2].to_string(),
            architecture: caps[3].to_string(),
        })
    }

    /// Extracts and parses the `.PKGINFO` descriptor. Reading the same path
    /// twice yields the same result.
    pub fn read_metadata(&self) -> RestoreResult<ArchiveMetadata> {
        let invalid = || RestoreError::InvalidPackageFormat(self.path.display().to_string());

        let file = File::open(&self.path).map_err(|_| invalid())?;
        let mut archive = Archive::new(XzDecoder::new(file));
        for entry in archive.entries().map_err(|_| invalid())? {
            let mut entry = entry.map_err(|_| invalid())?;
            let is_descriptor = entry
                .path()
                .map(|p| p.as_ref() == Path::new(DESCRIPTOR_NAME))
                .unwrap_or(false);
            if !is_descriptor {
                continue;
            }
            let mut content = String::new();
            entry.read_to_string(&mut content).map_err(|_| invalid())?;
            return Ok(parse_descriptor(&content));
        }
        Err(invalid())
    }
}

// descriptor lines are `<key> = <value>`, one per line; `depend` may repeat
fn parse_descriptor(content: &str) -> ArchiveMetadata {
    let mut metadata = ArchiveMetadata::default();
    for line in content.lines() {
        let Some((key, value)) = line.split_once(" = ") else {
            continue;
        };
        match key {
            "depend" => metadata
                .dependencies
                .push(strip_version_constraint(value).to_string()),
            "arch" => metadata.architecture = Some(value.to_string()),
            "license" => metadata.license = Some(value.to_string()),
            _ => {}
        }
    }
    metadata
}

/// Cuts a trailing version constraint (`<`, `<=`, `>`, `>=`) off a
/// dependency value, leaving the bare package name.
pub fn strip_version_constraint(dependency: &str) -> &str {
    match dependency.find(|c| c == '<' || c == '>') {
        Some(pos) => &dependency[..pos],
        None => dependency,
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use std::path::{Path, PathBuf};

    pub fn write_archive(dir: &Path, file_name: &str, pkginfo: &str) -> PathBuf {
        let path = dir.join(file_name);
        let file = std::fs::File::create(&path).unwrap();
        let encoder = xz2::write::XzEncoder::new(file, 6);
        let mut builder = tar::Builder::new(encoder);
        let data = pkginfo.as_bytes();
        let mut header = tar::Header::new_gnu();
        header.set_mode(0o644);
        header.set_size(data.len() as u64);
        header.set_cksum();
        builder.append_data(&mut header, ".PKGINFO", data).unwrap();
        builder.into_inner().unwrap().finish().unwrap();
        path
    }

    pub fn write_empty_archive(dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        let file = std::fs::File::create(&path).unwrap();
        let encoder = xz2::write::XzEncoder::new(file, 6);
        let mut builder = tar::Builder::new(encoder);
        let mut header = tar::Header::new_gnu();
        header.set_mode(0o644);
        header.set_size(0);
        header.set_cksum();
        builder.append_data(&mut header, "dummy", &b""[..]).unwrap();
        builder.into_inner().unwrap().finish().unwrap();
        path
    }
}
