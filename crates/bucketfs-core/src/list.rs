//! The prefix/delimiter listing engine.
//!
//! Walks a bucket's key space under an optional prefix and groups results
//! into flat objects and "common prefixes" (S3's pseudo-directory
//! semantics):
//!
//! - Empty delimiter: every file under the prefix becomes an object; the
//!   walk recurses the whole subtree.
//! - Delimiter `/`: direct children only; a subdirectory becomes one common
//!   prefix entry `"{relative_path}/"` and is not recursed into.
//! - Any other delimiter: `NotImplemented`.
//!
//! Per object the engine reports key, size, modification time, and a hex
//! MD5 etag. Etags are recomputed from file content at listing time; there
//! is no checksum cache, so a listing costs one full read per object.
//!
//! Directory entries are visited in name order and common prefixes are kept
//! in a sorted set, so repeated listings over an unchanged tree return
//! identical results.

use std::fs::DirEntry;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use md5::{Digest, Md5};

use bucketfs_model::{ErrorCode, GatewayError, ListingResult, ObjectMeta};

/// List the objects of a bucket rooted at `bucket_root`.
///
/// `prefix` is interpreted as a directory path relative to the bucket root;
/// a prefix with no corresponding directory yields an empty result, the way
/// S3 answers a listing under a prefix with no keys.
///
/// # Errors
///
/// Returns `NoSuchBucket` if `bucket_root` itself does not exist,
/// `NotImplemented` for delimiters other than empty or `/`, and
/// `InternalError` for filesystem failures mid-walk.
pub fn list_objects(
    bucket_root: &Path,
    prefix: &str,
    delimiter: &str,
) -> Result<ListingResult, GatewayError> {
    if !bucket_root.is_dir() {
        return Err(GatewayError::new(ErrorCode::NoSuchBucket));
    }
    validate_prefix(prefix)?;

    let start = if prefix.is_empty() {
        bucket_root.to_path_buf()
    } else {
        bucket_root.join(prefix.trim_end_matches('/'))
    };

    let mut result = ListingResult::default();
    if !start.is_dir() {
        return Ok(result);
    }

    match delimiter {
        "" => walk_recursive(&start, bucket_root, &mut result)
            .map_err(|e| walk_error(&start, &e))?,
        "/" => walk_one_level(&start, bucket_root, &mut result)
            .map_err(|e| walk_error(&start, &e))?,
        other => {
            return Err(GatewayError::not_implemented(format!(
                "delimiter {other:?} is not supported"
            )));
        }
    }

    Ok(result)
}

/// Full recursive listing: every file under `dir` becomes an object.
fn walk_recursive(dir: &Path, bucket_root: &Path, out: &mut ListingResult) -> io::Result<()> {
    for entry in sorted_entries(dir)? {
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            walk_recursive(&entry.path(), bucket_root, out)?;
        } else if file_type.is_file() {
            out.objects.push(object_meta(bucket_root, &entry)?);
        }
    }
    Ok(())
}

/// One-level listing: files become objects, subdirectories become common
/// prefixes and are not descended into.
fn walk_one_level(dir: &Path, bucket_root: &Path, out: &mut ListingResult) -> io::Result<()> {
    for entry in sorted_entries(dir)? {
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            let rel = relative_key(bucket_root, &entry.path())?;
            out.common_prefixes.insert(format!("{rel}/"));
        } else if file_type.is_file() {
            out.objects.push(object_meta(bucket_root, &entry)?);
        }
    }
    Ok(())
}

/// Read a directory's entries sorted by file name, for deterministic
/// listing order across repeated calls.
fn sorted_entries(dir: &Path) -> io::Result<Vec<DirEntry>> {
    let mut entries = std::fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(DirEntry::file_name);
    Ok(entries)
}

/// Build the [`ObjectMeta`] for one file entry, reading its content to
/// compute the MD5 etag.
fn object_meta(bucket_root: &Path, entry: &DirEntry) -> io::Result<ObjectMeta> {
    let path = entry.path();
    let metadata = entry.metadata()?;
    let data = std::fs::read(&path)?;
    let last_modified: DateTime<Utc> = metadata.modified()?.into();

    Ok(ObjectMeta {
        key: relative_key(bucket_root, &path)?,
        size: metadata.len(),
        last_modified,
        etag: hex::encode(Md5::digest(&data)),
    })
}

/// The key of `path` relative to the bucket root, with `/` separators.
fn relative_key(bucket_root: &Path, path: &Path) -> io::Result<String> {
    let rel = path
        .strip_prefix(bucket_root)
        .map_err(|_| io::Error::other("entry escaped bucket root"))?;
    let mut key = String::new();
    for component in rel.components() {
        if !key.is_empty() {
            key.push('/');
        }
        key.push_str(&component.as_os_str().to_string_lossy());
    }
    Ok(key)
}

/// Reject prefixes that would escape the bucket subtree.
fn validate_prefix(prefix: &str) -> Result<(), GatewayError> {
    if prefix.starts_with('/')
        || prefix
            .split('/')
            .any(|component| component == ".." || component == ".")
    {
        return Err(GatewayError::invalid_argument(format!(
            "invalid listing prefix: {prefix:?}"
        )));
    }
    Ok(())
}

fn walk_error(dir: &Path, err: &io::Error) -> GatewayError {
    GatewayError::internal(format!("listing walk at {}: {err}", dir.display()))
}
