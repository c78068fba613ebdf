//! Object addresses of the form `bucket/key/.../name`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::AddressError;

/// A normalized object address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Bucket name (first path segment).
    pub bucket: String,
    /// Object key inside the bucket (everything after the first `/`).
    pub key: String,
    /// Display name (last key segment), also used as the local file name.
    pub name: String,
}

impl ObjectRef {
    /// Parses a `bucket/key` string.
    pub fn parse(address: &str) -> Result<Self, AddressError> {
        let (bucket, key) =
            address
                .split_once('/')
                .ok_or_else(|| AddressError::MissingSeparator {
                    address: address.to_string(),
                })?;

        if bucket.is_empty() {
            return Err(AddressError::EmptyBucket {
                address: address.to_string(),
            });
        }
        if key.is_empty() {
            return Err(AddressError::EmptyKey {
                address: address.to_string(),
            });
        }

        // basename semantics: "dir/sub/" names "sub"
        let name = key
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default();

        if name.is_empty() || name == "." || name == ".." {
            return Err(AddressError::InvalidName {
                address: address.to_string(),
            });
        }

        Ok(Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
            name: name.to_string(),
        })
    }

    /// Returns the full `bucket/key` address.
    pub fn full_key(&self) -> String {
        format!("{}/{}", self.bucket, self.key)
    }
}

impl FromStr for ObjectRef {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_key() {
        let r = ObjectRef::parse("bucket-a/folder/sub/file1.txt").unwrap();
        assert_eq!(r.bucket, "bucket-a");
        assert_eq!(r.key, "folder/sub/file1.txt");
        assert_eq!(r.name, "file1.txt");
    }

    #[test]
    fn test_parse_single_segment_key() {
        let r = ObjectRef::parse("bucket/file.bin").unwrap();
        assert_eq!(r.key, "file.bin");
        assert_eq!(r.name, "file.bin");
    }

    #[test]
    fn test_full_key_reconstructs_input() {
        for address in [
            "b/k",
            "bucket-a/folder/file1.txt",
            "bucket/a/b/c/d.tar.gz",
            "bucket/with space/x y.txt",
        ] {
            let r: ObjectRef = address.parse().unwrap();
            assert_eq!(r.full_key(), address);
            assert_eq!(r.to_string(), address);
            assert_eq!(r.bucket, address.split('/').next().unwrap());
            assert_eq!(r.name, address.rsplit('/').next().unwrap());
        }
    }

    #[test]
    fn test_trailing_slash_uses_basename() {
        let r = ObjectRef::parse("bucket/dir/sub/").unwrap();
        assert_eq!(r.key, "dir/sub/");
        assert_eq!(r.name, "sub");
    }

    #[test]
    fn test_no_separator_is_malformed() {
        let err = ObjectRef::parse("just-a-bucket").unwrap_err();
        assert!(matches!(err, AddressError::MissingSeparator { .. }));
    }

    #[test]
    fn test_empty_parts_are_malformed() {
        assert!(matches!(
            ObjectRef::parse("/key.txt"),
            Err(AddressError::EmptyBucket { .. })
        ));
        assert!(matches!(
            ObjectRef::parse("bucket/"),
            Err(AddressError::EmptyKey { .. })
        ));
        assert!(matches!(
            ObjectRef::parse("bucket/dir/.."),
            Err(AddressError::InvalidName { .. })
        ));
        assert!(matches!(
            ObjectRef::parse("bucket///"),
            Err(AddressError::InvalidName { .. })
        ));
    }
}
