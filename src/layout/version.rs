use super::LayoutError;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt::Display;
use std::str::FromStr;

/// MUMPS library version `major.minor.patch`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MumpsVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

/// oldest MUMPS release whose C structure layout is known
pub const MIN_SUPPORTED_VERSION: MumpsVersion = MumpsVersion::new(4, 10, 0);
/// newest MUMPS release whose C structure layout is known
pub const MAX_SUPPORTED_VERSION: MumpsVersion = MumpsVersion::new(5, 7, 999);

impl MumpsVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Integer form of the version, three decimal digits per
    /// component (`5.2.1 -> 5002001`).
    pub fn as_int(&self) -> u64 {
        self.patch as u64 + 1_000 * self.minor as u64 + 1_000_000 * self.major as u64
    }

    pub fn is_supported(&self) -> bool {
        self.as_int() >= MIN_SUPPORTED_VERSION.as_int()
            && self.as_int() <= MAX_SUPPORTED_VERSION.as_int()
    }
}

impl Display for MumpsVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for MumpsVersion {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || LayoutError::BadVersionString(s.to_string());
        let parts = s
            .trim()
            .split('.')
            .map(|p| p.parse::<u32>().map_err(|_| bad()))
            .collect::<Result<Vec<u32>, _>>()?;

        match parts[..] {
            [major, minor, patch] => Ok(MumpsVersion::new(major, minor, patch)),
            _ => Err(bad()),
        }
    }
}

lazy_static! {
    // greedy prefix: the last "x.y.z" in the text wins
    static ref VERSION_RE: Regex = Regex::new(r"^.*(\d)\.(\d+)\.(\d+).*$").unwrap();
}

/// Locate a version number in raw bytes written by MUMPS.
///
/// All bytes outside the range `'.'..='9'` are discarded first, so that
/// the version string is found even when the structure layout used to
/// receive it is not the one the library was built with.
pub fn find_version(bytes: &[u8]) -> Option<MumpsVersion> {
    let text: String = bytes
        .iter()
        .filter(|&&b| (b'.'..=b'9').contains(&b))
        .map(|&b| b as char)
        .collect();

    let caps = VERSION_RE.captures(&text)?;
    let part = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    Some(MumpsVersion::new(part(1)?, part(2)?, part(3)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_int() {
        assert_eq!(MumpsVersion::new(5, 2, 1).as_int(), 5002001);
        assert_eq!(MumpsVersion::new(4, 10, 0).as_int(), 4010000);
    }

    #[test]
    fn test_version_parse() {
        let v: MumpsVersion = "5.6.2".parse().unwrap();
        assert_eq!(v, MumpsVersion::new(5, 6, 2));
        assert_eq!(v.to_string(), "5.6.2");
        assert!("5.6".parse::<MumpsVersion>().is_err());
        assert!("5.x.1".parse::<MumpsVersion>().is_err());
    }

    #[test]
    fn test_supported_range() {
        assert!(MumpsVersion::new(4, 10, 0).is_supported());
        assert!(MumpsVersion::new(5, 7, 3).is_supported());
        assert!(!MumpsVersion::new(4, 9, 2).is_supported());
        assert!(!MumpsVersion::new(5, 8, 0).is_supported());
    }

    #[test]
    fn test_find_version_in_noise() {
        let mut aux = vec![0u8; 64];
        aux[3] = 7;
        aux[10..15].copy_from_slice(b"5.4.1");
        aux[15] = b' ';
        aux[20] = 200;
        assert_eq!(find_version(&aux), Some(MumpsVersion::new(5, 4, 1)));
    }

    #[test]
    fn test_find_version_takes_last() {
        assert_eq!(
            find_version(b"1.2.3  x  4.10.0\0\0"),
            Some(MumpsVersion::new(4, 10, 0))
        );
    }

    #[test]
    fn test_find_version_missing() {
        assert_eq!(find_version(&[0u8; 32]), None);
        assert_eq!(find_version(b"5.4"), None);
    }
}
