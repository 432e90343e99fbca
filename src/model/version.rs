use std::{cmp::Ordering, fmt};

/// A parsed release version: dotted numeric components followed by optional pre-release identifiers.
///
/// Both `v6.2.0-beta.1` and `6.2.0-beta.1` parse to the same value, a single leading `v` is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseVersion {
    core: Vec<u64>,
    pre: Vec<Identifier>,
}

/// A single pre-release identifier
#[derive(Debug, Clone, PartialEq, Eq)]
enum Identifier {
    Numeric(u64),
    Qualifier(Qualifier),
}

/// Word identifiers, sorted from the least to the most mature
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Qualifier {
    Other(String),
    Dev,
    Alpha,
    Beta,
    ReleaseCandidate,
}

impl ReleaseVersion {
    /// Parses a version string, returning `None` if it's not a dotted numeric version
    pub fn parse(version: &str) -> Option<Self> {
        let version = strip_marker(version.trim());
        let core_end = version
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(version.len());
        let (core_str, rest) = version.split_at(core_end);

        let core = core_str
            .split('.')
            .map(|part| part.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()?;

        let pre = rest
            .trim_start_matches(['-', '+', '_', '.'])
            .split(['.', '-', '_', '+'])
            .filter(|part| !part.is_empty())
            .map(Identifier::parse)
            .collect();

        Some(Self { core, pre })
    }

    /// Whether this version carries pre-release identifiers
    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }
}

impl Identifier {
    fn parse(part: &str) -> Self {
        if let Ok(num) = part.parse::<u64>() {
            return Identifier::Numeric(num);
        }
        let word = part.to_ascii_lowercase();
        Identifier::Qualifier(match word.as_str() {
            "dev" => Qualifier::Dev,
            "alpha" | "a" => Qualifier::Alpha,
            "beta" | "b" => Qualifier::Beta,
            "rc" => Qualifier::ReleaseCandidate,
            _ => Qualifier::Other(word),
        })
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Identifier::Numeric(a), Identifier::Numeric(b)) => a.cmp(b),
            (Identifier::Numeric(_), Identifier::Qualifier(_)) => Ordering::Less,
            (Identifier::Qualifier(_), Identifier::Numeric(_)) => Ordering::Greater,
            (Identifier::Qualifier(a), Identifier::Qualifier(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReleaseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        // Missing numeric components count as zero, so `1.0` equals `1.0.0`
        let len = self.core.len().max(other.core.len());
        let core = (0..len)
            .map(|i| {
                let a = self.core.get(i).copied().unwrap_or_default();
                let b = other.core.get(i).copied().unwrap_or_default();
                a.cmp(&b)
            })
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal);

        core.then_with(|| match (self.pre.is_empty(), other.pre.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.pre.cmp(&other.pre),
        })
    }
}

impl PartialOrd for ReleaseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.core.iter().map(u64::to_string).collect::<Vec<_>>().join(".");
        write!(f, "{core}")?;
        for (idx, id) in self.pre.iter().enumerate() {
            f.write_str(if idx == 0 { "-" } else { "." })?;
            match id {
                Identifier::Numeric(num) => write!(f, "{num}")?,
                Identifier::Qualifier(Qualifier::Dev) => f.write_str("dev")?,
                Identifier::Qualifier(Qualifier::Alpha) => f.write_str("alpha")?,
                Identifier::Qualifier(Qualifier::Beta) => f.write_str("beta")?,
                Identifier::Qualifier(Qualifier::ReleaseCandidate) => f.write_str("rc")?,
                Identifier::Qualifier(Qualifier::Other(word)) => f.write_str(word)?,
            }
        }
        Ok(())
    }
}

/// Compares two version strings.
///
/// A single leading `v` is ignored on both sides. Numeric components compare numerically and a pre-release sorts
/// below the same numeric version without one. When either side isn't a dotted numeric version, both strings are
/// compared lexicographically instead.
pub fn compare(a: &str, b: &str) -> Ordering {
    match (ReleaseVersion::parse(a), ReleaseVersion::parse(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => strip_marker(a.trim()).cmp(strip_marker(b.trim())),
    }
}

/// Whether `current` is strictly newer than `previous`
pub fn is_newer(current: &str, previous: &str) -> bool {
    let newer = compare(current, previous) == Ordering::Greater;
    tracing::trace!("Compare {current} with {previous}: newer={newer}");
    newer
}

fn strip_marker(version: &str) -> &str {
    version
        .strip_prefix('v')
        .or_else(|| version.strip_prefix('V'))
        .unwrap_or(version)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_compare_reflexive() {
        for v in [
            "v1.0.0",
            "6.2.0-beta.1",
            "v6.2.0-dev-release.3",
            "v0.1",
            "latest",
            "",
            "v",
        ] {
            assert_eq!(compare(v, v), Ordering::Equal, "{v} should equal itself");
        }
    }

    #[test]
    fn test_compare_numeric() {
        assert_eq!(compare("v1.2.0", "v1.1.9"), Ordering::Greater);
        assert_eq!(compare("v1.10.0", "v1.9.0"), Ordering::Greater);
        assert_eq!(compare("v0.9", "v1.0"), Ordering::Less);
        assert_eq!(compare("1.0", "1.0.0"), Ordering::Equal);
    }

    #[test]
    fn test_compare_leading_marker() {
        assert_eq!(compare("1.0.0", "v1.0.0"), Ordering::Equal);
        assert_eq!(compare("v2.0.0", "1.9.9"), Ordering::Greater);
    }

    #[test]
    fn test_compare_prerelease() {
        assert_eq!(compare("v2.0.0-beta.1", "v2.0.0"), Ordering::Less);
        assert_eq!(compare("v2.0.0-beta.2", "v2.0.0-beta.1"), Ordering::Greater);
        assert_eq!(compare("v2.0.0-beta.1", "v2.0.0-alpha.4"), Ordering::Greater);
        assert_eq!(compare("v2.0.0-rc.1", "v2.0.0-beta.9"), Ordering::Greater);
        assert_eq!(compare("v6.2.0-dev-release.3", "v6.2.0-alpha.1"), Ordering::Less);
        assert_eq!(compare("v0.1-beta.0", "v0.1-alpha.0"), Ordering::Greater);
        assert_eq!(compare("v2.0.0-beta.1", "v1.9.9"), Ordering::Greater);
    }

    #[test]
    fn test_compare_unparseable_falls_back_to_lexical() {
        assert_eq!(compare("latest", "nightly"), Ordering::Less);
        assert_eq!(compare("vnext", "next"), Ordering::Equal);
        assert_eq!(compare("1..2", "1..3"), Ordering::Less);
    }

    #[test]
    fn test_is_newer() {
        assert!(is_newer("v6.1.2", "v6.1.1"));
        assert!(is_newer("v1.0", "v0.1"));
        assert!(!is_newer("v6.1.1", "v6.1.1"));
        assert!(!is_newer("v6.1.0", "v6.1.1"));
    }

    #[test]
    fn test_parse_and_display() {
        let version = ReleaseVersion::parse("v6.2.0-Beta.1").unwrap();
        assert!(version.is_prerelease());
        assert_eq!(version.to_string(), "6.2.0-beta.1");
        assert!(!ReleaseVersion::parse("6.1.2").unwrap().is_prerelease());
        assert!(ReleaseVersion::parse("release").is_none());
        assert!(ReleaseVersion::parse("1..2").is_none());
    }
}
