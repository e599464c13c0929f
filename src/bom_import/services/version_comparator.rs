use crate::bom_import::domain::ProjectVersion;
use std::cmp::Ordering;

/// Orders dotted-numeric version strings such as `1.2.3`.
///
/// Segments are compared numerically one by one; a missing segment counts
/// as 0, so `1.0` and `1.0.0` are equal. A segment's value is its leading
/// decimal digits (`3rc1` is 3, `beta` is 0).
pub struct VersionComparator;

impl VersionComparator {
    pub fn compare(a: &str, b: &str) -> Ordering {
        let left = Self::segments(a);
        let right = Self::segments(b);
        let len = left.len().max(right.len());

        (0..len)
            .map(|i| {
                let l = left.get(i).copied().unwrap_or(0);
                let r = right.get(i).copied().unwrap_or(0);
                l.cmp(&r)
            })
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }

    /// Highest version of the list; the earliest entry wins a tie
    pub fn latest(versions: &[ProjectVersion]) -> Option<&ProjectVersion> {
        versions.iter().fold(None, |best, current| match best {
            Some(b) if Self::compare(&current.version, &b.version) != Ordering::Greater => Some(b),
            _ => Some(current),
        })
    }

    fn segments(version: &str) -> Vec<u64> {
        version
            .trim()
            .trim_start_matches(['v', 'V'])
            .split('.')
            .map(|segment| {
                let digits: String = segment.chars().take_while(|c| c.is_ascii_digit()).collect();
                digits.parse::<u64>().unwrap_or(0)
            })
            .collect()
    }
}
