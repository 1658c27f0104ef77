//! Fuzzy association of channel files with preview bitmaps.
//!
//! There is no key linking a channel file to its preview. Instrument software
//! names both after the channel, with spacing and case varying, so the join is
//! a containment test on normalized stems that can return zero, one or many
//! candidates.

/// Strip all spaces and lowercase.
#[must_use]
pub fn normalize_stem(stem: &str) -> String {
    stem.chars()
        .filter(|&c| c != ' ')
        .flat_map(char::to_lowercase)
        .collect()
}

/// True when the normalized bitmap stem contains the normalized channel stem.
#[must_use]
pub fn stem_matches(channel_stem: &str, bitmap_stem: &str) -> bool {
    normalize_stem(bitmap_stem).contains(&normalize_stem(channel_stem))
}

/// Outcome of correlating one channel with the candidate bitmaps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Correlation<T> {
    /// No candidate matched.
    None,
    /// Exactly one candidate matched.
    Unique(T),
    /// Several matched; the first in listing order was chosen.
    Ambiguous { chosen: T, candidates: Vec<T> },
}

impl<T: Clone> Correlation<T> {
    /// Classify an ordered match list.
    #[must_use]
    pub fn from_matches(mut matches: Vec<T>) -> Self {
        match matches.len() {
            0 => Self::None,
            1 => Self::Unique(matches.remove(0)),
            _ => Self::Ambiguous {
                chosen: matches[0].clone(),
                candidates: matches,
            },
        }
    }

    /// The selected candidate, if any.
    #[must_use]
    pub fn chosen(&self) -> Option<&T> {
        match self {
            Self::None => None,
            Self::Unique(chosen) | Self::Ambiguous { chosen, .. } => Some(chosen),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_stem("Image 01"), "image01");
        assert_eq!(normalize_stem(" Topo Fwd "), "topofwd");
        assert_eq!(normalize_stem(""), "");
    }

    #[test]
    fn test_containment_not_equality() {
        assert!(stem_matches("Image 01", "image01_preview"));
        assert!(!stem_matches("Image 01", "other"));
        // Containment anywhere, not just as a prefix.
        assert!(stem_matches("TopoFwd", "scan_0003 topofwd"));
        assert!(!stem_matches("TopoFwdLong", "TopoFwd"));
    }

    #[test]
    fn test_filter_candidates() {
        let stems = ["image01_preview", "other"];
        let matches: Vec<_> = stems
            .iter()
            .filter(|s| stem_matches("Image 01", s))
            .collect();
        assert_eq!(matches, vec![&"image01_preview"]);
    }

    #[test]
    fn test_correlation_classification() {
        assert_eq!(Correlation::<u8>::from_matches(vec![]), Correlation::None);
        assert_eq!(Correlation::from_matches(vec![3]), Correlation::Unique(3));

        let ambiguous = Correlation::from_matches(vec![5, 7]);
        assert_eq!(ambiguous.chosen(), Some(&5));
        assert_eq!(
            ambiguous,
            Correlation::Ambiguous {
                chosen: 5,
                candidates: vec![5, 7]
            }
        );
    }
}
