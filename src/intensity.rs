use serde::Serialize;

/// Heatmap shading tiers, from an empty cell up to the busiest hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityTier {
    Zero,
    Faint,
    Light,
    Medium,
    Strong,
    Peak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorPair {
    pub background: &'static str,
    pub foreground: &'static str,
}

impl IntensityTier {
    /// Picks a tier from `sqrt(value / max_value)`.
    ///
    /// A non-zero value against a zero ceiling is treated as `Peak`.
    pub fn classify(value: u64, max_value: u64) -> Self {
        if value == 0 {
            return Self::Zero;
        }
        if max_value == 0 {
            return Self::Peak;
        }
        let intensity = (value as f64 / max_value as f64).sqrt();
        if intensity > 0.85 {
            Self::Peak
        } else if intensity > 0.65 {
            Self::Strong
        } else if intensity > 0.45 {
            Self::Medium
        } else if intensity > 0.20 {
            Self::Light
        } else {
            Self::Faint
        }
    }

    pub fn colors(self) -> ColorPair {
        let (background, foreground) = match self {
            Self::Zero => ("#ffffff", "#6b7280"),
            Self::Faint => ("#ccfbf1", "#4b5563"),
            Self::Light => ("#99f6e4", "#1f2937"),
            Self::Medium => ("#5eead4", "#1f2937"),
            Self::Strong => ("#14b8a6", "#ffffff"),
            Self::Peak => ("#0f766e", "#ffffff"),
        };
        ColorPair {
            background,
            foreground,
        }
    }

    /// Single-character shade for terminal heatmaps.
    pub fn glyph(self) -> char {
        match self {
            Self::Zero => '.',
            Self::Faint => '░',
            Self::Light => '▒',
            Self::Medium => '▓',
            Self::Strong => '█',
            Self::Peak => '#',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_its_own_tier_for_any_ceiling() {
        for max_value in [0, 1, 50, 10_000] {
            assert_eq!(IntensityTier::classify(0, max_value), IntensityTier::Zero);
        }
        assert_ne!(IntensityTier::Zero.colors(), IntensityTier::Faint.colors());
    }

    #[test]
    fn value_at_ceiling_is_peak() {
        assert_eq!(IntensityTier::classify(40, 40), IntensityTier::Peak);
        assert_eq!(IntensityTier::classify(7, 7).colors().background, "#0f766e");
    }

    #[test]
    fn zero_ceiling_with_value_is_peak() {
        assert_eq!(IntensityTier::classify(3, 0), IntensityTier::Peak);
    }

    #[test]
    fn square_root_scaling_thresholds() {
        // sqrt(v / 100): 0.1, 0.3, 0.5, 0.7, 0.9
        assert_eq!(IntensityTier::classify(1, 100), IntensityTier::Faint);
        assert_eq!(IntensityTier::classify(9, 100), IntensityTier::Light);
        assert_eq!(IntensityTier::classify(25, 100), IntensityTier::Medium);
        assert_eq!(IntensityTier::classify(49, 100), IntensityTier::Strong);
        assert_eq!(IntensityTier::classify(81, 100), IntensityTier::Peak);
    }

    #[test]
    fn thresholds_are_strict() {
        // sqrt(4 / 100) == 0.2 exactly, which stays in the faint tier.
        assert_eq!(IntensityTier::classify(4, 100), IntensityTier::Faint);
    }

    #[test]
    fn tiers_are_ordered_by_intensity() {
        let tiers: Vec<_> = [0, 1, 9, 25, 49, 81]
            .iter()
            .map(|&v| IntensityTier::classify(v, 100))
            .collect();
        assert!(tiers.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
