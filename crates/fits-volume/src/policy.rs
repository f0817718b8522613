//! Team conventions: normalization and on-disk axis order.

/// Which physical axis each array axis holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrder {
    /// Array axes are (x, y, z).
    Native,
    /// Array axes are (z, y, x).
    Reversed,
}

/// How a team's cubes are prepared before a volume is summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionPolicy {
    /// Divide every sample by the sum of the whole cube first.
    pub normalize: bool,
    /// Storage order of the spatial axes.
    pub axis_order: AxisOrder,
}

/// Team assumed when none is given.
pub const DEFAULT_TEAM: &str = "Team_SKAO";

/// Teams that deviate from [`ExtractionPolicy::DEFAULT`].
pub const TEAM_POLICIES: &[(&str, ExtractionPolicy)] = &[
    (
        "ReionYuga",
        ExtractionPolicy {
            normalize: true,
            axis_order: AxisOrder::Native,
        },
    ),
    ("LoreliB", ExtractionPolicy::REVERSED),
    ("EoR-PIE-MC", ExtractionPolicy::REVERSED),
    ("EoR-PIE", ExtractionPolicy::REVERSED),
];

impl AxisOrder {
    /// Array axis holding physical axis `axis` (0 = x, 1 = y, 2 = z).
    pub fn array_axis(self, axis: usize) -> usize {
        match self {
            AxisOrder::Native => axis,
            AxisOrder::Reversed => 2 - axis,
        }
    }
}

impl ExtractionPolicy {
    /// Raw samples, (x, y, z) storage.
    pub const DEFAULT: ExtractionPolicy = ExtractionPolicy {
        normalize: false,
        axis_order: AxisOrder::Native,
    };

    const REVERSED: ExtractionPolicy = ExtractionPolicy {
        normalize: false,
        axis_order: AxisOrder::Reversed,
    };

    /// Look up a team by exact name. Unknown teams get [`Self::DEFAULT`].
    pub fn for_team(team_name: &str) -> Self {
        TEAM_POLICIES
            .iter()
            .find(|(name, _)| *name == team_name)
            .map_or(Self::DEFAULT, |(_, policy)| *policy)
    }
}

impl Default for ExtractionPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_team_is_native_raw() {
        assert_eq!(ExtractionPolicy::for_team(DEFAULT_TEAM), ExtractionPolicy::DEFAULT);
        assert_eq!(ExtractionPolicy::default(), ExtractionPolicy::DEFAULT);
    }

    #[test]
    fn reion_yuga_normalizes() {
        let p = ExtractionPolicy::for_team("ReionYuga");
        assert!(p.normalize);
        assert_eq!(p.axis_order, AxisOrder::Native);
    }

    #[test]
    fn reversed_teams() {
        for team in ["LoreliB", "EoR-PIE-MC", "EoR-PIE"] {
            let p = ExtractionPolicy::for_team(team);
            assert!(!p.normalize, "{team}");
            assert_eq!(p.axis_order, AxisOrder::Reversed, "{team}");
        }
    }

    #[test]
    fn array_axis_mapping() {
        assert_eq!(
            [0, 1, 2].map(|a| AxisOrder::Native.array_axis(a)),
            [0, 1, 2]
        );
        assert_eq!(
            [0, 1, 2].map(|a| AxisOrder::Reversed.array_axis(a)),
            [2, 1, 0]
        );
    }

    #[test]
    fn unknown_and_near_miss_names_fall_back() {
        for team in ["", "Unknown", "loreliB", "EoR-PIE ", "reionyuga"] {
            assert_eq!(ExtractionPolicy::for_team(team), ExtractionPolicy::DEFAULT, "{team:?}");
        }
    }
}
