use crate::platform;

/// Env var forcing reduced motion on (`1`/`true`) or off (`0`/`false`).
pub const ENV_REDUCED_MOTION: &str = "SCREENPETS_REDUCED_MOTION";
/// Env var seeding the pet RNG for reproducible runs.
pub const ENV_SEED: &str = "SCREENPETS_SEED";

/// Startup settings, read once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayConfig {
    /// When set, no pets are spawned, no clock runs, nothing is drawn.
    pub reduced_motion: bool,
    pub seed: Option<u64>,
}

impl OverlayConfig {
    /// Read from the process environment and the OS motion preference.
    pub fn load() -> Self {
        Self::from_sources(
            |key| std::env::var(key).ok(),
            platform::prefers_reduced_motion(),
        )
    }

    /// Build from a key lookup plus the OS preference (`None` if unknown).
    ///
    /// An explicit env value wins over the OS. Anything unreadable is
    /// treated as "motion allowed".
    pub fn from_sources(
        lookup: impl Fn(&str) -> Option<String>,
        os_reduced_motion: Option<bool>,
    ) -> Self {
        let env_reduced = lookup(ENV_REDUCED_MOTION).and_then(|raw| {
            let parsed = parse_flag(&raw);
            if parsed.is_none() {
                log::warn!("Ignoring {ENV_REDUCED_MOTION}={raw:?}: expected a boolean");
            }
            parsed
        });

        let seed = lookup(ENV_SEED).and_then(|raw| match raw.trim().parse::<u64>() {
            Ok(seed) => Some(seed),
            Err(e) => {
                log::warn!("Ignoring {ENV_SEED}={raw:?}: {e}");
                None
            }
        });

        Self {
            reduced_motion: env_reduced.or(os_reduced_motion).unwrap_or(false),
            seed,
        }
    }

    /// RNG for the pet simulation, seeded if configured.
    pub fn rng(&self) -> fastrand::Rng {
        match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "reduce" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn missing_signals_allow_motion() {
        let cfg = OverlayConfig::from_sources(lookup(&[]), None);
        assert_eq!(cfg, OverlayConfig::default());
    }

    #[test]
    fn os_preference_applies_without_override() {
        let cfg = OverlayConfig::from_sources(lookup(&[]), Some(true));
        assert!(cfg.reduced_motion);
    }

    #[test]
    fn env_overrides_os() {
        let cfg = OverlayConfig::from_sources(lookup(&[(ENV_REDUCED_MOTION, "off")]), Some(true));
        assert!(!cfg.reduced_motion);
        let cfg = OverlayConfig::from_sources(lookup(&[(ENV_REDUCED_MOTION, " TRUE ")]), None);
        assert!(cfg.reduced_motion);
    }

    #[test]
    fn garbage_falls_back() {
        let cfg = OverlayConfig::from_sources(
            lookup(&[(ENV_REDUCED_MOTION, "sometimes"), (ENV_SEED, "-4")]),
            None,
        );
        assert!(!cfg.reduced_motion);
        assert_eq!(cfg.seed, None);
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let cfg = OverlayConfig::from_sources(lookup(&[(ENV_SEED, "1234")]), None);
        assert_eq!(cfg.seed, Some(1234));
        assert_eq!(cfg.rng().u64(..), cfg.rng().u64(..));
    }
}
