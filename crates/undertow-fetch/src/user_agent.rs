//! Desktop User-Agent pool. One agent is drawn per process start so every
//! request in a run presents the same browser identity.

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;

pub const FALLBACK: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36";

const DESKTOP_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36 Edg/134.0.0.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 \
     (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:136.0) \
     Gecko/20100101 Firefox/136.0",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:136.0) \
     Gecko/20100101 Firefox/136.0",
];

static CHOSEN: Lazy<&'static str> = Lazy::new(|| {
    DESKTOP_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(FALLBACK)
});

/// The User-Agent for this process.
pub fn desktop_user_agent() -> &'static str {
    *CHOSEN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_is_stable_within_a_process() {
        assert_eq!(desktop_user_agent(), desktop_user_agent());
        assert!(desktop_user_agent().starts_with("Mozilla/5.0"));
    }
}
