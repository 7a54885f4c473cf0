//! Cache of assembled color-only deltas.

use std::collections::{HashMap, VecDeque};

use ttyansi::color::push_color_params;
use ttycell::decode_color;

const DEFAULT_CAP: usize = 1024;

/// Bounded cache of color-only SGR deltas keyed by
/// `(fg, bg, needs_bg_reset)`.
///
/// Purely an allocation saver for frames that cycle through a stable set
/// of styles; correctness never depends on a hit. When an insertion would
/// exceed the cap, the oldest entry is evicted.
#[derive(Debug)]
pub struct DeltaCache {
    map: HashMap<(u16, u16, bool), String>,
    order: VecDeque<(u16, u16, bool)>,
    cap: usize,
}

impl DeltaCache {
    #[must_use]
    pub fn new() -> DeltaCache {
        DeltaCache::with_capacity(DEFAULT_CAP)
    }

    #[must_use]
    pub fn with_capacity(cap: usize) -> DeltaCache {
        DeltaCache {
            map: HashMap::new(),
            order: VecDeque::new(),
            cap: cap.max(1),
        }
    }

    /// Number of cached deltas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The color-only delta selecting `(fg, bg)`, prefixed with a `49`
    /// background reset when requested.
    pub fn delta(&mut self, fg: u16, bg: u16, bg_reset: bool) -> &str {
        let key = (fg, bg, bg_reset);
        if !self.map.contains_key(&key) {
            if self.map.len() >= self.cap
                && let Some(oldest) = self.order.pop_front()
            {
                self.map.remove(&oldest);
            }
            self.order.push_back(key);
        }
        self.map
            .entry(key)
            .or_insert_with(|| build_delta(fg, bg, bg_reset))
    }
}

impl Default for DeltaCache {
    fn default() -> DeltaCache {
        DeltaCache::new()
    }
}

fn build_delta(fg: u16, bg: u16, bg_reset: bool) -> String {
    let mut params = String::new();
    if bg_reset {
        params.push_str("49");
    }
    if fg != 0 {
        if !params.is_empty() {
            params.push(';');
        }
        push_color_params(&mut params, decode_color(fg), false);
    }
    if bg != 0 {
        if !params.is_empty() {
            params.push(';');
        }
        push_color_params(&mut params, decode_color(bg), true);
    }
    if params.is_empty() {
        return String::new();
    }
    let mut out = String::with_capacity(params.len() + 3);
    out.push_str("\x1b[");
    out.push_str(&params);
    out.push('m');
    out
}
