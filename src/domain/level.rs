//! Price-extension level engine.
//!
//! Maps `(high, low, close, options)` to an ordered list of [`LevelResult`]s:
//! - `LONG_LEVELS` are always evaluated (long and custom entries)
//! - `SHORT_LEVELS` are appended when `show_short` is set
//! - `CLOSE_LEVELS` are appended when `show_close` is set
//!
//! Every entry is checked against the daily [`LimitBand`]. With `apply_limit`
//! an out-of-band entry is dropped, otherwise it carries a [`LimitWarning`].
//! Custom entries are exempt from the band.

use serde::Serialize;

/// Upper daily price-limit multiplier, applied to the window low.
pub const LIMIT_UP_RATIO: f64 = 1.10;
/// Lower daily price-limit multiplier, applied to the window high.
pub const LIMIT_DOWN_RATIO: f64 = 0.90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelGroup {
    Long,
    Short,
    Close,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    High,
    Low,
    Close,
}

/// Presentation family of an annotation. Renderers decide how to realise it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationStyle {
    Plain,
    Custom,
    Short,
    Close,
}

/// Which side of the limit band a level falls outside of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitWarning {
    Up,
    Down,
    Both,
}

impl LimitWarning {
    pub fn advisory(self) -> &'static str {
        match self {
            LimitWarning::Up => "(超出漲幅限制)",
            LimitWarning::Down => "(超出跌幅限制)",
            LimitWarning::Both => "(超出漲跌幅限制)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub text: &'static str,
    pub style: AnnotationStyle,
    pub warning: Option<LimitWarning>,
}

impl Annotation {
    /// Note followed by the advisory phrase, without any markup.
    pub fn plain_text(&self) -> String {
        match self.warning {
            Some(w) => format!("{} {}", self.text, w.advisory()),
            None => self.text.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelResult {
    pub label: &'static str,
    pub value: f64,
    pub annotation: Annotation,
}

/// Switches controlling which groups are evaluated and how the band is used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenderOptions {
    pub apply_limit: bool,
    pub show_short: bool,
    pub show_close: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LimitBand {
    pub limit_up: f64,
    pub limit_down: f64,
}

impl LimitBand {
    pub fn new(high: f64, low: f64) -> Self {
        Self {
            limit_up: low * LIMIT_UP_RATIO,
            limit_down: high * LIMIT_DOWN_RATIO,
        }
    }
}

impl LevelGroup {
    pub fn style(self) -> AnnotationStyle {
        match self {
            LevelGroup::Long => AnnotationStyle::Plain,
            LevelGroup::Short => AnnotationStyle::Short,
            LevelGroup::Close => AnnotationStyle::Close,
            LevelGroup::Custom => AnnotationStyle::Custom,
        }
    }

    /// The band side `value` breaches for this group, if any.
    pub fn limit_breach(self, value: f64, band: &LimitBand) -> Option<LimitWarning> {
        match self {
            LevelGroup::Long if value > band.limit_up => Some(LimitWarning::Up),
            LevelGroup::Short if value < band.limit_down => Some(LimitWarning::Down),
            LevelGroup::Close if value > band.limit_up || value < band.limit_down => {
                Some(LimitWarning::Both)
            }
            _ => None,
        }
    }
}

/// A catalogue entry: `anchor + range * factor`.
#[derive(Debug, Clone, Copy)]
pub struct LevelDefinition {
    pub label: &'static str,
    pub anchor: Anchor,
    pub factor: f64,
    pub note: &'static str,
    pub group: LevelGroup,
}

impl LevelDefinition {
    pub fn value(&self, high: f64, low: f64, close: f64) -> f64 {
        let base = match self.anchor {
            Anchor::High => high,
            Anchor::Low => low,
            Anchor::Close => close,
        };
        base + (high - low) * self.factor
    }
}

const fn def(
    label: &'static str,
    anchor: Anchor,
    factor: f64,
    note: &'static str,
    group: LevelGroup,
) -> LevelDefinition {
    LevelDefinition {
        label,
        anchor,
        factor,
        note,
        group,
    }
}

pub const LONG_LEVELS: [LevelDefinition; 6] = [
    def("高點 − 波幅×0.382", Anchor::High, -0.382, "黃金分割回檔支撐", LevelGroup::Long),
    def("低點 + 波幅×1.03", Anchor::Low, 1.03, "小幅突破前高，試探新高", LevelGroup::Long),
    def("低點 + 波幅×1.2", Anchor::Low, 1.2, "第一個明顯延伸壓力位", LevelGroup::Long),
    def("低點 + 波幅×1.5", Anchor::Low, 1.5, "關鍵心理整數＋1.5 倍目標壓力", LevelGroup::Long),
    def("自訂延伸（低點 + 波幅×0.06）", Anchor::Low, 0.06, "微支撐區（自訂）", LevelGroup::Custom),
    def("自訂延伸（低點 + 波幅×0.31）", Anchor::Low, 0.31, "短期反彈目標（自訂）", LevelGroup::Custom),
];

pub const SHORT_LEVELS: [LevelDefinition; 5] = [
    def("高點 − 波幅×0.03", Anchor::High, -0.03, "微幅跌破，測試支撐", LevelGroup::Short),
    def("高點 − 波幅×0.2", Anchor::High, -0.2, "第一個空方延伸支撐", LevelGroup::Short),
    def("高點 − 波幅×0.5", Anchor::High, -0.5, "中段支撐（空方）", LevelGroup::Short),
    def("高點 − 波幅×0.618", Anchor::High, -0.618, "強支撐，空方延伸目標", LevelGroup::Short),
    def("高點 − 波幅×0.8", Anchor::High, -0.8, "空方極限支撐", LevelGroup::Short),
];

pub const CLOSE_LEVELS: [LevelDefinition; 4] = [
    def("收盤 + 波幅×0.06", Anchor::Close, 0.06, "短線反彈（收盤起點）", LevelGroup::Close),
    def("收盤 + 波幅×0.31", Anchor::Close, 0.31, "中段反彈（收盤起點）", LevelGroup::Close),
    def("收盤 − 波幅×0.06", Anchor::Close, -0.06, "短線回檔（收盤起點）", LevelGroup::Close),
    def("收盤 − 波幅×0.31", Anchor::Close, -0.31, "中段回檔（收盤起點）", LevelGroup::Close),
];

fn evaluate(
    definition: &LevelDefinition,
    high: f64,
    low: f64,
    close: f64,
    band: &LimitBand,
    apply_limit: bool,
) -> Option<LevelResult> {
    let value = definition.value(high, low, close);
    let breach = definition.group.limit_breach(value, band);
    if apply_limit && breach.is_some() {
        return None;
    }
    Some(LevelResult {
        label: definition.label,
        value,
        annotation: Annotation {
            text: definition.note,
            style: definition.group.style(),
            warning: if apply_limit { None } else { breach },
        },
    })
}

/// Compute the extension levels for one window.
///
/// Total over all inputs: degenerate or non-finite figures propagate
/// arithmetically. An empty result is a valid outcome when `apply_limit`
/// filters out every entry.
pub fn compute_levels(high: f64, low: f64, close: f64, options: &RenderOptions) -> Vec<LevelResult> {
    let band = LimitBand::new(high, low);

    let mut groups: Vec<&[LevelDefinition]> = vec![&LONG_LEVELS[..]];
    if options.show_short {
        groups.push(&SHORT_LEVELS[..]);
    }
    if options.show_close {
        groups.push(&CLOSE_LEVELS[..]);
    }

    groups
        .into_iter()
        .flatten()
        .filter_map(|d| evaluate(d, high, low, close, &band, options.apply_limit))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    const ALL: RenderOptions = RenderOptions {
        apply_limit: false,
        show_short: true,
        show_close: true,
    };

    fn labels(levels: &[LevelResult]) -> Vec<&'static str> {
        levels.iter().map(|l| l.label).collect()
    }

    fn find<'a>(levels: &'a [LevelResult], label: &str) -> Option<&'a LevelResult> {
        levels.iter().find(|l| l.label == label)
    }

    #[test]
    fn default_options_yield_long_catalogue_in_order() {
        let levels = compute_levels(110.0, 100.0, 105.0, &RenderOptions::default());
        let expected: Vec<_> = LONG_LEVELS.iter().map(|d| d.label).collect();
        assert_eq!(labels(&levels), expected);
    }

    #[test]
    fn all_groups_appended_long_short_close() {
        let levels = compute_levels(110.0, 100.0, 105.0, &ALL);
        let expected: Vec<_> = LONG_LEVELS
            .iter()
            .chain(SHORT_LEVELS.iter())
            .chain(CLOSE_LEVELS.iter())
            .map(|d| d.label)
            .collect();
        assert_eq!(labels(&levels), expected);
    }

    #[test]
    fn scenario_with_close_group() {
        let opts = RenderOptions {
            apply_limit: false,
            show_short: false,
            show_close: true,
        };
        let levels = compute_levels(110.0, 100.0, 105.0, &opts);
        assert_eq!(levels.len(), 10);

        let l = find(&levels, "低點 + 波幅×1.5").unwrap();
        assert_relative_eq!(l.value, 115.0);
        assert_eq!(l.annotation.warning, Some(LimitWarning::Up));
        assert!(l.annotation.plain_text().ends_with("(超出漲幅限制)"));
    }

    #[test]
    fn formulas_match_catalogue() {
        let levels = compute_levels(110.0, 100.0, 105.0, &ALL);
        let values: Vec<f64> = levels.iter().map(|l| l.value).collect();
        let expected = [
            106.18, 110.3, 112.0, 115.0, 100.6, 103.1, // long + custom
            109.7, 108.0, 105.0, 103.82, 102.0, // short
            105.6, 108.1, 104.4, 101.9, // close
        ];
        assert_eq!(values.len(), expected.len());
        for (v, e) in values.iter().zip(expected) {
            assert_relative_eq!(*v, e, epsilon = 1e-9);
        }
    }

    #[test]
    fn apply_limit_drops_long_entries_above_limit_up() {
        let opts = RenderOptions {
            apply_limit: true,
            ..RenderOptions::default()
        };
        let levels = compute_levels(110.0, 100.0, 105.0, &opts);
        assert!(find(&levels, "低點 + 波幅×1.03").is_none());
        assert!(find(&levels, "低點 + 波幅×1.2").is_none());
        assert!(find(&levels, "低點 + 波幅×1.5").is_none());
        assert_eq!(
            labels(&levels),
            vec![
                "高點 − 波幅×0.382",
                "自訂延伸（低點 + 波幅×0.06）",
                "自訂延伸（低點 + 波幅×0.31）",
            ]
        );
        assert!(levels.iter().all(|l| l.annotation.warning.is_none()));
    }

    #[test]
    fn without_limit_out_of_band_long_entries_are_kept_and_flagged() {
        let levels = compute_levels(110.0, 100.0, 105.0, &RenderOptions::default());
        let l = find(&levels, "低點 + 波幅×1.03").unwrap();
        assert_eq!(l.annotation.warning, Some(LimitWarning::Up));
        let inside = find(&levels, "高點 − 波幅×0.382").unwrap();
        assert_eq!(inside.annotation.warning, None);
    }

    #[test]
    fn short_entries_below_limit_down_are_flagged_or_dropped() {
        // high=200, low=100: limit_down=180, so most short levels are below it.
        let opts = RenderOptions {
            show_short: true,
            ..RenderOptions::default()
        };
        let levels = compute_levels(200.0, 100.0, 150.0, &opts);
        let shallow = find(&levels, "高點 − 波幅×0.03").unwrap();
        assert_eq!(shallow.annotation.warning, None);
        let deep = find(&levels, "高點 − 波幅×0.8").unwrap();
        assert_eq!(deep.annotation.warning, Some(LimitWarning::Down));
        assert!(deep.annotation.plain_text().ends_with("(超出跌幅限制)"));

        let filtered = compute_levels(
            200.0,
            100.0,
            150.0,
            &RenderOptions {
                apply_limit: true,
                ..opts
            },
        );
        let short: Vec<_> = filtered
            .iter()
            .filter(|l| l.annotation.style == AnnotationStyle::Short)
            .map(|l| l.label)
            .collect();
        assert!(short.contains(&"高點 − 波幅×0.03"));
        assert!(!short.contains(&"高點 − 波幅×0.5"));
        assert!(!short.contains(&"高點 − 波幅×0.618"));
        assert!(!short.contains(&"高點 − 波幅×0.8"));
    }

    #[test]
    fn close_entries_use_both_sides_of_band() {
        let opts = RenderOptions {
            show_close: true,
            ..RenderOptions::default()
        };
        // limit_up=110, limit_down=99; close far above the band
        let levels = compute_levels(110.0, 100.0, 120.0, &opts);
        let close: Vec<_> = levels
            .iter()
            .filter(|l| l.annotation.style == AnnotationStyle::Close)
            .collect();
        assert_eq!(close.len(), 4);
        assert!(close.iter().all(|l| l.annotation.warning == Some(LimitWarning::Both)));
        assert!(close[0].annotation.plain_text().ends_with("(超出漲跌幅限制)"));

        let filtered = compute_levels(
            110.0,
            100.0,
            120.0,
            &RenderOptions {
                apply_limit: true,
                ..opts
            },
        );
        assert!(filtered.iter().all(|l| l.annotation.style != AnnotationStyle::Close));
    }

    #[test]
    fn styles_follow_group() {
        let levels = compute_levels(110.0, 100.0, 105.0, &ALL);
        let styles: Vec<_> = levels.iter().map(|l| l.annotation.style).collect();
        assert_eq!(&styles[..4], &[AnnotationStyle::Plain; 4]);
        assert_eq!(&styles[4..6], &[AnnotationStyle::Custom; 2]);
        assert_eq!(&styles[6..11], &[AnnotationStyle::Short; 5]);
        assert_eq!(&styles[11..], &[AnnotationStyle::Close; 4]);
    }

    #[test]
    fn flat_range_collapses_every_level_onto_high() {
        let levels = compute_levels(100.0, 100.0, 100.0, &ALL);
        assert_eq!(levels.len(), 15);
        assert!(levels.iter().all(|l| l.value == 100.0));
    }

    #[test]
    fn only_custom_entries_survive_a_band_that_rejects_everything_else() {
        // limit_up=110: every long and close level sits above it
        let opts = RenderOptions {
            apply_limit: true,
            show_short: false,
            show_close: true,
        };
        let levels = compute_levels(1000.0, 100.0, 5000.0, &opts);
        assert_eq!(
            labels(&levels),
            vec!["自訂延伸（低點 + 波幅×0.06）", "自訂延伸（低點 + 波幅×0.31）"]
        );
    }

    #[test]
    fn nan_input_propagates_without_warning() {
        let levels = compute_levels(f64::NAN, 100.0, 105.0, &ALL);
        assert_eq!(levels.len(), 15);
        assert!(levels.iter().all(|l| l.value.is_nan()));
        assert!(levels.iter().all(|l| l.annotation.warning.is_none()));
    }

    #[test]
    fn inverted_range_is_computed_with_negative_range() {
        // range = -10, limit_up = 121, limit_down = 90
        let band = LimitBand::new(100.0, 110.0);
        assert_relative_eq!(band.limit_up, 121.0, epsilon = 1e-9);
        assert_relative_eq!(band.limit_down, 90.0, epsilon = 1e-9);

        let levels = compute_levels(100.0, 110.0, 105.0, &ALL);
        let expected = [
            103.82, 99.7, 98.0, 95.0, 109.4, 106.9, // long + custom
            100.3, 102.0, 105.0, 106.18, 108.0, // short
            104.4, 101.9, 105.6, 108.1, // close
        ];
        assert_eq!(levels.len(), expected.len());
        for (l, e) in levels.iter().zip(expected) {
            assert_relative_eq!(l.value, e, epsilon = 1e-9);
        }
        assert!(levels.iter().all(|l| l.annotation.warning.is_none()));
    }

    #[test]
    fn infinite_high_propagates() {
        // range = inf, limit_up = 110, limit_down = inf
        let levels = compute_levels(f64::INFINITY, 100.0, 105.0, &ALL);
        assert_eq!(levels.len(), 15);

        // high-anchored: inf - inf
        let retrace = find(&levels, "高點 − 波幅×0.382").unwrap();
        assert!(retrace.value.is_nan());
        assert_eq!(retrace.annotation.warning, None);
        for l in levels.iter().filter(|l| l.annotation.style == AnnotationStyle::Short) {
            assert!(l.value.is_nan());
            assert_eq!(l.annotation.warning, None);
        }

        let ext = find(&levels, "低點 + 波幅×1.5").unwrap();
        assert_eq!(ext.value, f64::INFINITY);
        assert_eq!(ext.annotation.warning, Some(LimitWarning::Up));

        let close: Vec<_> = levels
            .iter()
            .filter(|l| l.annotation.style == AnnotationStyle::Close)
            .collect();
        assert_eq!(close[0].value, f64::INFINITY);
        assert_eq!(close[2].value, f64::NEG_INFINITY);
        assert!(close.iter().all(|l| l.annotation.warning == Some(LimitWarning::Both)));

        let filtered = compute_levels(
            f64::INFINITY,
            100.0,
            105.0,
            &RenderOptions {
                apply_limit: true,
                ..ALL
            },
        );
        // NaN entries never breach; custom entries are exempt
        assert_eq!(filtered.len(), 8);
    }

    #[test]
    fn limit_band_derivation() {
        let band = LimitBand::new(110.0, 100.0);
        assert_relative_eq!(band.limit_up, 110.0, epsilon = 1e-9);
        assert_relative_eq!(band.limit_down, 99.0, epsilon = 1e-9);
    }

    fn window() -> impl Strategy<Value = (f64, f64, f64)> {
        (1.0f64..10_000.0, 0.0f64..5_000.0, 0.0f64..1.0).prop_map(|(low, spread, t)| {
            let high = low + spread;
            (high, low, low + spread * t)
        })
    }

    fn options() -> impl Strategy<Value = RenderOptions> {
        (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(a, s, c)| RenderOptions {
            apply_limit: a,
            show_short: s,
            show_close: c,
        })
    }

    proptest! {
        #[test]
        fn unfiltered_counts_follow_switches((high, low, close) in window(), s in any::<bool>(), c in any::<bool>()) {
            let opts = RenderOptions { apply_limit: false, show_short: s, show_close: c };
            let levels = compute_levels(high, low, close, &opts);
            let expected = 6 + if s { 5 } else { 0 } + if c { 4 } else { 0 };
            prop_assert_eq!(levels.len(), expected);
        }

        #[test]
        fn idempotent((high, low, close) in window(), opts in options()) {
            prop_assert_eq!(
                compute_levels(high, low, close, &opts),
                compute_levels(high, low, close, &opts)
            );
        }

        #[test]
        fn custom_entries_never_dropped_nor_flagged((high, low, close) in window(), opts in options()) {
            let levels = compute_levels(high, low, close, &opts);
            let custom: Vec<_> = levels
                .iter()
                .filter(|l| l.annotation.style == AnnotationStyle::Custom)
                .collect();
            prop_assert_eq!(custom.len(), 2);
            prop_assert!(custom.iter().all(|l| l.annotation.warning.is_none()));
        }

        #[test]
        fn filtered_output_is_subsequence_of_unfiltered((high, low, close) in window(), s in any::<bool>(), c in any::<bool>()) {
            let loose = compute_levels(high, low, close, &RenderOptions { apply_limit: false, show_short: s, show_close: c });
            let strict = compute_levels(high, low, close, &RenderOptions { apply_limit: true, show_short: s, show_close: c });
            let kept: Vec<_> = loose
                .iter()
                .filter(|l| l.annotation.warning.is_none())
                .map(|l| (l.label, l.value))
                .collect();
            let strict: Vec<_> = strict.iter().map(|l| (l.label, l.value)).collect();
            prop_assert_eq!(kept, strict);
        }
    }
}
