//! Recursive SVG assembly.
//!
//! Geometry is expressed entirely through nested transform groups — every
//! branch is the unit segment `M 0 0 L 0 -1` under an accumulated
//! rotate/translate/scale — so no trigonometry is evaluated and the output
//! is a pure function of the inputs. All fractional values are fixed-point
//! integers formatted to three decimals.

use std::fmt::Write;

use mtree_core::types::{TreeGenome, TreeState};
use mtree_growth::{GrowthPhase, Projection};

/// Canvas edge in pixels; the trunk is planted at the bottom center.
const CANVAS: u32 = 1024;
const TRUNK_X: u32 = 512;
const TRUNK_Y: u32 = 1000;

const STROKE: &str = "#4A2E19";
const TIP_FILL: &str = "#0B6623";
const TIP_FILL_ALT: &str = "#CC7722";

/// Jitter amplitude in degrees per unit of genome `delta`.
const JITTER_DEGREES: u64 = 3;

/// Messages shown when a tree stands at zero segments.
const MSG_DECLINE: &str = "Erysichthon was here";
const MSG_REGROW: &str = "Spes messis in semine";

/// Branch-tip glyph: the default dot, or an approved composable token's
/// fragment. Resolution against external ownership happens in the token
/// collection; the renderer only draws what it is handed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarkerGlyph {
    Default,
    Custom(String),
}

/// splitmix64. Deterministic per-node seed stream for angle jitter.
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// Root jitter seed folded from every genome field.
fn genome_seed(genome: &TreeGenome) -> u64 {
    let mut seed = genome.init_length as u64;
    seed = splitmix64(seed ^ (genome.diameter as u64) << 8);
    seed = splitmix64(seed ^ (genome.branches as u64) << 16);
    seed = splitmix64(seed ^ (genome.angle as u64) << 24);
    seed = splitmix64(seed ^ (genome.d as u64) << 32);
    splitmix64(seed ^ (genome.delta as u64) << 40)
}

/// Format a value in thousandths as a plain decimal, e.g. `485` → `"0.485"`.
fn milli(value: u64) -> String {
    format!("{}.{:03}", value / 1000, value % 1000)
}

/// Child scale factor in thousandths, derived from the genome's decay
/// selector `d` (1–11 → 0.485–0.835).
fn decay_milli(d: u8) -> u64 {
    450 + d as u64 * 35
}

/// Signed jitter in degrees for one branch node.
fn jitter(seed: u64, delta: u8) -> i64 {
    if delta == 0 {
        return 0;
    }
    let amplitude = delta as u64 * JITTER_DEGREES;
    (seed % (2 * amplitude + 1)) as i64 - amplitude as i64
}

/// Rotation of branch `i` of `n` around the parent axis: an even spread of
/// `[-angle, +angle]` plus per-node jitter.
fn branch_rotation(genome: &TreeGenome, i: u8, n: u8, seed: u64) -> i64 {
    let a = genome.angle as i64;
    let spread = if n <= 1 {
        0
    } else {
        -a + 2 * a * i as i64 / (n - 1) as i64
    };
    spread + jitter(seed, genome.delta)
}

fn write_branches(out: &mut String, genome: &TreeGenome, levels: u8, seed: u64, scale: &str) {
    out.push_str("<path d=\"M 0 0 L 0 -1\" marker-end=\"url(#tip)\"/>");
    if levels == 0 {
        return;
    }
    let n = genome.branches;
    for i in 0..n {
        let node_seed = splitmix64(seed ^ (i as u64 + 1));
        let rotation = branch_rotation(genome, i, n, node_seed);
        write!(
            out,
            "<g transform=\"translate(0, -1) rotate({rotation}) scale({scale})\">"
        )
        .expect("write to String");
        write_branches(out, genome, levels - 1, node_seed, scale);
        out.push_str("</g>");
    }
}

fn write_marker_def(out: &mut String, state: &TreeState, glyph: &MarkerGlyph, alt: bool) {
    // Hare hunts thicken the tip marker: 1.0, 1.1, 1.2, ...
    let w = 10 + state.hares as u64;
    let width = format!("{}.{}", w / 10, w % 10);
    match glyph {
        MarkerGlyph::Default => {
            let fill = if alt { TIP_FILL_ALT } else { TIP_FILL };
            write!(
                out,
                "<defs><marker id=\"tip\" viewBox=\"0 0 2 2\" refX=\"1\" refY=\"1\" \
                 markerWidth=\"{width}\" markerHeight=\"{width}\" orient=\"auto\">\
                 <circle cx=\"1\" cy=\"1\" r=\"1\" fill=\"{fill}\"/></marker></defs>"
            )
            .expect("write to String");
        }
        MarkerGlyph::Custom(fragment) => {
            write!(
                out,
                "<defs><marker id=\"tip\" viewBox=\"0 0 10 10\" refX=\"5\" refY=\"5\" \
                 markerWidth=\"{width}\" markerHeight=\"{width}\" orient=\"auto\">\
                 {fragment}</marker></defs>"
            )
            .expect("write to String");
        }
    }
}

fn write_mood(out: &mut String, state: &TreeState, phase: GrowthPhase) {
    if state.segments != 0 {
        return;
    }
    let (fill, msg) = match phase {
        GrowthPhase::Declining { .. } => ("#660000", MSG_DECLINE),
        GrowthPhase::Growing => ("#006616", MSG_REGROW),
    };
    write!(
        out,
        "<text x=\"20\" y=\"40\" font-size=\"24\" fill=\"{fill}\">{msg}</text>"
    )
    .expect("write to String");
}

/// Render a tree to a standalone SVG document.
///
/// Pure: identical `(genome, state, projection, glyph, alt_palette)` inputs
/// yield byte-identical output.
pub fn render_svg(
    genome: &TreeGenome,
    state: &TreeState,
    projection: &Projection,
    glyph: &MarkerGlyph,
    alt_palette: bool,
) -> String {
    let mut out = String::with_capacity(4096);
    write!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{CANVAS}\" height=\"{CANVAS}\" \
         viewBox=\"0 0 {CANVAS} {CANVAS}\">"
    )
    .expect("write to String");
    write_marker_def(&mut out, state, glyph, alt_palette);

    // Trunk stroke width in local (pre-scale) units so it tapers with the
    // nested group scaling.
    let stroke_width = milli(genome.diameter as u64 * 1000 / projection.length.max(1) as u64);
    write!(
        out,
        "<g transform=\"translate({TRUNK_X}, {TRUNK_Y}) scale({len})\" fill=\"none\" \
         stroke=\"{STROKE}\" stroke-width=\"{stroke_width}\" stroke-linecap=\"round\">",
        len = projection.length,
    )
    .expect("write to String");

    if state.animated && matches!(projection.phase, GrowthPhase::Declining { .. }) {
        out.push_str(
            "<animateTransform attributeName=\"transform\" type=\"rotate\" \
             values=\"-2;2;-2\" dur=\"7s\" additive=\"sum\" repeatCount=\"indefinite\"/>",
        );
    }

    let scale = milli(decay_milli(genome.d));
    write_branches(&mut out, genome, state.segments, genome_seed(genome), &scale);
    out.push_str("</g>");
    write_mood(&mut out, state, projection.phase);
    out.push_str("</svg>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn genome() -> TreeGenome {
        TreeGenome {
            init_length: 22,
            diameter: 12,
            branches: 3,
            angle: 45,
            d: 7,
            delta: 1,
        }
    }

    fn state(segments: u8) -> TreeState {
        TreeState {
            segments,
            animated: false,
            stags: 0,
            hares: 0,
            minted_since: 0,
        }
    }

    fn growing(length: u32) -> Projection {
        Projection {
            length,
            phase: GrowthPhase::Growing,
        }
    }

    #[test]
    fn output_is_an_svg_document() {
        let svg = render_svg(&genome(), &state(2), &growing(37), &MarkerGlyph::Default, false);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn scale_carries_projected_length() {
        let svg = render_svg(&genome(), &state(2), &growing(37), &MarkerGlyph::Default, false);
        assert!(svg.contains("translate(512, 1000) scale(37)"));
    }

    #[test]
    fn render_is_pure() {
        let a = render_svg(&genome(), &state(4), &growing(120), &MarkerGlyph::Default, false);
        let b = render_svg(&genome(), &state(4), &growing(120), &MarkerGlyph::Default, false);
        assert_eq!(a, b);
    }

    #[test]
    fn default_marker_is_a_unit_circle() {
        let svg = render_svg(&genome(), &state(2), &growing(37), &MarkerGlyph::Default, false);
        assert!(svg.contains("<circle cx=\"1\" cy=\"1\" r=\"1\""));
        assert!(svg.contains("markerWidth=\"1.0\""));
    }

    #[test]
    fn hare_hunts_widen_the_marker() {
        let mut s = state(3);
        s.hares = 2;
        let svg = render_svg(&genome(), &s, &growing(37), &MarkerGlyph::Default, false);
        assert!(svg.contains("markerWidth=\"1.2\""));
        assert!(!svg.contains("markerWidth=\"1.0\""));
    }

    #[test]
    fn custom_glyph_replaces_the_circle() {
        let glyph = MarkerGlyph::Custom("<path d=\"M 0 0 L 10 5 L 0 10 z\" />".into());
        let svg = render_svg(&genome(), &state(2), &growing(37), &glyph, false);
        assert!(svg.contains("<path d=\"M 0 0 L 10 5 L 0 10 z\" />"));
        assert!(!svg.contains("<circle cx=\"1\" cy=\"1\" r=\"1\""));
    }

    #[test]
    fn zero_segments_declining_mourns() {
        let p = Projection {
            length: 22,
            phase: GrowthPhase::Declining { remaining: 100 },
        };
        let svg = render_svg(&genome(), &state(0), &p, &MarkerGlyph::Default, false);
        assert!(svg.contains("660000\">Erysichthon was here"));
    }

    #[test]
    fn zero_segments_regrowing_hopes() {
        let svg = render_svg(&genome(), &state(0), &growing(22), &MarkerGlyph::Default, false);
        assert!(svg.contains("006616\">Spes messis in semine"));
    }

    #[test]
    fn positive_segments_carry_no_message() {
        let svg = render_svg(&genome(), &state(3), &growing(37), &MarkerGlyph::Default, false);
        assert!(!svg.contains("<text"));
    }

    #[test]
    fn animated_tree_sways_only_during_decline() {
        let mut s = state(4);
        s.animated = true;
        let still = render_svg(&genome(), &s, &growing(37), &MarkerGlyph::Default, false);
        assert!(!still.contains("animateTransform"));

        let p = Projection {
            length: 30,
            phase: GrowthPhase::Declining { remaining: 10 },
        };
        let swaying = render_svg(&genome(), &s, &p, &MarkerGlyph::Default, false);
        assert!(swaying.contains("animateTransform"));
    }

    #[test]
    fn branch_count_follows_genome() {
        // segments levels of n-ary branching: paths = sum n^i for i in 0..=levels.
        let mut g = genome();
        g.branches = 2;
        let svg = render_svg(&g, &state(3), &growing(37), &MarkerGlyph::Default, false);
        let paths = svg.matches("M 0 0 L 0 -1").count();
        assert_eq!(paths, 1 + 2 + 4 + 8);
    }

    #[test]
    fn zero_segments_is_trunk_only() {
        let svg = render_svg(&genome(), &state(0), &growing(22), &MarkerGlyph::Default, false);
        assert_eq!(svg.matches("M 0 0 L 0 -1").count(), 1);
    }

    #[test]
    fn alt_palette_changes_tip_fill() {
        let base = render_svg(&genome(), &state(2), &growing(37), &MarkerGlyph::Default, false);
        let alt = render_svg(&genome(), &state(2), &growing(37), &MarkerGlyph::Default, true);
        assert!(base.contains(TIP_FILL));
        assert!(alt.contains(TIP_FILL_ALT));
        assert_ne!(base, alt);
    }

    #[test]
    fn milli_formats_three_decimals() {
        assert_eq!(milli(485), "0.485");
        assert_eq!(milli(1000), "1.000");
        assert_eq!(milli(62), "0.062");
    }

    #[test]
    fn decay_factor_stays_below_one() {
        for d in 1..=11u8 {
            let m = decay_milli(d);
            assert!(m < 1000, "d={d} gives {m}");
        }
    }

    #[test]
    fn zero_delta_means_no_jitter() {
        for seed in [0u64, 1, u64::MAX] {
            assert_eq!(jitter(seed, 0), 0);
        }
    }

    proptest! {
        #[test]
        fn jitter_bounded_by_delta(seed in any::<u64>(), delta in 0u8..=3) {
            let j = jitter(seed, delta);
            let bound = delta as i64 * JITTER_DEGREES as i64;
            prop_assert!(j >= -bound && j <= bound);
        }

        #[test]
        fn rotations_stay_within_one_turn(
            seed in any::<u64>(),
            angle in prop::sample::select(vec![20u16, 30, 45, 60, 90]),
            n in 2u8..=4,
        ) {
            let mut g = genome();
            g.angle = angle;
            for i in 0..n {
                let r = branch_rotation(&g, i, n, seed);
                prop_assert!(r.abs() <= angle as i64 + 9);
            }
        }
    }
}
