//! JSON metadata envelope around a rendered tree.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;

use mtree_core::types::{TokenId, TreeGenome, TreeState};
use mtree_growth::Projection;

const DESCRIPTION: &str =
    "A Merge Tree. It grows with the chain, declines when hunted, and remembers \
     every hand it has passed through.";

#[derive(Serialize)]
struct Attribute<'a> {
    trait_type: &'a str,
    value: serde_json::Value,
}

#[derive(Serialize)]
struct TokenMetadata<'a> {
    name: String,
    description: &'a str,
    attributes: Vec<Attribute<'a>>,
    image: String,
}

fn attr(trait_type: &str, value: impl Into<serde_json::Value>) -> Attribute<'_> {
    Attribute {
        trait_type,
        value: value.into(),
    }
}

/// The metadata document for one token, with the SVG embedded as a base64
/// `data:image/svg+xml` URI.
pub fn metadata_json(
    token_id: TokenId,
    genome: &TreeGenome,
    state: &TreeState,
    projection: &Projection,
    svg: &str,
) -> String {
    let meta = TokenMetadata {
        name: format!("Merge Tree #{token_id}"),
        description: DESCRIPTION,
        attributes: vec![
            attr("Length", projection.length),
            attr("Diameter", genome.diameter),
            attr("Segments", state.segments),
            attr("Branches", genome.branches),
            attr("Angle", genome.angle),
            attr("Stags", state.stags),
            attr("Hares", state.hares),
            attr("Animated", state.animated),
        ],
        image: format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg)),
    };
    serde_json::to_string(&meta).expect("metadata serialization is infallible")
}

/// The full token URI: the metadata document itself wrapped as a base64
/// `data:application/json` URI.
pub fn token_uri(
    token_id: TokenId,
    genome: &TreeGenome,
    state: &TreeState,
    projection: &Projection,
    svg: &str,
) -> String {
    let json = metadata_json(token_id, genome, state, projection, svg);
    format!("data:application/json;base64,{}", STANDARD.encode(json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtree_growth::GrowthPhase;

    fn fixture() -> (TreeGenome, TreeState, Projection) {
        let genome = TreeGenome {
            init_length: 22,
            diameter: 12,
            branches: 3,
            angle: 45,
            d: 7,
            delta: 1,
        };
        let state = TreeState {
            segments: 2,
            animated: false,
            stags: 1,
            hares: 3,
            minted_since: 0,
        };
        let projection = Projection {
            length: 37,
            phase: GrowthPhase::Growing,
        };
        (genome, state, projection)
    }

    #[test]
    fn metadata_names_the_token() {
        let (g, s, p) = fixture();
        let json = metadata_json(42, &g, &s, &p, "<svg></svg>");
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["name"], "Merge Tree #42");
    }

    #[test]
    fn image_is_a_base64_svg_uri() {
        let (g, s, p) = fixture();
        let json = metadata_json(0, &g, &s, &p, "<svg>x</svg>");
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        let image = v["image"].as_str().unwrap();
        let payload = image.strip_prefix("data:image/svg+xml;base64,").unwrap();
        assert_eq!(STANDARD.decode(payload).unwrap(), b"<svg>x</svg>");
    }

    #[test]
    fn attributes_reflect_state() {
        let (g, s, p) = fixture();
        let json = metadata_json(0, &g, &s, &p, "<svg></svg>");
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        let attrs = v["attributes"].as_array().unwrap();
        let find = |name: &str| {
            attrs
                .iter()
                .find(|a| a["trait_type"] == name)
                .unwrap_or_else(|| panic!("missing attribute {name}"))["value"]
                .clone()
        };
        assert_eq!(find("Length"), 37);
        assert_eq!(find("Segments"), 2);
        assert_eq!(find("Hares"), 3);
        assert_eq!(find("Animated"), false);
    }

    #[test]
    fn token_uri_round_trips_to_metadata() {
        let (g, s, p) = fixture();
        let uri = token_uri(7, &g, &s, &p, "<svg></svg>");
        let payload = uri.strip_prefix("data:application/json;base64,").unwrap();
        let json = String::from_utf8(STANDARD.decode(payload).unwrap()).unwrap();
        assert_eq!(json, metadata_json(7, &g, &s, &p, "<svg></svg>"));
    }
}
