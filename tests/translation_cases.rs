//! Integer translations driven by the cases in `tests/data/translation_cases.json`.
//!
//! Each case crops two windows from one random texture so that the second is
//! the first moved by `(dx, dy)`, then checks that the interior of the flow
//! field reports exactly that displacement.

use blockflow::{compute_flow, FlowConfig, ImageView};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

const CASES_JSON: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/data/translation_cases.json"
));

/// Side of the cropped input images.
const SIDE: usize = 40;

/// Offset of the first crop inside the base texture.
const ORIGIN: usize = 15;

/// Maximum absolute error on integer translations.
const TOLERANCE_PX: f32 = 1e-3;

#[derive(Debug, Deserialize)]
struct Manifest {
    cases: Vec<TranslationCase>,
}

#[derive(Debug, Deserialize)]
struct TranslationCase {
    case_id: String,
    seed: u64,
    dx: isize,
    dy: isize,
    patch_r: usize,
    search_r: usize,
    #[serde(default = "default_sigma")]
    sigma: f32,
}

fn default_sigma() -> f32 {
    blockflow::flow::DEFAULT_SIGMA
}

fn crop(src: &[u8], src_w: usize, x0: usize, y0: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(SIDE * SIDE);
    for y in 0..SIDE {
        let start = (y0 + y) * src_w + x0;
        out.extend_from_slice(&src[start..start + SIDE]);
    }
    out
}

fn run_case(case: &TranslationCase) {
    assert!(
        case.dx.unsigned_abs() <= case.search_r && case.dy.unsigned_abs() <= case.search_r,
        "{}: displacement outside the search radius",
        case.case_id
    );
    let base_side = SIDE + 2 * ORIGIN;
    let mut rng = StdRng::seed_from_u64(case.seed);
    let base: Vec<u8> = (0..base_side * base_side)
        .map(|_| rng.random_range(0..=255))
        .collect();

    let first = crop(&base, base_side, ORIGIN, ORIGIN);
    let second = crop(
        &base,
        base_side,
        (ORIGIN as isize - case.dx) as usize,
        (ORIGIN as isize - case.dy) as usize,
    );

    let cfg = FlowConfig {
        sigma: case.sigma,
        thr: 0.0,
        ..FlowConfig::new(case.patch_r, case.search_r)
    };
    let field = compute_flow(
        ImageView::from_slice(&first, SIDE, SIDE).unwrap(),
        ImageView::from_slice(&second, SIDE, SIDE).unwrap(),
        &cfg,
    )
    .unwrap();
    assert_eq!((field.width(), field.height()), (SIDE, SIDE), "{}", case.case_id);

    let smoothing_r = (3.0 * case.sigma).ceil() as usize;
    let border = case.patch_r + case.search_r + smoothing_r;
    for y in border..SIDE - border {
        for x in border..SIDE - border {
            let (vx, vy, _) = field.at(x, y).unwrap();
            assert!(
                (vx - case.dx as f32).abs() < TOLERANCE_PX
                    && (vy - case.dy as f32).abs() < TOLERANCE_PX,
                "{}: ({x}, {y}) -> ({vx}, {vy})",
                case.case_id
            );
        }
    }
}

#[test]
fn manifest_translations_are_recovered() {
    let manifest: Manifest = serde_json::from_str(CASES_JSON).unwrap();
    assert!(!manifest.cases.is_empty());
    for case in &manifest.cases {
        run_case(case);
    }
}
