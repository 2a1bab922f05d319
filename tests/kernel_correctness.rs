use blockflow::kernel::scalar::ScalarKernel;
use blockflow::kernel::{placement_shape, sliding_sum_of_squares, CorrelationKernel};
use blockflow::{BlockMatcher, Displacement, ImageView, PenaltyGrid};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_image(rng: &mut StdRng, width: usize, height: usize) -> Vec<f32> {
    (0..width * height)
        .map(|_| rng.random_range(0.0f32..255.0))
        .collect()
}

fn brute_force_sum_sq(window: ImageView<'_, f32>, pw: usize, ph: usize) -> Vec<f64> {
    let cols = window.width() - pw + 1;
    let rows = window.height() - ph + 1;
    let mut out = Vec::with_capacity(cols * rows);
    for y in 0..rows {
        for x in 0..cols {
            let mut acc = 0.0f64;
            for ty in 0..ph {
                let row = window.row(y + ty).unwrap();
                for &v in &row[x..x + pw] {
                    acc += f64::from(v) * f64::from(v);
                }
            }
            out.push(acc);
        }
    }
    out
}

fn brute_force_ssd(window: ImageView<'_, f32>, tpl: ImageView<'_, f32>) -> Vec<f64> {
    let (cols, rows) = placement_shape(window, tpl.width(), tpl.height()).unwrap();
    let mut out = Vec::with_capacity(cols * rows);
    for y in 0..rows {
        for x in 0..cols {
            let mut acc = 0.0f64;
            for ty in 0..tpl.height() {
                let win_row = window.row(y + ty).unwrap();
                let tpl_row = tpl.row(ty).unwrap();
                for tx in 0..tpl.width() {
                    let d = f64::from(win_row[x + tx]) - f64::from(tpl_row[tx]);
                    acc += d * d;
                }
            }
            out.push(acc);
        }
    }
    out
}

#[test]
fn sliding_sum_of_squares_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(7);
    let (width, height) = (23, 17);
    let data = random_image(&mut rng, width, height);
    let view = ImageView::from_slice(&data, width, height).unwrap();

    for &(pw, ph) in &[(1, 1), (3, 3), (5, 7), (23, 17)] {
        let fast = sliding_sum_of_squares(view, pw, ph).unwrap();
        let slow = brute_force_sum_sq(view, pw, ph);
        assert_eq!(fast.len(), slow.len());
        for (a, b) in fast.iter().zip(&slow) {
            assert!((a - b).abs() <= 1e-9 * b.max(1.0), "{a} vs {b}");
        }
    }
}

#[test]
fn sliding_sum_of_squares_respects_roi_stride() {
    let mut rng = StdRng::seed_from_u64(8);
    let (width, height) = (30, 30);
    let data = random_image(&mut rng, width, height);
    let view = ImageView::from_slice(&data, width, height).unwrap();
    let window = view.patch(15, 12, 6).unwrap();

    let fast = sliding_sum_of_squares(window, 5, 5).unwrap();
    let slow = brute_force_sum_sq(window, 5, 5);
    for (a, b) in fast.iter().zip(&slow) {
        assert!((a - b).abs() <= 1e-9 * b.max(1.0));
    }
}

#[test]
fn decomposed_distance_matches_direct_ssd() {
    let mut rng = StdRng::seed_from_u64(11);
    let (width, height) = (25, 25);
    let data = random_image(&mut rng, width, height);
    let view = ImageView::from_slice(&data, width, height).unwrap();
    let tpl = view.patch(9, 14, 3).unwrap();
    let window = view.patch(12, 12, 7).unwrap();

    let sum_w2 = sliding_sum_of_squares(window, 7, 7).unwrap();
    let sum_t2: f64 = tpl
        .rows()
        .flatten()
        .map(|&v| f64::from(v) * f64::from(v))
        .sum();
    let mut dots = vec![0.0; sum_w2.len()];
    ScalarKernel::correlate_valid(window, tpl, &mut dots).unwrap();

    let direct = brute_force_ssd(window, tpl);
    for ((w2, dot), d) in sum_w2.iter().zip(&dots).zip(&direct) {
        let decomposed = sum_t2 + w2 - 2.0 * dot;
        assert!((decomposed - d).abs() <= 1e-6 * (sum_t2 + w2), "{decomposed} vs {d}");
    }
}

#[test]
fn block_matcher_agrees_with_brute_force_argmin() {
    let mut rng = StdRng::seed_from_u64(21);
    let (width, height) = (30, 30);
    let first = random_image(&mut rng, width, height);
    let second = random_image(&mut rng, width, height);
    let v1 = ImageView::from_slice(&first, width, height).unwrap();
    let v2 = ImageView::from_slice(&second, width, height).unwrap();
    let (patch_r, search_r) = (2, 4);
    let penalty = PenaltyGrid::new(search_r, 0.01).unwrap();
    let matcher = BlockMatcher::new(v1, v2, patch_r, &penalty).unwrap();
    let mut scratch = matcher.scratch();

    for &(cx, cy) in &[(10, 10), (15, 12), (20, 19)] {
        let tpl = v1.patch(cx, cy, patch_r).unwrap();
        let window = v2.patch(cx, cy, patch_r + search_r).unwrap();
        let direct = brute_force_ssd(window, tpl);
        let mut best = 0;
        for (idx, d) in direct.iter().enumerate() {
            let cost = (d + 1e-6) * penalty.as_slice()[idx];
            if cost < (direct[best] + 1e-6) * penalty.as_slice()[best] {
                best = idx;
            }
        }
        let side = penalty.side();
        let expected = Displacement {
            dx: (best % side) as isize - search_r as isize,
            dy: (best / side) as isize - search_r as isize,
        };
        let found = matcher.match_at(cx, cy, &mut scratch).unwrap();
        assert_eq!(found.displacement, expected);
    }
}
