//src/align/affine.rs

//! Gotoh three-state dynamic programming.
//!
//! States per cell `(i, j)`:
//! - `Match`: `a[i-1]` against `b[j-1]`
//! - `GapB`: `a[i-1]` against a gap (gap on track B)
//! - `GapA`: a gap against `b[j-1]` (gap on track A)
//!
//! Scores are kept in rolling rows; the traceback is one byte per cell with
//! two bits per state naming its predecessor. Ties resolve in a fixed order:
//! a diagonal predecessor prefers `Match`, then `GapB`, then `GapA`; a gap
//! cell prefers extending its own gap, then opening from `Match`, then
//! switching gap side.

use super::{AlignMode, Scoring};
use crate::types::{Alignment, GAP};

const NEG_INF: i32 = i32::MIN / 4;

const X_SHIFT: u8 = 2;
const Y_SHIFT: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Match,
    GapB,
    GapA,
    /// Local alignment begins here.
    Start,
}

impl State {
    #[inline]
    fn encode(self) -> u8 {
        match self {
            State::Match => 0,
            State::GapB => 1,
            State::GapA => 2,
            State::Start => 3,
        }
    }

    #[inline]
    fn decode(bits: u8) -> State {
        match bits & 0b11 {
            0 => State::Match,
            1 => State::GapB,
            2 => State::GapA,
            _ => State::Start,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Best {
    score: i32,
    i: usize,
    j: usize,
    state: State,
}

/// Highest candidate; earlier entries win ties.
#[inline]
fn pick(candidates: [(i32, State); 3]) -> (i32, State) {
    let mut best = candidates[0];
    for &cand in &candidates[1..] {
        if cand.0 > best.0 {
            best = cand;
        }
    }
    best
}

/// Fills the DP, optionally recording the traceback into `trace`
/// (`(a.len() + 1) * (b.len() + 1)` bytes, row-major).
fn fill(
    a: &[u8],
    b: &[u8],
    mode: AlignMode,
    scoring: &Scoring,
    mut trace: Option<&mut Vec<u8>>,
) -> Best {
    let n = a.len();
    let m = b.len();
    let width = m + 1;
    let open = scoring.gap_open;
    let ext = scoring.gap_extend;

    if let Some(t) = trace.as_deref_mut() {
        t.clear();
        t.resize((n + 1) * width, 0);
    }

    let mut prev_m = vec![NEG_INF; width];
    let mut prev_x = vec![NEG_INF; width];
    let mut prev_y = vec![NEG_INF; width];
    let mut cur_m = vec![NEG_INF; width];
    let mut cur_x = vec![NEG_INF; width];
    let mut cur_y = vec![NEG_INF; width];

    // Row 0: only leading gaps on track A exist, and only in global mode.
    if mode == AlignMode::Global {
        prev_m[0] = 0;
        for j in 1..=m {
            let (v, src) = pick([
                (prev_y[j - 1].saturating_add(ext), State::GapA),
                (prev_m[j - 1].saturating_add(open), State::Match),
                (prev_x[j - 1].saturating_add(open), State::GapB),
            ]);
            prev_y[j] = v;
            if let Some(t) = trace.as_deref_mut() {
                t[j] = src.encode() << Y_SHIFT;
            }
        }
    }

    let mut best = Best {
        score: 0,
        i: 0,
        j: 0,
        state: State::Start,
    };

    for i in 1..=n {
        let ai = a[i - 1];
        cur_m[0] = NEG_INF;
        cur_y[0] = NEG_INF;
        cur_x[0] = NEG_INF;
        if mode == AlignMode::Global {
            let (v, src) = pick([
                (prev_x[0].saturating_add(ext), State::GapB),
                (prev_m[0].saturating_add(open), State::Match),
                (prev_y[0].saturating_add(open), State::GapA),
            ]);
            cur_x[0] = v;
            if let Some(t) = trace.as_deref_mut() {
                t[i * width] = src.encode() << X_SHIFT;
            }
        }

        for j in 1..=m {
            let (diag, diag_src) = pick([
                (prev_m[j - 1], State::Match),
                (prev_x[j - 1], State::GapB),
                (prev_y[j - 1], State::GapA),
            ]);
            let sub = scoring.substitution(ai, b[j - 1]);
            let (mv, m_src) = if mode == AlignMode::Local && diag <= 0 {
                (sub, State::Start)
            } else {
                (sub.saturating_add(diag), diag_src)
            };
            cur_m[j] = mv;

            let (xv, x_src) = pick([
                (prev_x[j].saturating_add(ext), State::GapB),
                (prev_m[j].saturating_add(open), State::Match),
                (prev_y[j].saturating_add(open), State::GapA),
            ]);
            cur_x[j] = xv;

            let (yv, y_src) = pick([
                (cur_y[j - 1].saturating_add(ext), State::GapA),
                (cur_m[j - 1].saturating_add(open), State::Match),
                (cur_x[j - 1].saturating_add(open), State::GapB),
            ]);
            cur_y[j] = yv;

            if let Some(t) = trace.as_deref_mut() {
                t[i * width + j] =
                    m_src.encode() | (x_src.encode() << X_SHIFT) | (y_src.encode() << Y_SHIFT);
            }

            // A local alignment never gains by ending in a gap.
            if mode == AlignMode::Local && mv > best.score {
                best = Best {
                    score: mv,
                    i,
                    j,
                    state: State::Match,
                };
            }
        }

        std::mem::swap(&mut prev_m, &mut cur_m);
        std::mem::swap(&mut prev_x, &mut cur_x);
        std::mem::swap(&mut prev_y, &mut cur_y);
    }

    if mode == AlignMode::Global {
        let (score, state) = pick([
            (prev_m[m], State::Match),
            (prev_x[m], State::GapB),
            (prev_y[m], State::GapA),
        ]);
        best = Best {
            score,
            i: n,
            j: m,
            state,
        };
    }
    best
}

fn traceback(a: &[u8], b: &[u8], trace: &[u8], best: Best) -> Alignment {
    let width = b.len() + 1;
    let mut track_a = Vec::with_capacity(a.len() + b.len());
    let mut track_b = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j, mut state) = (best.i, best.j, best.state);

    loop {
        if i == 0 && j == 0 {
            break;
        }
        let bits = trace[i * width + j];
        match state {
            State::Start => break,
            State::Match => {
                track_a.push(a[i - 1]);
                track_b.push(b[j - 1]);
                state = State::decode(bits);
                i -= 1;
                j -= 1;
            }
            State::GapB => {
                track_a.push(a[i - 1]);
                track_b.push(GAP);
                state = State::decode(bits >> X_SHIFT);
                i -= 1;
            }
            State::GapA => {
                track_a.push(GAP);
                track_b.push(b[j - 1]);
                state = State::decode(bits >> Y_SHIFT);
                j -= 1;
            }
        }
    }

    track_a.reverse();
    track_b.reverse();
    Alignment {
        track_a,
        track_b,
        score: best.score,
        a_range: i..best.i,
        b_range: j..best.j,
    }
}

pub fn align(a: &[u8], b: &[u8], mode: AlignMode, scoring: &Scoring) -> Alignment {
    let mut trace = Vec::new();
    let best = fill(a, b, mode, scoring, Some(&mut trace));
    traceback(a, b, &trace, best)
}

pub fn score(a: &[u8], b: &[u8], mode: AlignMode, scoring: &Scoring) -> i32 {
    fill(a, b, mode, scoring, None).score
}
