// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text measurement. Block heights depend on text wrapping, which depends on
// font metrics, so measurement is a capability the active render backend can
// supply. The built-in measurer uses a static Helvetica width table matching
// the PDF built-in font the vector backend writes with.

/// Points to millimetres (1 pt = 1/72 inch).
pub const PT_TO_MM: f32 = 0.352_778;

/// Width measurement for a single font at arbitrary sizes.
///
/// Implementations must be deterministic for a given input; the paginator
/// relies on measuring the same text twice yielding the same answer.
pub trait TextMeasurer {
    /// Rendered width of `text` in millimetres at `size_pt`.
    fn text_width_mm(&self, text: &str, size_pt: f32) -> f32;

    /// Greedy word-wrap of `text` into lines no wider than `max_width_mm`.
    ///
    /// Words wider than the full line are force-broken. Blank input yields
    /// no lines.
    fn wrap(&self, text: &str, size_pt: f32, max_width_mm: f32) -> Vec<String> {
        let mut lines = Vec::new();
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return lines;
        }

        let space_w = self.text_width_mm(" ", size_pt);
        let mut current = String::new();
        let mut current_w = 0.0_f32;

        for word in words {
            let word_w = self.text_width_mm(word, size_pt);

            if word_w > max_width_mm {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_w = 0.0;
                }
                // Force-break the oversized word character by character.
                let mut chunk = String::new();
                let mut chunk_w = 0.0_f32;
                for ch in word.chars() {
                    let ch_w = self.text_width_mm(ch.encode_utf8(&mut [0u8; 4]), size_pt);
                    if chunk_w + ch_w > max_width_mm && !chunk.is_empty() {
                        lines.push(std::mem::take(&mut chunk));
                        chunk_w = 0.0;
                    }
                    chunk.push(ch);
                    chunk_w += ch_w;
                }
                current = chunk;
                current_w = chunk_w;
                continue;
            }

            if current.is_empty() {
                current.push_str(word);
                current_w = word_w;
            } else if current_w + space_w + word_w <= max_width_mm {
                current.push(' ');
                current.push_str(word);
                current_w += space_w + word_w;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_w = word_w;
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    /// Number of wrapped lines `text` occupies at `size_pt` in `max_width_mm`.
    fn line_count(&self, text: &str, size_pt: f32, max_width_mm: f32) -> usize {
        self.wrap(text, size_pt, max_width_mm).len()
    }
}

/// Static Helvetica character-width table.
///
/// Widths are the Adobe AFM values scaled to em units, covering ASCII
/// 0x20..=0x7E; other codepoints fall back to an average width. The same
/// approximation drives both pagination and the vector backend, so the two
/// agree on where lines break.
pub struct HelveticaMetrics;

/// AFM widths / 1000 for ASCII 0x20 (space) through 0x7E (~).
#[rustfmt::skip]
static HELVETICA_WIDTHS: [f32; 95] = [
    // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
    0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
    // 0      1      2      3      4      5      6      7      8      9
    0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
    // :      ;      <      =      >      ?      @
    0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
    // A      B      C      D      E      F      G      H      I      J      K      L      M
    0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
    // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
    0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
    // [      \      ]      ^      _      `
    0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
    // a      b      c      d      e      f      g      h      i      j      k      l      m
    0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
    // n      o      p      q      r      s      t      u      v      w      x      y      z
    0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
    // {      |      }      ~
    0.334, 0.260, 0.334, 0.584,
];

/// Fallback for codepoints outside the table.
const HELVETICA_AVERAGE: f32 = 0.513;

impl HelveticaMetrics {
    /// Width of one string in em units at 1 em.
    fn measure_em(text: &str) -> f32 {
        text.chars()
            .map(|c| {
                let code = c as usize;
                if (0x20..=0x7E).contains(&code) {
                    HELVETICA_WIDTHS[code - 0x20]
                } else {
                    HELVETICA_AVERAGE
                }
            })
            .sum()
    }
}

impl TextMeasurer for HelveticaMetrics {
    fn text_width_mm(&self, text: &str, size_pt: f32) -> f32 {
        Self::measure_em(text) * size_pt * PT_TO_MM
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_measures_zero() {
        assert_eq!(HelveticaMetrics.text_width_mm("", 10.0), 0.0);
    }

    #[test]
    fn digits_share_a_width() {
        let m = HelveticaMetrics;
        assert_eq!(m.text_width_mm("1111", 10.0), m.text_width_mm("8888", 10.0));
    }

    #[test]
    fn width_scales_linearly_with_size() {
        let m = HelveticaMetrics;
        let at_ten = m.text_width_mm("Resume", 10.0);
        let at_twenty = m.text_width_mm("Resume", 20.0);
        assert!((at_twenty - 2.0 * at_ten).abs() < 1e-4);
    }

    #[test]
    fn non_ascii_falls_back_to_average() {
        let m = HelveticaMetrics;
        let expected = HELVETICA_AVERAGE * 10.0 * PT_TO_MM;
        assert!((m.text_width_mm("é", 10.0) - expected).abs() < 1e-4);
    }

    #[test]
    fn short_text_stays_on_one_line() {
        let lines = HelveticaMetrics.wrap("Hello world", 10.0, 180.0);
        assert_eq!(lines, vec!["Hello world"]);
    }

    #[test]
    fn wrap_respects_max_width() {
        let m = HelveticaMetrics;
        let text = "Built a distributed caching layer with consistent hashing \
                    that cut tail latency under sustained production load";
        let max = 60.0;
        let lines = m.wrap(text, 10.0, max);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(
                m.text_width_mm(line, 10.0) <= max + 1e-3,
                "line {line:?} exceeds max width"
            );
        }
    }

    #[test]
    fn wrap_preserves_every_word() {
        let text = "one two three four five six seven eight nine ten";
        let lines = HelveticaMetrics.wrap(text, 10.0, 25.0);
        let rejoined = lines.join(" ");
        assert_eq!(rejoined, text);
    }

    #[test]
    fn oversized_word_is_force_broken() {
        let m = HelveticaMetrics;
        let word = "w".repeat(200);
        let lines = m.wrap(&word, 10.0, 30.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(m.text_width_mm(line, 10.0) <= 30.0 + 1e-3);
        }
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn blank_text_wraps_to_nothing() {
        assert!(HelveticaMetrics.wrap("   ", 10.0, 100.0).is_empty());
    }
}
