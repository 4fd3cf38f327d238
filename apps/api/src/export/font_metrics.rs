//! Static font-metric tables for the two PDF base-font families used in exports.
//!
//! Character widths are in em units (relative to font size), taken from the
//! standard Type1 metrics. Tables cover ASCII 0x20..=0x7E (95 printable characters).
//! Index = (char as usize) - 32.

use serde::{Deserialize, Serialize};

/// Bold glyphs run wider than regular ones; approximated with one factor.
const BOLD_WIDTH_FACTOR: f32 = 1.06;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    /// Sans-serif templates (Arial, Helvetica Neue, ...).
    Helvetica,
    /// Serif templates (Georgia, Garamond, ...).
    Times,
}

impl FontFamily {
    /// Picks the base font for a template's CSS-style font stack.
    pub fn from_font_stack(stack: &str) -> Self {
        let families: Vec<String> = stack
            .split(',')
            .map(|f| f.trim().trim_matches('"').to_lowercase())
            .collect();
        let serif = families.iter().any(|f| {
            f == "serif" || f.contains("georgia") || f.contains("times") || f.contains("garamond")
        });
        if serif {
            FontFamily::Times
        } else {
            FontFamily::Helvetica
        }
    }

    pub fn regular_name(&self) -> &'static str {
        match self {
            FontFamily::Helvetica => "Helvetica",
            FontFamily::Times => "Times-Roman",
        }
    }

    pub fn bold_name(&self) -> &'static str {
        match self {
            FontFamily::Helvetica => "Helvetica-Bold",
            FontFamily::Times => "Times-Bold",
        }
    }

    pub fn metrics(&self) -> &'static FontMetricTable {
        match self {
            FontFamily::Helvetica => &HELVETICA_TABLE,
            FontFamily::Times => &TIMES_TABLE,
        }
    }
}

/// Static character-width table for a font family.
///
/// `widths[i]` = width of ASCII character `(i + 32)` at 1em.
pub struct FontMetricTable {
    widths: [f32; 95],
    /// Fallback width for non-ASCII characters (codepoints > 0x7E).
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    /// Measures the rendered width of a string in em units.
    ///
    /// Non-ASCII characters fall back to `average_char_width`.
    pub fn measure_str(&self, s: &str, bold: bool) -> f32 {
        let width: f32 = s
            .chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32]
                } else {
                    self.average_char_width
                }
            })
            .sum();
        if bold {
            width * BOLD_WIDTH_FACTOR
        } else {
            width
        }
    }

    /// Greedy word-wrap of `s` into lines no wider than `max_width_em`.
    ///
    /// Explicit newlines always break. A single word wider than the line is
    /// split at character boundaries.
    pub fn wrap(&self, s: &str, max_width_em: f32, bold: bool) -> Vec<String> {
        let space_w = if bold {
            self.space_width * BOLD_WIDTH_FACTOR
        } else {
            self.space_width
        };
        let mut lines = Vec::new();

        for paragraph in s.lines() {
            let mut current = String::new();
            let mut current_width = 0.0_f32;

            for word in paragraph.split_whitespace() {
                for piece in self.split_long_word(word, max_width_em, bold) {
                    let piece_w = self.measure_str(&piece, bold);
                    if current.is_empty() {
                        current = piece;
                        current_width = piece_w;
                    } else if current_width + space_w + piece_w > max_width_em {
                        lines.push(std::mem::take(&mut current));
                        current = piece;
                        current_width = piece_w;
                    } else {
                        current.push(' ');
                        current.push_str(&piece);
                        current_width += space_w + piece_w;
                    }
                }
            }
            if !current.is_empty() {
                lines.push(current);
            }
        }
        lines
    }

    fn split_long_word(&self, word: &str, max_width_em: f32, bold: bool) -> Vec<String> {
        if self.measure_str(word, bold) <= max_width_em {
            return vec![word.to_string()];
        }
        let mut pieces = Vec::new();
        let mut current = String::new();
        for c in word.chars() {
            let mut candidate = current.clone();
            candidate.push(c);
            if !current.is_empty() && self.measure_str(&candidate, bold) > max_width_em {
                pieces.push(std::mem::take(&mut current));
                current.push(c);
            } else {
                current = candidate;
            }
        }
        if !current.is_empty() {
            pieces.push(current);
        }
        pieces
    }
}

/// Helvetica (Arial-compatible).
static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
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
    ],
    average_char_width: 0.56,
    space_width: 0.278,
};

/// Times-Roman (Georgia stand-in).
static TIMES_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.250, 0.333, 0.408, 0.500, 0.500, 0.833, 0.778, 0.180, 0.333, 0.333, 0.500, 0.564, 0.250, 0.333, 0.250, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.564, 0.564, 0.564, 0.444, 0.921,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.667, 0.667, 0.722, 0.611, 0.556, 0.722, 0.722, 0.333, 0.389, 0.722, 0.611, 0.889,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.722, 0.556, 0.722, 0.667, 0.556, 0.611, 0.722, 0.722, 0.944, 0.722, 0.722, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.469, 0.500, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.444, 0.500, 0.444, 0.500, 0.444, 0.333, 0.500, 0.500, 0.278, 0.278, 0.500, 0.278, 0.778,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.500, 0.500, 0.500, 0.500, 0.333, 0.389, 0.278, 0.500, 0.500, 0.722, 0.500, 0.500, 0.444,
        // {      |      }      ~
        0.480, 0.200, 0.480, 0.541,
    ],
    average_char_width: 0.50,
    space_width: 0.250,
};
