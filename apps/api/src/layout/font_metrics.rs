//! Static glyph-advance tables for the PDF base-14 faces the renderer draws with.
//!
//! Widths are in em units (relative to font size), taken from the standard Adobe AFM
//! metrics. Kerning is ignored: the tables give a per-character advance and nothing more,
//! which is all the layout needs to right-align a string or fit a name into a band.
//! All tables cover ASCII 0x20..=0x7E (95 printable characters).
//! Index = (char as usize) - 32.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Font faces
// ────────────────────────────────────────────────────────────────────────────

/// Font families available without embedding (PDF base-14).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    /// Neutral sans-serif. Default for every preset.
    Helvetica,
    /// Classic serif.
    Times,
    /// Fixed pitch.
    Courier,
}

impl FontFamily {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "helvetica" | "sans" => Some(FontFamily::Helvetica),
            "times" | "times-roman" | "serif" => Some(FontFamily::Times),
            "courier" | "mono" => Some(FontFamily::Courier),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    Regular,
    Bold,
}

/// A concrete face: family plus weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontFace {
    pub family: FontFamily,
    pub weight: FontWeight,
}

impl FontFace {
    pub const fn regular(family: FontFamily) -> Self {
        FontFace {
            family,
            weight: FontWeight::Regular,
        }
    }

    pub const fn bold(family: FontFamily) -> Self {
        FontFace {
            family,
            weight: FontWeight::Bold,
        }
    }

    /// PostScript name of the base-14 font.
    pub fn base_font_name(&self) -> &'static str {
        match (self.family, self.weight) {
            (FontFamily::Helvetica, FontWeight::Regular) => "Helvetica",
            (FontFamily::Helvetica, FontWeight::Bold) => "Helvetica-Bold",
            (FontFamily::Times, FontWeight::Regular) => "Times-Roman",
            (FontFamily::Times, FontWeight::Bold) => "Times-Bold",
            (FontFamily::Courier, FontWeight::Regular) => "Courier",
            (FontFamily::Courier, FontWeight::Bold) => "Courier-Bold",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for one face.
///
/// `widths[i]` = advance of ASCII character `(i + 32)` at 1em, covering 0x20 (space)
/// through 0x7E (~).
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    pub face: FontFace,
    widths: [f32; 95],
    /// Fallback width for characters outside printable ASCII.
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    /// Measures the advance width of a string in em units.
    ///
    /// Non-ASCII characters fall back to `average_char_width`.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32]
                } else {
                    self.average_char_width
                }
            })
            .sum()
    }

    /// Width of `s` in points when set at `size_pt`.
    pub fn text_width(&self, s: &str, size_pt: f32) -> f32 {
        self.measure_str(s) * size_pt
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    face: FontFace::regular(FontFamily::Helvetica),
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0-9
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
    average_char_width: 0.52,
    space_width: 0.278,
};

static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    face: FontFace::bold(FontFamily::Helvetica),
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0-9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {      |      }      ~
        0.389, 0.280, 0.389, 0.584,
    ],
    average_char_width: 0.56,
    space_width: 0.278,
};

static TIMES_TABLE: FontMetricTable = FontMetricTable {
    face: FontFace::regular(FontFamily::Times),
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.250, 0.333, 0.408, 0.500, 0.500, 0.833, 0.778, 0.180, 0.333, 0.333, 0.500, 0.564, 0.250, 0.333, 0.250, 0.278,
        // 0-9
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
    average_char_width: 0.47,
    space_width: 0.250,
};

static TIMES_BOLD_TABLE: FontMetricTable = FontMetricTable {
    face: FontFace::bold(FontFamily::Times),
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.250, 0.333, 0.555, 0.500, 0.500, 1.000, 0.833, 0.278, 0.333, 0.333, 0.500, 0.570, 0.250, 0.333, 0.250, 0.278,
        // 0-9
        0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.570, 0.570, 0.570, 0.500, 0.930,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.778, 0.389, 0.500, 0.778, 0.667, 0.944,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.611, 0.778, 0.722, 0.556, 0.667, 0.722, 0.722, 1.000, 0.722, 0.722, 0.667,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.581, 0.500, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.500, 0.556, 0.444, 0.556, 0.444, 0.333, 0.500, 0.556, 0.278, 0.333, 0.556, 0.278, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.500, 0.556, 0.556, 0.444, 0.389, 0.333, 0.556, 0.500, 0.722, 0.500, 0.500, 0.444,
        // {      |      }      ~
        0.394, 0.220, 0.394, 0.520,
    ],
    average_char_width: 0.50,
    space_width: 0.250,
};

// Courier is fixed pitch: every glyph advances 0.6em in both weights.
static COURIER_TABLE: FontMetricTable = FontMetricTable {
    face: FontFace::regular(FontFamily::Courier),
    widths: [0.600; 95],
    average_char_width: 0.600,
    space_width: 0.600,
};

static COURIER_BOLD_TABLE: FontMetricTable = FontMetricTable {
    face: FontFace::bold(FontFamily::Courier),
    widths: [0.600; 95],
    average_char_width: 0.600,
    space_width: 0.600,
};

/// Returns the static metric table for a face.
pub fn get_metrics(face: &FontFace) -> &'static FontMetricTable {
    match (face.family, face.weight) {
        (FontFamily::Helvetica, FontWeight::Regular) => &HELVETICA_TABLE,
        (FontFamily::Helvetica, FontWeight::Bold) => &HELVETICA_BOLD_TABLE,
        (FontFamily::Times, FontWeight::Regular) => &TIMES_TABLE,
        (FontFamily::Times, FontWeight::Bold) => &TIMES_BOLD_TABLE,
        (FontFamily::Courier, FontWeight::Regular) => &COURIER_TABLE,
        (FontFamily::Courier, FontWeight::Bold) => &COURIER_BOLD_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
